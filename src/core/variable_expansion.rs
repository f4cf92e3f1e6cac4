use std::borrow::Cow;

/// Expands to the shell's own process id.
pub const PID_MARKER: &str = "$$";

/// Replaces every `$$` in `line` with `pid`, scanning left to right.
///
/// Replacement text is never rescanned, so `$$$` becomes `<pid>$`. A line
/// without the marker is returned as-is without allocating.
pub fn expand_pid<'a>(line: &'a str, pid: &str) -> Cow<'a, str> {
    if line.contains(PID_MARKER) {
        Cow::Owned(line.replace(PID_MARKER, pid))
    } else {
        Cow::Borrowed(line)
    }
}
