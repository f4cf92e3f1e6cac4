//! Line-level building blocks: pid expansion, parsing, and process outcomes.

pub mod job;
pub mod parser;
pub mod variable_expansion;
