//! Pet health assistant: prompt building, remote completion and reply parsing.
//!
//! The assistant only narrates and advises. Scores, patterns and adherence
//! are computed locally by `pawlog-core` and stay available when the
//! assistant is unreachable.

pub mod assistant;
pub mod client;
pub mod context;
pub mod parser;
pub mod prompts;

pub use assistant::*;
pub use client::*;
pub use context::*;
pub use parser::*;
pub use prompts::*;
