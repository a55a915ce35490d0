//! Predictive LL(1) syntax checker for C-

mod parser;

pub use parser::{DEFAULT_MAX_DEPTH, Parser};
