//! C- syntax checker
//!
//! This library scans source text of the C- teaching language into tokens
//! and checks them against its LL(1) grammar, reporting every lexical and
//! syntax error it finds instead of stopping at the first one.
//!
//! ## Architecture
//!
//! The checker is organized into:
//! - **Lexer** (`lexer/`): single pass from characters to tokens, ending in `EndOfInput`
//! - **Parser** (`parser/`): predictive recursive descent over the finished token list
//! - **Driver** (`driver/`): the lex -> parse pipeline used by the binary
//! - **Common** (`common/`): shared infrastructure (errors, spans, diagnostic rendering)

pub mod common;
pub mod driver;
pub mod lexer;
pub mod parser;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{CheckConfig, CheckReport, check_source};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::Parser;
