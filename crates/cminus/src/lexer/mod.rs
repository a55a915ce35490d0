//! Lexer module for tokenizing C- source code

mod scanner;
mod token;

pub use scanner::{Lexer, tokenize};
pub use token::{Token, TokenKind};

pub(crate) use token::PAST_END;
