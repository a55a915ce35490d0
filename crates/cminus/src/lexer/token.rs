//! Token definitions for the C- lexer

use crate::common::Span;
use logos::Logos;
use std::fmt;

/// Token with its lexeme and source location.
///
/// `line` and `column` are 1-based and point at the first character of the
/// lexeme. The end marker appended by the lexer has an empty lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

/// Handed out by the parser when it reads past the end of a token sequence
pub(crate) static PAST_END: Token = Token {
    kind: TokenKind::EndOfInput,
    lexeme: String::new(),
    line: 0,
    column: 0,
    span: Span::new(0, 0),
};

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' at {}:{}", self.kind, self.lexeme, self.line, self.column)
    }
}

/// All token kinds in C-
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\n\x0B\x0C\r\x1C-\x1F]+")]
// Unicode space separators, except the no-break spaces U+00A0, U+2007 and U+202F
#[logos(skip r"[\x{1680}\x{2000}-\x{2006}\x{2008}-\x{200A}\x{2028}\x{2029}\x{205F}\x{3000}]+")]
#[logos(skip r"//[^\n]*")] // Skip line comments
pub enum TokenKind {
    // === Keywords ===
    #[token("int")]
    Int,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,

    // === Identifiers and literals ===
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Identifier,
    #[regex(r"\p{Nd}+")]
    IntegerLiteral,

    // === Operators ===
    #[token("==")]
    #[token("!=")]
    #[token("<")]
    #[token("<=")]
    #[token(">")]
    #[token(">=")]
    RelOp,
    #[token("+")]
    #[token("-")]
    AddOp,
    // `/*` shares the slash with division; the callback swallows the comment
    #[token("*")]
    #[token("/")]
    #[token("/*", skip_block_comment)]
    MulOp,
    #[token("=")]
    Assign,

    // === Punctuation ===
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Special
    EndOfInput,
}

/// Consume a block comment through its closing `*/`, or to end of input
/// when it is never closed.
fn skip_block_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> logos::Skip {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(rest.len()),
    }
    logos::Skip
}

impl TokenKind {
    /// FIRST(type), which is also FIRST of every declaration form
    pub fn is_type_specifier(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Void)
    }

    /// FIRST(expr) = FIRST(arg-list)
    pub fn can_start_expression(&self) -> bool {
        matches!(
            self,
            TokenKind::LParen | TokenKind::IntegerLiteral | TokenKind::Identifier
        )
    }

    /// FIRST(stmt)
    pub fn can_start_statement(&self) -> bool {
        self.can_start_expression()
            || matches!(
                self,
                TokenKind::Semicolon
                    | TokenKind::LBrace
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::Return
            )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Int => "Int",
            TokenKind::Void => "Void",
            TokenKind::If => "If",
            TokenKind::Else => "Else",
            TokenKind::While => "While",
            TokenKind::Return => "Return",
            TokenKind::Identifier => "Identifier",
            TokenKind::IntegerLiteral => "IntegerLiteral",
            TokenKind::RelOp => "RelOp",
            TokenKind::AddOp => "AddOp",
            TokenKind::MulOp => "MulOp",
            TokenKind::Assign => "Assign",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Comma => "Comma",
            TokenKind::LParen => "LParen",
            TokenKind::RParen => "RParen",
            TokenKind::LBracket => "LBracket",
            TokenKind::RBracket => "RBracket",
            TokenKind::LBrace => "LBrace",
            TokenKind::RBrace => "RBrace",
            TokenKind::EndOfInput => "EndOfInput",
        };
        f.write_str(name)
    }
}
