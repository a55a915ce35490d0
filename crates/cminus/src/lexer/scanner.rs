//! Lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::{CompileError, Span};
use logos::Logos;

/// 1-based line/column cursor that follows the logos byte offsets
#[derive(Debug)]
struct LineTracker {
    offset: usize,
    line: usize,
    column: usize,
}

impl LineTracker {
    fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Walk forward to byte offset `target`, one character at a time
    fn advance_to(&mut self, source: &str, target: usize) {
        if target <= self.offset {
            return;
        }
        for ch in source[self.offset..target].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = target;
    }
}

/// Lexer for C- source code.
///
/// Scanning never stops early: an unrecognized character (including a `!`
/// that is not part of `!=`) is recorded as a lexical error, skipped, and
/// the scan resumes with the next character.
#[derive(Debug, Default)]
pub struct Lexer {
    diagnostics: Vec<CompileError>,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize the entire source.
    ///
    /// The returned sequence always ends with exactly one `EndOfInput`
    /// token positioned just past the last character. Lexical errors from a
    /// previous call are discarded.
    pub fn scan(&mut self, source: &str) -> Vec<Token> {
        self.diagnostics.clear();

        let mut inner = TokenKind::lexer(source);
        let mut tracker = LineTracker::new();
        let mut tokens = Vec::new();

        while let Some(result) = inner.next() {
            let range = inner.span();
            tracker.advance_to(source, range.start);

            match result {
                Ok(kind) => {
                    tokens.push(Token::new(
                        kind,
                        inner.slice(),
                        tracker.line,
                        tracker.column,
                        Span::from(range.clone()),
                    ));
                    tracker.advance_to(source, range.end);
                }
                Err(()) => {
                    let Some(ch) = source[range.start..].chars().next() else {
                        break;
                    };
                    // Skip exactly one character, whatever logos matched
                    let end = range.start + ch.len_utf8();
                    if range.end < end {
                        inner.bump(end - range.end);
                    }
                    self.diagnostics.push(CompileError::lexical(
                        format!("unexpected character '{ch}'"),
                        tracker.line,
                        tracker.column,
                        Span::new(range.start, end),
                    ));
                    tracker.advance_to(source, end);
                }
            }
        }

        tracker.advance_to(source, source.len());
        tokens.push(Token::new(
            TokenKind::EndOfInput,
            "",
            tracker.line,
            tracker.column,
            Span::new(source.len(), source.len()),
        ));
        tokens
    }

    /// Lexical errors found by the last `scan`
    pub fn diagnostics(&self) -> &[CompileError] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<CompileError> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Scan `source` with a fresh lexer, returning the tokens and lexical errors
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<CompileError>) {
    let mut lexer = Lexer::new();
    let tokens = lexer.scan(source);
    (tokens, lexer.take_diagnostics())
}
