//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

use super::Span;
use crate::lexer::Token;

/// A diagnostic produced while checking a C- program.
///
/// Lexical and syntax problems are collected, not raised: the lexer and the
/// parser each keep an ordered list of these and carry on. `Internal` is the
/// one variant that travels through `?` inside the parser, and `parse()`
/// converts it into a list entry before returning.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("line {line}, column {column}: {message}")]
    Lexical {
        message: String,
        line: usize,
        column: usize,
        span: Span,
    },

    #[error("line {}, column {}: expected {expected}, found {found}", .found.line, .found.column)]
    Syntax { expected: String, found: Token },

    #[error(
        "line {}, column {}: additional tokens after end of program, found {found}",
        .found.line,
        .found.column
    )]
    TrailingInput { found: Token },

    #[error("line {line}, column {column}: internal parser fault: {message}")]
    Internal {
        message: String,
        line: usize,
        column: usize,
    },
}

impl CompileError {
    pub fn lexical(message: impl Into<String>, line: usize, column: usize, span: Span) -> Self {
        Self::Lexical {
            message: message.into(),
            line,
            column,
            span,
        }
    }

    pub fn syntax(expected: impl Into<String>, found: Token) -> Self {
        Self::Syntax {
            expected: expected.into(),
            found,
        }
    }

    pub fn trailing_input(found: Token) -> Self {
        Self::TrailingInput { found }
    }

    /// Internal fault positioned at the token the parser was looking at
    pub fn internal(message: impl Into<String>, at: &Token) -> Self {
        Self::Internal {
            message: message.into(),
            line: at.line,
            column: at.column,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::Lexical { .. })
    }

    /// True for diagnostics raised by the grammar traversal
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. } | Self::TrailingInput { .. } | Self::Internal { .. }
        )
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Lexical { line, .. } | Self::Internal { line, .. } => *line,
            Self::Syntax { found, .. } | Self::TrailingInput { found } => found.line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Self::Lexical { column, .. } | Self::Internal { column, .. } => *column,
            Self::Syntax { found, .. } | Self::TrailingInput { found } => found.column,
        }
    }

    /// Description of the construct the parser was looking for
    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::Syntax { expected, .. } => Some(expected),
            Self::TrailingInput { .. } => Some("end of input"),
            _ => None,
        }
    }

    /// The token that was actually found where `expected()` was required
    pub fn found(&self) -> Option<&Token> {
        match self {
            Self::Syntax { found, .. } | Self::TrailingInput { found } => Some(found),
            _ => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexical { span, .. } => Some(*span),
            Self::Syntax { found, .. } | Self::TrailingInput { found } => Some(found.span),
            _ => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(choice: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(choice),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    /// Build the codespan diagnostic for an error without emitting it
    pub fn diagnostic(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        match error {
            CompileError::Lexical { message, span, .. } => Diagnostic::error()
                .with_message("Lexical error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message),
                ]),

            CompileError::Syntax { expected, found } => Diagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, found.span.range())
                        .with_message(format!("expected {expected}, found {}", found.kind)),
                ]),

            CompileError::TrailingInput { found } => Diagnostic::error()
                .with_message("Trailing input")
                .with_labels(vec![
                    Label::primary(file_id, found.span.range())
                        .with_message("additional tokens after end of program"),
                ]),

            CompileError::Internal { .. } => Diagnostic::bug().with_message(error.to_string()),
        }
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let diagnostic = Self::diagnostic(file_id, error);
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
    }

    pub fn report_all<'e>(
        &self,
        file_id: usize,
        errors: impl IntoIterator<Item = &'e CompileError>,
    ) {
        for error in errors {
            self.report_error(file_id, error);
        }
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
