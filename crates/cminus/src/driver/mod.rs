//! Checking pipeline: lex the whole source, then run the LL(1) parser

use crate::common::{CompileError, DiagnosticReporter};
use crate::lexer::{Lexer, Token};
use crate::parser::{DEFAULT_MAX_DEPTH, Parser};

/// Configuration options for a check run
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub dump_tokens: bool,
    pub verbose: bool,
    /// Statement and expression nesting allowed before the parser gives up
    pub max_depth: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            dump_tokens: false,
            verbose: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything one check run produced
#[derive(Debug)]
pub struct CheckReport {
    pub tokens: Vec<Token>,
    /// Errors from the lexer, in source order
    pub lexical: Vec<CompileError>,
    /// Errors from the parser, in the order they were found
    pub syntax: Vec<CompileError>,
    /// What `Parser::parse` returned
    pub accepted: bool,
}

impl CheckReport {
    /// Syntactically valid and free of lexical errors
    pub fn is_valid(&self) -> bool {
        self.accepted && self.lexical.is_empty()
    }

    /// Lexical errors followed by syntax errors
    pub fn diagnostics(&self) -> impl Iterator<Item = &CompileError> {
        self.lexical.iter().chain(&self.syntax)
    }

    pub fn error_count(&self) -> usize {
        self.lexical.len() + self.syntax.len()
    }

    pub fn report(&self, reporter: &DiagnosticReporter, file_id: usize) {
        reporter.report_all(file_id, self.diagnostics());
    }
}

/// Lex and parse `source`.
///
/// The lexer runs to completion before the parser starts; lexical errors do
/// not stop the parse, the parser simply sees the tokens that survived.
pub fn check_source(source: &str, config: &CheckConfig) -> CheckReport {
    if config.verbose {
        eprintln!("Scanning...");
    }

    let mut lexer = Lexer::new();
    let tokens = lexer.scan(source);
    let lexical = lexer.take_diagnostics();

    if config.dump_tokens {
        eprintln!("=== C- Tokens ({}) ===", tokens.len());
        eprint!("{}", dump_tokens(&tokens));
        eprintln!("=== End Tokens ===\n");
    }

    if config.verbose {
        eprintln!("Parsing {} tokens...", tokens.len());
    }

    let mut parser = Parser::new(&tokens).with_max_depth(config.max_depth);
    let accepted = parser.parse();
    let syntax = parser.into_diagnostics();

    if config.verbose {
        eprintln!(
            "Done: {} lexical error(s), {} syntax error(s)",
            lexical.len(),
            syntax.len()
        );
    }

    CheckReport {
        tokens,
        lexical,
        syntax,
        accepted,
    }
}

/// One token per line, in the lexer's display format
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut output = String::new();
    for token in tokens {
        output.push_str(&format!("{token}\n"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    #[test]
    fn test_valid_source() {
        let report = check_source("int main(void) { return 0; }", &CheckConfig::default());

        assert!(report.is_valid());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.tokens.len(), 11);
        assert_eq!(report.tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
    }

    #[test]
    fn test_lexical_error_invalidates_but_parse_continues() {
        let report = check_source("int main(void) { return 0; } @", &CheckConfig::default());

        assert!(report.accepted);
        assert!(!report.is_valid());
        assert_eq!(report.lexical.len(), 1);
        assert!(report.syntax.is_empty());
    }

    #[test]
    fn test_channels_stay_separate() {
        let report = check_source("int x = 1 # ;", &CheckConfig::default());

        assert!(report.lexical.iter().all(CompileError::is_lexical));
        assert!(report.syntax.iter().all(CompileError::is_syntax));
        assert!(!report.syntax.is_empty());
        assert_eq!(report.diagnostics().count(), report.error_count());
        assert!(report.diagnostics().next().is_some_and(CompileError::is_lexical));
    }

    #[test]
    fn test_depth_from_config() {
        let config = CheckConfig {
            max_depth: 2,
            ..CheckConfig::default()
        };
        let report = check_source("void f(void) { x = ((1)); }", &config);
        assert!(!report.accepted);
        assert!(matches!(report.syntax.last(), Some(CompileError::Internal { .. })));
    }

    #[test]
    fn test_dump_tokens() {
        let report = check_source("int x;", &CheckConfig::default());
        assert_eq!(
            dump_tokens(&report.tokens),
            "Int 'int' at 1:1\nIdentifier 'x' at 1:5\nSemicolon ';' at 1:6\nEndOfInput '' at 1:7\n"
        );
    }
}
