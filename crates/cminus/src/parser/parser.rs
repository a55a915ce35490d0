//! Recursive descent parser for C-
//!
//! One method per grammar nonterminal, each deciding between alternatives by
//! the kind of the single lookahead token. The traversal builds nothing: it
//! accepts or rejects the token sequence and records every mismatch.
//!
//! A mismatch is logged and the offending token is left in place; no
//! resynchronization is attempted, so one mistake can produce further
//! diagnostics in the rules that follow.

use crate::common::{CompileError, CompileResult};
use crate::lexer::{PAST_END, Token, TokenKind};

/// Nesting depth (statements plus expressions) allowed before `parse` gives up
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// LL(1) parser over a borrowed token sequence
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
    diagnostics: Vec<CompileError>,
}

impl<'t> Parser<'t> {
    /// Create a parser over tokens produced by the lexer
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check the whole token sequence against the grammar.
    ///
    /// Returns true iff no diagnostic was recorded, including the check
    /// that nothing but the end marker follows the program. A call resumes
    /// from wherever the previous one stopped; use [`Parser::reset`] first to
    /// check the sequence again.
    pub fn parse(&mut self) -> bool {
        if let Err(fault) = self.parse_program() {
            self.diagnostics.push(fault);
            return false;
        }
        self.check_trailing_input();
        self.diagnostics.is_empty()
    }

    /// Diagnostics recorded so far, in the order they were found
    pub fn diagnostics(&self) -> &[CompileError] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<CompileError> {
        self.diagnostics
    }

    /// Rewind to the first token and forget earlier diagnostics
    pub fn reset(&mut self) {
        self.pos = 0;
        self.depth = 0;
        self.diagnostics.clear();
    }

    /// Index of the next unconsumed token
    pub fn position(&self) -> usize {
        self.pos
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    /// Current token; past the end this is a synthetic end marker
    pub fn peek(&self) -> &'t Token {
        let tokens: &'t [Token] = self.tokens;
        tokens.get(self.pos).unwrap_or(&PAST_END)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &'t Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind`, or log that `description` was expected.
    /// The cursor does not move on a mismatch.
    fn require(&mut self, kind: TokenKind, description: &str) -> bool {
        let matched = self.accept(kind);
        if !matched {
            self.error(description);
        }
        matched
    }

    fn error(&mut self, expected: &str) {
        let found = self.peek().clone();
        self.diagnostics.push(CompileError::syntax(expected, found));
    }

    /// Run a rule that may recurse back into itself, bounding the depth
    fn nested(&mut self, rule: impl FnOnce(&mut Self) -> CompileResult<()>) -> CompileResult<()> {
        if self.depth >= self.max_depth {
            return Err(CompileError::internal(
                format!("nesting deeper than {} levels", self.max_depth),
                self.peek(),
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Every repetition must consume at least one token per iteration
    fn ensure_progress(&self, start: usize, rule: &str) -> CompileResult<()> {
        if self.pos == start {
            return Err(CompileError::internal(
                format!("{rule} made no progress"),
                self.peek(),
            ));
        }
        Ok(())
    }

    fn check_trailing_input(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            let found = self.peek().clone();
            self.diagnostics.push(CompileError::trailing_input(found));
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    // program -> decl-list
    fn parse_program(&mut self) -> CompileResult<()> {
        self.parse_decl_list()
    }

    // decl-list -> decl decl-list'
    // decl-list' -> decl decl-list' | ε
    fn parse_decl_list(&mut self) -> CompileResult<()> {
        self.parse_decl()?;
        while self.peek().kind.is_type_specifier() {
            let start = self.pos;
            self.parse_decl()?;
            self.ensure_progress(start, "declaration list")?;
        }
        Ok(())
    }

    // decl -> type ident decl-tail
    fn parse_decl(&mut self) -> CompileResult<()> {
        self.parse_type();
        self.require(TokenKind::Identifier, "identifier");
        self.parse_decl_tail()
    }

    // decl-tail -> ';' | '[' intlit ']' ';' | '(' params ')' block
    fn parse_decl_tail(&mut self) -> CompileResult<()> {
        if self.accept(TokenKind::Semicolon) {
            return Ok(());
        }
        if self.accept(TokenKind::LBracket) {
            self.parse_array_size();
        } else if self.accept(TokenKind::LParen) {
            self.parse_params();
            self.require(TokenKind::RParen, "')'");
            self.parse_block()?;
        } else {
            self.error("';', '[' or '(' after identifier");
        }
        Ok(())
    }

    // intlit ']' ';' after an already consumed '['
    fn parse_array_size(&mut self) {
        self.require(TokenKind::IntegerLiteral, "integer constant");
        self.require(TokenKind::RBracket, "']'");
        self.require(TokenKind::Semicolon, "';'");
    }

    // var-decl -> type ident var-decl-tail
    fn parse_var_decl(&mut self) {
        self.parse_type();
        self.require(TokenKind::Identifier, "identifier");
        self.parse_var_decl_tail();
    }

    // var-decl-tail -> ';' | '[' intlit ']' ';'
    fn parse_var_decl_tail(&mut self) {
        if self.accept(TokenKind::Semicolon) {
            return;
        }
        if self.accept(TokenKind::LBracket) {
            self.parse_array_size();
        } else {
            self.error("';' or '[' after identifier");
        }
    }

    // type -> 'int' | 'void'
    fn parse_type(&mut self) {
        if !self.accept(TokenKind::Int) && !self.accept(TokenKind::Void) {
            self.error("'int' or 'void'");
        }
    }

    // params -> param-list | 'void' | ε
    //
    // A lone `void` is only told apart from a `void` parameter by the token
    // after it, so the type of the first parameter is matched here.
    fn parse_params(&mut self) {
        if self.accept(TokenKind::Void) {
            if self.check(TokenKind::RParen) {
                return;
            }
            self.parse_param_rest();
            self.parse_param_list_tail();
        } else if self.check(TokenKind::Int) {
            self.parse_param_list();
        }
    }

    // param-list -> param param-list'
    fn parse_param_list(&mut self) {
        self.parse_param();
        self.parse_param_list_tail();
    }

    // param-list' -> ',' param-list | ε
    fn parse_param_list_tail(&mut self) {
        while self.accept(TokenKind::Comma) {
            self.parse_param();
        }
    }

    // param -> type ident param-tail
    fn parse_param(&mut self) {
        self.parse_type();
        self.parse_param_rest();
    }

    // ident param-tail, with param-tail -> '[' ']' | ε
    fn parse_param_rest(&mut self) {
        self.require(TokenKind::Identifier, "identifier");
        if self.accept(TokenKind::LBracket) {
            self.require(TokenKind::RBracket, "']'");
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    // block -> '{' local-decls stmt-list '}'
    fn parse_block(&mut self) -> CompileResult<()> {
        self.require(TokenKind::LBrace, "'{'");
        self.parse_local_decls()?;
        self.parse_stmt_list()?;
        self.require(TokenKind::RBrace, "'}'");
        Ok(())
    }

    // local-decls -> var-decl*
    fn parse_local_decls(&mut self) -> CompileResult<()> {
        while self.peek().kind.is_type_specifier() {
            let start = self.pos;
            self.parse_var_decl();
            self.ensure_progress(start, "local declarations")?;
        }
        Ok(())
    }

    // stmt-list -> stmt*
    fn parse_stmt_list(&mut self) -> CompileResult<()> {
        while self.peek().kind.can_start_statement() {
            let start = self.pos;
            self.parse_stmt()?;
            self.ensure_progress(start, "statement list")?;
        }
        Ok(())
    }

    // stmt -> block | if-stmt | while-stmt | return-stmt | expr-stmt
    fn parse_stmt(&mut self) -> CompileResult<()> {
        self.nested(|p| match p.peek().kind {
            TokenKind::LBrace => p.parse_block(),
            TokenKind::If => p.parse_if_stmt(),
            TokenKind::While => p.parse_while_stmt(),
            TokenKind::Return => p.parse_return_stmt(),
            _ => p.parse_expr_stmt(),
        })
    }

    // expr-stmt -> expr ';' | ';'
    fn parse_expr_stmt(&mut self) -> CompileResult<()> {
        if self.accept(TokenKind::Semicolon) {
            return Ok(());
        }
        self.parse_expr()?;
        self.require(TokenKind::Semicolon, "';'");
        Ok(())
    }

    // while-stmt -> 'while' '(' expr ')' stmt
    fn parse_while_stmt(&mut self) -> CompileResult<()> {
        self.require(TokenKind::While, "'while'");
        self.require(TokenKind::LParen, "'('");
        self.parse_expr()?;
        self.require(TokenKind::RParen, "')'");
        self.parse_stmt()
    }

    // if-stmt -> 'if' '(' expr ')' stmt ( 'else' stmt | ε )
    fn parse_if_stmt(&mut self) -> CompileResult<()> {
        self.require(TokenKind::If, "'if'");
        self.require(TokenKind::LParen, "'('");
        self.parse_expr()?;
        self.require(TokenKind::RParen, "')'");
        self.parse_stmt()?;
        if self.accept(TokenKind::Else) {
            self.parse_stmt()?;
        }
        Ok(())
    }

    // return-stmt -> 'return' ( ';' | expr ';' )
    fn parse_return_stmt(&mut self) -> CompileResult<()> {
        self.require(TokenKind::Return, "'return'");
        if self.accept(TokenKind::Semicolon) {
            return Ok(());
        }
        self.parse_expr()?;
        self.require(TokenKind::Semicolon, "';'");
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    // expr -> '(' expr ')' term' sum' simple'
    //       | intlit term' sum' simple'
    //       | ident ident-tail
    fn parse_expr(&mut self) -> CompileResult<()> {
        self.nested(|p| match p.peek().kind {
            TokenKind::LParen => {
                p.advance();
                p.parse_expr()?;
                p.require(TokenKind::RParen, "')'");
                p.parse_operator_tails()
            }
            TokenKind::IntegerLiteral => {
                p.advance();
                p.parse_operator_tails()
            }
            TokenKind::Identifier => {
                p.advance();
                p.parse_ident_tail()
            }
            _ => {
                p.error("expression: '(', integer constant or identifier");
                Ok(())
            }
        })
    }

    // ident-tail -> '=' expr
    //             | '[' expr ']' ( '=' expr | term' sum' simple' )
    //             | '(' args ')' term' sum' simple'
    //             | term' sum' simple'
    fn parse_ident_tail(&mut self) -> CompileResult<()> {
        match self.peek().kind {
            TokenKind::Assign => {
                self.advance();
                self.parse_expr()
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_expr()?;
                self.require(TokenKind::RBracket, "']'");
                if self.accept(TokenKind::Assign) {
                    self.parse_expr()
                } else {
                    self.parse_operator_tails()
                }
            }
            TokenKind::LParen => {
                self.advance();
                self.parse_args()?;
                self.require(TokenKind::RParen, "')'");
                self.parse_operator_tails()
            }
            _ => self.parse_operator_tails(),
        }
    }

    // term' sum' simple', the common continuation once the first factor is in
    fn parse_operator_tails(&mut self) -> CompileResult<()> {
        self.parse_term_tail()?;
        self.parse_sum_tail()?;
        self.parse_simple_tail()
    }

    // simple' -> relop sum | ε
    fn parse_simple_tail(&mut self) -> CompileResult<()> {
        if self.accept(TokenKind::RelOp) {
            self.parse_sum()?;
        }
        Ok(())
    }

    // sum -> term sum'
    fn parse_sum(&mut self) -> CompileResult<()> {
        self.parse_term()?;
        self.parse_sum_tail()
    }

    // sum' -> (addop term)*
    fn parse_sum_tail(&mut self) -> CompileResult<()> {
        while self.accept(TokenKind::AddOp) {
            self.parse_term()?;
        }
        Ok(())
    }

    // term -> factor term'
    fn parse_term(&mut self) -> CompileResult<()> {
        self.parse_factor()?;
        self.parse_term_tail()
    }

    // term' -> (mulop factor)*
    fn parse_term_tail(&mut self) -> CompileResult<()> {
        while self.accept(TokenKind::MulOp) {
            self.parse_factor()?;
        }
        Ok(())
    }

    // factor -> '(' expr ')' | intlit | ident factor-ident-tail
    fn parse_factor(&mut self) -> CompileResult<()> {
        match self.peek().kind {
            TokenKind::LParen => {
                self.advance();
                self.parse_expr()?;
                self.require(TokenKind::RParen, "')'");
            }
            TokenKind::IntegerLiteral => {
                self.advance();
            }
            TokenKind::Identifier => {
                self.advance();
                self.parse_factor_ident_tail()?;
            }
            _ => self.error("factor: '(', integer constant or identifier"),
        }
        Ok(())
    }

    // factor-ident-tail -> '[' expr ']' | '(' args ')' | ε
    fn parse_factor_ident_tail(&mut self) -> CompileResult<()> {
        if self.accept(TokenKind::LBracket) {
            self.parse_expr()?;
            self.require(TokenKind::RBracket, "']'");
        } else if self.accept(TokenKind::LParen) {
            self.parse_args()?;
            self.require(TokenKind::RParen, "')'");
        }
        Ok(())
    }

    // args -> arg-list | ε
    fn parse_args(&mut self) -> CompileResult<()> {
        if self.peek().kind.can_start_expression() {
            self.parse_arg_list()?;
        }
        Ok(())
    }

    // arg-list -> expr (',' expr)*
    fn parse_arg_list(&mut self) -> CompileResult<()> {
        self.parse_expr()?;
        while self.accept(TokenKind::Comma) {
            self.parse_expr()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn check(source: &str) -> (bool, Vec<CompileError>) {
        let (tokens, lexical) = tokenize(source);
        assert!(lexical.is_empty(), "unexpected lexical errors: {lexical:?}");
        let mut parser = Parser::new(&tokens);
        let ok = parser.parse();
        (ok, parser.into_diagnostics())
    }

    fn expectations(diagnostics: &[CompileError]) -> Vec<&str> {
        diagnostics.iter().filter_map(CompileError::expected).collect()
    }

    #[test]
    fn test_parse_minimal_program() {
        let (ok, diagnostics) = check("int main(void){ return 0; }");
        assert!(ok);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_parse_globals_and_functions() {
        let source = "
            int count;
            int table[10];
            void reset(int a[], int n) { while (n > 0) { n = n - 1; a[n] = 0; } }
            int max(int x, int y) { if (x >= y) return x; else return y; }
            int main() {
                int t;
                int buf[4];
                t = max(count, table[2] * (3 + count)) / 2;
                buf[0] = t;
                reset(buf, 4);
                ;
                { int inner; inner = t != 0; }
                return;
            }
        ";
        let (ok, diagnostics) = check(source);
        assert!(ok, "{diagnostics:?}");
    }

    #[test]
    fn test_parse_expression_forms() {
        for body in [
            "x = y = 3;",
            "x = (a + b) * c - d / e;",
            "x = a[i + 1] + f() + g(1, (2), h[3]);",
            "a[i] = b[j] < c;",
            "a[i] * 2 + 1 == 7;",
            "f(x) + 1 > 0;",
            "(x);",
            "42 - x;",
            "x;",
        ] {
            let source = format!("void f(void) {{ {body} }}");
            let (ok, diagnostics) = check(&source);
            assert!(ok, "{body}: {diagnostics:?}");
        }
    }

    #[test]
    fn test_dangling_else_binds_inner() {
        let (ok, _) = check("void f(void) { if (a) if (b) x = 1; else x = 2; }");
        assert!(ok);
    }

    #[test]
    fn test_missing_expression_after_assign() {
        let (ok, diagnostics) = check("int main() { x = ; }");

        assert!(!ok);
        assert_eq!(diagnostics.len(), 1);
        let found = diagnostics[0].found().expect("syntax error carries a token");
        assert_eq!(found.kind, TokenKind::Semicolon);
        assert_eq!((found.line, found.column), (1, 18));
        assert_eq!(
            diagnostics[0].to_string(),
            "line 1, column 18: expected expression: '(', integer constant or identifier, \
             found Semicolon ';' at 1:18"
        );
    }

    #[test]
    fn test_trailing_input() {
        let (ok, diagnostics) = check("int x; int y; }");

        assert!(!ok);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            &diagnostics[0],
            CompileError::TrailingInput { found } if found.kind == TokenKind::RBrace
        ));
        assert_eq!((diagnostics[0].line(), diagnostics[0].column()), (1, 15));
    }

    #[test]
    fn test_relational_does_not_chain() {
        let (ok, diagnostics) = check("int f(void) { return a < b < c; }");

        assert!(!ok);
        assert_eq!(diagnostics[0].expected(), Some("';'"));
        assert_eq!(diagnostics[0].found().map(|t| t.lexeme.as_str()), Some("<"));
        assert!(matches!(diagnostics.last(), Some(CompileError::TrailingInput { .. })));
    }

    #[test]
    fn test_errors_cascade_without_recovery() {
        let (ok, diagnostics) = check("void f() { int 5; }");

        assert!(!ok);
        assert_eq!(expectations(&diagnostics), vec!["identifier", "';' or '[' after identifier"]);
        // both point at the same unconsumed token
        assert!(diagnostics.iter().all(|d| (d.line(), d.column()) == (1, 16)));
    }

    #[test]
    fn test_parsing_continues_after_error() {
        let (ok, diagnostics) = check("int main() { if (x > 0 { x = 1; } y = ; }");

        assert!(!ok);
        assert_eq!(
            expectations(&diagnostics),
            vec!["')'", "expression: '(', integer constant or identifier"]
        );
    }

    #[test]
    fn test_empty_program() {
        let (ok, diagnostics) = check("");

        assert!(!ok);
        assert_eq!(
            expectations(&diagnostics),
            vec!["'int' or 'void'", "identifier", "';', '[' or '(' after identifier"]
        );
        assert!(
            diagnostics
                .iter()
                .all(|d| d.found().is_some_and(|t| t.kind == TokenKind::EndOfInput))
        );
    }

    #[test]
    fn test_void_parameter_list() {
        assert!(check("int f(void x, int y[]) { return x; }").0);

        let (ok, diagnostics) = check("int f(void, int x) { return x; }");
        assert!(!ok);
        assert_eq!(expectations(&diagnostics), vec!["identifier"]);
    }

    #[test]
    fn test_array_declaration_needs_size() {
        let (ok, diagnostics) = check("int x[];");
        assert!(!ok);
        assert_eq!(expectations(&diagnostics), vec!["integer constant"]);
    }

    #[test]
    fn test_unary_minus_is_not_an_expression() {
        let (ok, diagnostics) = check("void f(void) { x = -1; }");
        assert!(!ok);
        assert_eq!(diagnostics[0].found().map(|t| t.kind), Some(TokenKind::AddOp));
    }

    #[test]
    fn test_local_declarations_precede_statements() {
        let (ok, diagnostics) = check("void f(void) { x = 1; int y; }");
        assert!(!ok);
        assert_eq!(diagnostics[0].expected(), Some("'}'"));
    }

    #[test]
    fn test_depth_limit_is_contained() {
        let source = format!("int f(void) {{ return {}1{}; }}", "(".repeat(40), ")".repeat(40));
        let (tokens, _) = tokenize(&source);

        let mut parser = Parser::new(&tokens);
        assert!(parser.parse());

        let mut shallow = Parser::new(&tokens).with_max_depth(8);
        assert!(!shallow.parse());
        assert_eq!(shallow.diagnostics().len(), 1);
        assert!(matches!(shallow.diagnostics()[0], CompileError::Internal { .. }));
    }

    #[test]
    fn test_peek_past_end_is_synthetic() {
        let tokens = [
            Token::new(TokenKind::Int, "int", 1, 1, Span::new(0, 3)),
            Token::new(TokenKind::Identifier, "x", 1, 5, Span::new(4, 5)),
            Token::new(TokenKind::Semicolon, ";", 1, 6, Span::new(5, 6)),
        ];
        let mut parser = Parser::new(&tokens);
        assert!(parser.parse());
        assert_eq!(parser.position(), 3);
        assert_eq!(parser.peek(), &PAST_END);

        let mut empty = Parser::new(&[]);
        assert!(!empty.parse());
        assert!(empty.diagnostics().iter().all(|d| d.line() == 0 && d.column() == 0));
    }

    #[test]
    fn test_reset_allows_reparse() {
        let (tokens, _) = tokenize("int main() { x = ; }");
        let mut parser = Parser::new(&tokens);

        assert!(!parser.parse());
        let first: Vec<String> = parser.diagnostics().iter().map(ToString::to_string).collect();

        parser.reset();
        assert_eq!(parser.position(), 0);
        assert!(!parser.parse());
        let second: Vec<String> = parser.diagnostics().iter().map(ToString::to_string).collect();
        assert_eq!(first, second);
    }
}
