//! Rowan-based parser for temporal assertion properties
//!
//! This module implements the parsing logic using Rowan's GreenNodeBuilder.
//! The grammar, from loosest to tightest binding: implication (`|->`, `|=>`),
//! comparison (`==`, `!=`), `|`, `^`, `&`, cycle sequencing (`##`), then
//! unary operators and atoms. Chains of `|`, `^`, `&` and `##` at one
//! precedence level are kept flat in a single node so later stages see all
//! operands of a chain as siblings.

use crate::lexer::{Lexer, TokenWithPos};
use crate::syntax::{SyntaxKind, SyntaxNode};
use rowan::{GreenNode, GreenNodeBuilder};

/// Deepest operand nesting accepted before the parser gives up
const MAX_NESTING_DEPTH: usize = 256;

/// Parser state for building Rowan trees
pub struct ParseState<'a> {
    /// Tokens from lexer
    tokens: Vec<TokenWithPos>,
    /// Current token position
    current: usize,
    /// Green node builder
    builder: GreenNodeBuilder<'static>,
    /// Source text
    source: &'a str,
    /// Collected parse errors
    errors: Vec<ParseError>,
    /// Current operand nesting depth
    depth: usize,
}

impl<'a> ParseState<'a> {
    /// Create a new parser state
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        Self {
            tokens,
            current: 0,
            builder: GreenNodeBuilder::new(),
            source,
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Parse a single property expression
    pub fn parse_property(mut self) -> ParseResult {
        self.start_node(SyntaxKind::ROOT);

        if self.is_at_end() {
            self.error("expected a property expression");
        } else {
            self.parse_impl_expr();

            if !self.is_at_end() {
                self.error_and_bump("unexpected input after property expression");
                while !self.is_at_end() {
                    self.bump();
                }
            }
        }

        self.finish_node();

        ParseResult {
            green_node: self.builder.finish(),
            errors: self.errors,
        }
    }

    /// Parse implication expression (`|->`, `|=>`), left associative
    fn parse_impl_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_cmp_expr();

        while self.at(SyntaxKind::IMPLIES) || self.at(SyntaxKind::IMPLIES_NEXT) {
            // Reusing the original checkpoint wraps the node finished on the
            // previous iteration, giving left associativity
            self.builder
                .start_node_at(checkpoint, rowan::SyntaxKind(SyntaxKind::IMPL_EXPR as u16));
            self.bump(); // consume |-> or |=>
            self.parse_cmp_expr();
            self.builder.finish_node();
        }
    }

    /// Parse comparison expression (`==`, `!=`), left associative
    fn parse_cmp_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_or_expr();

        while self.at(SyntaxKind::EQ_EQ) || self.at(SyntaxKind::NOT_EQ) {
            self.builder
                .start_node_at(checkpoint, rowan::SyntaxKind(SyntaxKind::CMP_EXPR as u16));
            self.bump(); // consume == or !=
            self.parse_or_expr();
            self.builder.finish_node();
        }
    }

    /// Parse bitwise OR chain, kept flat
    fn parse_or_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_xor_expr();

        if self.at(SyntaxKind::PIPE) {
            self.builder
                .start_node_at(checkpoint, rowan::SyntaxKind(SyntaxKind::OR_EXPR as u16));
            while self.at(SyntaxKind::PIPE) {
                self.bump(); // consume |
                self.parse_xor_expr();
            }
            self.builder.finish_node();
        }
    }

    /// Parse bitwise XOR chain, kept flat
    fn parse_xor_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_and_expr();

        if self.at(SyntaxKind::CARET) {
            self.builder
                .start_node_at(checkpoint, rowan::SyntaxKind(SyntaxKind::XOR_EXPR as u16));
            while self.at(SyntaxKind::CARET) {
                self.bump(); // consume ^
                self.parse_and_expr();
            }
            self.builder.finish_node();
        }
    }

    /// Parse bitwise AND chain, kept flat
    fn parse_and_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_seq_expr();

        if self.at(SyntaxKind::AMP) {
            self.builder
                .start_node_at(checkpoint, rowan::SyntaxKind(SyntaxKind::AND_EXPR as u16));
            while self.at(SyntaxKind::AMP) {
                self.bump(); // consume &
                self.parse_seq_expr();
            }
            self.builder.finish_node();
        }
    }

    /// Parse cycle sequence chain (`##`), kept flat
    ///
    /// A number directly after `##` is a step count token, not an operand,
    /// so `a ## 2 b` carries operands `a` and `b` only.
    fn parse_seq_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_unary_expr();

        if self.at(SyntaxKind::DOUBLE_HASH) {
            self.builder
                .start_node_at(checkpoint, rowan::SyntaxKind(SyntaxKind::SEQ_EXPR as u16));
            while self.at(SyntaxKind::DOUBLE_HASH) {
                self.bump(); // consume ##
                if self.at(SyntaxKind::NUMBER) {
                    self.bump(); // consume step count
                }
                if self.at_expr_start() {
                    self.parse_unary_expr();
                } else {
                    self.error("expected operand after `##`");
                }
            }
            self.builder.finish_node();
        }
    }

    /// Parse unary operators, offsets, calls and atoms
    fn parse_unary_expr(&mut self) {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_and_bump("property expression is nested too deeply");
            return;
        }
        self.depth += 1;

        match self.current_kind() {
            Some(SyntaxKind::TILDE) => {
                self.start_node(SyntaxKind::UNARY_EXPR);
                self.bump(); // consume ~
                self.parse_unary_expr();
                self.finish_node();
            }
            Some(SyntaxKind::AT) => {
                self.start_node(SyntaxKind::AT_EXPR);
                self.bump(); // consume @
                self.expect(SyntaxKind::NUMBER);
                self.parse_unary_expr();
                self.finish_node();
            }
            Some(SyntaxKind::HASH) => {
                self.start_node(SyntaxKind::HASH_EXPR);
                self.bump(); // consume #
                self.expect(SyntaxKind::NUMBER);
                self.parse_unary_expr();
                self.finish_node();
            }
            Some(SyntaxKind::L_PAREN) => {
                self.start_node(SyntaxKind::PAREN_EXPR);
                self.bump(); // consume (
                self.parse_impl_expr();
                self.expect(SyntaxKind::R_PAREN);
                self.finish_node();
            }
            Some(kind) if kind.is_keyword() => {
                self.parse_call_expr();
            }
            Some(
                SyntaxKind::IDENT
                | SyntaxKind::BIT_IDENT
                | SyntaxKind::ESCAPED_IDENT
                | SyntaxKind::NUMBER,
            ) => {
                self.start_node(SyntaxKind::ATOM);
                self.bump();
                self.finish_node();
            }
            Some(_) => {
                self.error_and_bump("expected a property operand");
            }
            None => {
                self.error("expected a property operand");
            }
        }

        self.depth -= 1;
    }

    /// Parse a sampled value function call
    fn parse_call_expr(&mut self) {
        self.start_node(SyntaxKind::CALL_EXPR);

        let keyword = self.current_kind();
        self.bump(); // consume function name

        self.expect(SyntaxKind::L_PAREN);

        let mut arity = 0usize;
        if self.at_expr_start() {
            self.parse_impl_expr();
            arity += 1;
            while self.at(SyntaxKind::COMMA) {
                self.bump(); // consume ,
                self.parse_impl_expr();
                arity += 1;
            }
        }

        self.expect(SyntaxKind::R_PAREN);

        if let Some(keyword) = keyword {
            self.check_call_arity(keyword, arity);
        }

        self.finish_node();
    }

    /// Validate argument counts for sampled value functions
    fn check_call_arity(&mut self, keyword: SyntaxKind, arity: usize) {
        let valid = match keyword {
            SyntaxKind::UNTIL_KW => arity == 2,
            SyntaxKind::EVENTUALLY_KW => arity == 1 || arity == 3,
            _ => arity == 1,
        };

        if !valid {
            let expected = match keyword {
                SyntaxKind::UNTIL_KW => "exactly 2 arguments",
                SyntaxKind::EVENTUALLY_KW => "1 or 3 arguments",
                _ => "exactly 1 argument",
            };
            let message = format!(
                "{} takes {}, found {}",
                keyword.description(),
                expected,
                arity
            );
            self.error(&message);
        }
    }

    // === Helper methods ===

    /// Start a new syntax node
    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(rowan::SyntaxKind(kind as u16));
    }

    /// Finish the current syntax node
    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Get current token kind
    fn current_kind(&self) -> Option<SyntaxKind> {
        self.current_token()
            .map(|t| SyntaxKind::from(t.token.clone()))
    }

    /// Get current token
    fn current_token(&self) -> Option<&TokenWithPos> {
        self.tokens.get(self.current)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    /// Check if current token is of given kind
    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Check if current token can start an operand
    fn at_expr_start(&self) -> bool {
        self.current_kind().is_some_and(|kind| kind.is_expr_start())
    }

    /// Consume current token
    fn bump(&mut self) {
        if let Some(token) = self.current_token() {
            let kind = SyntaxKind::from(token.token.clone());
            let text = &self.source[token.span.clone()];
            self.builder.token(rowan::SyntaxKind(kind as u16), text);
            self.current += 1;
        }
    }

    /// Expect a specific token kind
    fn expect(&mut self, kind: SyntaxKind) {
        if self.at(kind) {
            self.bump();
        } else {
            let position = if let Some(token) = self.current_token() {
                token.span.start
            } else {
                self.source.len()
            };

            let error = ParseError {
                message: format!("expected {}", kind.description()),
                position,
                kind: ParseErrorKind::MissingToken,
                expected: Some(kind.description().to_string()),
                found: self.current_token().map(|t| format!("{:?}", t.token)),
            };

            self.errors.push(error);
        }
    }

    /// Report an error
    fn error(&mut self, message: &str) {
        self.report_error(message, ParseErrorKind::InvalidSyntax);
    }

    /// Report an error and consume token
    fn error_and_bump(&mut self, message: &str) {
        self.report_error(message, ParseErrorKind::UnexpectedToken);
        if !self.is_at_end() {
            self.bump();
        }
    }

    /// Report a specific error type
    fn report_error(&mut self, message: &str, kind: ParseErrorKind) {
        let position = if let Some(token) = self.current_token() {
            token.span.start
        } else {
            self.source.len()
        };

        let error = ParseError {
            message: message.to_string(),
            position,
            kind,
            expected: None,
            found: self.current_token().map(|t| format!("{:?}", t.token)),
        };

        self.errors.push(error);
    }
}

/// Parse result containing the syntax tree and any errors
pub struct ParseResult {
    pub green_node: GreenNode,
    pub errors: Vec<ParseError>,
}

/// Parse error information
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
    pub kind: ParseErrorKind,
    pub expected: Option<String>,
    pub found: Option<String>,
}

/// Types of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken,
    MissingToken,
    InvalidSyntax,
}

/// Main parsing function
pub fn parse(source: &str) -> SyntaxNode {
    let parser = ParseState::new(source);
    let result = parser.parse_property();
    SyntaxNode::new_root(result.green_node)
}

/// Parse with error reporting
pub fn parse_with_errors(source: &str) -> (SyntaxNode, Vec<ParseError>) {
    let parser = ParseState::new(source);
    let result = parser.parse_property();
    (SyntaxNode::new_root(result.green_node), result.errors)
}
