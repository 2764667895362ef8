//! Front end for temporal assertion properties
//!
//! This crate turns property source text into a lossless syntax tree:
//! - Lexical analysis with logos
//! - Syntax tree construction with rowan
//! - Error-tolerant parsing with position information

pub mod lexer;
pub mod parse;
pub mod syntax;

pub use lexer::{Lexer, Token, TokenWithPos};
pub use parse::{parse, parse_with_errors, ParseError, ParseErrorKind, ParseResult};
pub use syntax::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxNodeExt, SyntaxToken, TempoLanguage};
