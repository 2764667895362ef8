//! Lexer for temporal assertion properties
//!
//! Tokenizes property source text using the logos crate for performance.

use logos::Logos;
use std::fmt;

/// All token types in the property language
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    // Sampled value functions
    #[token("$rose")]
    Rose,
    #[token("$fell")]
    Fell,
    #[token("$stable")]
    Stable,
    #[token("$changed")]
    Changed,
    #[token("$always")]
    Always,
    #[token("$never")]
    Never,
    #[token("$once")]
    Once,
    #[token("$eventually")]
    Eventually,
    #[token("$until")]
    Until,
    #[token("$any")]
    Any,
    #[token("$all")]
    All,

    // Identifiers. A bit select such as `req[3]` is a single token, and an
    // escaped identifier keeps its leading backslash in the token text.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_$]*\[[0-9]+\]", |lex| lex.slice().to_owned(), priority = 3)]
    BitIdentifier(String),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_$]*", |lex| lex.slice().to_owned())]
    Identifier(String),
    #[regex(r"\\[!-~]+", |lex| lex.slice().to_owned())]
    EscapedIdentifier(String),

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    Number(u64),

    // Implication operators (longest match keeps them ahead of `|`)
    #[token("|->")]
    Implies,
    #[token("|=>")]
    ImpliesNext,

    // Comparison operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,

    // Bitwise operators
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,

    // Cycle operators
    #[token("##")]
    DoubleHash,
    #[token("@")]
    At,
    #[token("#")]
    Hash,

    // Delimiters
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(",")]
    Comma,

    // Skip whitespace and comments
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Rose => write!(f, "$rose"),
            Token::Fell => write!(f, "$fell"),
            Token::Stable => write!(f, "$stable"),
            Token::Changed => write!(f, "$changed"),
            Token::Always => write!(f, "$always"),
            Token::Never => write!(f, "$never"),
            Token::Once => write!(f, "$once"),
            Token::Eventually => write!(f, "$eventually"),
            Token::Until => write!(f, "$until"),
            Token::Any => write!(f, "$any"),
            Token::All => write!(f, "$all"),
            Token::BitIdentifier(name) => write!(f, "{}", name),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::EscapedIdentifier(name) => write!(f, "{}", name),
            Token::Number(n) => write!(f, "{}", n),
            Token::Implies => write!(f, "|->"),
            Token::ImpliesNext => write!(f, "|=>"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Tilde => write!(f, "~"),
            Token::Amp => write!(f, "&"),
            Token::Caret => write!(f, "^"),
            Token::Pipe => write!(f, "|"),
            Token::DoubleHash => write!(f, "##"),
            Token::At => write!(f, "@"),
            Token::Hash => write!(f, "#"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Error => write!(f, "<error>"),
        }
    }
}

/// Token with position information
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithPos {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Lexer for property source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }

    /// Get the next token with position information
    pub fn next_token(&mut self) -> Option<TokenWithPos> {
        self.inner.next().map(|result| {
            let token = result.unwrap_or(Token::Error);
            let span = self.inner.span();
            TokenWithPos { token, span }
        })
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<TokenWithPos> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Get current source slice
    pub fn slice(&self) -> &'a str {
        self.inner.slice()
    }
}
