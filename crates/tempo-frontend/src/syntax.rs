//! Syntax tree definitions for temporal assertion properties
//!
//! Defines the rowan-based lossless syntax tree used by the parser.

use crate::lexer::Token;

/// All syntax node and token kinds in the property grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum SyntaxKind {
    // === Tokens (Terminal nodes) ===

    // Literals
    IDENT,
    BIT_IDENT,
    ESCAPED_IDENT,
    NUMBER,

    // Function keywords
    ROSE_KW,
    FELL_KW,
    STABLE_KW,
    CHANGED_KW,
    ALWAYS_KW,
    NEVER_KW,
    ONCE_KW,
    EVENTUALLY_KW,
    UNTIL_KW,
    ANY_KW,
    ALL_KW,

    // Operators
    IMPLIES,      // |->
    IMPLIES_NEXT, // |=>
    EQ_EQ,        // ==
    NOT_EQ,       // !=
    TILDE,        // ~
    AMP,          // &
    CARET,        // ^
    PIPE,         // |
    DOUBLE_HASH,  // ##
    AT,           // @
    HASH,         // #

    // Delimiters
    L_PAREN, // (
    R_PAREN, // )
    COMMA,   // ,

    // Error
    ERROR,

    // === Non-terminal nodes ===
    ROOT,
    IMPL_EXPR,
    CMP_EXPR,
    OR_EXPR,
    XOR_EXPR,
    AND_EXPR,
    SEQ_EXPR,
    UNARY_EXPR,
    AT_EXPR,
    HASH_EXPR,
    CALL_EXPR,
    PAREN_EXPR,
    ATOM,

    // Placeholder for the end
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Check if this kind is a sampled value function keyword
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            ROSE_KW
                | FELL_KW
                | STABLE_KW
                | CHANGED_KW
                | ALWAYS_KW
                | NEVER_KW
                | ONCE_KW
                | EVENTUALLY_KW
                | UNTIL_KW
                | ANY_KW
                | ALL_KW
        )
    }

    /// Check if a token of this kind can start an operand
    pub fn is_expr_start(self) -> bool {
        self.is_keyword()
            || matches!(
                self,
                IDENT | BIT_IDENT | ESCAPED_IDENT | NUMBER | TILDE | AT | HASH | L_PAREN
            )
    }

    /// Human readable description for error messages
    pub fn description(self) -> &'static str {
        match self {
            IDENT => "identifier",
            BIT_IDENT => "bit select",
            ESCAPED_IDENT => "escaped identifier",
            NUMBER => "number",
            ROSE_KW => "`$rose`",
            FELL_KW => "`$fell`",
            STABLE_KW => "`$stable`",
            CHANGED_KW => "`$changed`",
            ALWAYS_KW => "`$always`",
            NEVER_KW => "`$never`",
            ONCE_KW => "`$once`",
            EVENTUALLY_KW => "`$eventually`",
            UNTIL_KW => "`$until`",
            ANY_KW => "`$any`",
            ALL_KW => "`$all`",
            IMPLIES => "`|->`",
            IMPLIES_NEXT => "`|=>`",
            EQ_EQ => "`==`",
            NOT_EQ => "`!=`",
            TILDE => "`~`",
            AMP => "`&`",
            CARET => "`^`",
            PIPE => "`|`",
            DOUBLE_HASH => "`##`",
            AT => "`@`",
            HASH => "`#`",
            L_PAREN => "`(`",
            R_PAREN => "`)`",
            COMMA => "`,`",
            _ => "token",
        }
    }
}

impl From<Token> for SyntaxKind {
    fn from(token: Token) -> Self {
        match token {
            Token::Rose => ROSE_KW,
            Token::Fell => FELL_KW,
            Token::Stable => STABLE_KW,
            Token::Changed => CHANGED_KW,
            Token::Always => ALWAYS_KW,
            Token::Never => NEVER_KW,
            Token::Once => ONCE_KW,
            Token::Eventually => EVENTUALLY_KW,
            Token::Until => UNTIL_KW,
            Token::Any => ANY_KW,
            Token::All => ALL_KW,
            Token::BitIdentifier(_) => BIT_IDENT,
            Token::Identifier(_) => IDENT,
            Token::EscapedIdentifier(_) => ESCAPED_IDENT,
            Token::Number(_) => NUMBER,
            Token::Implies => IMPLIES,
            Token::ImpliesNext => IMPLIES_NEXT,
            Token::EqEq => EQ_EQ,
            Token::NotEq => NOT_EQ,
            Token::Tilde => TILDE,
            Token::Amp => AMP,
            Token::Caret => CARET,
            Token::Pipe => PIPE,
            Token::DoubleHash => DOUBLE_HASH,
            Token::At => AT,
            Token::Hash => HASH,
            Token::LeftParen => L_PAREN,
            Token::RightParen => R_PAREN,
            Token::Comma => COMMA,
            Token::Error => ERROR,
        }
    }
}

/// The property language definition for rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TempoLanguage {}

impl rowan::Language for TempoLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Type alias for our syntax node
pub type SyntaxNode = rowan::SyntaxNode<TempoLanguage>;
/// Type alias for our syntax token
pub type SyntaxToken = rowan::SyntaxToken<TempoLanguage>;
/// Type alias for syntax elements
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// Extension trait for syntax nodes
pub trait SyntaxNodeExt {
    /// Find the first child node with the given kind
    fn first_child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode>;
    /// Find all children nodes with the given kind
    fn children_of_kind(&self, kind: SyntaxKind) -> Vec<SyntaxNode>;
    /// Get the first token child with the given kind
    fn first_token_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxToken>;
}

impl SyntaxNodeExt for SyntaxNode {
    fn first_child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.children().find(|child| child.kind() == kind)
    }

    fn children_of_kind(&self, kind: SyntaxKind) -> Vec<SyntaxNode> {
        self.children()
            .filter(|child| child.kind() == kind)
            .collect()
    }

    fn first_token_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxToken> {
        self.children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() == kind)
    }
}
