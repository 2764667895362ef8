//! Property tree representation
//!
//! A property is a tree of operator nodes over identifier and constant
//! leaves. Every node carries a cycle delay; a positive delay refers to
//! cycles in the past, so `delay == 1` means the value one cycle ago.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operators that can appear at internal property nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyOp {
    /// Bitwise negation `~`
    Not,
    /// Bitwise AND `&`, n-ary
    And,
    /// Bitwise XOR `^`, n-ary
    Xor,
    /// Bitwise OR `|`, n-ary
    Or,
    /// Equality `==`
    Eq,
    /// Inequality `!=`
    Ne,
    /// Overlapping implication `|->`
    Implies,
    /// Next-cycle implication `|=>`
    ImpliesNext,
    /// Delay carrier introduced by `@n` and `#n`
    Offset,
    /// Bit concatenation
    Concat,
    /// `$rose`
    Rose,
    /// `$fell`
    Fell,
    /// `$stable`
    Stable,
    /// `$changed`
    Changed,
    /// `$always`
    Always,
    /// `$never`
    Never,
    /// `$once`
    Once,
    /// `$eventually`, optionally with cycle bounds
    Eventually,
    /// `$until`
    Until,
    /// OR reduction `$any`
    Any,
    /// AND reduction `$all`
    All,
}

impl fmt::Display for PropertyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            PropertyOp::Not => "~",
            PropertyOp::And => "&",
            PropertyOp::Xor => "^",
            PropertyOp::Or => "|",
            PropertyOp::Eq => "==",
            PropertyOp::Ne => "!=",
            PropertyOp::Implies => "|->",
            PropertyOp::ImpliesNext => "|=>",
            PropertyOp::Offset => "@",
            PropertyOp::Concat => "{}",
            PropertyOp::Rose => "$rose",
            PropertyOp::Fell => "$fell",
            PropertyOp::Stable => "$stable",
            PropertyOp::Changed => "$changed",
            PropertyOp::Always => "$always",
            PropertyOp::Never => "$never",
            PropertyOp::Once => "$once",
            PropertyOp::Eventually => "$eventually",
            PropertyOp::Until => "$until",
            PropertyOp::Any => "$any",
            PropertyOp::All => "$all",
        };
        f.write_str(symbol)
    }
}

/// Payload of a property node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Internal operator node
    Op(PropertyOp),
    /// Signal reference leaf
    Ident(String),
    /// Numeric constant leaf
    Const(u64),
}

/// A node in a property tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub kind: PropertyKind,
    pub delay: i32,
    pub children: Vec<Property>,
}

impl Property {
    /// Create an operator node with delay 0
    pub fn op(op: PropertyOp, children: Vec<Property>) -> Self {
        Self {
            kind: PropertyKind::Op(op),
            delay: 0,
            children,
        }
    }

    /// Create an identifier leaf with delay 0
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            kind: PropertyKind::Ident(name.into()),
            delay: 0,
            children: Vec::new(),
        }
    }

    /// Create a constant leaf with delay 0
    pub fn constant(value: u64) -> Self {
        Self {
            kind: PropertyKind::Const(value),
            delay: 0,
            children: Vec::new(),
        }
    }

    /// Set the node delay, builder style
    pub fn with_delay(mut self, delay: i32) -> Self {
        self.delay = delay;
        self
    }

    /// A node with no children is a terminal
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Symbol used when rendering this node
    pub fn symbol(&self) -> String {
        match &self.kind {
            PropertyKind::Op(op) => op.to_string(),
            PropertyKind::Ident(name) => name.clone(),
            PropertyKind::Const(value) => value.to_string(),
        }
    }

    /// Smallest delay accumulated along any root-to-terminal path
    pub fn min_delay(&self) -> i32 {
        self.min_delay_from(0)
    }

    /// Largest delay accumulated along any root-to-terminal path
    pub fn max_delay(&self) -> i32 {
        self.max_delay_from(0)
    }

    fn min_delay_from(&self, offset: i32) -> i32 {
        let here = offset + self.delay;
        if self.children.is_empty() {
            here
        } else {
            self.children
                .iter()
                .map(|child| child.min_delay_from(here))
                .min()
                .unwrap_or(here)
        }
    }

    fn max_delay_from(&self, offset: i32) -> i32 {
        let here = offset + self.delay;
        if self.children.is_empty() {
            here
        } else {
            self.children
                .iter()
                .map(|child| child.max_delay_from(here))
                .max()
                .unwrap_or(here)
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, prefix: &str, tail: bool) -> fmt::Result {
        let connector = if tail { "└── " } else { "├── " };
        write!(f, "{}{}{}", prefix, connector, self.symbol())?;
        if self.delay != 0 {
            write!(f, " (delay {})", self.delay)?;
        }
        let extension = if tail { "    " } else { "│   " };
        let child_prefix = format!("{prefix}{extension}");
        let count = self.children.len();
        for (index, child) in self.children.iter().enumerate() {
            writeln!(f)?;
            child.render(f, &child_prefix, index + 1 == count)?;
        }
        Ok(())
    }
}

/// Renders the tree with box drawing connectors, one node per line
///
/// The root is drawn as the tail of an invisible parent and delays are
/// only shown where nonzero.
impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, "", true)
    }
}
