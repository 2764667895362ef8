//! Compiler for temporal hardware assertion properties
//!
//! Turns assertion source text into single-bit property trees over the
//! primitive operators `~ & ^ |` plus the temporal markers the netlist
//! stages understand:
//! - Property tree construction from the parsed syntax
//! - Sugar elimination for implications, comparisons and sampled value functions
//! - Delay normalization into non-negative, zero-based form
//! - Width checking against a read-only signal table
//! - Multi-bit expansion into per-bit slices

pub mod ast;
pub mod builder;
pub mod check;
pub mod desugar;
pub mod expand;
pub mod normalize;
pub mod table;

pub use ast::{Property, PropertyKind, PropertyOp};
pub use builder::build_property;
pub use check::{check, resolved_width};
pub use desugar::desugar;
pub use expand::expand;
pub use normalize::{flatten, group, normalize, shift};
pub use table::{SignalTable, Width};

use thiserror::Error;

/// Errors raised while compiling a property
///
/// Every error is fatal; the pipeline stops at the first one. Width
/// errors embed a rendering of the offending subtree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("parse error at byte {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("malformed property tree: {0}")]
    SyntaxTree(String),

    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("bit width mismatch: {message}\n{subtree}")]
    BitWidthMismatch { message: String, subtree: String },

    #[error("delayed multi-bit net: `{symbol}` is {width} bits wide at delay {delay}\n{subtree}")]
    DelayedMultibitNet {
        symbol: String,
        width: u32,
        delay: i32,
        subtree: String,
    },
}

/// Compile property source text against a signal table
///
/// Runs the full pipeline in order: parse, build, desugar, normalize,
/// check, expand. The returned tree uses only primitive operators and
/// surviving temporal markers, every identifier resolves to a single
/// bit, and the smallest accumulated delay is exactly zero.
pub fn compile(source: &str, table: &SignalTable) -> Result<Property, CompileError> {
    let (tree, errors) = tempo_frontend::parse::parse_with_errors(source);
    if let Some(error) = errors.first() {
        return Err(CompileError::Parse {
            message: error.message.clone(),
            position: error.position,
        });
    }

    let built = build_property(&tree)?;
    let desugared = desugar(built);
    let normalized = normalize(desugared);
    check(&normalized, table)?;
    expand(normalized, table)
}
