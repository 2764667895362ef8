//! Width checking
//!
//! Resolves the bit width of every node against a read-only signal table
//! and rejects trees the downstream netlist stages cannot represent.
//! Constants resolve to [`Width::Any`] and unify with anything. A `~` or
//! `^` over operands wider than one bit is a desugared comparison and
//! resolves to its single-bit outcome; every other operator requires its
//! operands to agree and passes the common width through, except
//! concatenation, whose width is its child count.

use crate::ast::{Property, PropertyKind, PropertyOp};
use crate::table::{SignalTable, Width};
use crate::CompileError;

/// Check a property against a signal table
///
/// The whole property must resolve to a single bit. Returns the resolved
/// root width on success.
pub fn check(prop: &Property, table: &SignalTable) -> Result<Width, CompileError> {
    let width = resolved_width(prop, table)?;
    if let Width::Bits(w) = width {
        if w > 1 {
            return Err(CompileError::BitWidthMismatch {
                message: format!("property resolves to {} bits, expected a single bit", w),
                subtree: prop.to_string(),
            });
        }
    }
    Ok(width)
}

/// Resolve the width of a subtree
pub fn resolved_width(prop: &Property, table: &SignalTable) -> Result<Width, CompileError> {
    let width = match &prop.kind {
        PropertyKind::Ident(name) => {
            let bits = table
                .width(name)
                .ok_or_else(|| CompileError::UnknownIdentifier(name.clone()))?;
            Width::Bits(bits)
        }
        PropertyKind::Const(_) => Width::Any,
        PropertyKind::Op(op) => match op {
            PropertyOp::Concat => {
                for child in &prop.children {
                    resolved_width(child, table)?;
                }
                Width::Bits(prop.children.len() as u32)
            }
            PropertyOp::Eq
            | PropertyOp::Ne
            | PropertyOp::Implies
            | PropertyOp::ImpliesNext
            | PropertyOp::Until
            | PropertyOp::Rose
            | PropertyOp::Fell
            | PropertyOp::Stable
            | PropertyOp::Changed
            | PropertyOp::Any
            | PropertyOp::All => {
                common_child_width(prop, table)?;
                Width::Bits(1)
            }
            PropertyOp::Not | PropertyOp::Xor => {
                let common = common_child_width(prop, table)?;
                if common.is_single_bit() {
                    common
                } else {
                    Width::Bits(1)
                }
            }
            PropertyOp::And
            | PropertyOp::Or
            | PropertyOp::Offset
            | PropertyOp::Always
            | PropertyOp::Never
            | PropertyOp::Once
            | PropertyOp::Eventually => common_child_width(prop, table)?,
        },
    };

    require_scalar_if_delayed(prop, width)?;
    Ok(width)
}

/// Unify the widths of all children of a node
fn common_child_width(prop: &Property, table: &SignalTable) -> Result<Width, CompileError> {
    let mut common = Width::Any;
    for child in &prop.children {
        let child_width = resolved_width(child, table)?;
        common = match common.join(child_width) {
            Some(width) => width,
            None => {
                return Err(CompileError::BitWidthMismatch {
                    message: format!(
                        "operands of `{}` mix widths {} and {}",
                        prop.symbol(),
                        common,
                        child_width
                    ),
                    subtree: prop.to_string(),
                })
            }
        };
    }
    Ok(common)
}

/// A node wider than one bit must sit at delay 0
fn require_scalar_if_delayed(prop: &Property, width: Width) -> Result<(), CompileError> {
    if prop.delay == 0 {
        return Ok(());
    }
    if let Width::Bits(w) = width {
        if w > 1 {
            return Err(CompileError::DelayedMultibitNet {
                symbol: prop.symbol(),
                width: w,
                delay: prop.delay,
                subtree: prop.to_string(),
            });
        }
    }
    Ok(())
}
