//! Multi-bit expansion
//!
//! Rewrites operations over multi-bit signals into single-bit form. A
//! negation or XOR whose operands are wider than one bit is a desugared
//! comparison: it becomes an AND (equality) or OR (inequality) over
//! per-bit slices of the whole subtree. Reductions `$any` and `$all`
//! become OR respectively AND over slices of their operand, or degrade
//! to a plain copy when the operand is already a single bit. Triggers
//! are checked before recursing, so an outer comparison expands as one
//! unit instead of being rewritten bit by bit from below.

use crate::ast::{Property, PropertyKind, PropertyOp};
use crate::table::{SignalTable, Width};
use crate::CompileError;

/// Expand all multi-bit operations in a property tree
pub fn expand(prop: Property, table: &SignalTable) -> Result<Property, CompileError> {
    if let PropertyKind::Op(op) = &prop.kind {
        match op {
            PropertyOp::Not => {
                if let Some(child) = prop.children.first() {
                    if let Width::Bits(w) = value_width(child, table)? {
                        if w > 1 {
                            return Ok(slice_combination(prop, PropertyOp::And, w, table));
                        }
                    }
                }
            }
            PropertyOp::Xor => {
                if let Width::Bits(w) = children_value_width(&prop, table)? {
                    if w > 1 {
                        return Ok(slice_combination(prop, PropertyOp::Or, w, table));
                    }
                }
            }
            PropertyOp::Any | PropertyOp::All => {
                return expand_reduction(prop, table);
            }
            _ => {}
        }
    }

    let Property {
        kind,
        delay,
        children,
    } = prop;
    let children = children
        .into_iter()
        .map(|child| expand(child, table))
        .collect::<Result<_, _>>()?;
    Ok(Property {
        kind,
        delay,
        children,
    })
}

/// Replace a node by a combination of its per-bit slices
///
/// The combination keeps the replaced node's delay; the slices sit at
/// delay 0 relative to it.
fn slice_combination(
    prop: Property,
    combiner: PropertyOp,
    width: u32,
    table: &SignalTable,
) -> Property {
    let delay = prop.delay;
    let template = prop.with_delay(0);
    let slices = (0..width)
        .map(|bit| slice(&template, bit, table))
        .collect();
    Property::op(combiner, slices).with_delay(delay)
}

fn expand_reduction(prop: Property, table: &SignalTable) -> Result<Property, CompileError> {
    let Property {
        kind,
        delay,
        children,
    } = prop;
    let combiner = if kind == PropertyKind::Op(PropertyOp::All) {
        PropertyOp::And
    } else {
        PropertyOp::Or
    };

    match <[Property; 1]>::try_from(children) {
        Ok([operand]) => match value_width(&operand, table)? {
            Width::Bits(w) if w > 1 => {
                let slices = (0..w).map(|bit| slice(&operand, bit, table)).collect();
                Ok(Property::op(combiner, slices).with_delay(delay))
            }
            _ => {
                // a single-bit reduction degrades to its operand
                let mut operand = expand(operand, table)?;
                operand.delay += delay;
                Ok(operand)
            }
        },
        Err(children) => {
            let children = children
                .into_iter()
                .map(|child| expand(child, table))
                .collect::<Result<_, _>>()?;
            Ok(Property {
                kind,
                delay,
                children,
            })
        }
    }
}

/// Width a subtree evaluates to, before any expansion
///
/// Unlike the checker this never fails on width grounds: operands of
/// different widths make the node single-bit, which simply disables the
/// expansion triggers above it. A negation over a wide operand is
/// itself an equality or NOR unit and evaluates to a single bit; only
/// its own trigger sees the wide child.
fn value_width(prop: &Property, table: &SignalTable) -> Result<Width, CompileError> {
    match &prop.kind {
        PropertyKind::Ident(name) => table
            .width(name)
            .map(Width::Bits)
            .ok_or_else(|| CompileError::UnknownIdentifier(name.clone())),
        PropertyKind::Const(_) => Ok(Width::Any),
        PropertyKind::Op(op) => match op {
            PropertyOp::Concat => Ok(Width::Bits(prop.children.len() as u32)),
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
            | PropertyOp::All => Ok(Width::Bits(1)),
            PropertyOp::Not => match children_value_width(prop, table)? {
                Width::Bits(w) if w > 1 => Ok(Width::Bits(1)),
                width => Ok(width),
            },
            PropertyOp::And
            | PropertyOp::Or
            | PropertyOp::Xor
            | PropertyOp::Offset
            | PropertyOp::Always
            | PropertyOp::Never
            | PropertyOp::Once
            | PropertyOp::Eventually => children_value_width(prop, table),
        },
    }
}

fn children_value_width(prop: &Property, table: &SignalTable) -> Result<Width, CompileError> {
    let mut common = Width::Any;
    for child in &prop.children {
        let child_width = value_width(child, table)?;
        common = match common.join(child_width) {
            Some(width) => width,
            None => return Ok(Width::Bits(1)),
        };
    }
    Ok(common)
}

/// Project a subtree onto one bit position
///
/// Only identifiers wider than one bit are renamed to their bit select;
/// constants, single-bit identifiers, structure and delays are untouched.
fn slice(prop: &Property, bit: u32, table: &SignalTable) -> Property {
    match &prop.kind {
        PropertyKind::Ident(name) if table.width(name).is_some_and(|w| w > 1) => Property {
            kind: PropertyKind::Ident(format!("{name}[{bit}]")),
            delay: prop.delay,
            children: Vec::new(),
        },
        _ => Property {
            kind: prop.kind.clone(),
            delay: prop.delay,
            children: prop
                .children
                .iter()
                .map(|child| slice(child, bit, table))
                .collect(),
        },
    }
}
