//! Sugar elimination
//!
//! Rewrites implications, comparisons and most sampled value functions
//! into the primitive operator set `~ & ^ |` plus the temporal markers
//! that survive to the output (`$always`, `$eventually`, `$any`, `$all`).
//! Rules cascade at a node until none applies, then rewriting recurses
//! into the children, so a rule may produce further sugar below itself
//! but never above.

use crate::ast::{Property, PropertyKind, PropertyOp};

/// Rewrite all sugar in a property tree
pub fn desugar(prop: Property) -> Property {
    let Property {
        kind,
        delay,
        children,
    } = rewrite(prop);
    Property {
        kind,
        delay,
        children: children.into_iter().map(desugar).collect(),
    }
}

/// Apply rewrite rules at one node until its root operator is primitive
fn rewrite(prop: Property) -> Property {
    let Property {
        kind,
        delay,
        children,
    } = prop;
    let op = match kind {
        PropertyKind::Op(op) => op,
        _ => {
            return Property {
                kind,
                delay,
                children,
            }
        }
    };

    match op {
        // x |=> y rewrites as x |-> y with the consequent one cycle later
        PropertyOp::ImpliesNext => match <[Property; 2]>::try_from(children) {
            Ok([x, mut y]) => {
                y.delay -= 1;
                rewrite(Property::op(PropertyOp::Implies, vec![x, y]).with_delay(delay))
            }
            Err(children) => keep(op, delay, children),
        },
        // x |-> y is ~x | y
        PropertyOp::Implies => match <[Property; 2]>::try_from(children) {
            Ok([x, y]) => {
                let not_x = Property::op(PropertyOp::Not, vec![x]);
                Property::op(PropertyOp::Or, vec![not_x, y]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // x == y is ~(x ^ y), the node delay moves to the new root only
        PropertyOp::Eq => match <[Property; 2]>::try_from(children) {
            Ok([x, y]) => {
                let xor = Property::op(PropertyOp::Xor, vec![x, y]);
                Property::op(PropertyOp::Not, vec![xor]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // x != y is x ^ y
        PropertyOp::Ne => match <[Property; 2]>::try_from(children) {
            Ok([x, y]) => Property::op(PropertyOp::Xor, vec![x, y]).with_delay(delay),
            Err(children) => keep(op, delay, children),
        },
        // $rose(x) is x & ~(x one cycle ago)
        PropertyOp::Rose => match <[Property; 1]>::try_from(children) {
            Ok([x]) => {
                let past = Property::op(PropertyOp::Not, vec![x.clone()]).with_delay(1);
                Property::op(PropertyOp::And, vec![x, past]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // $fell(x) is (x one cycle ago) & ~x, the copy is taken before the shift
        PropertyOp::Fell => match <[Property; 1]>::try_from(children) {
            Ok([x]) => {
                let now = Property::op(PropertyOp::Not, vec![x.clone()]);
                let mut past = x;
                past.delay += 1;
                Property::op(PropertyOp::And, vec![past, now]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // $stable(x) is ~(x ^ x one cycle ago)
        PropertyOp::Stable => match <[Property; 1]>::try_from(children) {
            Ok([x]) => {
                let mut past = x.clone();
                past.delay += 1;
                let xor = Property::op(PropertyOp::Xor, vec![x, past]);
                Property::op(PropertyOp::Not, vec![xor]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // $changed(x) is x ^ x one cycle ago
        PropertyOp::Changed => match <[Property; 1]>::try_from(children) {
            Ok([x]) => {
                let mut past = x.clone();
                past.delay += 1;
                Property::op(PropertyOp::Xor, vec![x, past]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // $never(x) is $always(~x)
        PropertyOp::Never => match <[Property; 1]>::try_from(children) {
            Ok([x]) => {
                let not_x = Property::op(PropertyOp::Not, vec![x]);
                Property::op(PropertyOp::Always, vec![not_x]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // $once(x) is ~$always(~x)
        PropertyOp::Once => match <[Property; 1]>::try_from(children) {
            Ok([x]) => {
                let not_x = Property::op(PropertyOp::Not, vec![x]);
                let never = Property::op(PropertyOp::Always, vec![not_x]);
                Property::op(PropertyOp::Not, vec![never]).with_delay(delay)
            }
            Err(children) => keep(op, delay, children),
        },
        // $until(x, y) is $never(x) |-> y
        PropertyOp::Until => match <[Property; 2]>::try_from(children) {
            Ok([x, y]) => {
                let never_x = Property::op(PropertyOp::Never, vec![x]);
                rewrite(Property::op(PropertyOp::Implies, vec![never_x, y]).with_delay(delay))
            }
            Err(children) => keep(op, delay, children),
        },
        _ => keep(op, delay, children),
    }
}

fn keep(op: PropertyOp, delay: i32, children: Vec<Property>) -> Property {
    Property {
        kind: PropertyKind::Op(op),
        delay,
        children,
    }
}
