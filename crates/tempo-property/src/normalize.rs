//! Delay normalization
//!
//! Brings the delays of a property tree into canonical form in three
//! steps: [`flatten`] pushes every internal delay down to the terminals
//! and dissolves delay carriers, [`shift`] moves all terminals by a
//! constant, and [`group`] factors the shared part of child delays back
//! up the tree. [`normalize`] runs the steps so that afterwards every
//! accumulated root-to-terminal delay is non-negative and the smallest
//! one is exactly zero.

use crate::ast::{Property, PropertyKind, PropertyOp};

/// Normalize all delays in a property tree
pub fn normalize(prop: Property) -> Property {
    let flat = flatten(prop);
    let cycles = -flat.min_delay();
    group(shift(flat, cycles))
}

/// Push internal delays down to the terminals
///
/// Afterwards every internal node carries delay 0 and each terminal the
/// accumulated delay of its path. Delay carrier nodes disappear here;
/// their only job was to hold a delay.
pub fn flatten(prop: Property) -> Property {
    flatten_from(prop, 0)
}

fn flatten_from(prop: Property, offset: i32) -> Property {
    let Property {
        kind,
        delay,
        children,
    } = prop;
    let total = offset + delay;

    if children.is_empty() {
        return Property {
            kind,
            delay: total,
            children,
        };
    }

    let children = if kind == PropertyKind::Op(PropertyOp::Offset) {
        match <[Property; 1]>::try_from(children) {
            Ok([child]) => return flatten_from(child, total),
            Err(children) => children,
        }
    } else {
        children
    };

    Property {
        kind,
        delay: 0,
        children: children
            .into_iter()
            .map(|child| flatten_from(child, total))
            .collect(),
    }
}

/// Add a constant number of cycles to every terminal delay
pub fn shift(prop: Property, cycles: i32) -> Property {
    let Property {
        kind,
        delay,
        children,
    } = prop;

    if children.is_empty() {
        Property {
            kind,
            delay: delay + cycles,
            children,
        }
    } else {
        Property {
            kind,
            delay,
            children: children
                .into_iter()
                .map(|child| shift(child, cycles))
                .collect(),
        }
    }
}

/// Factor shared child delays up into their parent, bottom up
pub fn group(prop: Property) -> Property {
    let Property {
        kind,
        delay,
        children,
    } = prop;

    if children.is_empty() {
        return Property {
            kind,
            delay,
            children,
        };
    }

    let mut children: Vec<Property> = children.into_iter().map(group).collect();
    let shared = children
        .iter()
        .map(|child| child.delay)
        .min()
        .unwrap_or(0);
    if shared != 0 {
        for child in &mut children {
            child.delay -= shared;
        }
    }

    Property {
        kind,
        delay: delay + shared,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Property {
        Property::ident(name)
    }

    #[test]
    fn test_flatten_pushes_delays_to_terminals() {
        let prop = Property::op(
            PropertyOp::And,
            vec![
                ident("a"),
                Property::op(PropertyOp::Not, vec![ident("b")]).with_delay(1),
            ],
        )
        .with_delay(2);

        let expected = Property::op(
            PropertyOp::And,
            vec![
                ident("a").with_delay(2),
                Property::op(PropertyOp::Not, vec![ident("b").with_delay(3)]),
            ],
        );
        assert_eq!(flatten(prop), expected);
    }

    #[test]
    fn test_flatten_dissolves_delay_carriers() {
        let prop = Property::op(
            PropertyOp::Not,
            vec![Property::op(PropertyOp::Offset, vec![ident("a")]).with_delay(2)],
        );
        let expected = Property::op(PropertyOp::Not, vec![ident("a").with_delay(2)]);
        assert_eq!(flatten(prop), expected);

        let stacked = Property::op(
            PropertyOp::Offset,
            vec![Property::op(PropertyOp::Offset, vec![ident("x")]).with_delay(-3)],
        )
        .with_delay(1);
        assert_eq!(flatten(stacked), ident("x").with_delay(-2));
    }

    #[test]
    fn test_shift_touches_terminals_only() {
        let prop = Property::op(
            PropertyOp::Or,
            vec![ident("a").with_delay(-1), ident("b")],
        );
        let shifted = shift(prop, 1);
        assert_eq!(shifted.delay, 0);
        assert_eq!(shifted.children[0].delay, 0);
        assert_eq!(shifted.children[1].delay, 1);
    }

    #[test]
    fn test_group_hoists_shared_delay() {
        let prop = Property::op(
            PropertyOp::And,
            vec![ident("a").with_delay(2), ident("b").with_delay(3)],
        );
        let expected = Property::op(
            PropertyOp::And,
            vec![ident("a"), ident("b").with_delay(1)],
        )
        .with_delay(2);
        assert_eq!(group(prop), expected);
    }

    #[test]
    fn test_group_recurses_before_hoisting() {
        let inner = Property::op(
            PropertyOp::Or,
            vec![ident("a").with_delay(4), ident("b").with_delay(2)],
        );
        let prop = Property::op(PropertyOp::And, vec![inner, ident("c").with_delay(1)]);

        let result = group(prop);
        // inner min 2 moves onto the OR node, then the shared 1 onto the AND
        assert_eq!(result.delay, 1);
        assert_eq!(result.children[0].delay, 1);
        assert_eq!(result.children[0].children[0].delay, 2);
        assert_eq!(result.children[0].children[1].delay, 0);
        assert_eq!(result.children[1].delay, 0);
    }

    #[test]
    fn test_normalize_aligns_minimum_to_zero() {
        // desugared form of x |=> y
        let prop = Property::op(
            PropertyOp::Or,
            vec![
                Property::op(PropertyOp::Not, vec![ident("x")]),
                ident("y").with_delay(-1),
            ],
        );
        let expected = Property::op(
            PropertyOp::Or,
            vec![
                Property::op(PropertyOp::Not, vec![ident("x")]).with_delay(1),
                ident("y"),
            ],
        );
        assert_eq!(normalize(prop), expected);
    }

    #[test]
    fn test_normalize_single_terminal() {
        assert_eq!(normalize(ident("a").with_delay(5)), ident("a"));
        assert_eq!(normalize(ident("a").with_delay(-4)), ident("a"));
    }

    #[test]
    fn test_normalize_invariants() {
        let prop = Property::op(
            PropertyOp::And,
            vec![
                Property::op(
                    PropertyOp::Or,
                    vec![ident("a").with_delay(-2), ident("b").with_delay(1)],
                ),
                Property::op(PropertyOp::Offset, vec![ident("c")]).with_delay(-5),
            ],
        );
        let result = normalize(prop);
        assert_eq!(result.min_delay(), 0);
        assert!(result.max_delay() >= 0);
    }

    #[test]
    fn test_normalize_preserves_relative_delays() {
        let prop = Property::op(
            PropertyOp::And,
            vec![ident("a").with_delay(-3), ident("b").with_delay(2)],
        );
        let spread = prop.max_delay() - prop.min_delay();
        let result = normalize(prop);
        assert_eq!(result.max_delay() - result.min_delay(), spread);
        assert_eq!(result.min_delay(), 0);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let prop = Property::op(
            PropertyOp::Or,
            vec![
                Property::op(PropertyOp::Not, vec![ident("x").with_delay(2)]).with_delay(1),
                ident("y").with_delay(-1),
            ],
        );
        let once = normalize(prop);
        assert_eq!(normalize(once.clone()), once);
    }
}
