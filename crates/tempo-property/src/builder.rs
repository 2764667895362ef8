//! Property tree construction from syntax trees
//!
//! Walks the rowan tree produced by the front end and builds the
//! [`Property`] representation the compiler passes operate on. The cycle
//! sign convention is fixed here: `@n` becomes delay `n`, `#n` becomes
//! delay `-n`, and each `##` step moves its right operand one further
//! cycle into the future, so chained operands pick up negative delays.

use crate::ast::{Property, PropertyOp};
use crate::CompileError;
use tempo_frontend::syntax::{SyntaxKind, SyntaxNode, SyntaxNodeExt, SyntaxToken};

/// Maximum recursion depth when walking syntax trees
const MAX_RECURSION_DEPTH: usize = 256;

/// Build a property tree from a parsed syntax tree
pub fn build_property(root: &SyntaxNode) -> Result<Property, CompileError> {
    let expr = if root.kind() == SyntaxKind::ROOT {
        root.children().next().ok_or_else(|| {
            CompileError::SyntaxTree("syntax tree holds no property expression".to_string())
        })?
    } else {
        root.clone()
    };
    build_expr(&expr, 0)
}

fn build_expr(node: &SyntaxNode, depth: usize) -> Result<Property, CompileError> {
    if depth >= MAX_RECURSION_DEPTH {
        return Err(CompileError::SyntaxTree(format!(
            "property tree deeper than {} levels",
            MAX_RECURSION_DEPTH
        )));
    }

    match node.kind() {
        SyntaxKind::ATOM => build_atom(node),
        SyntaxKind::PAREN_EXPR => {
            let inner = only_child(node)?;
            build_expr(&inner, depth + 1)
        }
        SyntaxKind::UNARY_EXPR => {
            let operand = only_child(node)?;
            let child = build_expr(&operand, depth + 1)?;
            Ok(Property::op(PropertyOp::Not, vec![child]))
        }
        SyntaxKind::AT_EXPR => build_offset(node, 1, depth),
        SyntaxKind::HASH_EXPR => build_offset(node, -1, depth),
        SyntaxKind::OR_EXPR => build_nary(node, PropertyOp::Or, depth),
        SyntaxKind::XOR_EXPR => build_nary(node, PropertyOp::Xor, depth),
        SyntaxKind::AND_EXPR => build_nary(node, PropertyOp::And, depth),
        SyntaxKind::SEQ_EXPR => build_sequence(node, depth),
        SyntaxKind::CMP_EXPR | SyntaxKind::IMPL_EXPR => build_binary(node, depth),
        SyntaxKind::CALL_EXPR => build_call(node, depth),
        kind => Err(CompileError::SyntaxTree(format!(
            "unexpected {:?} node in property expression",
            kind
        ))),
    }
}

/// Extract the leaf below an atom node
fn build_atom(node: &SyntaxNode) -> Result<Property, CompileError> {
    let token = node
        .children_with_tokens()
        .filter_map(|element| element.into_token())
        .next()
        .ok_or_else(|| CompileError::SyntaxTree("atom node without token".to_string()))?;

    match token.kind() {
        SyntaxKind::IDENT | SyntaxKind::BIT_IDENT | SyntaxKind::ESCAPED_IDENT => {
            Ok(Property::ident(token.text()))
        }
        SyntaxKind::NUMBER => {
            let value = token.text().parse::<u64>().map_err(|_| {
                CompileError::SyntaxTree(format!("invalid numeric literal `{}`", token.text()))
            })?;
            Ok(Property::constant(value))
        }
        kind => Err(CompileError::SyntaxTree(format!(
            "unexpected {:?} token in atom",
            kind
        ))),
    }
}

/// Build `@n` and `#n` as a delay carrier around the operand
fn build_offset(node: &SyntaxNode, sign: i32, depth: usize) -> Result<Property, CompileError> {
    let token = node.first_token_of_kind(SyntaxKind::NUMBER).ok_or_else(|| {
        CompileError::SyntaxTree("cycle operator without cycle count".to_string())
    })?;
    let cycles = parse_cycles(&token)?;
    let operand = only_child(node)?;
    let child = build_expr(&operand, depth + 1)?;
    Ok(Property::op(PropertyOp::Offset, vec![child]).with_delay(sign * cycles))
}

fn build_nary(node: &SyntaxNode, op: PropertyOp, depth: usize) -> Result<Property, CompileError> {
    let mut operands = Vec::new();
    for child in node.children() {
        operands.push(build_expr(&child, depth + 1)?);
    }
    Ok(collapse(op, operands))
}

/// Build a `##` chain as one AND whose operands carry the step delays
///
/// A bare `##` counts one cycle and a literal `n` right after it counts
/// `n - 1` more, so the running total at each operand is the number of
/// cycles it sits after the first operand.
fn build_sequence(node: &SyntaxNode, depth: usize) -> Result<Property, CompileError> {
    let mut cycles = 0i32;
    let mut operands = Vec::new();

    for element in node.children_with_tokens() {
        if let Some(token) = element.as_token() {
            match token.kind() {
                SyntaxKind::DOUBLE_HASH => cycles += 1,
                SyntaxKind::NUMBER => cycles += parse_cycles(token)? - 1,
                _ => {}
            }
        } else if let Some(child) = element.as_node() {
            let mut operand = build_expr(child, depth + 1)?;
            operand.delay -= cycles;
            operands.push(operand);
        }
    }

    Ok(collapse(PropertyOp::And, operands))
}

fn build_binary(node: &SyntaxNode, depth: usize) -> Result<Property, CompileError> {
    let op = binary_op(node)?;
    let mut operands = Vec::new();
    for child in node.children() {
        operands.push(build_expr(&child, depth + 1)?);
    }
    if operands.len() != 2 {
        return Err(CompileError::SyntaxTree(format!(
            "`{}` expects two operands, found {}",
            op,
            operands.len()
        )));
    }
    Ok(Property::op(op, operands))
}

fn build_call(node: &SyntaxNode, depth: usize) -> Result<Property, CompileError> {
    let op = call_op(node)?;
    let mut arguments = Vec::new();
    for child in node.children() {
        arguments.push(build_expr(&child, depth + 1)?);
    }

    let valid = match op {
        PropertyOp::Until => arguments.len() == 2,
        PropertyOp::Eventually => arguments.len() == 1 || arguments.len() == 3,
        _ => arguments.len() == 1,
    };
    if !valid {
        return Err(CompileError::SyntaxTree(format!(
            "`{}` applied to {} arguments",
            op,
            arguments.len()
        )));
    }

    Ok(Property::op(op, arguments))
}

/// A chain with a single operand is just that operand
fn collapse(op: PropertyOp, operands: Vec<Property>) -> Property {
    match <[Property; 1]>::try_from(operands) {
        Ok([only]) => only,
        Err(operands) => Property::op(op, operands),
    }
}

fn only_child(node: &SyntaxNode) -> Result<SyntaxNode, CompileError> {
    node.children().next().ok_or_else(|| {
        CompileError::SyntaxTree(format!("{:?} node without operand", node.kind()))
    })
}

fn parse_cycles(token: &SyntaxToken) -> Result<i32, CompileError> {
    token.text().parse::<i32>().map_err(|_| {
        CompileError::SyntaxTree(format!("cycle count `{}` out of range", token.text()))
    })
}

fn binary_op(node: &SyntaxNode) -> Result<PropertyOp, CompileError> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .find_map(|token| match token.kind() {
            SyntaxKind::EQ_EQ => Some(PropertyOp::Eq),
            SyntaxKind::NOT_EQ => Some(PropertyOp::Ne),
            SyntaxKind::IMPLIES => Some(PropertyOp::Implies),
            SyntaxKind::IMPLIES_NEXT => Some(PropertyOp::ImpliesNext),
            _ => None,
        })
        .ok_or_else(|| CompileError::SyntaxTree("binary node without operator".to_string()))
}

fn call_op(node: &SyntaxNode) -> Result<PropertyOp, CompileError> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .find_map(|token| match token.kind() {
            SyntaxKind::ROSE_KW => Some(PropertyOp::Rose),
            SyntaxKind::FELL_KW => Some(PropertyOp::Fell),
            SyntaxKind::STABLE_KW => Some(PropertyOp::Stable),
            SyntaxKind::CHANGED_KW => Some(PropertyOp::Changed),
            SyntaxKind::ALWAYS_KW => Some(PropertyOp::Always),
            SyntaxKind::NEVER_KW => Some(PropertyOp::Never),
            SyntaxKind::ONCE_KW => Some(PropertyOp::Once),
            SyntaxKind::EVENTUALLY_KW => Some(PropertyOp::Eventually),
            SyntaxKind::UNTIL_KW => Some(PropertyOp::Until),
            SyntaxKind::ANY_KW => Some(PropertyOp::Any),
            SyntaxKind::ALL_KW => Some(PropertyOp::All),
            _ => None,
        })
        .ok_or_else(|| CompileError::SyntaxTree("call node without function name".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::PropertyKind;

    fn build(source: &str) -> Property {
        let root = tempo_frontend::parse::parse(source);
        build_property(&root).expect("property should build")
    }

    #[test]
    fn test_atoms() {
        assert_eq!(build("ready"), Property::ident("ready"));
        assert_eq!(build("bus[3]"), Property::ident("bus[3]"));
        assert_eq!(build(r"\u0.ack"), Property::ident(r"\u0.ack"));
        assert_eq!(build("7"), Property::constant(7));
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            build("~x"),
            Property::op(PropertyOp::Not, vec![Property::ident("x")])
        );
    }

    #[test]
    fn test_flat_chains() {
        assert_eq!(
            build("a & b & c"),
            Property::op(
                PropertyOp::And,
                vec![
                    Property::ident("a"),
                    Property::ident("b"),
                    Property::ident("c"),
                ]
            )
        );
        assert_eq!(
            build("a | b | c"),
            Property::op(
                PropertyOp::Or,
                vec![
                    Property::ident("a"),
                    Property::ident("b"),
                    Property::ident("c"),
                ]
            )
        );
    }

    #[test]
    fn test_parens_are_transparent() {
        assert_eq!(build("(a)"), Property::ident("a"));
        assert_eq!(
            build("~(a | b)"),
            Property::op(
                PropertyOp::Not,
                vec![Property::op(
                    PropertyOp::Or,
                    vec![Property::ident("a"), Property::ident("b")]
                )]
            )
        );
    }

    #[test]
    fn test_at_offset_is_positive() {
        assert_eq!(
            build("@2 x"),
            Property::op(PropertyOp::Offset, vec![Property::ident("x")]).with_delay(2)
        );
    }

    #[test]
    fn test_hash_offset_is_negative() {
        assert_eq!(
            build("#3 x"),
            Property::op(PropertyOp::Offset, vec![Property::ident("x")]).with_delay(-3)
        );
    }

    #[test]
    fn test_sequence_single_step() {
        assert_eq!(
            build("a ## b"),
            Property::op(
                PropertyOp::And,
                vec![Property::ident("a"), Property::ident("b").with_delay(-1)]
            )
        );
    }

    #[test]
    fn test_sequence_with_step_count() {
        assert_eq!(
            build("a ## 2 b"),
            Property::op(
                PropertyOp::And,
                vec![Property::ident("a"), Property::ident("b").with_delay(-2)]
            )
        );
    }

    #[test]
    fn test_sequence_literal_steps_accumulate() {
        // each `##` adds one cycle, a literal n after it adds n - 1 more
        assert_eq!(
            build("a ## b ## 2 ## c"),
            Property::op(
                PropertyOp::And,
                vec![
                    Property::ident("a"),
                    Property::ident("b").with_delay(-1),
                    Property::ident("c").with_delay(-4),
                ]
            )
        );
    }

    #[test]
    fn test_implication() {
        assert_eq!(
            build("a |-> b"),
            Property::op(
                PropertyOp::Implies,
                vec![Property::ident("a"), Property::ident("b")]
            )
        );
        assert_eq!(
            build("a |=> b"),
            Property::op(
                PropertyOp::ImpliesNext,
                vec![Property::ident("a"), Property::ident("b")]
            )
        );
    }

    #[test]
    fn test_implication_left_associative() {
        let prop = build("a |-> b |=> c");
        assert_eq!(prop.kind, PropertyKind::Op(PropertyOp::ImpliesNext));
        assert_eq!(prop.children[0].kind, PropertyKind::Op(PropertyOp::Implies));
        assert_eq!(prop.children[1], Property::ident("c"));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            build("x == y"),
            Property::op(
                PropertyOp::Eq,
                vec![Property::ident("x"), Property::ident("y")]
            )
        );
        assert_eq!(
            build("x != y"),
            Property::op(
                PropertyOp::Ne,
                vec![Property::ident("x"), Property::ident("y")]
            )
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            build("$rose(req)"),
            Property::op(PropertyOp::Rose, vec![Property::ident("req")])
        );
        assert_eq!(
            build("$until(busy, done)"),
            Property::op(
                PropertyOp::Until,
                vec![Property::ident("busy"), Property::ident("done")]
            )
        );
        assert_eq!(
            build("$eventually(8, req, done)"),
            Property::op(
                PropertyOp::Eventually,
                vec![
                    Property::constant(8),
                    Property::ident("req"),
                    Property::ident("done"),
                ]
            )
        );
    }

    #[test]
    fn test_offset_composes_with_operators() {
        // unary binds tighter than &, so @1 applies to a alone
        assert_eq!(
            build("@1 a & b"),
            Property::op(
                PropertyOp::And,
                vec![
                    Property::op(PropertyOp::Offset, vec![Property::ident("a")]).with_delay(1),
                    Property::ident("b"),
                ]
            )
        );
    }

    #[test]
    fn test_bad_arity_is_rejected() {
        let root = tempo_frontend::parse::parse("$rose(a, b)");
        assert!(build_property(&root).is_err());
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        let root = tempo_frontend::parse::parse("");
        assert!(build_property(&root).is_err());
    }
}
