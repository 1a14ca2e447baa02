//! Contains code for the compile-time evaluation of constant expression
//! subtrees. The generator uses this to fold fully-constant expressions into
//! a single immediate load and to decide when a multiplication can be
//! strength-reduced to a shift.

use crate::ast;

/// Determine whether the given subtree is fully constant, i.e. whether its
/// value can be computed at generation time. A number literal is always
/// constant; an arithmetic binary operation is constant if and only if both
/// of its operands are. Every other node kind - including relational
/// comparisons, which produce no value - is never constant.
pub fn is_constant(node: &ast::Node) -> bool {
    match node {
        ast::Node::Number(_) => true,

        ast::Node::BinaryOp { op, left, right } if op.is_arithmetic() =>
            is_constant(left) && is_constant(right),

        _ => false
    }
}

/// Compute the value of a constant subtree using 64-bit two's-complement
/// signed arithmetic (addition, subtraction and multiplication wrap on
/// overflow; division truncates toward zero). A constant division by zero is
/// reported as a compile-time failure rather than being allowed to reach the
/// emitted program as a faulting instruction.
///
/// Callers must have established `is_constant` for the subtree first -
/// reaching any other node kind here is an internal invariant violation.
pub fn evaluate_constant(node: &ast::Node) -> super::Result<i64> {
    match node {
        ast::Node::Number(value) => Ok(*value as i64),

        ast::Node::BinaryOp { op, left, right } => {
            let left_val = evaluate_constant(left)?;
            let right_val = evaluate_constant(right)?;

            match op {
                ast::Op::Add => Ok(left_val.wrapping_add(right_val)),
                ast::Op::Subtract => Ok(left_val.wrapping_sub(right_val)),
                ast::Op::Multiply => Ok(left_val.wrapping_mul(right_val)),

                ast::Op::Divide => {
                    if right_val == 0 { Err(super::Failure::ConstantDivisionByZero) }
                    else { Ok(left_val.wrapping_div(right_val)) }
                }

                _ => unreachable!("relational operation in constant subtree")
            }
        }

        _ => unreachable!("evaluate_constant called on non-constant node")
    }
}

/// Return the exponent `e` such that `value == 2^e`, or 0 if `value` is not a
/// usable power of two. Note that 0 is therefore ambiguous with the genuine
/// exponent of `value == 1` - as a consequence a multiplication by 1 cannot
/// be strength-reduced to a shift by zero and falls back to the generic
/// multiply path instead. This fallback is deliberate and relied upon by the
/// generator.
pub fn power_of_two_exponent(value: i64) -> u32 {
    let mut power = 0;

    if value != 0 {
        let mut remaining = value;

        while remaining != 1 {
            if remaining % 2 != 0 { return 0 }

            remaining /= 2;
            power += 1;
        }
    }

    power
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, Op};
    use crate::codegen::Failure;

    fn binary(op: Op, left: Node, right: Node) -> Node {
        Node::BinaryOp { op, left: Box::new(left), right: Box::new(right) }
    }

    #[test]
    fn test_constant_detection() {
        assert!(is_constant(&Node::Number(5)));
        assert!(is_constant(&binary(Op::Add, Node::Number(2), Node::Number(3))));
        assert!(is_constant(&binary(
            Op::Multiply,
            binary(Op::Subtract, Node::Number(10), Node::Number(4)),
            Node::Number(6)
        )));

        assert!(!is_constant(&Node::Variable('A')));
        assert!(!is_constant(&binary(Op::Add, Node::Variable('A'), Node::Number(1))));
        assert!(!is_constant(&binary(Op::LessThan, Node::Number(1), Node::Number(2))));
        assert!(!is_constant(&Node::Print(Box::new(Node::Number(1)))));
        assert!(!is_constant(&Node::Sequence(vec![Node::Number(1)])));
    }

    #[test]
    fn test_constant_evaluation() {
        assert_eq!(evaluate_constant(&Node::Number(5)), Ok(5));
        assert_eq!(evaluate_constant(&binary(Op::Add, Node::Number(2), Node::Number(3))), Ok(5));
        assert_eq!(evaluate_constant(&binary(Op::Subtract, Node::Number(2), Node::Number(3))), Ok(-1));
        assert_eq!(
            evaluate_constant(&binary(
                Op::Multiply,
                binary(Op::Add, Node::Number(1), Node::Number(2)),
                Node::Number(4)
            )),
            Ok(12)
        );

        // Division truncates toward zero:
        assert_eq!(evaluate_constant(&binary(Op::Divide, Node::Number(7), Node::Number(2))), Ok(3));
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(
            evaluate_constant(&binary(Op::Add, Node::Number(i64::MAX as u64), Node::Number(1))),
            Ok(i64::MIN)
        );
        assert_eq!(
            evaluate_constant(&binary(Op::Multiply, Node::Number(i64::MAX as u64), Node::Number(2))),
            Ok(-2)
        );
    }

    #[test]
    fn test_division_by_constant_zero() {
        assert_eq!(
            evaluate_constant(&binary(Op::Divide, Node::Number(6), Node::Number(0))),
            Err(Failure::ConstantDivisionByZero)
        );

        // Detected at any nesting depth:
        assert_eq!(
            evaluate_constant(&binary(
                Op::Add,
                Node::Number(1),
                binary(Op::Divide, Node::Number(6), binary(Op::Subtract, Node::Number(2), Node::Number(2)))
            )),
            Err(Failure::ConstantDivisionByZero)
        );
    }

    #[test]
    fn test_power_of_two_exponent() {
        assert_eq!(power_of_two_exponent(2), 1);
        assert_eq!(power_of_two_exponent(8), 3);
        assert_eq!(power_of_two_exponent(1024), 10);

        // Sentinel for values that cannot be turned into a shift:
        assert_eq!(power_of_two_exponent(0), 0);
        assert_eq!(power_of_two_exponent(6), 0);
        assert_eq!(power_of_two_exponent(-8), 0);

        // The value 1 shares the sentinel - see the function's documentation.
        assert_eq!(power_of_two_exponent(1), 0);
    }
}
