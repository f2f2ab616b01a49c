//! Operator tables. A combination of operator and operand types missing from a table is a type
//! error.

use std::mem;

use glint_parser::ast::{BinaryOp, UnaryOp};
use glint_value::Value;

use crate::RuntimeError;

pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Negate, Value::Number(val)) => Ok(Value::Number(-val)),
        (UnaryOp::Not, Value::Bool(val)) => Ok(Value::Bool(!val)),
        _ => Err(RuntimeError::UnaryTypeMismatch {
            op,
            operand: operand.type_name(),
        }),
    }
}

/// Applies a binary operator to two evaluated operands. `and` and `or` are accepted on booleans
/// but the evaluator short-circuits them before getting here.
pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    use BinaryOp::*;

    let mismatch = || RuntimeError::TypeMismatch {
        op,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    };

    // nil only ever equals nil
    if matches!(lhs, Value::Nil) || matches!(rhs, Value::Nil) {
        let both_nil = matches!((lhs, rhs), (Value::Nil, Value::Nil));
        return match op {
            EqualEqual => Ok(Value::Bool(both_nil)),
            BangEqual => Ok(Value::Bool(!both_nil)),
            _ => Err(mismatch()),
        };
    }

    let value = match (op, lhs, rhs) {
        (Plus, Value::Number(l), Value::Number(r)) => Value::Number(l + r),
        (Plus, Value::Str(l), Value::Str(r)) => Value::new_string(format!("{}{}", l, r)),
        (Minus, Value::Number(l), Value::Number(r)) => Value::Number(l - r),
        (Star, Value::Number(l), Value::Number(r)) => Value::Number(l * r),
        (Slash, Value::Number(l), Value::Number(r)) => Value::Number(l / r),
        (Greater, Value::Number(l), Value::Number(r)) => Value::Bool(l > r),
        (GreaterEqual, Value::Number(l), Value::Number(r)) => Value::Bool(l >= r),
        (Less, Value::Number(l), Value::Number(r)) => Value::Bool(l < r),
        (LessEqual, Value::Number(l), Value::Number(r)) => Value::Bool(l <= r),
        (And, Value::Bool(l), Value::Bool(r)) => Value::Bool(*l && *r),
        (Or, Value::Bool(l), Value::Bool(r)) => Value::Bool(*l || *r),
        (EqualEqual, l, r) if same_type(l, r) => Value::Bool(l == r),
        (BangEqual, l, r) if same_type(l, r) => Value::Bool(l != r),
        _ => return Err(mismatch()),
    };
    Ok(value)
}

fn same_type(lhs: &Value, rhs: &Value) -> bool {
    mem::discriminant(lhs) == mem::discriminant(rhs)
}
