use std::cmp::Ordering;

use serde_json::Value;

use super::{
    ExpressionError,
    parser::{BinaryOp, Expr, LogicalOp, UnaryOp},
    value::{is_truthy, loosely_equal, number_value, type_name},
};
use crate::models::document::EvaluationContext;

impl Expr {
    pub(crate) fn eval(&self, context: &EvaluationContext) -> Result<Value, ExpressionError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Field(name) => context
                .lookup(name)
                .cloned()
                .ok_or_else(|| ExpressionError::UnknownField(name.clone())),
            Expr::Member(base, name) => member(base.eval(context)?, name),
            Expr::Index(base, index) => index_into(base.eval(context)?, &index.eval(context)?),
            Expr::Unary(op, operand) => unary(*op, operand.eval(context)?),
            Expr::Binary(op, left, right) => {
                binary(*op, &left.eval(context)?, &right.eval(context)?)
            }
            Expr::Logical(op, left, right) => {
                let left = left.eval(context)?;
                match (op, is_truthy(&left)) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    _ => right.eval(context),
                }
            }
        }
    }
}

fn member(base: Value, name: &str) -> Result<Value, ExpressionError> {
    match base {
        Value::Object(mut map) => map
            .remove(name)
            .ok_or_else(|| ExpressionError::UnknownField(name.to_string())),
        other => Err(ExpressionError::InvalidOperand {
            operator: ".",
            operand: type_name(&other),
        }),
    }
}

fn index_into(base: Value, index: &Value) -> Result<Value, ExpressionError> {
    match (base, index) {
        (Value::Array(mut items), Value::Number(n)) => {
            let position = resolve_position(n.as_i64(), items.len())?;
            Ok(items.swap_remove(position))
        }
        (Value::String(s), Value::Number(n)) => {
            let chars: Vec<char> = s.chars().collect();
            let position = resolve_position(n.as_i64(), chars.len())?;
            Ok(Value::String(chars[position].to_string()))
        }
        (Value::Object(mut map), Value::String(key)) => map
            .remove(key)
            .ok_or_else(|| ExpressionError::UnknownField(key.clone())),
        (base, index) => Err(ExpressionError::TypeMismatch {
            operator: "[]",
            left: type_name(&base),
            right: type_name(index),
        }),
    }
}

fn resolve_position(index: Option<i64>, len: usize) -> Result<usize, ExpressionError> {
    let Some(index) = index else {
        return Err(ExpressionError::InvalidOperand {
            operator: "[]",
            operand: "non-integer number",
        });
    };

    let resolved = if index < 0 { len as i64 + index } else { index };
    if resolved < 0 || resolved >= len as i64 {
        return Err(ExpressionError::IndexOutOfRange(index));
    }

    Ok(resolved as usize)
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, ExpressionError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!is_truthy(&operand))),
        UnaryOp::Neg => match operand.as_f64() {
            Some(n) => number_value(-n),
            None => Err(ExpressionError::InvalidOperand {
                operator: "-",
                operand: type_name(&operand),
            }),
        },
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExpressionError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(loosely_equal(left, right))),
        BinaryOp::Ne => Ok(Value::Bool(!loosely_equal(left, right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(op, left, right)?;
            let result = match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::In => contains(right, left).map(Value::Bool),
        BinaryOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => arithmetic(op, left, right),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            arithmetic(op, left, right)
        }
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExpressionError> {
    let (Some(a), Some(b)) = (numeric(left), numeric(right)) else {
        return Err(mismatch(op, left, right));
    };

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Err(ExpressionError::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Rem if b == 0.0 => return Err(ExpressionError::DivisionByZero),
        // Result takes the sign of the divisor.
        BinaryOp::Rem => a - b * (a / b).floor(),
        _ => return Err(mismatch(op, left, right)),
    };

    number_value(result)
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Ordering, ExpressionError> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (numeric(left), numeric(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };

    ordering.ok_or_else(|| mismatch(op, left, right))
}

fn contains(haystack: &Value, needle: &Value) -> Result<bool, ExpressionError> {
    match (haystack, needle) {
        (Value::String(h), Value::String(n)) => Ok(h.contains(n.as_str())),
        (Value::Array(items), needle) => Ok(items.iter().any(|item| loosely_equal(item, needle))),
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        _ => Err(mismatch(BinaryOp::In, needle, haystack)),
    }
}

/// Numbers and booleans take part in arithmetic, as they do in Python.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> ExpressionError {
    ExpressionError::TypeMismatch {
        operator: op.symbol(),
        left: type_name(left),
        right: type_name(right),
    }
}
