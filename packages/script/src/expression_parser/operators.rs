/**
 * Expression Operators
 *
 * The closed set of unary and binary operators with their token text,
 * binding precedence and evaluation over runtime values
 */
use std::cmp::Ordering;

use serde::Serialize;

use crate::evaluator::value::Value;

/// Failure applying an operator to incompatible operands
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    pub message: String,
}

impl OperationError {
    fn new(message: impl Into<String>) -> Self {
        OperationError {
            message: message.into(),
        }
    }
}

type OpResult = std::result::Result<Value, OperationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
    BitwiseNot,
}

impl UnaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "!" => Some(UnaryOperator::Not),
            "-" => Some(UnaryOperator::Minus),
            "+" => Some(UnaryOperator::Plus),
            "~" => Some(UnaryOperator::BitwiseNot),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::BitwiseNot => "~",
        }
    }

    pub fn apply(&self, operand: &Value) -> OpResult {
        match self {
            UnaryOperator::Not => Ok(Value::Bool(!operand.is_truthy())),
            UnaryOperator::Plus => match operand {
                Value::Null => Ok(Value::Int(0)),
                other => Ok(other.clone()),
            },
            UnaryOperator::Minus => match numeric(operand, "-")? {
                Number::Int(n) => Ok(n
                    .checked_neg()
                    .map(Value::Int)
                    .unwrap_or(Value::Float(-(n as f64)))),
                Number::Float(f) => Ok(Value::Float(-f)),
            },
            UnaryOperator::BitwiseNot => Ok(Value::Int(!integral(operand, "~")?)),
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    /// `=`, folded into `Equals` when the tree is built
    Assign,
    Or,
    And,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equals,
    NotEquals,
    StrictEquals,
    StrictNotEquals,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    LeftShift,
    RightShift,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        use BinaryOperator::*;
        Some(match token {
            "=" => Assign,
            "||" => Or,
            "&&" => And,
            "|" => BitwiseOr,
            "^" => BitwiseXor,
            "&" => BitwiseAnd,
            "==" => Equals,
            "!=" => NotEquals,
            "===" => StrictEquals,
            "!==" => StrictNotEquals,
            "<" => LessThan,
            ">" => GreaterThan,
            "<=" => LessThanEqual,
            ">=" => GreaterThanEqual,
            "<<" => LeftShift,
            ">>" => RightShift,
            "+" => Add,
            "-" => Subtract,
            "*" => Multiply,
            "/" => Divide,
            "%" => Modulo,
            _ => return None,
        })
    }

    pub fn token(&self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Assign => "=",
            Or => "||",
            And => "&&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            BitwiseAnd => "&",
            Equals => "==",
            NotEquals => "!=",
            StrictEquals => "===",
            StrictNotEquals => "!==",
            LessThan => "<",
            GreaterThan => ">",
            LessThanEqual => "<=",
            GreaterThanEqual => ">=",
            LeftShift => "<<",
            RightShift => ">>",
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
        }
    }

    /// Binding strength, higher binds tighter
    pub fn precedence(&self) -> u8 {
        use BinaryOperator::*;
        match self {
            Assign => 1,
            Or => 2,
            And => 3,
            BitwiseOr => 4,
            BitwiseXor => 5,
            BitwiseAnd => 6,
            Equals | NotEquals | StrictEquals | StrictNotEquals => 7,
            LessThan | GreaterThan | LessThanEqual | GreaterThanEqual => 8,
            LeftShift | RightShift => 9,
            Add | Subtract => 10,
            Multiply | Divide | Modulo => 11,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    /// Apply to two eagerly evaluated operands.
    ///
    /// Logical operators are handled here on already-evaluated values; the
    /// interpreter short-circuits before reaching this point.
    pub fn apply(&self, lhs: &Value, rhs: &Value) -> OpResult {
        use BinaryOperator::*;
        match self {
            Or => Ok(Value::Bool(lhs.is_truthy() || rhs.is_truthy())),
            And => Ok(Value::Bool(lhs.is_truthy() && rhs.is_truthy())),
            Assign | Equals | StrictEquals => Ok(Value::Bool(loose_equals(lhs, rhs))),
            NotEquals | StrictNotEquals => Ok(Value::Bool(!loose_equals(lhs, rhs))),
            LessThan => Ok(Value::Bool(compare(lhs, rhs) == Some(Ordering::Less))),
            GreaterThan => Ok(Value::Bool(compare(lhs, rhs) == Some(Ordering::Greater))),
            LessThanEqual => Ok(Value::Bool(matches!(
                compare(lhs, rhs),
                Some(Ordering::Less | Ordering::Equal)
            ))),
            GreaterThanEqual => Ok(Value::Bool(matches!(
                compare(lhs, rhs),
                Some(Ordering::Greater | Ordering::Equal)
            ))),
            Add => add(lhs, rhs),
            Subtract => arithmetic(lhs, rhs, "-", i64::checked_sub, |a, b| a - b),
            Multiply => arithmetic(lhs, rhs, "*", i64::checked_mul, |a, b| a * b),
            Divide => divide(lhs, rhs, "/", i64::checked_div, |a, b| a / b),
            Modulo => divide(lhs, rhs, "%", i64::checked_rem, |a, b| a % b),
            BitwiseOr => Ok(Value::Int(integral(lhs, "|")? | integral(rhs, "|")?)),
            BitwiseXor => Ok(Value::Int(integral(lhs, "^")? ^ integral(rhs, "^")?)),
            BitwiseAnd => Ok(Value::Int(integral(lhs, "&")? & integral(rhs, "&")?)),
            LeftShift => shift(lhs, rhs, "<<", i64::checked_shl),
            RightShift => shift(lhs, rhs, ">>", i64::checked_shr),
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Numeric view of an operand
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

fn numeric(value: &Value, op: &str) -> std::result::Result<Number, OperationError> {
    match value {
        Value::Null => Ok(Number::Int(0)),
        Value::Int(n) => Ok(Number::Int(*n)),
        Value::Float(f) => Ok(Number::Float(*f)),
        other => Err(OperationError::new(format!(
            "Operator '{}' cannot be applied to a {} value",
            op,
            other.type_name()
        ))),
    }
}

fn integral(value: &Value, op: &str) -> std::result::Result<i64, OperationError> {
    match numeric(value, op)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        Number::Float(f) => Err(OperationError::new(format!(
            "Operator '{}' requires integer operands but got {}",
            op, f
        ))),
    }
}

fn add(lhs: &Value, rhs: &Value) -> OpResult {
    if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
        let mut text = lhs.to_output_string();
        text.push_str(&rhs.to_output_string());
        return Ok(Value::String(text));
    }
    arithmetic(lhs, rhs, "+", i64::checked_add, |a, b| a + b)
}

fn arithmetic(
    lhs: &Value,
    rhs: &Value,
    op: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> OpResult {
    let (a, b) = (numeric(lhs, op)?, numeric(rhs, op)?);
    Ok(match (a, b) {
        (Number::Int(x), Number::Int(y)) => int_op(x, y)
            .map(Value::Int)
            .unwrap_or_else(|| Value::Float(float_op(x as f64, y as f64))),
        _ => Value::Float(float_op(a.as_f64(), b.as_f64())),
    })
}

fn divide(
    lhs: &Value,
    rhs: &Value,
    op: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> OpResult {
    if let (Number::Int(_), Number::Int(0)) = (numeric(lhs, op)?, numeric(rhs, op)?) {
        return Err(OperationError::new("Attempted to divide by zero"));
    }
    arithmetic(lhs, rhs, op, int_op, float_op)
}

fn shift(lhs: &Value, rhs: &Value, op: &str, shift_op: fn(i64, u32) -> Option<i64>) -> OpResult {
    let value = integral(lhs, op)?;
    let amount = integral(rhs, op)?;
    u32::try_from(amount)
        .ok()
        .and_then(|amount| shift_op(value, amount))
        .map(Value::Int)
        .ok_or_else(|| OperationError::new(format!("Shift amount {} is out of range", amount)))
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Equality with primitive coercion; `===` shares these semantics
pub fn loose_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            lhs.as_f64() == rhs.as_f64()
        }
        (Value::Int(_) | Value::Float(_), Value::String(s)) => match parse_number(s) {
            Some(n) => lhs.as_f64() == Some(n),
            None => lhs.to_output_string() == *s,
        },
        (Value::String(_), Value::Int(_) | Value::Float(_)) => loose_equals(rhs, lhs),
        (Value::Bool(b), Value::Int(_) | Value::Float(_)) => {
            Some(if *b { 1.0_f64 } else { 0.0 }) == rhs.as_f64()
        }
        (Value::Int(_) | Value::Float(_), Value::Bool(_)) => loose_equals(rhs, lhs),
        (Value::Bool(_), Value::String(_)) | (Value::String(_), Value::Bool(_)) => {
            lhs.to_output_string() == rhs.to_output_string()
        }
        _ => lhs == rhs,
    }
}

/// Ordering with the same coercions as [`loose_equals`]; `None` when unordered
pub fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            lhs.as_f64()?.partial_cmp(&rhs.as_f64()?)
        }
        (Value::Int(_) | Value::Float(_), Value::String(s)) => match parse_number(s) {
            Some(n) => lhs.as_f64()?.partial_cmp(&n),
            None => Some(lhs.to_output_string().as_str().cmp(s.as_str())),
        },
        (Value::String(_), Value::Int(_) | Value::Float(_)) => {
            compare(rhs, lhs).map(Ordering::reverse)
        }
        (Value::Bool(b), Value::Int(_) | Value::Float(_)) => {
            (if *b { 1.0_f64 } else { 0.0 }).partial_cmp(&rhs.as_f64()?)
        }
        (Value::Int(_) | Value::Float(_), Value::Bool(_)) => {
            compare(rhs, lhs).map(Ordering::reverse)
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
