/**
 * Expression AST
 *
 * Immutable expression tree produced by the parser. Nodes evaluate against a
 * scope (see `evaluator`) and print back to source (see `serializer`).
 */
use serde::Serialize;

use super::operators::{BinaryOperator, UnaryOperator};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    Member(MemberExpression),
    Call(CallExpression),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
}

/// Primitive literal value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub name: String,
}

/// `object.property` or, when `computed`, `object[property]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    pub computed: bool,
}

/// Filter invocation; only named filters are callable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpression {
    pub callee: Identifier,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum PropertyKey {
    Identifier(Identifier),
    Literal(Literal),
}

impl PropertyKey {
    /// The map key this property produces
    pub fn key_name(&self) -> String {
        match self {
            PropertyKey::Identifier(id) => id.name.clone(),
            PropertyKey::Literal(lit) => match &lit.value {
                LiteralValue::Null => "null".to_string(),
                LiteralValue::Bool(b) => b.to_string(),
                LiteralValue::Int(n) => n.to_string(),
                LiteralValue::Float(f) => f.to_string(),
                LiteralValue::String(s) => s.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectProperty {
    pub key: PropertyKey,
    pub value: Expression,
    /// `{ name }` written for `{ name: name }`
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpression {
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
}

/// `&&` / `||`, evaluated with short-circuiting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalExpression {
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
}

/// Printing precedence of unary expressions, above every binary operator
pub const UNARY_PRECEDENCE: u8 = u8::MAX - 1;

// Constructors used by the parser and by hosts building trees by hand

impl Expression {
    pub fn literal(value: LiteralValue) -> Self {
        Expression::Literal(Literal { value })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::literal(LiteralValue::String(value.into()))
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(Identifier { name: name.into() })
    }

    pub fn member(object: Expression, name: impl Into<String>) -> Self {
        Expression::Member(MemberExpression {
            object: Box::new(object),
            property: Box::new(Expression::identifier(name)),
            computed: false,
        })
    }

    pub fn index(object: Expression, index: Expression) -> Self {
        Expression::Member(MemberExpression {
            object: Box::new(object),
            property: Box::new(index),
            computed: true,
        })
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Expression::Call(CallExpression {
            callee: Identifier { name: name.into() },
            arguments,
        })
    }

    pub fn unary(operator: UnaryOperator, argument: Expression) -> Self {
        Expression::Unary(UnaryExpression {
            operator,
            argument: Box::new(argument),
        })
    }

    /// Build a binary node; `=` becomes `==` and `&&`/`||` become logical nodes
    pub fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Self {
        let operator = match operator {
            BinaryOperator::Assign => BinaryOperator::Equals,
            other => other,
        };
        if operator.is_logical() {
            Expression::Logical(LogicalExpression {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            })
        } else {
            Expression::Binary(BinaryExpression {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            })
        }
    }

    /// Name of a bare identifier or filter call, if this is one
    pub fn name(&self) -> Option<&str> {
        match self {
            Expression::Identifier(id) => Some(&id.name),
            Expression::Call(call) => Some(&call.callee.name),
            _ => None,
        }
    }

    /// Precedence used when printing; atoms bind tightest.
    /// Literals that print as arithmetic take the precedence of that arithmetic.
    pub fn precedence(&self) -> u8 {
        match self {
            Expression::Literal(l) => match l.value {
                LiteralValue::Float(f) if !f.is_finite() => BinaryOperator::Divide.precedence(),
                LiteralValue::Int(i64::MIN) => BinaryOperator::Subtract.precedence(),
                _ => u8::MAX,
            },
            Expression::Binary(b) => b.operator.precedence(),
            Expression::Logical(l) => l.operator.precedence(),
            Expression::Unary(_) => UNARY_PRECEDENCE,
            _ => u8::MAX,
        }
    }
}
