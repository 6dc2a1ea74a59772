//! Tree-walking interpreter
//!
//! Evaluates expressions against a [`Scope`]. Missing values propagate as
//! null; shape mismatches and unknown filters are errors.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use super::scope::Scope;
use super::value::Value;
use crate::error::{Result, ScriptError};
use crate::expression_parser::ast::*;
use crate::expression_parser::operators::BinaryOperator;

impl Expression {
    pub fn evaluate(&self, scope: &dyn Scope) -> Result<Value> {
        evaluate(self, scope)
    }
}

/// Evaluate an expression
pub fn evaluate(expr: &Expression, scope: &dyn Scope) -> Result<Value> {
    match expr {
        Expression::Literal(l) => Ok(Value::from(&l.value)),
        Expression::Identifier(id) => evaluate_identifier(&id.name, scope),
        Expression::Member(m) => evaluate_member(m, expr, scope),
        Expression::Call(c) => evaluate_call(c, expr, scope),
        Expression::Array(a) => Ok(Value::List(
            a.elements
                .iter()
                .map(|e| evaluate(e, scope))
                .collect::<Result<Vec<_>>>()?,
        )),
        Expression::Object(o) => {
            let mut map = IndexMap::with_capacity(o.properties.len());
            for property in &o.properties {
                map.insert(property.key.key_name(), evaluate(&property.value, scope)?);
            }
            Ok(Value::Map(map))
        }
        Expression::Unary(u) => {
            let operand = evaluate(&u.argument, scope)?;
            u.operator
                .apply(&operand)
                .map_err(|e| ScriptError::binding(e.message, expr.to_source()))
        }
        Expression::Binary(b) => {
            let left = evaluate(&b.left, scope)?;
            let right = evaluate(&b.right, scope)?;
            b.operator
                .apply(&left, &right)
                .map_err(|e| ScriptError::binding(e.message, expr.to_source()))
        }
        Expression::Logical(l) => {
            let left = evaluate(&l.left, scope)?.is_truthy();
            let result = match l.operator {
                BinaryOperator::Or if left => true,
                BinaryOperator::And if !left => false,
                _ => evaluate(&l.right, scope)?.is_truthy(),
            };
            Ok(Value::Bool(result))
        }
    }
}

/// Scope variable, else a zero-argument filter of the same name, else null
fn evaluate_identifier(name: &str, scope: &dyn Scope) -> Result<Value> {
    if let Some(value) = scope.get_variable(name) {
        return Ok(value);
    }
    match scope.resolve_filter(name, 0) {
        Some(filter) => scope
            .invoke(filter.as_ref(), &[])
            .map_err(|source| ScriptError::FilterInvocation {
                name: name.to_string(),
                source,
            }),
        None => Ok(Value::Null),
    }
}

fn evaluate_member(member: &MemberExpression, expr: &Expression, scope: &dyn Scope) -> Result<Value> {
    let target = evaluate(&member.object, scope)?;
    if target.is_null() {
        return Ok(Value::Null);
    }
    let result = if member.computed {
        let index = evaluate(&member.property, scope)?;
        index_value(&target, &index)
    } else {
        match member.property.as_ref() {
            Expression::Identifier(id) => member_value(&target, &id.name),
            _ => Err(format!("Invalid member '{}'", member.property)),
        }
    };
    result.map_err(|message| ScriptError::binding(message, expr.to_source()))
}

/// `target.name`
pub fn member_value(target: &Value, name: &str) -> std::result::Result<Value, String> {
    match target {
        Value::Null => Ok(Value::Null),
        Value::Map(map) => Ok(map.get(name).cloned().unwrap_or_default()),
        Value::String(s) if name == "length" => Ok(Value::from(s.chars().count())),
        Value::List(items) if name == "length" => Ok(Value::from(items.len())),
        Value::Object(host) => host
            .get_member(name)
            .or_else(|| host.get_index(&Value::from(name)))
            .ok_or_else(|| no_member(target, name)),
        _ => Err(no_member(target, name)),
    }
}

fn no_member(target: &Value, name: &str) -> String {
    format!("Member '{}' does not exist on type '{}'", name, target.type_name())
}

/// `target[index]`
pub fn index_value(target: &Value, index: &Value) -> std::result::Result<Value, String> {
    match (target, index) {
        (Value::Null, _) => Ok(Value::Null),
        (Value::Map(map), _) => Ok(map.get(&index.to_output_string()).cloned().unwrap_or_default()),
        (Value::List(items), Value::Int(_) | Value::Float(_)) => Ok(position(index)
            .and_then(|i| items.get(i).cloned())
            .unwrap_or_default()),
        (Value::String(s), Value::Int(_) | Value::Float(_)) => Ok(position(index)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or_default()),
        (Value::Object(host), _) => {
            if let Some(value) = host.get_index(index) {
                return Ok(value);
            }
            if let Value::String(name) = index {
                return member_value(target, name);
            }
            match (host.items(), position(index)) {
                (Some(items), Some(i)) => Ok(items.into_iter().nth(i).unwrap_or_default()),
                _ => Err(no_index(target, index)),
            }
        }
        (_, Value::String(name)) => member_value(target, name),
        _ => Err(no_index(target, index)),
    }
}

fn no_index(target: &Value, index: &Value) -> String {
    format!(
        "Cannot index a '{}' value with a '{}' index",
        target.type_name(),
        index.type_name()
    )
}

/// Non-negative integral index; negative or fractional indexes have no position
fn position(index: &Value) -> Option<usize> {
    index.as_i64().and_then(|i| usize::try_from(i).ok())
}

fn evaluate_call(call: &CallExpression, expr: &Expression, scope: &dyn Scope) -> Result<Value> {
    let args = call
        .arguments
        .iter()
        .map(|arg| evaluate(arg, scope))
        .collect::<Result<SmallVec<[Value; 4]>>>()?;
    invoke_filter(&call.callee.name, &args, scope, || expr.to_source())
}

/// Apply one filter of a pipe chain: `input` becomes the first argument
pub fn evaluate_filter(
    call: &CallExpression,
    input: Value,
    input_expr: &Expression,
    scope: &dyn Scope,
) -> Result<Value> {
    let mut args: SmallVec<[Value; 4]> = SmallVec::with_capacity(call.arguments.len() + 1);
    args.push(input);
    for arg in &call.arguments {
        args.push(evaluate(arg, scope)?);
    }
    invoke_filter(&call.callee.name, &args, scope, || {
        let sources: Vec<String> = std::iter::once(input_expr.to_source())
            .chain(call.arguments.iter().map(Expression::to_source))
            .collect();
        format!("{}({})", call.callee.name, sources.join(", "))
    })
}

fn invoke_filter(
    name: &str,
    args: &[Value],
    scope: &dyn Scope,
    signature: impl FnOnce() -> String,
) -> Result<Value> {
    let filter = match scope.resolve_filter(name, args.len()) {
        Some(filter) => filter,
        None => {
            debug!(filter = name, arity = args.len(), "filter not found");
            return Err(ScriptError::MissingFilter {
                name: name.to_string(),
                arity: args.len(),
                signature: signature(),
                similar: scope.similar_filters(name),
            });
        }
    };
    scope
        .invoke(filter.as_ref(), args)
        .map_err(|source| ScriptError::FilterInvocation {
            name: name.to_string(),
            source,
        })
}
