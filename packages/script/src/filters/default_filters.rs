//! Default filters
//!
//! Arithmetic, string, collection and control filters available to every
//! context created with defaults.

use super::{FilterRegistry, FilterResult};
use crate::evaluator::value::Value;
use crate::expression_parser::operators::{loose_equals, BinaryOperator};

pub struct DefaultFilters;

impl DefaultFilters {
    pub fn register(registry: &mut FilterRegistry) {
        registry
            // arithmetic
            .register("add", 2, add)
            .register("sub", 2, subtract)
            .register("subtract", 2, subtract)
            .register("mul", 2, multiply)
            .register("multiply", 2, multiply)
            .register("div", 2, divide)
            .register("divide", 2, divide)
            .register("mod", 2, modulo)
            .register("incr", 1, incr)
            .register("decr", 1, decr)
            // strings
            .register("upper", 1, upper)
            .register("lower", 1, lower)
            .register("trim", 1, trim)
            .register("append", 2, append)
            .register("prepend", 2, prepend)
            .register("substring", 2, substring)
            .register("substring", 3, substring)
            .register("replace", 3, replace)
            // collections
            .register("length", 1, length)
            .register("count", 1, length)
            .register("first", 1, first)
            .register("last", 1, last)
            .register("join", 1, join)
            .register("join", 2, join)
            .register("reverse", 1, reverse)
            .register("keys", 1, keys)
            .register("values", 1, values)
            .register("contains", 2, contains)
            // control
            .register("default", 2, default)
            .register("end", 0, end)
            .register("end", 1, end)
            .register("raw", 1, raw)
            .register("json", 1, json)
            .register("throw", 1, throw);
    }
}

fn binary(op: BinaryOperator, args: &[Value]) -> FilterResult {
    Ok(op.apply(&args[0], &args[1])?)
}

fn add(args: &[Value]) -> FilterResult {
    binary(BinaryOperator::Add, args)
}

fn subtract(args: &[Value]) -> FilterResult {
    binary(BinaryOperator::Subtract, args)
}

fn multiply(args: &[Value]) -> FilterResult {
    binary(BinaryOperator::Multiply, args)
}

fn divide(args: &[Value]) -> FilterResult {
    binary(BinaryOperator::Divide, args)
}

fn modulo(args: &[Value]) -> FilterResult {
    binary(BinaryOperator::Modulo, args)
}

fn incr(args: &[Value]) -> FilterResult {
    Ok(BinaryOperator::Add.apply(&args[0], &Value::Int(1))?)
}

fn decr(args: &[Value]) -> FilterResult {
    Ok(BinaryOperator::Subtract.apply(&args[0], &Value::Int(1))?)
}

fn upper(args: &[Value]) -> FilterResult {
    Ok(Value::String(args[0].to_output_string().to_uppercase()))
}

fn lower(args: &[Value]) -> FilterResult {
    Ok(Value::String(args[0].to_output_string().to_lowercase()))
}

fn trim(args: &[Value]) -> FilterResult {
    Ok(Value::String(args[0].to_output_string().trim().to_string()))
}

fn append(args: &[Value]) -> FilterResult {
    Ok(Value::String(format!("{}{}", args[0], args[1])))
}

fn prepend(args: &[Value]) -> FilterResult {
    Ok(Value::String(format!("{}{}", args[1], args[0])))
}

fn index_arg(value: &Value, filter: &str) -> Result<usize, String> {
    value
        .as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("{} expects a non-negative integer but got {}", filter, value.type_name()))
}

/// `substring(text, start[, length])`, counted in characters
fn substring(args: &[Value]) -> FilterResult {
    let text = args[0].to_output_string();
    let start = index_arg(&args[1], "substring")?;
    let chars = text.chars().skip(start);
    let result: String = match args.get(2) {
        Some(len) => chars.take(index_arg(len, "substring")?).collect(),
        None => chars.collect(),
    };
    Ok(Value::String(result))
}

fn replace(args: &[Value]) -> FilterResult {
    let text = args[0].to_output_string();
    let from = args[1].to_output_string();
    if from.is_empty() {
        return Ok(Value::String(text));
    }
    Ok(Value::String(text.replace(&from, &args[2].to_output_string())))
}

fn length(args: &[Value]) -> FilterResult {
    let len = match &args[0] {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => match other.items() {
            Some(items) => items.len(),
            None => return Err(format!("Cannot count a {} value", other.type_name()).into()),
        },
    };
    Ok(Value::from(len))
}

fn first(args: &[Value]) -> FilterResult {
    Ok(match &args[0] {
        Value::String(s) => s.chars().next().map(|c| Value::String(c.to_string())).into(),
        other => other.items().and_then(|items| items.into_iter().next()).into(),
    })
}

fn last(args: &[Value]) -> FilterResult {
    Ok(match &args[0] {
        Value::String(s) => s.chars().last().map(|c| Value::String(c.to_string())).into(),
        other => other.items().and_then(|items| items.into_iter().last()).into(),
    })
}

fn join(args: &[Value]) -> FilterResult {
    let separator = args.get(1).map_or_else(|| ",".to_string(), Value::to_output_string);
    let items = args[0]
        .items()
        .ok_or_else(|| format!("Cannot join a {} value", args[0].type_name()))?;
    Ok(Value::String(
        items
            .iter()
            .map(Value::to_output_string)
            .collect::<Vec<_>>()
            .join(&separator),
    ))
}

fn reverse(args: &[Value]) -> FilterResult {
    match &args[0] {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::Null => Ok(Value::Null),
        other => {
            let mut items = other
                .items()
                .ok_or_else(|| format!("Cannot reverse a {} value", other.type_name()))?;
            items.reverse();
            Ok(Value::List(items))
        }
    }
}

fn keys(args: &[Value]) -> FilterResult {
    match &args[0] {
        Value::Map(map) => Ok(Value::List(map.keys().map(|k| Value::from(k.as_str())).collect())),
        Value::Null => Ok(Value::List(Vec::new())),
        other => Err(format!("Cannot get keys of a {} value", other.type_name()).into()),
    }
}

fn values(args: &[Value]) -> FilterResult {
    match &args[0] {
        Value::Null => Ok(Value::List(Vec::new())),
        other => other
            .items()
            .map(Value::List)
            .ok_or_else(|| format!("Cannot get values of a {} value", other.type_name()).into()),
    }
}

fn contains(args: &[Value]) -> FilterResult {
    let found = match &args[0] {
        Value::Null => false,
        Value::String(s) => s.contains(&args[1].to_output_string()),
        Value::Map(map) => map.contains_key(&args[1].to_output_string()),
        other => match other.items() {
            Some(items) => items.iter().any(|item| loose_equals(item, &args[1])),
            None => return Err(format!("Cannot search a {} value", other.type_name()).into()),
        },
    };
    Ok(Value::Bool(found))
}

/// `default(value, fallback)`: fallback when value is null or empty
fn default(args: &[Value]) -> FilterResult {
    match &args[0] {
        Value::Null => Ok(args[1].clone()),
        Value::String(s) if s.is_empty() => Ok(args[1].clone()),
        other => Ok(other.clone()),
    }
}

fn end(_args: &[Value]) -> FilterResult {
    Ok(Value::Null)
}

fn raw(args: &[Value]) -> FilterResult {
    Ok(Value::raw(args[0].to_output_string()))
}

fn json(args: &[Value]) -> FilterResult {
    Ok(Value::raw(args[0].to_json()))
}

fn throw(args: &[Value]) -> FilterResult {
    Err(args[0].to_output_string().into())
}
