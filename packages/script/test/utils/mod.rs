/**
 * Test Utilities
 *
 * Helpers shared by the script integration tests
 */

use indexmap::IndexMap;
use sharp_script::{ScriptContext, ScriptError, Value};

/// Parse a JSON object into template arguments
pub fn args(json: &str) -> IndexMap<String, Value> {
    let parsed: serde_json::Value = serde_json::from_str(json).expect("test arguments must be valid JSON");
    match Value::from(parsed) {
        Value::Map(map) => map,
        other => panic!("test arguments must be a JSON object, got {:?}", other),
    }
}

pub fn eval_with(context: &ScriptContext, expr: &str, json: &str) -> Value {
    context
        .evaluate(expr, args(json))
        .unwrap_or_else(|e| panic!("evaluating '{}' failed: {}", expr, e))
}

pub fn eval(expr: &str, json: &str) -> Value {
    eval_with(&ScriptContext::new(), expr, json)
}

pub fn eval_err(expr: &str, json: &str) -> ScriptError {
    match ScriptContext::new().evaluate(expr, args(json)) {
        Ok(value) => panic!("expected '{}' to fail but got {:?}", expr, value),
        Err(e) => e,
    }
}

pub fn render_with(context: &ScriptContext, template: &str, json: &str) -> String {
    context
        .render("test", template, args(json))
        .unwrap_or_else(|e| panic!("rendering '{}' failed: {}", template, e))
}

pub fn render(template: &str, json: &str) -> String {
    render_with(&ScriptContext::new(), template, json)
}

pub fn render_err_with(context: &ScriptContext, template: &str, json: &str) -> ScriptError {
    match context.render("test", template, args(json)) {
        Ok(output) => panic!("expected '{}' to fail but rendered {:?}", template, output),
        Err(e) => e,
    }
}
