/**
 * Expression Serializer
 *
 * Prints an expression tree back to source text. Parentheses are emitted only
 * where precedence requires them, so printing is idempotent under re-parsing.
 */
use super::ast::*;

/// Serialize an expression to source text
pub fn serialize(expr: &Expression) -> String {
    let mut visitor = SerializeExpressionVisitor;
    visit_expression(&mut visitor, expr)
}

struct SerializeExpressionVisitor;

fn visit_expression(visitor: &mut SerializeExpressionVisitor, expr: &Expression) -> String {
    match expr {
        Expression::Literal(l) => visitor.visit_literal(&l.value),
        Expression::Identifier(i) => i.name.clone(),
        Expression::Member(m) => visitor.visit_member(m),
        Expression::Call(c) => visitor.visit_call(c),
        Expression::Array(a) => visitor.visit_array(a),
        Expression::Object(o) => visitor.visit_object(o),
        Expression::Unary(u) => visitor.visit_unary(u),
        Expression::Binary(b) => visitor.visit_binary(&b.left, b.operator.token(), b.operator.precedence(), &b.right),
        Expression::Logical(l) => visitor.visit_binary(&l.left, l.operator.token(), l.operator.precedence(), &l.right),
    }
}

impl SerializeExpressionVisitor {
    fn visit_literal(&mut self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Bool(b) => b.to_string(),
            // the lexer reads `9223372036854775808` as a float
            LiteralValue::Int(i64::MIN) => format!("-{} - 1", i64::MAX),
            LiteralValue::Int(n) => n.to_string(),
            LiteralValue::Float(f) => format_float(*f),
            LiteralValue::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        }
    }

    fn visit_member(&mut self, ast: &MemberExpression) -> String {
        let object = visit_expression(self, &ast.object);
        if ast.computed {
            format!("{}[{}]", object, visit_expression(self, &ast.property))
        } else {
            format!("{}.{}", object, visit_expression(self, &ast.property))
        }
    }

    fn visit_call(&mut self, ast: &CallExpression) -> String {
        format!("{}({})", ast.callee.name, self.visit_list(&ast.arguments))
    }

    fn visit_array(&mut self, ast: &ArrayExpression) -> String {
        format!("[{}]", self.visit_list(&ast.elements))
    }

    fn visit_object(&mut self, ast: &ObjectExpression) -> String {
        let properties = ast
            .properties
            .iter()
            .map(|p| {
                if p.shorthand {
                    p.key.key_name()
                } else {
                    let key = match &p.key {
                        PropertyKey::Identifier(id) => id.name.clone(),
                        PropertyKey::Literal(lit) => self.visit_literal(&lit.value),
                    };
                    format!("{}: {}", key, visit_expression(self, &p.value))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", properties)
    }

    fn visit_unary(&mut self, ast: &UnaryExpression) -> String {
        let argument = visit_expression(self, &ast.argument);
        if ast.argument.precedence() < UNARY_PRECEDENCE {
            format!("{}({})", ast.operator, argument)
        } else {
            format!("{}{}", ast.operator, argument)
        }
    }

    fn visit_binary(
        &mut self,
        left: &Expression,
        operator: &str,
        precedence: u8,
        right: &Expression,
    ) -> String {
        let mut left_text = visit_expression(self, left);
        if left.precedence() < precedence {
            left_text = format!("({})", left_text);
        }
        // operators are left-associative, so an equal-precedence right operand needs grouping
        let mut right_text = visit_expression(self, right);
        if right.precedence() <= precedence {
            right_text = format!("({})", right_text);
        }
        format!("{} {} {}", left_text, operator, right_text)
    }

    fn visit_list(&mut self, items: &[Expression]) -> String {
        items
            .iter()
            .map(|e| visit_expression(self, e))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Floats always print with a fractional part or exponent so they re-parse as floats.
/// Non-finite values print as divisions; see [`Expression::precedence`].
fn format_float(f: f64) -> String {
    if f.is_finite() {
        format!("{:?}", f)
    } else if f.is_nan() {
        "0.0 / 0.0".to_string()
    } else if f > 0.0 {
        "1.0 / 0.0".to_string()
    } else {
        "-1.0 / 0.0".to_string()
    }
}

impl Expression {
    /// Source text of this expression
    pub fn to_source(&self) -> String {
        serialize(self)
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&serialize(self))
    }
}
