/**
 * Expression Parser Tests
 *
 * Test suite for precedence climbing, member chains, literals and
 * parse diagnostics
 */

#[cfg(test)]
mod tests {
    use sharp_script::expression_parser::ast::*;
    use sharp_script::expression_parser::{BinaryOperator, ParseFlags, Parser, UnaryOperator};
    use sharp_script::{parse_expression, ScriptError};

    fn parse(text: &str) -> Expression {
        parse_expression(text).unwrap_or_else(|e| panic!("parsing '{}' failed: {}", text, e))
    }

    fn int(n: i64) -> Expression {
        Expression::literal(LiteralValue::Int(n))
    }

    fn id(name: &str) -> Expression {
        Expression::identifier(name)
    }

    /// Parse and check the printed form, which defaults to the input
    fn check_expression(exp: &str, expected: Option<&str>) {
        let expected_str = expected.unwrap_or(exp);
        let unparsed = parse(exp).to_source();
        assert_eq!(
            unparsed, expected_str,
            "Expression '{}' printed as '{}', expected '{}'",
            exp, unparsed, expected_str
        );
    }

    fn expect_syntax_error(text: &str, message: &str) -> String {
        match parse_expression(text) {
            Err(ScriptError::Syntax { message: actual, near }) => {
                assert!(
                    actual.contains(message),
                    "Expected '{}' to contain '{}'",
                    actual,
                    message
                );
                near
            }
            other => panic!("expected a syntax error for '{}', got {:?}", text, other),
        }
    }

    mod precedence {
        use super::*;

        #[test]
        fn should_bind_multiplication_tighter_than_addition() {
            assert_eq!(
                parse("1 + 2 * 3"),
                Expression::binary(
                    int(1),
                    BinaryOperator::Add,
                    Expression::binary(int(2), BinaryOperator::Multiply, int(3))
                )
            );
        }

        #[test]
        fn should_respect_parentheses() {
            assert_eq!(
                parse("(1 + 2) * 3"),
                Expression::binary(
                    Expression::binary(int(1), BinaryOperator::Add, int(2)),
                    BinaryOperator::Multiply,
                    int(3)
                )
            );
        }

        #[test]
        fn should_associate_to_the_left() {
            assert_eq!(
                parse("a - b - c"),
                Expression::binary(
                    Expression::binary(id("a"), BinaryOperator::Subtract, id("b")),
                    BinaryOperator::Subtract,
                    id("c")
                )
            );
        }

        #[test]
        fn should_order_the_full_operator_ladder() {
            check_expression("a || b && c | d ^ e & f == g < h << i + j * k", None);
            assert_eq!(
                parse("a || b && c").precedence(),
                BinaryOperator::Or.precedence()
            );
            assert_eq!(
                parse("a << b + c").precedence(),
                BinaryOperator::LeftShift.precedence()
            );
            assert_eq!(
                parse("a & b == c").precedence(),
                BinaryOperator::BitwiseAnd.precedence()
            );
        }

        #[test]
        fn should_build_logical_nodes_for_and_or() {
            assert!(matches!(parse("a && b"), Expression::Logical(_)));
            assert!(matches!(parse("a or b"), Expression::Logical(_)));
            assert!(matches!(parse("a | b"), Expression::Binary(_)));
        }

        #[test]
        fn should_normalize_assignment_to_equality() {
            assert_eq!(
                parse("a = 1"),
                Expression::binary(id("a"), BinaryOperator::Equals, int(1))
            );
            check_expression("a = 1", Some("a == 1"));
        }

        #[test]
        fn should_bind_unary_tighter_than_binary() {
            assert_eq!(
                parse("!a == b"),
                Expression::binary(
                    Expression::unary(UnaryOperator::Not, id("a")),
                    BinaryOperator::Equals,
                    id("b")
                )
            );
            assert_eq!(
                parse("-a.b"),
                Expression::unary(UnaryOperator::Minus, Expression::member(id("a"), "b"))
            );
            check_expression("- - 1", Some("--1"));
            check_expression("~x + !y", None);
        }
    }

    mod primaries {
        use super::*;

        #[test]
        fn should_parse_literals() {
            assert_eq!(parse("null"), Expression::literal(LiteralValue::Null));
            assert_eq!(parse("true"), Expression::literal(LiteralValue::Bool(true)));
            assert_eq!(parse("1.5"), Expression::literal(LiteralValue::Float(1.5)));
            assert_eq!(parse("'a'"), Expression::string("a"));
        }

        #[test]
        fn should_parse_member_chains() {
            assert_eq!(
                parse("a.b[0].c"),
                Expression::member(Expression::index(Expression::member(id("a"), "b"), int(0)), "c")
            );
            check_expression("a['b'].c", Some("a[\"b\"].c"));
        }

        #[test]
        fn should_allow_keywords_as_member_names() {
            assert_eq!(parse("a.null"), Expression::member(id("a"), "null"));
        }

        #[test]
        fn should_parse_filter_calls_with_member_access() {
            assert_eq!(
                parse("add(1, 2).x"),
                Expression::member(Expression::call("add", vec![int(1), int(2)]), "x")
            );
            check_expression("now()", None);
        }

        #[test]
        fn should_allow_trailing_commas() {
            assert_eq!(parse("f(1, 2,)"), parse("f(1, 2)"));
            assert_eq!(parse("[1, 2,]"), parse("[1, 2]"));
            assert_eq!(parse("{a: 1,}"), parse("{a: 1}"));
        }

        #[test]
        fn should_parse_array_literals() {
            check_expression("[1, 'x', [2], []]", Some("[1, \"x\", [2], []]"));
        }

        #[test]
        fn should_parse_object_literals_with_shorthand() {
            let expr = parse("{a, b: 2, 'c d': 3, 4: x}");
            match &expr {
                Expression::Object(obj) => {
                    let keys: Vec<String> = obj.properties.iter().map(|p| p.key.key_name()).collect();
                    assert_eq!(keys, vec!["a", "b", "c d", "4"]);
                    assert!(obj.properties[0].shorthand);
                    assert_eq!(obj.properties[0].value, id("a"));
                    assert!(!obj.properties[1].shorthand);
                }
                other => panic!("expected an object, got {:?}", other),
            }
            check_expression("{a, b: 2, 'c d': 3}", Some("{a, b: 2, \"c d\": 3}"));
        }

        #[test]
        fn should_parse_nested_parentheses() {
            check_expression("((a))", Some("a"));
            check_expression("-(a + b)", None);
        }
    }

    mod partial_parsing {
        use super::*;

        #[test]
        fn should_return_the_unparsed_remainder() {
            let (expr, rest) = Parser::new().parse_leading("a.b | upper }}").unwrap();
            assert_eq!(expr.to_source(), "a.b | upper");
            assert_eq!(rest, " }}");
        }

        #[test]
        fn should_stop_at_a_pipe_in_filter_context() {
            let source = "{{ a || b | upper }}";
            let (expr, end) = Parser::new()
                .parse_partial(source, 2, ParseFlags::FILTER_EXPRESSION)
                .unwrap();
            assert_eq!(expr.to_source(), "a || b");
            assert_eq!(&source[end..], " | upper }}");
        }

        #[test]
        fn should_parse_filters_with_and_without_arguments() {
            let source = "x | add(1) | upper";
            let (call, end) = Parser::new().parse_filter(source, 3).unwrap();
            assert_eq!(call.callee.name, "add");
            assert_eq!(call.arguments, vec![int(1)]);
            let (call, _) = Parser::new().parse_filter(source, end + 2).unwrap();
            assert_eq!(call.callee.name, "upper");
            assert!(call.arguments.is_empty());
        }

        #[test]
        fn should_reject_non_filter_pipes() {
            assert!(Parser::new().parse_filter("x | 1", 3).is_err());
            assert!(Parser::new().parse_filter("x | a.b", 3).is_err());
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unterminated_calls() {
            let near = expect_syntax_error("foo(", "Unterminated call expression");
            assert_eq!(near, "foo(");
        }

        #[test]
        fn should_report_unterminated_groups() {
            expect_syntax_error("(1 + 2", "Unterminated parenthesized expression");
            expect_syntax_error("[1, 2", "Unterminated array literal");
            expect_syntax_error("{a: 1", "Unterminated object literal");
            expect_syntax_error("a[1", "Unterminated index expression");
        }

        #[test]
        fn should_report_mismatched_closers() {
            expect_syntax_error("(1 + 2]", "Expected ')' to close parenthesized expression");
            expect_syntax_error("f(1 2)", "Expected ')' to close call expression but found '2'");
        }

        #[test]
        fn should_reject_invoking_members() {
            expect_syntax_error("a.b(1)", "only filters can be invoked");
            expect_syntax_error("f(1).g()", "only filters can be invoked");
        }

        #[test]
        fn should_reject_trailing_tokens() {
            expect_syntax_error("a b", "Unexpected token 'b'");
        }

        #[test]
        fn should_reject_missing_operands() {
            expect_syntax_error("1 +", "Unexpected end of expression");
            expect_syntax_error("* 2", "Unexpected token '*'");
            expect_syntax_error("a.", "expected member name");
            expect_syntax_error("a.1", "Expected member name but found '1'");
        }

        #[test]
        fn should_reject_malformed_object_keys() {
            expect_syntax_error("{[a]: 1}", "Expected property name");
            expect_syntax_error("{'a'}", "Expected ':' after property key");
        }

        #[test]
        fn should_bound_the_source_excerpt() {
            let long = format!("f({}", "a, ".repeat(40));
            let err = Parser::new().with_max_excerpt_length(10).parse_expression(&long);
            match err {
                Err(ScriptError::Syntax { near, .. }) => assert_eq!(near, "f(a, a, a,..."),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }
}
