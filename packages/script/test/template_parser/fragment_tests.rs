/**
 * Page Fragment Tests
 *
 * Test suite for splitting templates into text, expression and block fragments
 */

#[cfg(test)]
mod tests {
    use sharp_script::expression_parser::ast::*;
    use sharp_script::template_parser::{BlockFragment, VariableFragment};
    use sharp_script::{parse_page, PageFragment, ScriptConfig, ScriptError};

    fn parse(source: &str) -> Vec<PageFragment> {
        parse_page(source, &ScriptConfig::default())
            .unwrap_or_else(|e| panic!("parsing '{}' failed: {}", source, e))
    }

    fn parse_error(source: &str) -> String {
        match parse_page(source, &ScriptConfig::default()) {
            Err(e @ ScriptError::Syntax { .. }) => e.to_string(),
            other => panic!("expected a syntax error for '{}', got {:?}", source, other),
        }
    }

    fn texts(fragments: &[PageFragment]) -> Vec<&str> {
        fragments.iter().filter_map(|f| f.as_text()).collect()
    }

    fn variable(fragment: &PageFragment) -> &VariableFragment {
        match fragment {
            PageFragment::Variable(v) => v,
            other => panic!("expected a variable fragment, got {:?}", other),
        }
    }

    fn block(fragment: &PageFragment) -> &BlockFragment {
        match fragment {
            PageFragment::Block(b) => b,
            other => panic!("expected a block fragment, got {:?}", other),
        }
    }

    mod text_and_variables {
        use super::*;

        #[test]
        fn should_keep_plain_text_as_one_fragment() {
            assert_eq!(parse("no islands here"), vec![PageFragment::text("no islands here")]);
            assert!(parse("").is_empty());
        }

        #[test]
        fn should_split_text_around_variables() {
            let fragments = parse("Hello {{ name }}!");
            assert_eq!(fragments.len(), 3);
            assert_eq!(fragments[0].as_text(), Some("Hello "));
            let name = variable(&fragments[1]);
            assert_eq!(name.expression, Expression::identifier("name"));
            assert_eq!(name.original_text, "{{ name }}");
            assert_eq!(name.binding(), Some("name"));
            assert_eq!(fragments[2].as_text(), Some("!"));
        }

        #[test]
        fn should_parse_filter_chains_in_order() {
            let fragments = parse("{{ 5 | add(3) | incr }}");
            let fragment = variable(&fragments[0]);
            assert_eq!(fragment.expression, Expression::literal(LiteralValue::Int(5)));
            let names: Vec<&str> = fragment.filters.iter().map(|f| f.callee.name.as_str()).collect();
            assert_eq!(names, vec!["add", "incr"]);
            assert_eq!(fragment.filters[0].arguments, vec![Expression::literal(LiteralValue::Int(3))]);
            assert_eq!(fragment.binding(), None);
            assert_eq!(fragment.last_filter_name(), Some("incr"));
        }

        #[test]
        fn should_not_split_on_logical_or() {
            let fragments = parse("{{ a || b | upper }}");
            let fragment = variable(&fragments[0]);
            assert!(matches!(fragment.expression, Expression::Logical(_)));
            assert_eq!(fragment.filters.len(), 1);
        }

        #[test]
        fn should_allow_objects_next_to_the_closing_delimiter() {
            let fragments = parse("{{ {a: 1}}}");
            assert!(matches!(variable(&fragments[0]).expression, Expression::Object(_)));
        }

        #[test]
        fn should_capture_whitespace_arguments() {
            let fragments = parse("{{ 'x' | append: and {more} }}");
            let filter = &variable(&fragments[0]).filters[0];
            assert_eq!(filter.callee.name, "append");
            assert_eq!(filter.arguments, vec![Expression::string("and {{more}}")]);
        }

        #[test]
        fn should_end_whitespace_arguments_at_the_line_end() {
            let fragments = parse("{{ greet: World\n}}tail");
            let fragment = variable(&fragments[0]);
            assert_eq!(
                fragment.expression,
                Expression::call("greet", vec![Expression::string("World")])
            );
            assert_eq!(texts(&fragments), vec!["tail"]);
        }

        #[test]
        fn should_swallow_the_new_line_after_configured_filters() {
            let fragments = parse("{{ x | end }}\nnext");
            assert_eq!(texts(&fragments), vec!["next"]);
            let fragments = parse("{{ x | end }}\r\nnext");
            assert_eq!(texts(&fragments), vec!["next"]);
            let fragments = parse("{{ x | upper }}\nnext");
            assert_eq!(texts(&fragments), vec!["\nnext"]);
        }

        #[test]
        fn should_swallow_the_new_line_after_bare_filter_names() {
            let fragments = parse("{{ end }}\nA");
            assert_eq!(fragments.len(), 2);
            assert_eq!(variable(&fragments[0]).expression, Expression::identifier("end"));
            assert_eq!(texts(&fragments), vec!["A"]);
            let fragments = parse("{{ end() }}\nA");
            assert_eq!(texts(&fragments), vec!["A"]);
            let fragments = parse("{{ name }}\nA");
            assert_eq!(texts(&fragments), vec!["\nA"]);
        }

        #[test]
        fn should_use_the_configured_filter_names() {
            let mut config = ScriptConfig::default();
            config.remove_new_line_after_filters_named.insert("assign".to_string());
            let fragments = parse_page("{{ x | assign }}\nnext", &config).unwrap();
            assert_eq!(texts(&fragments), vec!["next"]);
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn should_drop_comments() {
            let fragments = parse("A{{* ignored *}}B");
            assert_eq!(texts(&fragments), vec!["A", "B"]);
            assert_eq!(fragments.len(), 2);
        }

        #[test]
        fn should_not_parse_comment_bodies() {
            let fragments = parse("A{{* {{ foo( }} *}}B");
            assert_eq!(texts(&fragments), vec!["A", "B"]);
        }

        #[test]
        fn should_report_unterminated_comments() {
            assert!(parse_error("A{{* open").contains("Unterminated comment"));
        }
    }

    mod blocks {
        use super::*;

        #[test]
        fn should_parse_a_block_with_else_sections() {
            let fragments = parse("{{#if a}}\nyes\n{{else if b}}\nmaybe\n{{else}}\nno\n{{/if}}\nafter");
            assert_eq!(fragments.len(), 2);
            let fragment = block(&fragments[0]);
            assert_eq!(fragment.name, "if");
            assert_eq!(fragment.argument, "a");
            assert_eq!(fragment.body, vec![PageFragment::text("yes\n")]);
            assert_eq!(fragment.else_blocks.len(), 2);
            assert_eq!(fragment.else_blocks[0].argument, "if b");
            assert_eq!(fragment.else_blocks[0].body, vec![PageFragment::text("maybe\n")]);
            assert_eq!(fragment.else_blocks[1].argument, "");
            assert_eq!(fragment.else_blocks[1].body, vec![PageFragment::text("no\n")]);
            assert_eq!(fragments[1].as_text(), Some("after"));
        }

        #[test]
        fn should_parse_nested_blocks() {
            let fragments = parse("{{#each items}}[{{#if it}}x{{else}}y{{/if}}]{{/each}}");
            let outer = block(&fragments[0]);
            assert_eq!(outer.name, "each");
            assert!(outer.else_blocks.is_empty());
            assert_eq!(outer.body.len(), 3);
            let inner = block(&outer.body[1]);
            assert_eq!(inner.name, "if");
            assert_eq!(inner.else_blocks.len(), 1);
            assert_eq!(
                outer.original_text,
                "{{#each items}}[{{#if it}}x{{else}}y{{/if}}]{{/each}}"
            );
        }

        #[test]
        fn should_keep_verbatim_blocks_unparsed() {
            let fragments = parse("{{#raw}}{{ not parsed( }}{{#if}}{{/raw}}");
            let fragment = block(&fragments[0]);
            assert_eq!(fragment.name, "raw");
            assert_eq!(fragment.body, vec![PageFragment::text("{{ not parsed( }}{{#if}}")]);
        }

        #[test]
        fn should_skip_comments_inside_blocks() {
            let fragments = parse("{{#if a}}{{* {{/if}} *}}x{{/if}}");
            assert_eq!(texts(&block(&fragments[0]).body), vec!["x"]);
        }

        #[test]
        fn should_report_mismatched_closing_tags() {
            let message = parse_error("{{#if a}}x{{/each}}");
            assert!(message.contains("Expected '{{/if}}' but found '{{/each}}'"), "{}", message);
        }

        #[test]
        fn should_report_unterminated_blocks() {
            let message = parse_error("{{#if a}}x");
            assert!(message.contains("Unterminated block 'if'"), "{}", message);
        }

        #[test]
        fn should_reject_stray_block_tags() {
            assert!(parse_error("x{{/if}}").contains("Unexpected block tag outside of a block"));
            assert!(parse_error("x{{else}}").contains("Unexpected block tag outside of a block"));
        }

        #[test]
        fn should_treat_else_prefixed_names_as_variables() {
            let fragments = parse("{{ elsewhere }}");
            assert_eq!(variable(&fragments[0]).binding(), Some("elsewhere"));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unterminated_calls_with_location() {
            match parse_page("line1\n{{ foo(", &ScriptConfig::default()) {
                Err(ScriptError::Syntax { message, near }) => {
                    assert!(message.contains("Unterminated call expression"), "{}", message);
                    assert!(message.ends_with("at 2:4"), "{}", message);
                    assert_eq!(near, "foo(");
                }
                other => panic!("unexpected result {:?}", other),
            }
        }

        #[test]
        fn should_report_unterminated_islands() {
            assert!(parse_error("{{ a").contains("Unterminated expression, missing '}}'"));
        }

        #[test]
        fn should_report_unexpected_tokens_inside_islands() {
            let message = parse_error("{{ a b }}");
            assert!(message.contains("Expected '}}' but found 'b'"), "{}", message);
        }

        #[test]
        fn should_respect_the_excerpt_limit() {
            let config = ScriptConfig {
                max_excerpt_length: 5,
                ..ScriptConfig::default()
            };
            match parse_page("{{ foo(1, 2, 3", &config) {
                Err(ScriptError::Syntax { near, .. }) => assert_eq!(near, "foo(1..."),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }
}
