/**
 * Lexer Tests
 *
 * Test suite for the on-demand expression lexer
 */

#[cfg(test)]
mod tests {
    use sharp_script::expression_parser::lexer::{Lexer, NumberValue, Token, TokenType};
    use sharp_script::ScriptError;

    fn lex(text: &str) -> Vec<Token> {
        Lexer::new(text)
            .tokenize()
            .unwrap_or_else(|e| panic!("lexing '{}' failed: {}", text, e))
    }

    fn lex_error(text: &str) -> String {
        match Lexer::new(text).tokenize() {
            Ok(tokens) => panic!("expected '{}' to fail but got {:?}", text, tokens),
            Err(e) => e.to_string(),
        }
    }

    fn expect_token(token: &Token, index: usize, end: usize) {
        assert_eq!(token.index, index, "Token index mismatch");
        assert_eq!(token.end, end, "Token end mismatch");
    }

    fn expect_identifier_token(token: &Token, index: usize, end: usize, name: &str) {
        expect_token(token, index, end);
        assert!(token.is_identifier(), "Expected identifier token, got {:?}", token);
        assert_eq!(token.str_value, name);
    }

    fn expect_operator_token(token: &Token, index: usize, end: usize, operator: &str) {
        expect_token(token, index, end);
        assert!(
            token.is_operator(operator),
            "Expected operator token '{}', got {:?}",
            operator,
            token
        );
    }

    fn expect_string_token(token: &Token, index: usize, end: usize, value: &str) {
        expect_token(token, index, end);
        assert!(token.is_string(), "Expected string token, got {:?}", token);
        assert_eq!(token.str_value, value);
    }

    mod identifiers {
        use super::*;

        #[test]
        fn should_tokenize_a_simple_identifier() {
            let tokens = lex("j");
            assert_eq!(tokens.len(), 1);
            expect_identifier_token(&tokens[0], 0, 1, "j");
        }

        #[test]
        fn should_tokenize_identifiers_with_digits_and_underscores() {
            let tokens = lex("_a1 b_2");
            expect_identifier_token(&tokens[0], 0, 3, "_a1");
            expect_identifier_token(&tokens[1], 4, 7, "b_2");
        }

        #[test]
        fn should_tokenize_a_dotted_identifier() {
            let tokens = lex("j.k");
            assert_eq!(tokens.len(), 3);
            expect_identifier_token(&tokens[0], 0, 1, "j");
            assert!(tokens[1].is_character('.'));
            expect_identifier_token(&tokens[2], 2, 3, "k");
        }

        #[test]
        fn should_map_keywords() {
            let tokens = lex("true false null");
            assert!(tokens.iter().all(|t| t.is_keyword()));
            assert_eq!(tokens[2].str_value, "null");
        }

        #[test]
        fn should_map_and_or_to_logical_operators() {
            let tokens = lex("a and b or c");
            expect_operator_token(&tokens[1], 2, 5, "&&");
            expect_operator_token(&tokens[3], 8, 10, "||");
        }

        #[test]
        fn should_not_treat_identifiers_starting_with_keywords_as_keywords() {
            let tokens = lex("nullable android");
            assert!(tokens[0].is_identifier());
            assert!(tokens[1].is_identifier());
        }
    }

    mod strings {
        use super::*;

        #[test]
        fn should_tokenize_all_quote_styles() {
            expect_string_token(&lex("'a'")[0], 0, 3, "a");
            expect_string_token(&lex("\"a\"")[0], 0, 3, "a");
            expect_string_token(&lex("`a`")[0], 0, 3, "a");
            expect_string_token(&lex("′a′")[0], 0, "′a′".len(), "a");
        }

        #[test]
        fn should_unescape_only_the_active_quote() {
            expect_string_token(&lex(r#"'it\'s'"#)[0], 0, 7, "it's");
            expect_string_token(&lex(r#""a\'b""#)[0], 0, 6, r"a\'b");
            expect_string_token(&lex(r#"'a\nb'"#)[0], 0, 6, r"a\nb");
        }

        #[test]
        fn should_allow_other_quotes_inside_a_string() {
            expect_string_token(&lex(r#"'say "hi"'"#)[0], 0, 10, "say \"hi\"");
        }

        #[test]
        fn should_report_an_unterminated_string() {
            let message = lex_error("'abc");
            assert!(message.contains("Unterminated quote"), "{}", message);
            assert!(message.contains("'abc"), "{}", message);
        }
    }

    mod numbers {
        use super::*;

        #[test]
        fn should_tokenize_integers() {
            let tokens = lex("88");
            assert!(tokens[0].is_number());
            assert_eq!(tokens[0].number, Some(NumberValue::Int(88)));
        }

        #[test]
        fn should_tokenize_floats_and_exponents() {
            assert_eq!(lex("0.5")[0].number, Some(NumberValue::Float(0.5)));
            assert_eq!(lex("1e3")[0].number, Some(NumberValue::Float(1000.0)));
            assert_eq!(lex("2.5E-1")[0].number, Some(NumberValue::Float(0.25)));
            assert_eq!(lex("1e+2")[0].number, Some(NumberValue::Float(100.0)));
        }

        #[test]
        fn should_promote_oversized_integers_to_floats() {
            assert!(matches!(
                lex("99999999999999999999")[0].number,
                Some(NumberValue::Float(_))
            ));
        }

        #[test]
        fn should_reject_an_incomplete_exponent() {
            assert!(lex_error("1e").contains("Invalid exponent"));
            assert!(lex_error("1e+").contains("Invalid exponent"));
        }
    }

    mod operators {
        use super::*;

        #[test]
        fn should_prefer_the_longest_operator() {
            let tokens = lex("a === b !== c == d != e <= f >= g << h >> i");
            let ops: Vec<&str> = tokens
                .iter()
                .filter(|t| t.token_type == TokenType::Operator)
                .map(|t| t.str_value.as_str())
                .collect();
            assert_eq!(ops, vec!["===", "!==", "==", "!=", "<=", ">=", "<<", ">>"]);
        }

        #[test]
        fn should_tokenize_single_character_operators() {
            let tokens = lex("+ - * / % & | ^ ! ~ < > =");
            let ops: Vec<&str> = tokens.iter().map(|t| t.str_value.as_str()).collect();
            assert_eq!(
                ops,
                vec!["+", "-", "*", "/", "%", "&", "|", "^", "!", "~", "<", ">", "="]
            );
            assert!(tokens.iter().all(|t| t.is_any_operator()));
        }

        #[test]
        fn should_split_pipe_from_logical_or() {
            let tokens = lex("a || b | c");
            expect_operator_token(&tokens[1], 2, 4, "||");
            expect_operator_token(&tokens[3], 7, 8, "|");
        }
    }

    mod whitespace_and_errors {
        use super::*;

        #[test]
        fn should_skip_all_whitespace_kinds() {
            let tokens = lex(" \t\r\n\u{00A0}a\u{0085}");
            assert_eq!(tokens.len(), 1);
            assert!(tokens[0].is_identifier());
        }

        #[test]
        fn should_reject_unknown_characters() {
            let message = lex_error("a ? b");
            assert!(message.contains("Unexpected character [?]"), "{}", message);
        }

        #[test]
        fn should_report_line_and_column() {
            match Lexer::new("a\n  #").tokenize() {
                Err(ScriptError::Syntax { message, near }) => {
                    assert!(message.ends_with("at 2:3"), "{}", message);
                    assert_eq!(near, "#");
                }
                other => panic!("unexpected result {:?}", other),
            }
        }
    }
}
