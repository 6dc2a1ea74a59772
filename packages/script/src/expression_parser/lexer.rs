/**
 * Expression Lexer
 *
 * Scans one token at a time from a byte offset. Tokens are produced on
 * demand so that the page scanner can stop at `}}` and the parser can read
 * raw text for whitespace arguments.
 */
use serde::Serialize;

use crate::chars;
use crate::error::{Result, ScriptError};
use crate::parse_util::{syntax_error, DEFAULT_MAX_EXCERPT_LENGTH};

/// Token types in script expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum TokenType {
    Character = 0,
    Identifier = 1,
    Keyword = 2,
    String = 3,
    Operator = 4,
    Number = 5,
}

/// Numeric literal value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

/// Token representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    /// Identifier name, unescaped string contents, keyword, operator symbol or character
    pub str_value: String,
    pub number: Option<NumberValue>,
}

impl Token {
    pub fn new(index: usize, end: usize, token_type: TokenType, str_value: String) -> Self {
        Token {
            index,
            end,
            token_type,
            str_value,
            number: None,
        }
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_any_operator(&self) -> bool {
        self.token_type == TokenType::Operator
    }
}

const KEYWORDS: &[&str] = &["null", "true", "false"];

/// Operators checked longest first
const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", ">=", "<=", "||", "&&", "<<", ">>", ">", "<", "=", "!", "+", "-",
    "*", "/", "%", "&", "|", "^", "~",
];

const CHARACTERS: &[char] = &[
    chars::LPAREN,
    chars::RPAREN,
    chars::LBRACKET,
    chars::RBRACKET,
    chars::LBRACE,
    chars::RBRACE,
    chars::COMMA,
    chars::PERIOD,
    chars::COLON,
];

/// On-demand scanner over an expression source
#[derive(Debug, Clone, Copy)]
pub struct Lexer<'a> {
    input: &'a str,
    max_excerpt_length: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            max_excerpt_length: DEFAULT_MAX_EXCERPT_LENGTH,
        }
    }

    pub fn with_max_excerpt_length(mut self, max: usize) -> Self {
        self.max_excerpt_length = max;
        self
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    fn char_at(&self, index: usize) -> char {
        self.input
            .get(index..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(chars::EOF)
    }

    /// Offset of the first non-whitespace character at or after `index`
    pub fn skip_whitespace(&self, mut index: usize) -> usize {
        loop {
            let ch = self.char_at(index);
            if index >= self.input.len() || !chars::is_whitespace(ch) {
                return index;
            }
            index += ch.len_utf8();
        }
    }

    /// Scan the token starting at the first significant character after `index`
    pub fn scan_token(&self, index: usize) -> Result<Option<Token>> {
        let start = self.skip_whitespace(index);
        if start >= self.input.len() {
            return Ok(None);
        }

        let ch = self.char_at(start);
        let token = if chars::is_quote(ch) {
            self.scan_string(start, ch)?
        } else if chars::is_digit(ch) {
            self.scan_number(start)?
        } else if chars::is_identifier_start(ch) {
            self.scan_identifier(start)
        } else if chars::is_operator_start(ch) {
            self.scan_operator(start)
        } else if CHARACTERS.contains(&ch) {
            Token::new(start, start + ch.len_utf8(), TokenType::Character, ch.to_string())
        } else {
            return Err(self.error(start, &format!("Unexpected character [{}]", ch)));
        };
        Ok(Some(token))
    }

    /// Scan every token of the input
    pub fn tokenize(&self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut index = 0;
        while let Some(token) = self.scan_token(index)? {
            index = token.end;
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn scan_identifier(&self, start: usize) -> Token {
        let end = self.input[start..]
            .find(|c: char| !chars::is_identifier_part(c))
            .map_or(self.input.len(), |offset| start + offset);
        let text = &self.input[start..end];
        match text {
            "and" => Token::new(start, end, TokenType::Operator, "&&".to_string()),
            "or" => Token::new(start, end, TokenType::Operator, "||".to_string()),
            _ if KEYWORDS.contains(&text) => {
                Token::new(start, end, TokenType::Keyword, text.to_string())
            }
            _ => Token::new(start, end, TokenType::Identifier, text.to_string()),
        }
    }

    fn scan_operator(&self, start: usize) -> Token {
        let rest = &self.input[start..];
        // every operator-start character is itself a single-char operator
        let op = OPERATORS
            .iter()
            .find(|op| rest.starts_with(*op))
            .copied()
            .unwrap_or(&rest[..1]);
        Token::new(start, start + op.len(), TokenType::Operator, op.to_string())
    }

    fn scan_number(&self, start: usize) -> Result<Token> {
        let bytes = self.input.as_bytes();
        let mut index = start;
        let mut simple = true;

        while index < bytes.len() && chars::is_digit(bytes[index] as char) {
            index += 1;
        }
        if index + 1 < bytes.len()
            && bytes[index] as char == chars::PERIOD
            && chars::is_digit(bytes[index + 1] as char)
        {
            simple = false;
            index += 1;
            while index < bytes.len() && chars::is_digit(bytes[index] as char) {
                index += 1;
            }
        }
        if index < bytes.len() && matches!(bytes[index], b'e' | b'E') {
            simple = false;
            index += 1;
            if index < bytes.len() && matches!(bytes[index], b'+' | b'-') {
                index += 1;
            }
            let digits_start = index;
            while index < bytes.len() && chars::is_digit(bytes[index] as char) {
                index += 1;
            }
            if digits_start == index {
                return Err(self.error(start, "Invalid exponent"));
            }
        }

        let text = &self.input[start..index];
        let number = match text.parse::<i64>() {
            Ok(n) if simple => NumberValue::Int(n),
            _ => NumberValue::Float(
                text.parse::<f64>()
                    .map_err(|_| self.error(start, "Invalid number"))?,
            ),
        };
        let mut token = Token::new(start, index, TokenType::Number, text.to_string());
        token.number = Some(number);
        Ok(token)
    }

    fn scan_string(&self, start: usize, quote: char) -> Result<Token> {
        let body_start = start + quote.len_utf8();
        let mut buffer = String::new();
        let mut iter = self.input[body_start..].char_indices().peekable();

        while let Some((offset, ch)) = iter.next() {
            if ch == chars::BACKSLASH {
                // only an escaped quote is unescaped; other backslashes are kept
                if let Some(&(_, next)) = iter.peek() {
                    if next == quote {
                        buffer.push(quote);
                        iter.next();
                        continue;
                    }
                }
                buffer.push(ch);
            } else if ch == quote {
                let end = body_start + offset + quote.len_utf8();
                return Ok(Token::new(start, end, TokenType::String, buffer));
            } else {
                buffer.push(ch);
            }
        }

        Err(self.error(start, "Unterminated quote"))
    }

    pub fn error(&self, index: usize, message: &str) -> ScriptError {
        syntax_error(self.input, index, self.max_excerpt_length, message)
    }
}
