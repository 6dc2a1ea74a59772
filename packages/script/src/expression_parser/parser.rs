/**
 * Expression Parser
 *
 * Precedence-climbing parser over the on-demand lexer. Binary operators are
 * folded with an explicit operand/operator stack; member chains and calls
 * are parsed by recursive descent.
 */
use bitflags::bitflags;
use smallvec::SmallVec;

use super::ast::*;
use super::lexer::{Lexer, NumberValue, Token, TokenType};
use super::operators::{BinaryOperator, UnaryOperator};
use crate::chars;
use crate::error::{Result, ScriptError};
use crate::parse_util::DEFAULT_MAX_EXCERPT_LENGTH;

bitflags! {
    /// Parse flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParseFlags: u8 {
        /// A single `|` ends the expression instead of being bitwise-or
        const PIPE_TERMINATES = 1 << 0;
        /// `name: text` captures the rest of the line as one string argument
        const WHITESPACE_ARGUMENT = 1 << 1;
        /// Expression inside a `{{ }}` island
        const FILTER_EXPRESSION = Self::PIPE_TERMINATES.bits() | Self::WHITESPACE_ARGUMENT.bits();
    }
}

/// Parser for script expressions
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    max_excerpt_length: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            max_excerpt_length: DEFAULT_MAX_EXCERPT_LENGTH,
        }
    }

    pub fn with_max_excerpt_length(mut self, max: usize) -> Self {
        self.max_excerpt_length = max;
        self
    }

    fn lexer<'a>(&self, source: &'a str) -> Lexer<'a> {
        Lexer::new(source).with_max_excerpt_length(self.max_excerpt_length)
    }

    /// Parse a complete expression; trailing tokens are an error
    pub fn parse_expression(&self, source: &str) -> Result<Expression> {
        let (expr, end) = self.parse_partial(source, 0, ParseFlags::empty())?;
        let lexer = self.lexer(source);
        if let Some(token) = lexer.scan_token(end)? {
            return Err(lexer.error(
                token.index,
                &format!("Unexpected token '{}'", token.str_value),
            ));
        }
        Ok(expr)
    }

    /// Parse the leading expression and return it with the unparsed remainder
    pub fn parse_leading<'s>(&self, source: &'s str) -> Result<(Expression, &'s str)> {
        let (expr, end) = self.parse_partial(source, 0, ParseFlags::empty())?;
        Ok((expr, &source[end..]))
    }

    /// Parse one expression starting at `index`, returning the offset just past it
    pub fn parse_partial(
        &self,
        source: &str,
        index: usize,
        flags: ParseFlags,
    ) -> Result<(Expression, usize)> {
        let mut parse_ast = ParseAST::new(self.lexer(source), index);
        let expr = parse_ast.parse_expression(flags)?;
        Ok((expr, parse_ast.index))
    }

    /// Parse one filter of a pipe chain; a bare name is a call without arguments
    pub fn parse_filter(&self, source: &str, index: usize) -> Result<(CallExpression, usize)> {
        let mut parse_ast = ParseAST::new(self.lexer(source), index);
        let token = parse_ast.next_token("filter")?;
        if !token.is_identifier() {
            return Err(parse_ast.error(
                token.index,
                &format!("Expected filter name but found '{}'", token.str_value),
            ));
        }
        parse_ast.advance(&token);
        let start = token.index;
        match parse_ast.parse_identifier_chain(token, ParseFlags::FILTER_EXPRESSION)? {
            Expression::Identifier(callee) => Ok((
                CallExpression {
                    callee,
                    arguments: Vec::new(),
                },
                parse_ast.index,
            )),
            Expression::Call(call) => Ok((call, parse_ast.index)),
            _ => Err(parse_ast.error(start, "Filter chains may only contain filter calls")),
        }
    }
}

/// Parsing state over one source
struct ParseAST<'a> {
    lexer: Lexer<'a>,
    index: usize,
}

impl<'a> ParseAST<'a> {
    fn new(lexer: Lexer<'a>, index: usize) -> Self {
        ParseAST { lexer, index }
    }

    fn error(&self, index: usize, message: &str) -> ScriptError {
        self.lexer.error(index, message)
    }

    fn peek(&self) -> Result<Option<Token>> {
        self.lexer.scan_token(self.index)
    }

    /// Next token, failing at end of input
    fn next_token(&self, expected: &str) -> Result<Token> {
        self.peek()?.ok_or_else(|| {
            self.error(
                self.index,
                &format!("Unexpected end of expression, expected {}", expected),
            )
        })
    }

    fn advance(&mut self, token: &Token) {
        self.index = token.end;
    }

    fn consume_optional_character(&mut self, code: char) -> Result<bool> {
        match self.peek()? {
            Some(token) if token.is_character(code) => {
                self.advance(&token);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Consume `close`, reporting an unterminated construct that began at `start`
    fn expect_closing(&mut self, close: char, start: usize, what: &str) -> Result<()> {
        match self.peek()? {
            Some(token) if token.is_character(close) => {
                self.advance(&token);
                Ok(())
            }
            Some(token) => Err(self.error(
                token.index,
                &format!(
                    "Expected '{}' to close {} but found '{}'",
                    close, what, token.str_value
                ),
            )),
            None => Err(self.error(start, &format!("Unterminated {}", what))),
        }
    }

    fn parse_expression(&mut self, flags: ParseFlags) -> Result<Expression> {
        let mut operands: SmallVec<[Expression; 4]> = SmallVec::new();
        let mut operators: SmallVec<[BinaryOperator; 4]> = SmallVec::new();

        operands.push(self.parse_unary(flags)?);
        while let Some(op) = self.consume_binary_operator(flags)? {
            while operators
                .last()
                .is_some_and(|top| top.precedence() >= op.precedence())
            {
                Self::fold(&mut operands, &mut operators);
            }
            operators.push(op);
            operands.push(self.parse_unary(flags)?);
        }
        while !operators.is_empty() {
            Self::fold(&mut operands, &mut operators);
        }

        operands
            .pop()
            .ok_or_else(|| self.error(self.index, "Expected expression"))
    }

    fn fold(
        operands: &mut SmallVec<[Expression; 4]>,
        operators: &mut SmallVec<[BinaryOperator; 4]>,
    ) {
        if let (Some(op), Some(right), Some(left)) =
            (operators.pop(), operands.pop(), operands.pop())
        {
            operands.push(Expression::binary(left, op, right));
        }
    }

    fn consume_binary_operator(&mut self, flags: ParseFlags) -> Result<Option<BinaryOperator>> {
        let token = match self.peek()? {
            Some(token) if token.is_any_operator() => token,
            _ => return Ok(None),
        };
        if token.is_operator("|") && flags.contains(ParseFlags::PIPE_TERMINATES) {
            return Ok(None);
        }
        match BinaryOperator::from_token(&token.str_value) {
            Some(op) => {
                self.advance(&token);
                Ok(Some(op))
            }
            None => Err(self.error(
                token.index,
                &format!("Unexpected operator '{}'", token.str_value),
            )),
        }
    }

    fn parse_unary(&mut self, flags: ParseFlags) -> Result<Expression> {
        let token = self.next_token("expression")?;
        if token.is_any_operator() {
            if let Some(op) = UnaryOperator::from_token(&token.str_value) {
                self.advance(&token);
                let argument = self.parse_unary(flags)?;
                return Ok(Expression::unary(op, argument));
            }
        }
        self.parse_primary(token, flags)
    }

    fn parse_primary(&mut self, token: Token, flags: ParseFlags) -> Result<Expression> {
        match token.token_type {
            TokenType::Number => {
                self.advance(&token);
                Ok(Expression::literal(match token.number {
                    Some(NumberValue::Int(n)) => LiteralValue::Int(n),
                    Some(NumberValue::Float(f)) => LiteralValue::Float(f),
                    None => return Err(self.error(token.index, "Invalid number")),
                }))
            }
            TokenType::String => {
                self.advance(&token);
                Ok(Expression::string(token.str_value))
            }
            TokenType::Keyword => {
                self.advance(&token);
                Ok(Expression::literal(match token.str_value.as_str() {
                    "true" => LiteralValue::Bool(true),
                    "false" => LiteralValue::Bool(false),
                    _ => LiteralValue::Null,
                }))
            }
            TokenType::Identifier => {
                self.advance(&token);
                self.parse_identifier_chain(token, flags)
            }
            TokenType::Character if token.is_character(chars::LPAREN) => {
                self.advance(&token);
                let expr = self.parse_expression(ParseFlags::empty())?;
                self.expect_closing(chars::RPAREN, token.index, "parenthesized expression")?;
                Ok(expr)
            }
            TokenType::Character if token.is_character(chars::LBRACKET) => {
                self.advance(&token);
                let elements = self.parse_arguments(chars::RBRACKET, token.index, "array literal")?;
                Ok(Expression::Array(ArrayExpression { elements }))
            }
            TokenType::Character if token.is_character(chars::LBRACE) => {
                self.advance(&token);
                self.parse_object(token.index)
            }
            _ => Err(self.error(
                token.index,
                &format!("Unexpected token '{}'", token.str_value),
            )),
        }
    }

    /// `name`, `name(args)`, then any `.member` / `[index]` accessors.
    /// Only the head may be invoked.
    fn parse_identifier_chain(&mut self, token: Token, flags: ParseFlags) -> Result<Expression> {
        let start = token.index;
        let name = token.str_value;

        if flags.contains(ParseFlags::WHITESPACE_ARGUMENT) {
            if let Some(colon) = self.peek()? {
                if colon.is_character(chars::COLON) {
                    return Ok(self.parse_whitespace_argument(name, colon.end));
                }
            }
        }

        let mut expr = if self.consume_optional_character(chars::LPAREN)? {
            let arguments = self.parse_arguments(chars::RPAREN, start, "call expression")?;
            Expression::call(name, arguments)
        } else {
            Expression::identifier(name)
        };

        while let Some(token) = self.peek()? {
            if token.is_character(chars::PERIOD) {
                self.advance(&token);
                let member = self.next_token("member name")?;
                if !(member.is_identifier() || member.is_keyword()) {
                    return Err(self.error(
                        member.index,
                        &format!("Expected member name but found '{}'", member.str_value),
                    ));
                }
                self.advance(&member);
                expr = Expression::member(expr, member.str_value);
            } else if token.is_character(chars::LBRACKET) {
                self.advance(&token);
                let index = self.parse_expression(ParseFlags::empty())?;
                self.expect_closing(chars::RBRACKET, token.index, "index expression")?;
                expr = Expression::index(expr, index);
            } else if token.is_character(chars::LPAREN) {
                return Err(self.error(
                    start,
                    "Member expressions cannot be invoked, only filters can be invoked",
                ));
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// `name: text up to the end of line or }}`
    fn parse_whitespace_argument(&mut self, name: String, from: usize) -> Expression {
        let rest = &self.lexer.input()[from..];
        let end = [rest.find(chars::LF), rest.find("}}")]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(rest.len());
        let text = rest[..end].trim().replace('{', "{{").replace('}', "}}");
        self.index = from + end;
        Expression::call(name, vec![Expression::string(text)])
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed
    fn parse_arguments(&mut self, close: char, start: usize, what: &str) -> Result<Vec<Expression>> {
        let mut args = Vec::new();
        loop {
            match self.peek()? {
                None => return Err(self.error(start, &format!("Unterminated {}", what))),
                Some(token) if token.is_character(close) => {
                    self.advance(&token);
                    return Ok(args);
                }
                Some(_) => {}
            }
            args.push(self.parse_expression(ParseFlags::empty())?);
            if !self.consume_optional_character(chars::COMMA)? {
                self.expect_closing(close, start, what)?;
                return Ok(args);
            }
        }
    }

    fn parse_object(&mut self, start: usize) -> Result<Expression> {
        let mut properties = Vec::new();
        loop {
            let token = match self.peek()? {
                None => return Err(self.error(start, "Unterminated object literal")),
                Some(token) => token,
            };
            if token.is_character(chars::RBRACE) {
                self.advance(&token);
                break;
            }

            let key = match token.token_type {
                TokenType::Identifier => PropertyKey::Identifier(Identifier {
                    name: token.str_value.clone(),
                }),
                TokenType::String => PropertyKey::Literal(Literal {
                    value: LiteralValue::String(token.str_value.clone()),
                }),
                TokenType::Number => PropertyKey::Literal(Literal {
                    value: match token.number {
                        Some(NumberValue::Float(f)) => LiteralValue::Float(f),
                        Some(NumberValue::Int(n)) => LiteralValue::Int(n),
                        None => LiteralValue::String(token.str_value.clone()),
                    },
                }),
                _ => {
                    return Err(self.error(
                        token.index,
                        &format!("Expected property name but found '{}'", token.str_value),
                    ))
                }
            };
            self.advance(&token);

            let property = if self.consume_optional_character(chars::COLON)? {
                ObjectProperty {
                    key,
                    value: self.parse_expression(ParseFlags::empty())?,
                    shorthand: false,
                }
            } else if let PropertyKey::Identifier(id) = &key {
                let value = Expression::Identifier(id.clone());
                ObjectProperty {
                    key,
                    value,
                    shorthand: true,
                }
            } else {
                return Err(self.error(token.index, "Expected ':' after property key"));
            };
            properties.push(property);

            if !self.consume_optional_character(chars::COMMA)? {
                self.expect_closing(chars::RBRACE, start, "object literal")?;
                break;
            }
        }
        Ok(Expression::Object(ObjectExpression { properties }))
    }
}
