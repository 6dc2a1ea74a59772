/**
 * Expression Parser Module
 *
 * Lexer, operators, AST, parser and serializer for script expressions
 */
pub mod ast;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenType};
pub use operators::{BinaryOperator, UnaryOperator};
pub use parser::{ParseFlags, Parser};
pub use serializer::serialize;
