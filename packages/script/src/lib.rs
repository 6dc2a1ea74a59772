#![deny(clippy::all)]

/**
 * Sharp Script
 *
 * Embedded expression language and `{{ }}` template engine: lexer,
 * precedence-climbing parser, page-fragment scanner and tree-walking
 * evaluator with a registration-time filter table.
 */

// Core modules
pub mod chars;
pub mod config;
pub mod error;
pub mod parse_util;

// Parser modules
pub mod expression_parser;
pub mod template_parser;

// Evaluation modules
pub mod blocks;
pub mod cache;
pub mod context;
pub mod evaluator;
pub mod filters;
pub mod page_result;

// Re-exports
pub use config::{OutputFormat, ScriptConfig};
pub use context::{ScriptContext, SharpPage};
pub use error::{Result, ScriptError};
pub use evaluator::{HostObject, Scope, ScopeContext, Value};
pub use expression_parser::{Expression, Parser};
pub use filters::{Filter, FilterRegistry, FilterResult};
pub use page_result::PageResult;
pub use template_parser::{parse_page, PageFragment};

/// Parse a standalone expression
pub fn parse_expression(source: &str) -> Result<Expression> {
    Parser::new().parse_expression(source)
}
