/**
 * Page Fragments
 *
 * A parsed page is an ordered list of fragments: literal text, `{{ }}`
 * expression islands and `{{#block}}` statements.
 */
use serde::Serialize;

use crate::expression_parser::ast::{CallExpression, Expression};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PageFragment {
    String(StringFragment),
    Variable(VariableFragment),
    Block(BlockFragment),
}

/// Literal text emitted verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringFragment {
    pub value: String,
}

/// `{{ expression | filter1 | filter2 }}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableFragment {
    /// Source of the whole island including delimiters
    pub original_text: String,
    pub expression: Expression,
    /// Pipe chain in evaluation order
    pub filters: Vec<CallExpression>,
}

impl VariableFragment {
    /// Name of a bare identifier expression without filters
    pub fn binding(&self) -> Option<&str> {
        match &self.expression {
            Expression::Identifier(id) if self.filters.is_empty() => Some(&id.name),
            _ => None,
        }
    }

    pub fn last_filter_name(&self) -> Option<&str> {
        self.filters.last().map(|f| f.callee.name.as_str())
    }
}

/// `{{#name argument}} body {{else argument}} body {{/name}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockFragment {
    pub original_text: String,
    pub name: String,
    /// Raw text after the block name
    pub argument: String,
    pub body: Vec<PageFragment>,
    pub else_blocks: Vec<ElseBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseBlock {
    /// Raw text after `else`, empty for a plain `{{else}}`
    pub argument: String,
    pub body: Vec<PageFragment>,
}

impl PageFragment {
    pub fn text(value: impl Into<String>) -> Self {
        PageFragment::String(StringFragment {
            value: value.into(),
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PageFragment::String(s) => Some(&s.value),
            _ => None,
        }
    }

    pub fn original_text(&self) -> &str {
        match self {
            PageFragment::String(s) => &s.value,
            PageFragment::Variable(v) => &v.original_text,
            PageFragment::Block(b) => &b.original_text,
        }
    }
}
