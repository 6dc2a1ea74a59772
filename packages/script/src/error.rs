//! Script errors
//!
//! One error type for the whole engine: parse failures, binding failures,
//! missing filters, host passthrough and cancellation.

use thiserror::Error;

/// Boxed error returned by host filters
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ScriptError {
    /// Lexical or parse error, always fatal
    #[error("Syntax error: {message} near '{near}'")]
    Syntax { message: String, near: String },

    /// Member not found, incompatible index target or operand types
    #[error("{message} in '{expression}'")]
    Binding { message: String, expression: String },

    #[error("Filter '{signature}' was not found{}", similar_hint(.similar))]
    MissingFilter {
        name: String,
        arity: usize,
        signature: String,
        similar: Vec<String>,
    },

    /// Error raised by a host filter
    #[error("Filter '{name}' failed: {source}")]
    FilterInvocation {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Error in template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: Box<ScriptError>,
    },

    #[error("Render cancelled")]
    Cancelled,

    #[error("Failed to write output")]
    Output(#[from] std::fmt::Error),
}

fn similar_hint(similar: &[String]) -> String {
    if similar.is_empty() {
        String::new()
    } else {
        format!(". Check for matching args in: {}", similar.join(", "))
    }
}

impl ScriptError {
    pub fn syntax(message: impl Into<String>, near: impl Into<String>) -> Self {
        ScriptError::Syntax {
            message: message.into(),
            near: near.into(),
        }
    }

    pub fn binding(message: impl Into<String>, expression: impl Into<String>) -> Self {
        ScriptError::Binding {
            message: message.into(),
            expression: expression.into(),
        }
    }

    /// Attach the template name unless the error already carries one
    pub fn in_template(self, template: &str) -> Self {
        match self {
            ScriptError::Template { .. } | ScriptError::Cancelled => self,
            other => ScriptError::Template {
                template: template.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through template wrappers
    pub fn root(&self) -> &ScriptError {
        match self {
            ScriptError::Template { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self.root(), ScriptError::Syntax { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;
