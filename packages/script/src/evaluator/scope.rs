//! Scopes
//!
//! The binding environment an expression is evaluated against

use std::sync::Arc;

use indexmap::IndexMap;

use super::value::Value;
use crate::context::ScriptContext;
use crate::filters::{Filter, FilterResult};

/// Variable lookup and filter resolution supplied by the host
pub trait Scope {
    fn get_variable(&self, name: &str) -> Option<Value>;

    fn resolve_filter(&self, name: &str, arity: usize) -> Option<Arc<dyn Filter>>;

    fn invoke(&self, filter: &dyn Filter, args: &[Value]) -> FilterResult {
        filter.invoke(args)
    }

    /// Signatures of filters sharing `name`, for diagnostics
    fn similar_filters(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Scope chain over a [`ScriptContext`]: local variables, then parent scopes,
/// then the context's global arguments
#[derive(Debug, Clone)]
pub struct ScopeContext<'a> {
    context: &'a ScriptContext,
    parent: Option<&'a ScopeContext<'a>>,
    vars: IndexMap<String, Value>,
}

impl<'a> ScopeContext<'a> {
    pub fn new(context: &'a ScriptContext) -> Self {
        ScopeContext {
            context,
            parent: None,
            vars: IndexMap::new(),
        }
    }

    pub fn with_vars(mut self, vars: IndexMap<String, Value>) -> Self {
        self.vars.extend(vars);
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Child scope whose bindings shadow this one and are dropped with it
    pub fn child(&self, vars: IndexMap<String, Value>) -> ScopeContext<'_> {
        ScopeContext {
            context: self.context,
            parent: Some(self),
            vars,
        }
    }

    pub fn context(&self) -> &'a ScriptContext {
        self.context
    }

    pub fn vars(&self) -> &IndexMap<String, Value> {
        &self.vars
    }
}

impl Scope for ScopeContext<'_> {
    fn get_variable(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        match self.parent {
            Some(parent) => parent.get_variable(name),
            None => self.context.args().get(name).cloned(),
        }
    }

    fn resolve_filter(&self, name: &str, arity: usize) -> Option<Arc<dyn Filter>> {
        self.context.resolve_filter(name, arity)
    }

    fn similar_filters(&self, name: &str) -> Vec<String> {
        self.context.filters().similar(name)
    }
}
