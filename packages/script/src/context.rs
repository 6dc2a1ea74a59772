//! Script context
//!
//! Host-owned engine state: configuration, filters, blocks, global arguments,
//! error hooks and the parsed-page and expression caches. A context is
//! `Send + Sync` and is meant to be shared across render threads via `Arc`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::blocks::{BlockHandler, BlockRegistry};
use crate::cache::ComputeCache;
use crate::config::ScriptConfig;
use crate::error::{Result, ScriptError};
use crate::evaluator::{Scope, ScopeContext, Value};
use crate::expression_parser::{Expression, Parser};
use crate::filters::{Filter, FilterRegistry};
use crate::page_result::PageResult;
use crate::template_parser::{PageFragment, PageParser, VariableFragment};

pub type UnhandledExpressionHook = Arc<dyn Fn(&VariableFragment) -> Option<String> + Send + Sync>;
pub type ExceptionHook = Arc<dyn Fn(&ScriptError) -> Option<Value> + Send + Sync>;

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct SharpPage {
    pub name: String,
    pub fragments: Vec<PageFragment>,
}

pub struct ScriptContext {
    config: ScriptConfig,
    filters: FilterRegistry,
    blocks: BlockRegistry,
    args: IndexMap<String, Value>,
    on_unhandled_expression: Option<UnhandledExpressionHook>,
    on_expression_exception: Option<ExceptionHook>,
    pages: ComputeCache<(String, String), Arc<SharpPage>>,
    expressions: ComputeCache<String, Arc<Expression>>,
}

impl Default for ScriptContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptContext {
    /// Context with the default filters and blocks
    pub fn new() -> Self {
        ScriptContext {
            config: ScriptConfig::default(),
            filters: FilterRegistry::with_defaults(),
            blocks: BlockRegistry::with_defaults(),
            args: IndexMap::new(),
            on_unhandled_expression: None,
            on_expression_exception: None,
            pages: ComputeCache::new(),
            expressions: ComputeCache::new(),
        }
    }

    /// Context with no filters registered
    pub fn empty() -> Self {
        ScriptContext {
            filters: FilterRegistry::new(),
            ..Self::new()
        }
    }

    pub fn with_config(mut self, config: ScriptConfig) -> Self {
        self.config = config;
        self.clear_caches();
        self
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_filter<F>(mut self, name: &str, arity: usize, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filters.register(name, arity, filter);
        self
    }

    pub fn with_block<B>(mut self, name: &str, block: B) -> Self
    where
        B: BlockHandler + 'static,
    {
        self.blocks.register(name, block);
        self
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn with_args(mut self, args: IndexMap<String, Value>) -> Self {
        self.args.extend(args);
        self
    }

    /// Decide what a null bare identifier renders as; `None` renders nothing
    pub fn with_unhandled_expression<F>(mut self, hook: F) -> Self
    where
        F: Fn(&VariableFragment) -> Option<String> + Send + Sync + 'static,
    {
        self.on_unhandled_expression = Some(Arc::new(hook));
        self
    }

    /// Intercept evaluation errors; `Some(value)` renders the value instead of failing
    pub fn with_exception_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ScriptError) -> Option<Value> + Send + Sync + 'static,
    {
        self.on_expression_exception = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn args(&self) -> &IndexMap<String, Value> {
        &self.args
    }

    pub(crate) fn unhandled_expression_hook(&self) -> Option<&UnhandledExpressionHook> {
        self.on_unhandled_expression.as_ref()
    }

    pub(crate) fn exception_hook(&self) -> Option<&ExceptionHook> {
        self.on_expression_exception.as_ref()
    }

    /// Filter lookup honouring `excludeFiltersNamed`
    pub fn resolve_filter(&self, name: &str, arity: usize) -> Option<Arc<dyn Filter>> {
        if self.config.exclude_filters_named.contains(name) {
            return None;
        }
        self.filters.resolve(name, arity)
    }

    pub fn scope(&self) -> ScopeContext<'_> {
        ScopeContext::new(self)
    }

    /// Parse a template, reusing the cached page for the same name and source
    pub fn parse_page(&self, name: &str, source: &str) -> Result<Arc<SharpPage>> {
        let key = (name.to_string(), source.to_string());
        if let Some(page) = self.pages.get(&key) {
            debug!(template = name, "page cache hit");
            return Ok(page);
        }
        self.pages
            .get_or_try_insert_with(&key, || -> Result<Arc<SharpPage>> {
                debug!(template = name, "page cache miss, parsing");
                let fragments = PageParser::new(&self.config).parse(source)?;
                Ok(Arc::new(SharpPage {
                    name: name.to_string(),
                    fragments,
                }))
            })
            .map_err(|e| e.in_template(name))
    }

    /// Parse a standalone expression, cached by source text
    pub fn parse_expression(&self, source: &str) -> Result<Arc<Expression>> {
        let key = source.to_string();
        if let Some(expr) = self.expressions.get(&key) {
            return Ok(expr);
        }
        self.expressions.get_or_try_insert_with(&key, || {
            debug!(expression = source, "expression cache miss, parsing");
            Parser::new()
                .with_max_excerpt_length(self.config.max_excerpt_length)
                .parse_expression(source)
                .map(Arc::new)
        })
    }

    pub fn evaluate_expression(&self, source: &str, scope: &dyn Scope) -> Result<Value> {
        self.parse_expression(source)?.evaluate(scope)
    }

    /// Evaluate an expression against the global arguments plus `args`
    pub fn evaluate(&self, source: &str, args: IndexMap<String, Value>) -> Result<Value> {
        let scope = self.scope().with_vars(args);
        self.evaluate_expression(source, &scope)
    }

    /// Parse (cached) and render a template
    pub fn render(&self, name: &str, source: &str, args: IndexMap<String, Value>) -> Result<String> {
        let page = self.parse_page(name, source)?;
        PageResult::new(self, page)
            .with_args(args)
            .render_to_string()
    }

    pub fn clear_caches(&self) {
        self.pages.clear();
        self.expressions.clear();
    }

    pub fn cached_pages(&self) -> usize {
        self.pages.len()
    }
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("config", &self.config)
            .field("filters", &self.filters)
            .field("blocks", &self.blocks)
            .field("args", &self.args)
            .field("pages", &self.pages)
            .field("expressions", &self.expressions)
            .finish()
    }
}
