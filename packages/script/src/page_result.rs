//! Page rendering
//!
//! Writes a parsed page's fragments to any `fmt::Write`, evaluating variable
//! fragments and their filter chains and dispatching block fragments.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::context::{ScriptContext, SharpPage};
use crate::error::{Result, ScriptError};
use crate::evaluator::{evaluate, evaluate_filter, Scope, ScopeContext, Value};
use crate::expression_parser::Expression;
use crate::template_parser::{BlockFragment, PageFragment, VariableFragment};

pub struct PageResult<'c> {
    context: &'c ScriptContext,
    page: Arc<SharpPage>,
    args: IndexMap<String, Value>,
    cancellation: Option<Arc<AtomicBool>>,
}

impl<'c> PageResult<'c> {
    pub fn new(context: &'c ScriptContext, page: Arc<SharpPage>) -> Self {
        PageResult {
            context,
            page,
            args: IndexMap::new(),
            cancellation: None,
        }
    }

    /// Arguments visible to the page, shadowing the context's globals
    pub fn with_args(mut self, args: IndexMap<String, Value>) -> Self {
        self.args.extend(args);
        self
    }

    /// Abort with [`ScriptError::Cancelled`] once `flag` is set, checked before each fragment
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn context(&self) -> &'c ScriptContext {
        self.context
    }

    pub fn page(&self) -> &SharpPage {
        &self.page
    }

    pub fn render_to_string(&self) -> Result<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn write_to(&self, out: &mut dyn fmt::Write) -> Result<()> {
        let scope = ScopeContext::new(self.context).with_vars(self.args.clone());
        self.write_fragments(&self.page.fragments, &scope, out)
            .map_err(|e| e.in_template(&self.page.name))
    }

    pub fn write_fragments(
        &self,
        fragments: &[PageFragment],
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()> {
        for fragment in fragments {
            self.check_cancelled()?;
            match fragment {
                PageFragment::String(text) => {
                    trace!(len = text.value.len(), "write text fragment");
                    out.write_str(&text.value)?;
                }
                PageFragment::Variable(variable) => {
                    trace!(fragment = %variable.original_text, "write variable fragment");
                    self.write_variable(variable, scope, out)?;
                }
                PageFragment::Block(block) => {
                    trace!(block = %block.name, "write block fragment");
                    self.write_block(block, scope, out)?;
                }
            }
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ScriptError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Evaluate the expression then run the pipe chain left to right
    pub fn evaluate_variable(&self, fragment: &VariableFragment, scope: &dyn Scope) -> Result<Value> {
        let mut value = evaluate(&fragment.expression, scope)?;
        for filter in &fragment.filters {
            value = evaluate_filter(filter, value, &fragment.expression, scope)?;
        }
        Ok(value)
    }

    fn write_variable(
        &self,
        fragment: &VariableFragment,
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()> {
        let value = match self.evaluate_variable(fragment, scope) {
            Ok(value) => value,
            Err(error) => self.handle_exception(error)?,
        };

        if value.is_null() {
            if let Some(binding) = fragment.binding() {
                debug!(binding, "unhandled expression");
                if let Some(hook) = self.context.unhandled_expression_hook() {
                    if let Some(text) = hook(fragment) {
                        out.write_str(&text)?;
                    }
                }
            }
            return Ok(());
        }
        self.write_value(&value, out)
    }

    /// Write a value encoded per the configured output format
    pub fn write_value(&self, value: &Value, out: &mut dyn fmt::Write) -> Result<()> {
        let text = value.to_output_string();
        if value.is_raw() {
            out.write_str(&text)?;
        } else {
            out.write_str(&self.context.config().format.encode(&text))?;
        }
        Ok(())
    }

    fn handle_exception(&self, error: ScriptError) -> Result<Value> {
        if matches!(error, ScriptError::Syntax { .. } | ScriptError::Cancelled) {
            return Err(error);
        }
        match self.context.exception_hook().and_then(|hook| hook(&error)) {
            Some(value) => {
                warn!(%error, "expression error handled");
                Ok(value)
            }
            None => Err(error),
        }
    }

    fn write_block(
        &self,
        block: &BlockFragment,
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()> {
        let handler = self.context.blocks().get(&block.name).ok_or_else(|| {
            ScriptError::binding(
                format!("Block '{}' was not found", block.name),
                format!("{{{{#{} {}}}}}", block.name, block.argument),
            )
        })?;
        handler.write(block, self, scope, out)
    }

    /// Evaluate a block argument as an expression
    pub fn evaluate_argument(&self, source: &str, scope: &dyn Scope) -> Result<Value> {
        let expr: Arc<Expression> = self.context.parse_expression(source)?;
        match expr.evaluate(scope) {
            Ok(value) => Ok(value),
            Err(error) => self.handle_exception(error),
        }
    }
}
