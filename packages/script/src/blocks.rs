//! Blocks
//!
//! Handlers for `{{#name}} ... {{/name}}` statements. Bindings introduced
//! by a block live in a child scope and are dropped when the block ends.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::chars;
use crate::error::{Result, ScriptError};
use crate::evaluator::{ScopeContext, Value};
use crate::page_result::PageResult;
use crate::template_parser::BlockFragment;

pub trait BlockHandler: Send + Sync {
    fn write(
        &self,
        block: &BlockFragment,
        page: &PageResult<'_>,
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct BlockRegistry {
    blocks: HashMap<String, Arc<dyn BlockHandler>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `if`, `each`, `with` and `raw`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register("if", IfBlock)
            .register("each", EachBlock)
            .register("with", WithBlock)
            .register("raw", RawBlock);
        registry
    }

    pub fn register<B>(&mut self, name: &str, block: B) -> &mut Self
    where
        B: BlockHandler + 'static,
    {
        self.blocks.insert(name.to_string(), Arc::new(block));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn BlockHandler>> {
        self.blocks.get(name).cloned()
    }
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.blocks.keys().collect();
        names.sort();
        f.debug_struct("BlockRegistry").field("blocks", &names).finish()
    }
}

/// `{{#if cond}} ... {{else if cond}} ... {{else}} ... {{/if}}`
pub struct IfBlock;

impl BlockHandler for IfBlock {
    fn write(
        &self,
        block: &BlockFragment,
        page: &PageResult<'_>,
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()> {
        if page.evaluate_argument(&block.argument, scope)?.is_truthy() {
            return page.write_fragments(&block.body, scope, out);
        }
        for else_block in &block.else_blocks {
            let condition = else_condition(&else_block.argument);
            if condition.is_empty() || page.evaluate_argument(condition, scope)?.is_truthy() {
                return page.write_fragments(&else_block.body, scope, out);
            }
        }
        Ok(())
    }
}

/// `if cond` or a bare condition after `else`
fn else_condition(argument: &str) -> &str {
    match argument.strip_prefix("if") {
        Some(rest) if rest.is_empty() || rest.starts_with(chars::is_whitespace) => rest.trim(),
        _ => argument.trim(),
    }
}

/// `{{#each items}}` binds `it`, `{{#each item in items}}` binds `item`; both bind `index`
pub struct EachBlock;

impl BlockHandler for EachBlock {
    fn write(
        &self,
        block: &BlockFragment,
        page: &PageResult<'_>,
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()> {
        let (binding, source) = each_binding(&block.argument);
        let items = match page.evaluate_argument(source, scope)? {
            Value::Null => Vec::new(),
            Value::Map(map) => map
                .into_iter()
                .map(|(key, value)| entry(key, value))
                .collect(),
            other => other.items().ok_or_else(|| {
                ScriptError::binding(
                    format!("Cannot iterate over a '{}' value", other.type_name()),
                    source,
                )
            })?,
        };

        if items.is_empty() {
            if let Some(else_block) = block.else_blocks.first() {
                page.write_fragments(&else_block.body, scope, out)?;
            }
            return Ok(());
        }

        for (index, item) in items.into_iter().enumerate() {
            let mut vars = IndexMap::with_capacity(2);
            vars.insert(binding.to_string(), item);
            vars.insert("index".to_string(), Value::from(index));
            page.write_fragments(&block.body, &scope.child(vars), out)?;
        }
        Ok(())
    }
}

fn each_binding(argument: &str) -> (&str, &str) {
    if let Some((name, source)) = argument.split_once(" in ") {
        let name = name.trim();
        let is_identifier = name.starts_with(chars::is_identifier_start)
            && name.chars().all(chars::is_identifier_part);
        if is_identifier {
            return (name, source.trim());
        }
    }
    ("it", argument)
}

fn entry(key: String, value: Value) -> Value {
    let mut map = IndexMap::with_capacity(2);
    map.insert("key".to_string(), Value::String(key));
    map.insert("value".to_string(), value);
    Value::Map(map)
}

/// `{{#with obj}}` exposes the keys of a map as variables
pub struct WithBlock;

impl BlockHandler for WithBlock {
    fn write(
        &self,
        block: &BlockFragment,
        page: &PageResult<'_>,
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()> {
        let value = page.evaluate_argument(&block.argument, scope)?;
        if !value.is_truthy() {
            if let Some(else_block) = block.else_blocks.first() {
                page.write_fragments(&else_block.body, scope, out)?;
            }
            return Ok(());
        }
        let vars = match value {
            Value::Map(map) => map,
            other => {
                let mut vars = IndexMap::with_capacity(1);
                vars.insert("it".to_string(), other);
                vars
            }
        };
        page.write_fragments(&block.body, &scope.child(vars), out)
    }
}

/// Body captured verbatim by the page parser
pub struct RawBlock;

impl BlockHandler for RawBlock {
    fn write(
        &self,
        block: &BlockFragment,
        page: &PageResult<'_>,
        scope: &ScopeContext<'_>,
        out: &mut dyn fmt::Write,
    ) -> Result<()> {
        page.write_fragments(&block.body, scope, out)
    }
}
