//! Rendering commands
//!
//! Renders many templates in parallel over one shared context and evaluates
//! standalone expressions

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rayon::prelude::*;
use sharp_script::{ScriptContext, Value};
use tracing::{debug, info};

/// Output of one template, or the error that stopped it
#[derive(Debug)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub result: Result<String>,
}

/// Render every file in parallel; outcomes are returned in input order
pub fn render_files(
    context: &ScriptContext,
    files: &[PathBuf],
    args: &IndexMap<String, Value>,
) -> Vec<RenderOutcome> {
    info!(files = files.len(), "rendering templates");
    files
        .par_iter()
        .map(|path| RenderOutcome {
            path: path.clone(),
            result: render_file(context, path, args),
        })
        .collect()
}

fn render_file(context: &ScriptContext, path: &Path, args: &IndexMap<String, Value>) -> Result<String> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path.display().to_string();
    debug!(template = %name, bytes = source.len(), "render");
    Ok(context.render(&name, &source, args.clone())?)
}

/// Evaluate one expression and encode the result as JSON
pub fn evaluate_to_json(
    context: &ScriptContext,
    expression: &str,
    args: IndexMap<String, Value>,
) -> Result<String> {
    let value = context
        .evaluate(expression, args)
        .with_context(|| format!("Failed to evaluate '{}'", expression))?;
    Ok(serde_json::to_string(&value)?)
}
