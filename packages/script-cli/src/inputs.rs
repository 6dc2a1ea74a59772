//! Input loading
//!
//! Expands template globs and reads the JSON argument and config files

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use sharp_script::{ScriptConfig, Value};
use tracing::debug;

/// Expand each pattern in order, dropping duplicates. A pattern matching no files is an error.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let mut matched = 0;
        let entries = glob::glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))?;
        for entry in entries {
            let path = entry.with_context(|| format!("Failed to read a match of '{}'", pattern))?;
            if !path.is_file() {
                continue;
            }
            matched += 1;
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
        debug!(pattern = %pattern, matched, "expanded input pattern");
        if matched == 0 {
            bail!("No files matched '{}'", pattern);
        }
    }
    Ok(files)
}

/// Parse a JSON object into template arguments
pub fn parse_args(json: &str) -> Result<IndexMap<String, Value>> {
    let parsed: serde_json::Value = serde_json::from_str(json).context("Arguments are not valid JSON")?;
    match Value::from(parsed) {
        Value::Map(map) => Ok(map),
        other => bail!("Arguments must be a JSON object, got {}", other.type_name()),
    }
}

pub fn load_args(path: &Path) -> Result<IndexMap<String, Value>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read arguments from {}", path.display()))?;
    parse_args(&json).with_context(|| format!("Invalid arguments file {}", path.display()))
}

pub fn load_config(path: &Path) -> Result<ScriptConfig> {
    ScriptConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}
