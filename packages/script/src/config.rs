//! Script configuration
//!
//! Host-facing settings for parsing and rendering, loadable from JSON

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::parse_util::DEFAULT_MAX_EXCERPT_LENGTH;

/// Encoding applied to values emitted by variable fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

impl OutputFormat {
    pub fn encode(&self, text: &str) -> String {
        match self {
            OutputFormat::Text => text.to_string(),
            OutputFormat::Html => html_encode(text),
        }
    }
}

fn html_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptConfig {
    /// Filters whose `}}` swallows a single following newline
    pub remove_new_line_after_filters_named: BTreeSet<String>,
    /// Blocks whose body is emitted verbatim
    pub dont_evaluate_blocks_named: BTreeSet<String>,
    /// Filters hidden from resolution
    pub exclude_filters_named: BTreeSet<String>,
    pub format: OutputFormat,
    pub max_excerpt_length: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        ScriptConfig {
            remove_new_line_after_filters_named: ["end".to_string()].into_iter().collect(),
            dont_evaluate_blocks_named: ["raw".to_string()].into_iter().collect(),
            exclude_filters_named: BTreeSet::new(),
            format: OutputFormat::Text,
            max_excerpt_length: DEFAULT_MAX_EXCERPT_LENGTH,
        }
    }
}

impl ScriptConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a JSON config file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
