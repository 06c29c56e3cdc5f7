//! Component table: one rewrite rule per source-dialect instance type.
//!
//! A source-dialect type absent from this table is not an error: the
//! rewriter (C6) treats it as a subcircuit-fallback case, handled at lookup
//! time rather than here.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{NetlateError, Result};

/// A single component type's rewrite rule.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentRule {
    pub spice_prefix: String,
    pub keep_type: bool,
    pub removed: Vec<String>,
    pub translated: Vec<(String, String)>,
}

impl ComponentRule {
    /// The single letter identifying the target-dialect element class.
    pub fn prefix_char(&self) -> char {
        self.spice_prefix.chars().next().unwrap_or('X')
    }

    fn validate(&self, table: &str, key: &str) -> Result<()> {
        if self.spice_prefix.chars().count() != 1 || !self.spice_prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(NetlateError::TableLoad {
                table: table.to_string(),
                detail: format!(
                    "component '{key}': spice_prefix must be a single letter, got '{}'",
                    self.spice_prefix
                ),
            });
        }
        Ok(())
    }
}

pub fn load(path: &Path) -> Result<FxHashMap<String, ComponentRule>> {
    let text = std::fs::read_to_string(path).map_err(|source| NetlateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, &path.display().to_string())
}

pub fn parse(text: &str, table_name: &str) -> Result<FxHashMap<String, ComponentRule>> {
    let rules: FxHashMap<String, ComponentRule> =
        toml::from_str(text).map_err(|e| NetlateError::TableLoad {
            table: table_name.to_string(),
            detail: e.to_string(),
        })?;
    for (key, rule) in &rules {
        rule.validate(table_name, key)?;
    }
    Ok(rules)
}
