//! Model table: one rewrite rule per source-dialect model name.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{NetlateError, Result};

/// A single model's rewrite rule.
///
/// Invariant (checked at load time): `added`, `removed`, and the `from`
/// side of `translated` are pairwise disjoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRule {
    pub ignored: bool,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub translated: Vec<(String, String)>,
}

impl ModelRule {
    fn check_disjoint(&self, table: &str, key: &str) -> Result<()> {
        let mut seen: FxHashMap<&str, &str> = FxHashMap::default();
        for name in &self.added {
            seen.insert(name.as_str(), "added");
        }
        for (from, _) in &self.translated {
            if let Some(other) = seen.insert(from.as_str(), "translated") {
                return Err(NetlateError::TableLoad {
                    table: table.to_string(),
                    detail: format!(
                        "model '{key}': '{from}' appears in both 'translated' and '{other}'"
                    ),
                });
            }
        }
        for name in &self.removed {
            if let Some(other) = seen.insert(name.as_str(), "removed") {
                return Err(NetlateError::TableLoad {
                    table: table.to_string(),
                    detail: format!(
                        "model '{key}': '{name}' appears in both 'removed' and '{other}'"
                    ),
                });
            }
        }
        Ok(())
    }
}

pub fn load(path: &Path) -> Result<FxHashMap<String, ModelRule>> {
    let text = std::fs::read_to_string(path).map_err(|source| NetlateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, &path.display().to_string())
}

pub fn parse(text: &str, table_name: &str) -> Result<FxHashMap<String, ModelRule>> {
    let rules: FxHashMap<String, ModelRule> =
        toml::from_str(text).map_err(|e| NetlateError::TableLoad {
            table: table_name.to_string(),
            detail: e.to_string(),
        })?;
    for (key, rule) in &rules {
        rule.check_disjoint(table_name, key)?;
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_key_is_a_fatal_load_error() {
        let text = r#"
            [bsim4]
            ignored = false
            added = []
            removed = []
        "#;
        let err = parse(text, "model_table.toml").unwrap_err();
        assert!(matches!(err, NetlateError::TableLoad { .. }));
    }

    #[test]
    fn overlapping_translated_and_removed_is_rejected() {
        let text = r#"
            [bsim4]
            ignored = false
            added = []
            removed = ["w"]
            translated = [["w", "W"]]
        "#;
        let err = parse(text, "model_table.toml").unwrap_err();
        assert!(matches!(err, NetlateError::TableLoad { .. }));
    }

    #[test]
    fn ignored_model_parses_without_translated_entries() {
        let text = r#"
            [noisy]
            ignored = true
            added = []
            removed = []
            translated = []
        "#;
        let rules = parse(text, "model_table.toml").unwrap();
        assert!(rules["noisy"].ignored);
    }
}
