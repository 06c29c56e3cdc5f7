//! Per-run session context (C8).
//!
//! The tool this design derives from keeps these settings in a
//! process-wide module namespace (`shared_variables.py`); this
//! implementation passes an immutable [`Session`] value explicitly to
//! every component that needs it instead.

use std::path::PathBuf;

use crate::diagnostics::Threshold;

/// Immutable per-run configuration, built once from CLI flags (or test
/// fixtures) and threaded through the pipeline driver.
#[derive(Debug, Clone)]
pub struct Session {
    pub root_dir: PathBuf,
    pub top_basename: String,
    pub top_ext: String,
    pub output_dir: PathBuf,
    pub tech_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub threshold: Threshold,
    pub debug: bool,
}

impl Session {
    /// Split `name.ext` into its basename and extension, as the tool this
    /// design derives from does for `--top-file`.
    pub fn split_top_file(top_file: &str) -> Option<(String, String)> {
        let (name, ext) = top_file.rsplit_once('.')?;
        Some((name.to_string(), ext.to_string()))
    }
}
