//! Crate-wide error taxonomy.
//!
//! Every fallible operation in `netlate` returns one of these variants so
//! callers can match on error kind instead of parsing message text. See
//! the error-kind table in the design docs for which variants are fatal
//! for the current file vs. fatal for the whole run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced anywhere in the translation pipeline.
#[derive(Debug, Error)]
pub enum NetlateError {
    /// The grammar could not classify a preprocessed line as any known card.
    #[error("unknown card: {card}")]
    UnknownCard { card: String },

    /// A model name has no entry in the model table.
    #[error("model not in table: {name}")]
    ModelNotInTable { name: String },

    /// A source-dialect parameter survived both translation and removal.
    #[error("missing in table: {remaining:?} on {card_kind} {name}")]
    TableCoverage {
        card_kind: &'static str,
        name: String,
        remaining: Vec<String>,
    },

    /// An `include`/`ahdl_include` directive named a file that does not exist.
    #[error("include target not found: {path}")]
    IncludeMissing { path: PathBuf },

    /// An include directive could not be parsed.
    #[error("malformed include directive: {text}")]
    IncludeMalformed { text: String },

    /// The include graph revisited a file already on the current path.
    #[error("include cycle detected: {path} is already being resolved")]
    IncludeCycle { path: PathBuf },

    /// A translation table was missing a required key or had the wrong type.
    #[error("malformed translation table {table}: {detail}")]
    TableLoad { table: String, detail: String },

    /// A line could not be tokenized or parsed by a specific card production.
    #[error("parse error in {card_kind}: {detail}")]
    Parse { card_kind: &'static str, detail: String },

    /// Filesystem I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, NetlateError>;
