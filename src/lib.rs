//! # netlate
//!
//! Translates analog netlists between simulator dialects: a preprocessor,
//! a grammar, a tagged AST with a rendering contract, and two table-driven
//! rewrite passes, orchestrated by a per-file pipeline driver over an
//! include-graph resolver.
//!
//! ## Module structure (dependency order)
//!
//! ```text
//! pipeline          → per-file orchestration (read → preprocess → parse → render → write)
//!   ↓
//! include_resolver  → walks the inclusion graph from a root netlist
//! parser            → recursive-descent grammar over the lexer's token stream
//! rewrite           → model/component table-driven rewrite passes
//!   ↓
//! ast               → tagged Node variants, render_target
//! lexer             → logos token stream
//! tables            → translation-table loader (model_table.toml, component_table.toml)
//!   ↓
//! session           → immutable per-run context
//! diagnostics       → leveled messages, tracing bridge
//! error             → crate-wide error taxonomy
//! ```

/// Tagged AST node variants and the rendering contract.
pub mod ast;

/// Leveled diagnostic sink (console, log file, tracing).
pub mod diagnostics;

/// Crate-wide error taxonomy.
pub mod error;

/// Include-graph resolution (depth-first, cycle-checked).
pub mod include_resolver;

/// Logos-based lexer for one preprocessed card.
pub mod lexer;

/// Per-file and whole-run orchestration.
pub mod pipeline;

/// Line-oriented text normalization into one-card-per-line form.
pub mod preprocess;

/// Recursive-descent grammar over the lexer's token stream.
pub mod parser;

/// Model/component table-driven rewrite passes.
pub mod rewrite;

/// Immutable per-run session context.
pub mod session;

/// Translation-table loader.
pub mod tables;

pub use error::{NetlateError, Result};
pub use session::Session;
