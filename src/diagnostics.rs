//! Diagnostic sink (C1): leveled console/log messages plus a tracing bridge.
//!
//! The sink has two independent outputs for every message: a console line
//! gated by a verbosity threshold, and (always, regardless of threshold) a
//! `tracing` event at the matching severity so the crate stays inspectable
//! under `RUST_LOG` even when the caller never attaches a log file. A third,
//! optional output is a per-file append log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{NetlateError, Result};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Done,
    Warn,
    Error,
}

impl Level {
    fn prefix(self) -> &'static str {
        match self {
            Level::Info => "Info:",
            Level::Done => "Done:",
            Level::Warn => "Warn:",
            Level::Error => "Error:",
        }
    }
}

/// Console verbosity threshold. `Show` prints every message at or above
/// the given level; `Silent` prints nothing (but log file and tracing are
/// unaffected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Show(Level),
    Silent,
}

/// Leveled diagnostic sink. One instance is shared (by reference) for the
/// whole run; writes are serialized through an internal mutex so `emit` is
/// a single atomic write per call.
pub struct DiagnosticSink {
    threshold: Threshold,
    log: Mutex<Option<File>>,
}

impl DiagnosticSink {
    /// Build a sink that shows everything on the console and has no log file.
    pub fn new() -> Self {
        Self {
            threshold: Threshold::Show(Level::Info),
            log: Mutex::new(None),
        }
    }

    /// Raise or lower the console threshold. Messages strictly below this
    /// level are suppressed from the console (but still logged/traced).
    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
    }

    /// Attach a per-file log. Subsequent `emit` calls append one line each,
    /// regardless of the console threshold.
    pub fn attach_log(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| NetlateError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        *self.log.lock().unwrap() = Some(file);
        Ok(())
    }

    /// Detach any previously attached log file.
    pub fn detach_log(&self) {
        *self.log.lock().unwrap() = None;
    }

    /// Emit one diagnostic message. Single atomic write per call to each
    /// attached sink (console, log file, tracing).
    pub fn emit(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!(target: "netlate::diagnostics", "{message}"),
            Level::Done => tracing::info!(target: "netlate::diagnostics", done = true, "{message}"),
            Level::Warn => tracing::warn!(target: "netlate::diagnostics", "{message}"),
            Level::Error => tracing::error!(target: "netlate::diagnostics", "{message}"),
        }

        let visible = match self.threshold {
            Threshold::Silent => false,
            Threshold::Show(min) => level >= min,
        };
        if visible {
            println!("{} {}", level.prefix(), message);
        }

        if let Some(file) = self.log.lock().unwrap().as_mut() {
            let _ = writeln!(file, "{} {}", level.prefix(), message);
        }
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn done(&self, message: &str) {
        self.emit(Level::Done, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
