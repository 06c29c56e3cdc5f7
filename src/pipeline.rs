//! Pipeline driver (C8): per-file orchestration, read → preprocess →
//! parse → render → write, over the file list yielded by the include
//! resolver (C7).
//!
//! One file's fatal error aborts that file's translation (any cards
//! rendered before the failure remain on disk) but not the whole run; the
//! caller reports a nonzero process exit when [`RunReport::all_succeeded`]
//! is false.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::diagnostics::DiagnosticSink;
use crate::error::{NetlateError, Result};
use crate::include_resolver::{self, IncludedFile};
use crate::parser;
use crate::preprocess;
use crate::session::Session;
use crate::tables::TranslationTables;

/// Outcome summary for an entire run, across every resolved file.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunReport {
    pub files_translated: usize,
    pub files_failed: usize,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.files_failed == 0
    }
}

/// Translate every file reachable from `session`'s top netlist.
pub fn run(session: &Session, sink: &DiagnosticSink) -> Result<RunReport> {
    let tables = TranslationTables::load(&session.tech_dir)?;

    let files = include_resolver::resolve(&session.root_dir, &session.top_basename, &session.top_ext)?;
    sink.info(&format!("resolved {} file(s) from include graph", files.len()));

    let mut report = RunReport::default();
    for file in &files {
        sink.info(&format!("translating {}.{}", file.basename, file.ext));
        match translate_file(session, &tables, sink, file) {
            Ok(card_count) => {
                sink.done(&format!("translated {card_count} card(s) in {}.{}", file.basename, file.ext));
                report.files_translated += 1;
            }
            Err(err) => {
                sink.error(&format!("{}.{}: {err}", file.basename, file.ext));
                report.files_failed += 1;
            }
        }
    }
    Ok(report)
}

fn mirrored_dir(session: &Session, file_dir: &str, root: &Path) -> std::path::PathBuf {
    let rel = Path::new(file_dir).strip_prefix(&session.root_dir).unwrap_or(Path::new(""));
    root.join(rel)
}

fn translate_file(
    session: &Session,
    tables: &TranslationTables,
    sink: &DiagnosticSink,
    file: &IncludedFile,
) -> Result<usize> {
    let source_path = file.path();

    let output_dir = mirrored_dir(session, &file.dir, &session.output_dir);
    fs::create_dir_all(&output_dir).map_err(|source| NetlateError::Io { path: output_dir.clone(), source })?;

    if let Some(log_root) = &session.log_dir {
        let log_dir = mirrored_dir(session, &file.dir, log_root);
        fs::create_dir_all(&log_dir).map_err(|source| NetlateError::Io { path: log_dir.clone(), source })?;
        sink.attach_log(&log_dir.join(format!("{}.log", file.basename)))?;
    } else {
        sink.detach_log();
    }

    let source_text = fs::read_to_string(&source_path).map_err(|source| NetlateError::Io {
        path: source_path.clone(),
        source,
    })?;
    let preprocessed = preprocess::preprocess(&source_text);

    if let Some(log_root) = &session.log_dir {
        let log_dir = mirrored_dir(session, &file.dir, log_root);
        let _ = fs::write(log_dir.join(format!("{}.txt", file.basename)), &preprocessed);
    }

    let output_path = output_dir.join(format!("{}.sp", file.basename));
    let mut out_file = File::create(&output_path).map_err(|source| NetlateError::Io {
        path: output_path.clone(),
        source,
    })?;

    let mut card_count = 0;
    for line in preprocessed.lines() {
        let node = match parser::classify_and_parse(line, sink)? {
            Some(node) => node,
            None => continue,
        };
        if session.debug {
            tracing::trace!(target: "netlate::ast", ?node);
        }
        let rendered = node.render_target(tables, sink)?;
        writeln!(out_file, "{rendered}").map_err(|source| NetlateError::Io {
            path: output_path.clone(),
            source,
        })?;
        card_count += 1;
    }

    Ok(card_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Threshold;
    use std::fs;

    fn write_tech_tables(dir: &Path) {
        fs::write(
            dir.join("model_table.toml"),
            r#"
            [bsim4]
            ignored = false
            added = []
            removed = []
            translated = [["lmin", "LMIN"]]
            "#,
        )
        .unwrap();
        fs::write(
            dir.join("component_table.toml"),
            r#"
            [resistor]
            spice_prefix = "R"
            keep_type = false
            removed = []
            translated = [["r", "R"]]
            "#,
        )
        .unwrap();
    }

    #[test]
    fn translates_a_minimal_tree_end_to_end() {
        let root = tempfile::tempdir().unwrap();
        let tech = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_tech_tables(tech.path());

        fs::write(
            root.path().join("top.scs"),
            "R1 net1 net2 resistor r=5k\nmodel nch_25 bsim4 lmin=1u\n",
        )
        .unwrap();

        let session = Session {
            root_dir: root.path().to_path_buf(),
            top_basename: "top".to_string(),
            top_ext: "scs".to_string(),
            output_dir: out.path().to_path_buf(),
            tech_dir: tech.path().to_path_buf(),
            log_dir: None,
            threshold: Threshold::Silent,
            debug: false,
        };
        let mut sink = DiagnosticSink::new();
        sink.set_threshold(Threshold::Silent);

        let report = run(&session, &sink).unwrap();
        assert!(report.all_succeeded());
        assert_eq!(report.files_translated, 1);

        let rendered = fs::read_to_string(out.path().join("top.sp")).unwrap();
        assert!(rendered.contains("R_R1 net1 net2 R=5k"));
        assert!(rendered.contains(".model nch_25 LMIN=1u"));
    }

    #[test]
    fn unknown_card_fails_only_that_file() {
        let root = tempfile::tempdir().unwrap();
        let tech = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_tech_tables(tech.path());

        fs::write(root.path().join("top.scs"), "!!! garbage\n").unwrap();

        let session = Session {
            root_dir: root.path().to_path_buf(),
            top_basename: "top".to_string(),
            top_ext: "scs".to_string(),
            output_dir: out.path().to_path_buf(),
            tech_dir: tech.path().to_path_buf(),
            log_dir: None,
            threshold: Threshold::Silent,
            debug: false,
        };
        let mut sink = DiagnosticSink::new();
        sink.set_threshold(Threshold::Silent);

        let report = run(&session, &sink).unwrap();
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.files_translated, 0);
    }
}
