//! Thin CLI front end over the `netlate` library. Parses flags, builds a
//! `Session`, installs a tracing subscriber, and calls into the pipeline
//! entry point — no transformation logic lives here.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use netlate::diagnostics::{DiagnosticSink, Threshold, Level};
use netlate::pipeline;
use netlate::session::Session;

#[derive(Parser)]
#[command(name = "netlate")]
#[command(about = "Translate analog netlists between simulator dialects")]
struct Cli {
    /// Root of the source netlist tree.
    #[arg(long = "parent-path", value_name = "DIR")]
    parent_path: PathBuf,

    /// Root netlist file, relative to --parent-path (e.g. top.scs).
    #[arg(long = "top-file", value_name = "NAME.EXT")]
    top_file: String,

    /// Output directory; mirrors the input tree.
    #[arg(long = "output-path", value_name = "DIR")]
    output_path: PathBuf,

    /// Directory holding model_table.toml and component_table.toml.
    #[arg(long = "tech-path", value_name = "DIR")]
    tech_path: PathBuf,

    /// Optional directory for per-file logs; enables logging when set.
    #[arg(long = "log-path", value_name = "DIR")]
    log_path: Option<PathBuf>,

    /// Raise the console threshold to suppress everything.
    #[arg(long)]
    silent: bool,

    /// Enable AST trace output and raise the tracing filter to `trace`.
    #[arg(long)]
    debug: bool,
}

fn install_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if debug { "netlate=trace" } else { "netlate=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.debug);

    let Some((top_basename, top_ext)) = Session::split_top_file(&cli.top_file) else {
        eprintln!("--top-file must be NAME.EXT, got '{}'", cli.top_file);
        return ExitCode::FAILURE;
    };

    let threshold = if cli.silent { Threshold::Silent } else { Threshold::Show(Level::Info) };

    let session = Session {
        root_dir: cli.parent_path,
        top_basename,
        top_ext,
        output_dir: cli.output_path,
        tech_dir: cli.tech_path,
        log_dir: cli.log_path,
        threshold,
        debug: cli.debug,
    };

    let mut sink = DiagnosticSink::new();
    sink.set_threshold(session.threshold);

    sink.info("Welcome to netlate");

    match pipeline::run(&session, &sink) {
        Ok(report) => {
            sink.info(&format!(
                "{} file(s) translated, {} failed",
                report.files_translated, report.files_failed
            ));
            if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            sink.error(&format!("fatal: {err}"));
            ExitCode::FAILURE
        }
    }
}
