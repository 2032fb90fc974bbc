//! Roster importer service binary.
//!
//! Loads configuration, initializes tracing, starts the async runtime and
//! runs the synchronization pipeline. A fatal startup failure exits
//! non-zero with a diagnostic report; a completed run with per-record
//! partial failures exits zero (best-effort semantics).

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::load_importer_config;
use crate::core::run_import;
use crate::error::ImporterResult;

mod config;
mod core;
mod error;

/// Command line arguments for the importer.
#[derive(Debug, Parser)]
#[command(
    name = "importer",
    about = "Synchronizes a roster spreadsheet into the groups, locations and users tables"
)]
struct Cli {
    /// Path to the workbook, overriding the configured `spreadsheet.path`.
    #[arg(long)]
    spreadsheet: Option<String>,

    /// Worksheet name, overriding the configured `spreadsheet.sheet`.
    #[arg(long)]
    sheet: Option<String>,
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", err.render_report());
            ExitCode::FAILURE
        }
    }
}

fn run() -> ImporterResult<()> {
    let cli = Cli::parse();

    let mut importer_config = load_importer_config()?;
    if let Some(path) = cli.spreadsheet {
        importer_config.spreadsheet.path = path;
    }
    if let Some(sheet) = cli.sheet {
        importer_config.spreadsheet.sheet = Some(sheet);
    }

    let summary = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_import(importer_config))?;

    info!(
        completed = summary.counts.completed,
        partial = summary.counts.partial_group
            + summary.counts.partial_location
            + summary.counts.partial_user,
        failed = summary.counts.chunk_failed,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "import finished"
    );

    Ok(())
}

/// Initializes the tracing subscriber with env-filter support.
///
/// `RUST_LOG` controls verbosity; the default level is `info`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
