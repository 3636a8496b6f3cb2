//! Dupe Detective - Duplicate File Finder
//!
//! A cross-platform Rust CLI for finding duplicate files. Files are
//! compared by size first; only files sharing an exact size with at least
//! one other file have their contents hashed (streaming BLAKE3), so unique
//! files are never read.

use std::io;
use std::sync::Arc;

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

/// Run the application with parsed CLI arguments.
///
/// Wires logging, signal handling, the finder, and the chosen output
/// format together, and maps the scan outcome to an exit code.
///
/// # Errors
///
/// Returns an error for fatal conditions only: an invalid scan root or a
/// failure to write the report. Per-file errors are reported in the
/// summary and drive the partial-success exit code instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    let handler = signal::install_handler()?;

    let walker_config = WalkerConfig {
        mask: cli.mask.clone(),
        follow_symlinks: cli.follow_symlinks,
        skip_hidden: cli.skip_hidden,
        ignore_patterns: cli.ignore_patterns.clone(),
    };

    let finder_config = FinderConfig::default()
        .with_walker(walker_config)
        .with_io_threads(cli.io_threads)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(cli.quiet)));

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder.find_duplicates(&cli.path)?;

    let exit_code = if summary.interrupted {
        ExitCode::Interrupted
    } else if summary.has_errors() {
        ExitCode::PartialSuccess
    } else if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    match cli.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary).write_to(io::stdout())?,
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, exit_code).write_to(io::stdout())?;
        }
        OutputFormat::Csv => CsvOutput::new(&groups).write_to(io::stdout())?,
    }

    Ok(exit_code)
}
