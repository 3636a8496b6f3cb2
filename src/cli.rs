//! Command-line interface definitions.
//!
//! Defines all CLI arguments using the clap derive API. The interface is a
//! single command: scan a directory (with an optional filename mask) and
//! report duplicate groups.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory tree for duplicates among all files
//! dupedetective ~/Downloads
//!
//! # Only compare files matching a shell glob
//! dupedetective ~/Photos '*.jpg'
//!
//! # Machine-readable output for scripting
//! dupedetective ~/Downloads --output json
//!
//! # Verbose mode for debugging
//! dupedetective -v ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files by size, then by content hash.
///
/// Files are compared by size first; only files sharing an exact size with
/// at least one other file have their contents hashed, so unique files are
/// never read.
#[derive(Debug, Parser)]
#[command(name = "dupedetective")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory tree to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Shell-glob filename mask (e.g. '*.jpg', 'report-?.pdf')
    ///
    /// Applied to basenames only. Defaults to matching every file.
    #[arg(value_name = "MASK", value_parser = parse_mask)]
    pub mask: Option<glob::Pattern>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Glob patterns to exclude (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Number of I/O threads for hashing
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", default_value = "4")]
    pub io_threads: usize,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse and validate a shell-glob mask.
///
/// An invalid mask is rejected at argument-parse time, before any
/// filesystem work starts.
///
/// # Errors
///
/// Returns a description of the offending pattern position on failure.
pub fn parse_mask(s: &str) -> Result<glob::Pattern, String> {
    glob::Pattern::new(s).map_err(|e| format!("invalid glob pattern '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_minimal() {
        let cli = Cli::try_parse_from(["dupedetective", "/some/path"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("/some/path"));
        assert!(cli.mask.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.io_threads, 4);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parse_with_mask() {
        let cli = Cli::try_parse_from(["dupedetective", "/photos", "*.jpg"]).unwrap();
        assert_eq!(cli.mask.unwrap().as_str(), "*.jpg");
    }

    #[test]
    fn test_cli_rejects_invalid_mask() {
        let result = Cli::try_parse_from(["dupedetective", "/photos", "[unclosed"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "dupedetective",
            "-v",
            "/path",
            "--output",
            "json",
            "--ignore",
            "*.tmp",
            "--ignore",
            "node_modules",
            "--io-threads",
            "8",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.ignore_patterns, vec!["*.tmp", "node_modules"]);
        assert_eq!(cli.io_threads, 8);
    }

    #[test]
    fn test_cli_parse_walk_flags() {
        let cli = Cli::try_parse_from([
            "dupedetective",
            "/path",
            "--follow-symlinks",
            "--skip-hidden",
        ])
        .unwrap();

        assert!(cli.follow_symlinks);
        assert!(cli.skip_hidden);
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["dupedetective", "-v", "-q", "/path"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_missing_path() {
        let result = Cli::try_parse_from(["dupedetective"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_csv_output() {
        let cli = Cli::try_parse_from(["dupedetective", "/path", "--output", "csv"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Csv);
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_parse_mask_valid() {
        assert!(parse_mask("*").is_ok());
        assert!(parse_mask("*.txt").is_ok());
        assert!(parse_mask("report-?.pdf").is_ok());
        assert!(parse_mask("[ab]*.log").is_ok());
    }

    #[test]
    fn test_parse_mask_invalid() {
        assert!(parse_mask("[unclosed").is_err());
    }
}
