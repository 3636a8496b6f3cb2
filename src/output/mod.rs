//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Human-readable text report for the terminal
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupedetective::duplicates::DuplicateFinder;
//! use dupedetective::output::TextOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = TextOutput::new(&groups, &summary);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
