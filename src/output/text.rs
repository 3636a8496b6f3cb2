//! Human-readable text report.
//!
//! One block per duplicate group: the content digest and the per-file size
//! on a header line, then the member paths. A summary line closes the
//! report.

use std::io;

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text output formatter.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a new text output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write the report to the given writer.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
        } else {
            writeln!(writer, "The following files are duplicates:")?;

            for group in self.groups {
                writeln!(writer)?;
                writeln!(
                    writer,
                    " + {}, {} ({} bytes each)",
                    group.digest_hex().cyan(),
                    ByteSize::b(group.size),
                    group.size
                )?;
                for file in &group.files {
                    writeln!(writer, "   - {}", file.path.display())?;
                }
            }
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Scanned {} files ({}): {} duplicate groups, {} redundant files, {} reclaimable.",
            self.summary.total_files,
            ByteSize::b(self.summary.total_size),
            self.summary.duplicate_groups,
            self.summary.duplicate_files,
            ByteSize::b(self.summary.wasted_space).green()
        )?;

        if self.summary.has_errors() {
            writeln!(
                writer,
                "{} {} unreadable entries skipped, {} files could not be hashed.",
                "Warning:".yellow(),
                self.summary.scan_errors,
                self.summary.hash_failures
            )?;
        }

        if self.summary.interrupted {
            writeln!(writer, "{} scan was interrupted; results are partial.", "Note:".yellow())?;
        }

        Ok(())
    }

    /// Generate the report as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the report is not valid UTF-8 (it always is).
    pub fn to_text(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
