//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Size pass**: bucket all candidates by exact byte size and prune
//!    singleton sizes. A file whose size is unique cannot be a duplicate,
//!    so it is never hashed (see [`crate::duplicates::groups`]).
//! 2. **Digest pass**: for each surviving size bucket, compute streaming
//!    BLAKE3 digests (parallel, bounded I/O pool) and bucket again by
//!    digest with the same grouping primitive.
//!
//! Groups are emitted lazily via [`DuplicateStream`], one size bucket at a
//! time, so a caller consuming only a prefix never pays for the remaining
//! buckets.
//!
//! # Example
//!
//! ```no_run
//! use dupedetective::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for group in &groups {
//!     println!("{} x{} ({} bytes)", group.digest_hex(), group.len(), group.size);
//! }
//! println!("{} groups, {} bytes reclaimable", summary.duplicate_groups, summary.wasted_space);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::progress::ProgressCallback;
use crate::scanner::{FileEntry, Hash, HashError, Hasher, Walker, WalkerConfig};

use super::groups::{group_with_duplicates, DuplicateGroup};

/// Fatal conditions for a whole scan.
///
/// Only the scan root itself can fail a scan; per-file errors are counted
/// into the summary and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan root does not exist.
    #[error("Scan root not found: {0}")]
    RootNotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("Scan root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// The scan root could not be accessed.
    #[error("Cannot access scan root {path}: {source}")]
    RootIo {
        /// The root path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration (mask, symlinks, exclusions).
    pub walker: WalkerConfig,
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker", &self.walker)
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker: WalkerConfig::default(),
            io_threads: 4,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Aggregate counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Candidate files yielded by the walk
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Walk errors (unreadable entries, skipped)
    pub scan_errors: usize,
    /// Number of distinct file sizes observed
    pub unique_sizes: usize,
    /// Files that entered the digest pass (shared their size with another)
    pub hash_candidates: usize,
    /// Files successfully hashed
    pub files_hashed: usize,
    /// Files dropped because hashing failed
    pub hash_failures: usize,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Confirmed duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub wasted_space: u64,
    /// Whether the scan was interrupted by shutdown
    pub interrupted: bool,
}

impl ScanSummary {
    /// Whether any non-fatal per-file errors occurred.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.scan_errors > 0 || self.hash_failures > 0
    }
}

/// Two-phase duplicate finder.
///
/// Construct with a [`FinderConfig`], then call
/// [`stream`](DuplicateFinder::stream) for lazy consumption or
/// [`find_duplicates`](DuplicateFinder::find_duplicates) to collect
/// everything at once.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Arc::new(Hasher::new()),
        }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Replace the hasher (custom block size, instrumented tests).
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Start a scan, returning a lazy stream of duplicate groups.
    ///
    /// The walk and the size pass run eagerly (the size pass is a full
    /// barrier: every candidate must be seen before any bucket can be
    /// judged complete). Hashing runs lazily, one size bucket per pull.
    ///
    /// # Errors
    ///
    /// Fails only if the scan root is missing, inaccessible, or not a
    /// directory. Per-file errors are counted into the stream's summary.
    pub fn stream(&self, root: &Path) -> Result<DuplicateStream, FinderError> {
        validate_root(root)?;

        let config = self.config.clone();
        let mut summary = ScanSummary::default();

        // Walk: collect candidates, counting unreadable entries
        if let Some(ref callback) = config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = Walker::new(root, config.walker.clone());
        if let Some(ref flag) = config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut candidates: Vec<FileEntry> = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(file) => {
                    summary.total_size += file.size;
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_progress(candidates.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    candidates.push(file);
                }
                Err(e) => {
                    // Unreadable entries are absent from the pipeline, not fatal
                    summary.scan_errors += 1;
                    log::debug!("Walk error: {}", e);
                }
            }
        }

        if let Some(ref callback) = config.progress_callback {
            callback.on_phase_end("walking");
        }

        if config.is_shutdown_requested() {
            summary.interrupted = true;
        }

        log::info!(
            "Walk complete: {} candidate files, {} unreadable entries",
            candidates.len(),
            summary.scan_errors
        );

        // Size pass: prune singleton sizes so only files sharing an exact
        // size with at least one other file are ever hashed
        let (size_groups, size_stats) = group_with_duplicates(candidates, |f| Some(f.size));

        summary.total_files = size_stats.total_items;
        summary.unique_sizes = size_stats.distinct_keys;
        summary.hash_candidates = size_stats.surviving_items;

        log::info!(
            "Size pass complete: {} files → {} hash candidates in {} groups ({:.1}% eliminated)",
            size_stats.total_items,
            size_stats.surviving_items,
            size_stats.surviving_groups,
            size_stats.elimination_rate()
        );

        if let Some(ref callback) = config.progress_callback {
            callback.on_phase_start("hashing", size_stats.surviving_items);
        }

        // Bounded pool keeps parallel hashing from thrashing the disk
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.io_threads)
            .build()
            .unwrap_or_else(|_| {
                log::warn!(
                    "Failed to create custom thread pool, using {} threads",
                    rayon::current_num_threads()
                );
                rayon::ThreadPoolBuilder::new().build().unwrap()
            });

        Ok(DuplicateStream {
            buckets: size_groups.into_iter().collect::<Vec<_>>().into_iter(),
            pending: Vec::new().into_iter(),
            hasher: Arc::clone(&self.hasher),
            pool,
            config,
            summary,
            hashed: Arc::new(AtomicUsize::new(0)),
            finished: false,
        })
    }

    /// Run a scan to completion, collecting all duplicate groups.
    ///
    /// # Errors
    ///
    /// See [`stream`](DuplicateFinder::stream).
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let mut stream = self.stream(root)?;
        let groups: Vec<DuplicateGroup> = stream.by_ref().collect();
        Ok((groups, stream.into_summary()))
    }
}

/// Validate the scan root up front; everything past this point is
/// per-file and recoverable.
fn validate_root(root: &Path) -> Result<(), FinderError> {
    use std::io::ErrorKind;

    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FinderError::RootNotFound(root.to_path_buf()),
        _ => FinderError::RootIo {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(FinderError::RootNotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Lazy iterator over duplicate groups.
///
/// Each pull hashes at most one size bucket (in parallel, on the bounded
/// pool) and yields its digest groups one by one. Abandoning the stream
/// between buckets never retracts groups already emitted.
pub struct DuplicateStream {
    buckets: std::vec::IntoIter<(u64, Vec<FileEntry>)>,
    pending: std::vec::IntoIter<DuplicateGroup>,
    hasher: Arc<Hasher>,
    pool: rayon::ThreadPool,
    config: FinderConfig,
    summary: ScanSummary,
    hashed: Arc<AtomicUsize>,
    finished: bool,
}

impl DuplicateStream {
    /// The summary accumulated so far.
    ///
    /// Complete once the stream has been exhausted.
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Consume the stream, returning its summary.
    #[must_use]
    pub fn into_summary(self) -> ScanSummary {
        self.summary
    }

    /// Hash one size bucket and return its confirmed duplicate groups.
    fn hash_bucket(&mut self, size: u64, files: Vec<FileEntry>) -> Vec<DuplicateGroup> {
        log::debug!("Hashing size bucket {} bytes: {} files", size, files.len());

        let hasher = Arc::clone(&self.hasher);
        let shutdown = self.config.shutdown_flag.clone();
        let callback = self.config.progress_callback.clone();
        let hashed = Arc::clone(&self.hashed);

        // Workers only read files and return immutable digests
        let results: Vec<(FileEntry, Result<Hash, HashError>, bool)> = self.pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    if shutdown
                        .as_ref()
                        .is_some_and(|f| f.load(Ordering::SeqCst))
                    {
                        return (file, Err(interrupted_error()), true);
                    }

                    let result = hasher.digest(&file.path);
                    if result.is_ok() {
                        let done = hashed.fetch_add(1, Ordering::Relaxed) + 1;
                        if let Some(ref callback) = callback {
                            callback.on_progress(done, file.path.to_string_lossy().as_ref());
                        }
                    }
                    (file, result, false)
                })
                .collect()
        });

        let mut keyed: Vec<(FileEntry, Hash)> = Vec::with_capacity(results.len());
        for (file, result, skipped) in results {
            if skipped {
                continue;
            }
            match result {
                Ok(digest) => {
                    self.summary.files_hashed += 1;
                    keyed.push((file, digest));
                }
                Err(e) => {
                    // A file that vanished or became unreadable between the
                    // size pass and here is dropped from its bucket
                    self.summary.hash_failures += 1;
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                }
            }
        }

        // Same primitive as the size pass, keyed by digest this time
        let (digest_groups, _) = group_with_duplicates(keyed, |(_, digest)| Some(*digest));

        let mut groups: Vec<DuplicateGroup> = digest_groups
            .into_iter()
            .map(|(digest, members)| {
                let files: Vec<FileEntry> = members.into_iter().map(|(file, _)| file).collect();
                log::debug!(
                    "Duplicate group {}: {} files, {} bytes each",
                    crate::scanner::hash_to_hex(&digest),
                    files.len(),
                    size
                );
                DuplicateGroup::new(digest, size, files)
            })
            .collect();

        // Deterministic order within one bucket's output
        groups.sort_by(|a, b| a.digest.cmp(&b.digest));

        for group in &groups {
            self.summary.duplicate_groups += 1;
            self.summary.duplicate_files += group.duplicate_count();
            self.summary.wasted_space += group.wasted_space();
        }

        groups
    }

    /// Mark the stream complete and emit the closing log line.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        log::info!(
            "Digest pass complete: {} groups, {} duplicates, {} bytes reclaimable",
            self.summary.duplicate_groups,
            self.summary.duplicate_files,
            self.summary.wasted_space
        );
    }
}

impl Iterator for DuplicateStream {
    type Item = DuplicateGroup;

    fn next(&mut self) -> Option<DuplicateGroup> {
        loop {
            if let Some(group) = self.pending.next() {
                return Some(group);
            }

            if self.finished {
                return None;
            }

            // Abandoning between buckets keeps already-emitted groups valid
            if self.config.is_shutdown_requested() {
                self.summary.interrupted = true;
                log::info!("Scan interrupted by shutdown signal");
                self.finish();
                return None;
            }

            match self.buckets.next() {
                Some((size, files)) => {
                    let groups = self.hash_bucket(size, files);
                    self.pending = groups.into_iter();
                }
                None => {
                    self.finish();
                    return None;
                }
            }
        }
    }
}

impl std::fmt::Debug for DuplicateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateStream")
            .field("summary", &self.summary)
            .field("finished", &self.finished)
            .finish()
    }
}

/// The error recorded for files skipped due to shutdown.
fn interrupted_error() -> HashError {
    HashError::Io {
        path: PathBuf::new(),
        source: std::io::Error::new(std::io::ErrorKind::Interrupted, "Shutdown"),
    }
}
