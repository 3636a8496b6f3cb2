//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3 hashes
//! of file contents. Files are read in fixed-size blocks and folded into an
//! incremental hash state, so a file is never held fully in memory and
//! files larger than RAM hash fine.
//!
//! # Example
//!
//! ```no_run
//! use dupedetective::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest(Path::new("/some/file.bin")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;

/// A BLAKE3 content digest (32 bytes).
pub type Hash = [u8; 32];

/// Default block size for streaming reads (8 KiB).
pub const BLOCK_SIZE: usize = 8 * 1024;

/// Streaming file hasher.
///
/// Reads files block by block and folds each block into a running BLAKE3
/// state. The block size is configurable but rarely needs to change.
#[derive(Debug, Clone)]
pub struct Hasher {
    block_size: usize,
}

impl Hasher {
    /// Create a hasher with the default block size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            block_size: BLOCK_SIZE,
        }
    }

    /// Create a hasher with a custom block size.
    ///
    /// # Arguments
    ///
    /// * `block_size` - Bytes read per block (clamped to at least 1)
    #[must_use]
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    /// Compute the content digest of a file.
    ///
    /// Reads the entire file exactly once, end to end, in
    /// `self.block_size`-byte blocks. The file content is never loaded
    /// fully into memory.
    ///
    /// # Arguments
    ///
    /// * `path` - The file to hash
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// partway through. Callers drop such files from their bucket rather
    /// than aborting the scan.
    pub fn digest(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| classify_io_error(path, e))?;
        let mut state = blake3::Hasher::new();
        let mut block = vec![0u8; self.block_size];

        loop {
            let n = file
                .read(&mut block)
                .map_err(|e| classify_io_error(path, e))?;
            if n == 0 {
                break;
            }
            state.update(&block[..n]);
        }

        Ok(*state.finalize().as_bytes())
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an I/O error to the matching [`HashError`] variant.
fn classify_io_error(path: &Path, error: std::io::Error) -> HashError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// Convert a hash to its lowercase hexadecimal representation.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    use std::fmt::Write;

    let mut hex = String::with_capacity(64);
    for byte in hash {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Parse a 64-character hexadecimal string back into a hash.
///
/// Returns `None` if the string is not exactly 64 hex digits.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    if hex.len() != 64 {
        return None;
    }

    let mut hash = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let s = std::str::from_utf8(chunk).ok()?;
        hash[i] = u8::from_str_radix(s, 16).ok()?;
    }
    Some(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_digest_identical_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"same bytes");
        let b = write_file(&dir, "b.bin", b"same bytes");

        let hasher = Hasher::new();
        assert_eq!(hasher.digest(&a).unwrap(), hasher.digest(&b).unwrap());
    }

    #[test]
    fn test_digest_different_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"content one");
        let b = write_file(&dir, "b.bin", b"content two");

        let hasher = Hasher::new();
        assert_ne!(hasher.digest(&a).unwrap(), hasher.digest(&b).unwrap());
    }

    #[test]
    fn test_digest_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty", b"");

        let hasher = Hasher::new();
        let digest = hasher.digest(&path).unwrap();

        // BLAKE3 of the empty input
        assert_eq!(
            hash_to_hex(&digest),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_digest_matches_across_block_sizes() {
        let dir = TempDir::new().unwrap();
        // Larger than one block, not block-aligned
        let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let path = write_file(&dir, "data.bin", &content);

        let small = Hasher::with_block_size(7);
        let large = Hasher::with_block_size(64 * 1024);

        assert_eq!(small.digest(&path).unwrap(), large.digest(&path).unwrap());
    }

    #[test]
    fn test_digest_missing_file() {
        let hasher = Hasher::new();
        let err = hasher
            .digest(Path::new("/nonexistent/file/12345"))
            .unwrap_err();
        assert!(matches!(err, HashError::NotFound(_)));
    }

    #[test]
    fn test_hex_round_trip() {
        let mut hash = [0u8; 32];
        hash[0] = 0xAB;
        hash[15] = 0x01;
        hash[31] = 0xEF;

        let hex = hash_to_hex(&hash);
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab"));
        assert!(hex.ends_with("ef"));
        assert_eq!(hex_to_hash(&hex), Some(hash));
    }

    #[test]
    fn test_hex_to_hash_invalid() {
        assert_eq!(hex_to_hash(""), None);
        assert_eq!(hex_to_hash("abcd"), None);
        assert_eq!(hex_to_hash(&"zz".repeat(32)), None);
    }
}
