//! Generic grouping primitive and duplicate group types.
//!
//! # Overview
//!
//! Duplicate detection is two applications of the same operation: bucket a
//! sequence of files by a key, then keep only buckets with two or more
//! members, since a lone file cannot be a duplicate of anything. The first pass
//! keys by size, the second by content digest. [`group_with_duplicates`] is
//! that single operation, parameterized by a key-extraction function, so
//! both passes share the discard-singleton rule by construction instead of
//! drifting apart as two bespoke loops.
//!
//! # Example
//!
//! ```
//! use dupedetective::duplicates::group_with_duplicates;
//!
//! let words = vec!["ant", "bee", "cow", "owl", "elk"];
//! let (groups, stats) = group_with_duplicates(words, |w| Some(w.len()));
//!
//! // All five words are three letters long: one surviving group
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[&3].len(), 5);
//! assert_eq!(stats.eliminated_singletons, 0);
//! ```

use std::collections::HashMap;
use std::hash::Hash as StdHash;

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// Statistics from one grouping pass.
///
/// Both the size pass and the digest pass produce one of these; the
/// summary reported to the caller is assembled from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total items consumed from the input sequence
    pub total_items: usize,
    /// Items dropped because the key function returned `None`
    pub dropped_items: usize,
    /// Number of distinct keys observed
    pub distinct_keys: usize,
    /// Buckets of exactly one member, discarded
    pub eliminated_singletons: usize,
    /// Items remaining in surviving buckets
    pub surviving_items: usize,
    /// Number of surviving buckets (2+ members)
    pub surviving_groups: usize,
}

impl GroupingStats {
    /// Percentage of keyed items eliminated by the singleton rule.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        let keyed = self.total_items - self.dropped_items;
        if keyed == 0 {
            0.0
        } else {
            let eliminated = keyed - self.surviving_items;
            (eliminated as f64 / keyed as f64) * 100.0
        }
    }
}

/// Bucket a sequence by key and keep only buckets with 2+ members.
///
/// Consumes the input exactly once, so it composes with single-pass
/// sources. Items for which `key_fn` returns `None` (e.g. a file whose
/// digest could not be computed) are dropped silently; the count appears
/// in the returned stats. Ordering of groups and of members within a
/// group is unspecified.
///
/// # Arguments
///
/// * `items` - The sequence to partition
/// * `key_fn` - Extracts the bucket key for an item, or `None` to drop it
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<K, Vec<T>>` - Surviving buckets keyed by extracted value
/// - [`GroupingStats`] - Counters describing the pass
///
/// # Example
///
/// ```
/// use dupedetective::duplicates::group_with_duplicates;
///
/// let numbers = vec![1, 2, 3, 10, 20, 300];
/// let (groups, stats) = group_with_duplicates(numbers, |n| Some(n.to_string().len()));
///
/// // 1-digit {1,2,3} and 2-digit {10,20} survive; 300 is a singleton
/// assert_eq!(groups.len(), 2);
/// assert_eq!(stats.eliminated_singletons, 1);
/// assert_eq!(stats.surviving_items, 5);
/// ```
pub fn group_with_duplicates<I, T, K, F>(items: I, mut key_fn: F) -> (HashMap<K, Vec<T>>, GroupingStats)
where
    I: IntoIterator<Item = T>,
    K: Eq + StdHash,
    F: FnMut(&T) -> Option<K>,
{
    let mut buckets: HashMap<K, Vec<T>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for item in items {
        stats.total_items += 1;
        match key_fn(&item) {
            Some(key) => buckets.entry(key).or_default().push(item),
            None => stats.dropped_items += 1,
        }
    }

    stats.distinct_keys = buckets.len();

    let surviving: HashMap<K, Vec<T>> = buckets
        .into_iter()
        .filter(|(_, members)| {
            if members.len() == 1 {
                stats.eliminated_singletons += 1;
                false
            } else {
                stats.surviving_items += members.len();
                stats.surviving_groups += 1;
                true
            }
        })
        .collect();

    (surviving, stats)
}

/// Confirmed duplicate group of files.
///
/// All member files share the same byte size and the same content digest.
/// Invariant: `files.len() >= 2`; singleton buckets are discarded before
/// a group is ever constructed.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// BLAKE3 digest of the shared file content (32 bytes)
    pub digest: Hash,
    /// File size in bytes, shared by all members
    pub size: u64,
    /// The duplicate files
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(digest: Hash, size: u64, files: Vec<FileEntry>) -> Self {
        debug_assert!(files.len() >= 2, "duplicate group needs 2+ members");
        Self {
            digest,
            size,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of redundant copies (total minus one original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as a hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_file(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size)
    }

    #[test]
    fn test_group_empty_input() {
        let files: Vec<FileEntry> = vec![];
        let (groups, stats) = group_with_duplicates(files, |f| Some(f.size));

        assert!(groups.is_empty());
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.distinct_keys, 0);
        assert_eq!(stats.surviving_items, 0);
    }

    #[test]
    fn test_group_all_unique_keys() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 200),
            make_file("/c.txt", 300),
        ];
        let (groups, stats) = group_with_duplicates(files, |f| Some(f.size));

        assert!(groups.is_empty());
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.distinct_keys, 3);
        assert_eq!(stats.eliminated_singletons, 3);
        assert_eq!(stats.surviving_items, 0);
    }

    #[test]
    fn test_group_keeps_shared_keys() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 100),
            make_file("/c.txt", 200),
        ];
        let (groups, stats) = group_with_duplicates(files, |f| Some(f.size));

        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key(&100));
        assert_eq!(groups[&100].len(), 2);

        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.distinct_keys, 2);
        assert_eq!(stats.eliminated_singletons, 1);
        assert_eq!(stats.surviving_items, 2);
        assert_eq!(stats.surviving_groups, 1);
    }

    #[test]
    fn test_group_multiple_groups() {
        let files = vec![
            make_file("/a1.txt", 100),
            make_file("/a2.txt", 100),
            make_file("/b1.txt", 200),
            make_file("/b2.txt", 200),
            make_file("/b3.txt", 200),
            make_file("/c.txt", 300),
        ];
        let (groups, stats) = group_with_duplicates(files, |f| Some(f.size));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&100].len(), 2);
        assert_eq!(groups[&200].len(), 3);

        assert_eq!(stats.eliminated_singletons, 1);
        assert_eq!(stats.surviving_items, 5);
        assert_eq!(stats.surviving_groups, 2);
    }

    #[test]
    fn test_group_drops_none_keys() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 100),
            make_file("/broken.txt", 100),
        ];
        let (groups, stats) = group_with_duplicates(files, |f| {
            if f.path.to_string_lossy().contains("broken") {
                None
            } else {
                Some(f.size)
            }
        });

        assert_eq!(groups[&100].len(), 2);
        assert_eq!(stats.dropped_items, 1);
        assert_eq!(stats.total_items, 3);
    }

    #[test]
    fn test_group_dropped_item_can_leave_singleton() {
        // Two same-size files, one unreadable: the survivor is a singleton
        // and must be discarded by the usual rule.
        let files = vec![make_file("/ok.txt", 100), make_file("/broken.txt", 100)];
        let (groups, stats) = group_with_duplicates(files, |f| {
            if f.path.to_string_lossy().contains("broken") {
                None
            } else {
                Some(f.size)
            }
        });

        assert!(groups.is_empty());
        assert_eq!(stats.dropped_items, 1);
        assert_eq!(stats.eliminated_singletons, 1);
    }

    #[test]
    fn test_group_works_with_string_keys() {
        // The primitive is generic; the digest pass keys by Hash the same way
        let items = vec!["one", "two", "three", "four"];
        let (groups, _) = group_with_duplicates(items, |s| Some(s.len()));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&3].len(), 2);
    }

    #[test]
    fn test_elimination_rate() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 100),
            make_file("/c.txt", 200),
            make_file("/d.txt", 300),
        ];
        let (_, stats) = group_with_duplicates(files, |f| Some(f.size));

        // 2 of 4 keyed items eliminated
        assert!((stats.elimination_rate() - 50.0).abs() < 0.1);
    }

    #[test]
    fn test_elimination_rate_empty() {
        let stats = GroupingStats::default();
        assert_eq!(stats.elimination_rate(), 0.0);
    }

    #[test]
    fn test_duplicate_group_accessors() {
        let group = DuplicateGroup::new(
            [0u8; 32],
            1000,
            vec![
                make_file("/a.txt", 1000),
                make_file("/b.txt", 1000),
                make_file("/c.txt", 1000),
            ],
        );

        assert_eq!(group.len(), 3);
        assert_eq!(group.duplicate_count(), 2);
        assert_eq!(group.wasted_space(), 2000);
        assert_eq!(group.paths()[0], PathBuf::from("/a.txt"));
    }

    #[test]
    fn test_duplicate_group_digest_hex() {
        let mut digest = [0u8; 32];
        digest[0] = 0xAB;
        digest[1] = 0xCD;
        digest[31] = 0xEF;

        let group = DuplicateGroup::new(
            digest,
            100,
            vec![make_file("/a.txt", 100), make_file("/b.txt", 100)],
        );
        let hex = group.digest_hex();

        assert!(hex.starts_with("abcd"));
        assert!(hex.ends_with("ef"));
        assert_eq!(hex.len(), 64);
    }
}
