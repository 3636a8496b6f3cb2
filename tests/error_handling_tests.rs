//! Error handling: per-file failures stay local, only a bad root is fatal.

use dupedetective::duplicates::{DuplicateFinder, FinderError};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    let mut f = File::create(path).unwrap();
    f.write_all(content).unwrap();
}

#[test]
fn test_missing_root_is_fatal() {
    let finder = DuplicateFinder::with_defaults();
    let err = finder
        .find_duplicates(Path::new("/no/such/root/path/412345"))
        .unwrap_err();

    assert!(matches!(err, FinderError::RootNotFound(_)));
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    write_file(&file, b"I am not a directory");

    let finder = DuplicateFinder::with_defaults();
    let err = finder.find_duplicates(&file).unwrap_err();

    assert!(matches!(err, FinderError::RootNotADirectory(_)));
}

#[test]
#[cfg(unix)]
fn test_unreadable_file_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"readable pair");
    write_file(&dir.path().join("b.txt"), b"readable pair");

    // Same size as the pair so it lands in their bucket, then becomes
    // unreadable before the digest pass
    let locked = dir.path().join("locked.txt");
    write_file(&locked, b"readable-pair");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits are not enforced for root
    if File::open(&locked).is_ok() {
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(summary.hash_failures, 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
}

#[test]
#[cfg(unix)]
fn test_unreadable_survivor_leaves_no_singleton_group() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write_file(&dir.path().join("ok.txt"), b"only two here");

    let locked = dir.path().join("locked.txt");
    write_file(&locked, b"only two here");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    if File::open(&locked).is_ok() {
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();

    // The drop reduced the bucket to one member, discarded as everywhere
    assert!(groups.is_empty());
    assert_eq!(summary.hash_failures, 1);
    assert!(summary.has_errors());
}

#[test]
#[cfg(unix)]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"pair outside");
    write_file(&dir.path().join("b.txt"), b"pair outside");

    let closed = dir.path().join("closed");
    std::fs::create_dir(&closed).unwrap();
    write_file(&closed.join("hidden.txt"), b"pair outside");
    std::fs::set_permissions(&closed, std::fs::Permissions::from_mode(0o000)).unwrap();

    if std::fs::read_dir(&closed).is_ok() {
        std::fs::set_permissions(&closed, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(dir.path());

    std::fs::set_permissions(&closed, std::fs::Permissions::from_mode(0o755)).unwrap();

    // The scan completes; the unreadable subtree is simply absent
    let (groups, _) = result.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
}
