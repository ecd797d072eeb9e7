//! End-to-end pipeline tests through the public finder API.

use dupescout::duplicates::{DuplicateFinder, FinderConfig};
use dupescout::output::{inverse_text, DuplicateReport, ReportOptions};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

fn set_mtime(path: &Path, secs: i64) {
    filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(secs, 0)).unwrap();
}

fn scan(root: &Path) -> dupescout::duplicates::ScanOutcome {
    DuplicateFinder::new(FinderConfig::new(vec![root.to_path_buf()]))
        .scan()
        .unwrap()
}

#[test]
fn test_two_identical_one_different() {
    // Files `a` and `b` share content "x"; `c` has "y" at the same size.
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"x");
    let b = write_file(dir.path(), "b", b"x");
    let c = write_file(dir.path(), "c", b"y");
    set_mtime(&a, 1_000);
    set_mtime(&b, 2_000);

    let outcome = scan(dir.path());

    assert_eq!(outcome.groups.len(), 1);
    let group = &outcome.groups[0];
    assert_eq!(group.size, 1);
    let members: Vec<_> = group.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(members, vec![a, b], "older member first");
    assert_eq!(group.redundant_bytes(), 1);
    assert_eq!(group.reclaimable_bytes(), 1);

    // `c` shows up only in the inverse set.
    assert_eq!(outcome.unique, vec![c]);
}

#[test]
fn test_ignore_empty_moves_empty_files_to_inverse() {
    let dir = tempdir().unwrap();
    let e1 = write_file(dir.path(), "empty1", b"");
    let e2 = write_file(dir.path(), "empty2", b"");

    let config = FinderConfig::new(vec![dir.path().to_path_buf()]).with_ignore_empty(true);
    let outcome = DuplicateFinder::new(config).scan().unwrap();

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.unique, vec![e1, e2]);
}

#[test]
fn test_empty_files_are_duplicates_by_default() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let outcome = scan(dir.path());

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].size, 0);
    assert_eq!(outcome.groups[0].redundant_bytes(), 0);
}

#[test]
fn test_ignored_directory_hides_duplicates() {
    let dir = tempdir().unwrap();
    let outside = write_file(dir.path(), "outside", b"payload");
    let cache = dir.path().join("cache");
    fs::create_dir(&cache).unwrap();
    write_file(&cache, "inside", b"payload");

    let config = FinderConfig::new(vec![dir.path().to_path_buf()])
        .with_ignore_dirs([OsString::from("cache")]);
    let outcome = DuplicateFinder::new(config).scan().unwrap();

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.unique, vec![outside]);
}

#[test]
fn test_duplicates_across_roots() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    write_file(dir_a.path(), "one", b"cross-root content");
    write_file(dir_b.path(), "two", b"cross-root content");

    let config = FinderConfig::new(vec![
        dir_a.path().to_path_buf(),
        dir_b.path().to_path_buf(),
    ]);
    let outcome = DuplicateFinder::new(config).scan().unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].len(), 2);
}

#[test]
fn test_missing_root_counts_as_warning() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "present", b"data");
    let missing = dir.path().join("not-here");

    let config = FinderConfig::new(vec![dir.path().to_path_buf(), missing.clone()]);
    let outcome = DuplicateFinder::new(config).scan().unwrap();
    assert_eq!(outcome.stats.walk_warnings, 1);
    assert!(outcome.stats.had_warnings());

    let config =
        FinderConfig::new(vec![dir.path().to_path_buf(), missing]).with_ignore_missing(true);
    let outcome = DuplicateFinder::new(config).scan().unwrap();
    assert_eq!(outcome.stats.walk_warnings, 0);
    assert!(!outcome.stats.had_warnings());
}

#[cfg(unix)]
#[test]
fn test_symlinks_never_appear_in_any_output() {
    let dir = tempdir().unwrap();
    let target = write_file(dir.path(), "target", b"linked content");
    write_file(dir.path(), "copy", b"linked content");
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    // Descendant symlink: skipped silently.
    let outcome = scan(dir.path());
    assert_eq!(outcome.groups.len(), 1);
    for group in &outcome.groups {
        assert!(group.files.iter().all(|f| f.path != link));
    }
    assert!(!outcome.unique.contains(&link));
    assert_eq!(outcome.stats.walk_warnings, 0);

    // Symlink as an explicit root: warned about, still never reported.
    let config = FinderConfig::new(vec![link.clone()]);
    let outcome = DuplicateFinder::new(config).scan().unwrap();
    assert!(outcome.groups.is_empty());
    assert!(outcome.unique.is_empty());
    assert_eq!(outcome.stats.walk_warnings, 1);
}

#[test]
fn test_completeness_partition() {
    // Every candidate lands in exactly one of: a duplicate group, the
    // inverse set.
    let dir = tempdir().unwrap();
    let mut all = vec![
        write_file(dir.path(), "dup1", b"pair"),
        write_file(dir.path(), "dup2", b"pair"),
        write_file(dir.path(), "solo1", b"alone"),
        write_file(dir.path(), "solo2", b"also alone"),
        write_file(dir.path(), "trip1", b"three of us"),
        write_file(dir.path(), "trip2", b"three of us"),
        write_file(dir.path(), "trip3", b"three of us"),
    ];
    all.sort();

    let outcome = scan(dir.path());

    let mut reported: Vec<PathBuf> = outcome
        .groups
        .iter()
        .flat_map(|g| g.files.iter().map(|f| f.path.clone()))
        .chain(outcome.unique.iter().cloned())
        .collect();
    let total = reported.len();
    reported.sort();
    reported.dedup();
    assert_eq!(reported.len(), total, "no path reported twice");
    assert_eq!(reported, all, "every candidate reported exactly once");
}

#[test]
fn test_group_validity() {
    let dir = tempdir().unwrap();
    for i in 0..3 {
        write_file(dir.path(), &format!("m{i}"), b"mirrored");
    }
    write_file(dir.path(), "other", b"mirrorex");

    let outcome = scan(dir.path());

    for group in &outcome.groups {
        assert!(group.len() >= 2);
        for file in &group.files {
            assert_eq!(file.size, group.size);
            assert_eq!(file.full, Some(group.digest));
        }
    }
}

#[test]
fn test_rendered_output_is_deterministic() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write_file(dir.path(), &format!("a{i}"), b"first group");
    }
    for i in 0..2 {
        write_file(dir.path(), &format!("b{i}"), b"second, longer group!");
    }
    write_file(dir.path(), "unique", b"one of a kind");

    let render = || {
        let outcome = scan(dir.path());
        let report = DuplicateReport::new(&outcome.groups, ReportOptions::default());
        (report.to_text(), inverse_text(&outcome.unique))
    };

    assert_eq!(render(), render());
}
