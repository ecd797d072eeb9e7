use dupescout::duplicates::{DuplicateFinder, FinderConfig};
use dupescout::scanner::Hasher;
use proptest::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Small pool of contents so generated trees actually contain duplicates.
const CONTENTS: &[&[u8]] = &[
    b"",
    b"a",
    b"bb",
    b"same size",
    b"same-size",
    b"a noticeably longer payload for the bigger buckets",
];

proptest! {
    #[test]
    fn test_hash_determinism(content in "\\PC*") {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, content.as_bytes()).unwrap();

        let hasher = Hasher::new();
        prop_assert_eq!(
            hasher.full_hash(&path).unwrap(),
            hasher.full_hash(&path).unwrap()
        );
    }

    #[test]
    fn test_prehash_agrees_with_full_hash_for_short_content(content in "\\PC*") {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, content.as_bytes()).unwrap();

        let hasher = Hasher::new();
        if content.len() <= 4096 {
            prop_assert_eq!(
                hasher.prehash(&path).unwrap(),
                hasher.full_hash(&path).unwrap()
            );
        }
    }

    #[test]
    fn test_duplicates_and_inverse_partition_the_candidates(
        picks in prop::collection::vec(0..CONTENTS.len(), 0..12)
    ) {
        let dir = TempDir::new().unwrap();
        let mut created: Vec<PathBuf> = Vec::new();
        for (i, &pick) in picks.iter().enumerate() {
            let path = dir.path().join(format!("f{i:02}.dat"));
            fs::write(&path, CONTENTS[pick]).unwrap();
            created.push(path);
        }
        created.sort();

        let config = FinderConfig::new(vec![dir.path().to_path_buf()]);
        let outcome = DuplicateFinder::new(config).scan().unwrap();

        // Every group holds 2+ files of one size and one digest.
        for group in &outcome.groups {
            prop_assert!(group.len() >= 2);
            for file in &group.files {
                prop_assert_eq!(file.size, group.size);
                prop_assert_eq!(file.full, Some(group.digest));
            }
        }

        // Grouped paths and inverse paths partition the candidate set.
        let grouped: Vec<PathBuf> = outcome
            .groups
            .iter()
            .flat_map(|g| g.files.iter().map(|f| f.path.clone()))
            .collect();
        let grouped_set: HashSet<&PathBuf> = grouped.iter().collect();
        for path in &outcome.unique {
            prop_assert!(!grouped_set.contains(path));
        }

        let mut reported: Vec<PathBuf> = grouped;
        reported.extend(outcome.unique.iter().cloned());
        reported.sort();
        prop_assert_eq!(reported, created);
    }

    #[test]
    fn test_rescan_produces_identical_groups(
        picks in prop::collection::vec(0..CONTENTS.len(), 0..8)
    ) {
        let dir = TempDir::new().unwrap();
        for (i, &pick) in picks.iter().enumerate() {
            fs::write(dir.path().join(format!("f{i:02}")), CONTENTS[pick]).unwrap();
        }

        let scan = || {
            let config = FinderConfig::new(vec![dir.path().to_path_buf()]);
            let outcome = DuplicateFinder::new(config).scan().unwrap();
            outcome
                .groups
                .iter()
                .map(|g| {
                    (
                        g.digest,
                        g.files.iter().map(|f| f.path.clone()).collect::<Vec<_>>(),
                    )
                })
                .collect::<Vec<_>>()
        };

        prop_assert_eq!(scan(), scan());
    }
}
