use filedupe::duplicates::{DuplicateFinder, FinderConfig};
use filedupe::scanner::WalkerConfig;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const PAIR_CONTENT: &[u8] = b"duplicate_content_duplicate_content";

fn finder(min_size: u64) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default().with_walker_config(WalkerConfig::new(min_size, Vec::new(), false)),
    )
}

fn duplicate_paths(finder: &DuplicateFinder, root: &Path) -> BTreeSet<PathBuf> {
    let (sets, _) = finder.find_duplicates(root).unwrap();
    sets.iter().flat_map(|s| s.paths()).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (sets, summary) = finder(0).find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_sets, 0);
    assert_eq!(summary.directories, 1);
}

#[test]
fn test_unique_files_same_size() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("file1.txt"), b"content1").unwrap();
    fs::write(dir.path().join("file2.txt"), b"content2").unwrap();

    // Both are 8 bytes, below the threshold of 10.
    let (sets, summary) = finder(10).find_duplicates(dir.path()).unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);

    // Above the threshold they are hashed but still unique.
    let (sets, summary) = finder(0).find_duplicates(dir.path()).unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.size_candidates, 2);
    assert_eq!(summary.full.input_files, 0);
}

#[test]
fn test_nested_duplicate_pair() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("subdir")).unwrap();
    fs::write(dir.path().join("dupe1.txt"), PAIR_CONTENT).unwrap();
    fs::write(dir.path().join("subdir/dupe2.txt"), PAIR_CONTENT).unwrap();

    let (sets, _) = finder(10).find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, PAIR_CONTENT.len() as u64);
    assert_eq!(sets[0].len(), 2);
    assert_eq!(sets[0].full_digest, *blake3::hash(PAIR_CONTENT).as_bytes());
}

#[test]
fn test_same_size_different_content_excluded() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("subdir")).unwrap();
    fs::write(dir.path().join("dupe1.txt"), PAIR_CONTENT).unwrap();
    fs::write(dir.path().join("subdir/dupe2.txt"), PAIR_CONTENT).unwrap();
    let odd = dir.path().join("same_size.txt");
    fs::write(&odd, b"different_content_of_the_same_size!").unwrap();
    assert_eq!(fs::metadata(&odd).unwrap().len(), PAIR_CONTENT.len() as u64);

    let paths = duplicate_paths(&finder(10), dir.path());

    assert_eq!(paths.len(), 2);
    assert!(!paths.contains(&odd));
}

#[test]
fn test_threshold_is_strict() {
    let dir = tempdir().unwrap();
    let threshold = 20u64;

    let at = vec![b'a'; threshold as usize];
    let above = vec![b'b'; threshold as usize + 1];
    fs::write(dir.path().join("at_1"), &at).unwrap();
    fs::write(dir.path().join("at_2"), &at).unwrap();
    fs::write(dir.path().join("above_1"), &above).unwrap();
    fs::write(dir.path().join("above_2"), &above).unwrap();

    let (sets, summary) = finder(threshold).find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, threshold + 1);
}

#[test]
fn test_shared_prefix_not_paired() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"prefix-prefix-AAAA").unwrap();
    fs::write(dir.path().join("b"), b"prefix-prefix-BBBB").unwrap();

    let config = FinderConfig::default()
        .with_partial_budget(8)
        .with_walker_config(WalkerConfig::new(0, Vec::new(), false));
    let (sets, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.partial.surviving_files, 2);
    assert_eq!(summary.full.hashed_files, 2);
}

#[test]
fn test_repeated_runs_agree() {
    let dir = tempdir().unwrap();
    for group in 0..5 {
        for copy in 0..3 {
            let sub = dir.path().join(format!("d{copy}"));
            fs::create_dir_all(&sub).unwrap();
            fs::write(
                sub.join(format!("g{group}.bin")),
                format!("group {group} payload").repeat(group + 1),
            )
            .unwrap();
        }
    }

    let single = DuplicateFinder::new(
        FinderConfig::default()
            .with_pool_capacity(1)
            .with_walker_config(WalkerConfig::new(0, Vec::new(), false)),
    );
    let wide = DuplicateFinder::new(
        FinderConfig::default()
            .with_pool_capacity(8)
            .with_walker_config(WalkerConfig::new(0, Vec::new(), false)),
    );

    let first = duplicate_paths(&single, dir.path());
    let second = duplicate_paths(&wide, dir.path());
    let third = duplicate_paths(&wide, dir.path());

    assert_eq!(first.len(), 15);
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_root_that_is_a_file_is_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();

    assert!(finder(0).find_duplicates(&file).is_err());
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("real.txt"), PAIR_CONTENT).unwrap();
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("alias.txt")).unwrap();

    let (sets, summary) = finder(0).find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}
