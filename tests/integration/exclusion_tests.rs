use filedupe::duplicates::{DuplicateFinder, FinderConfig};
use filedupe::scanner::{DeviceId, FilesystemIdentity, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn finder(config: WalkerConfig) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_walker_config(config))
}

/// Reports every path under `mount` as living on another device.
struct FakeMount {
    mount: PathBuf,
}

impl FilesystemIdentity for FakeMount {
    fn device_of(&self, path: &Path) -> Option<DeviceId> {
        if path.starts_with(&self.mount) {
            Some(DeviceId(2))
        } else {
            Some(DeviceId(1))
        }
    }
}

#[test]
fn test_default_exclusion_prunes_nested_duplicates() {
    let dir = tempdir().unwrap();
    let backup = dir.path().join("deep/Backups.backupdb/2024");
    fs::create_dir_all(&backup).unwrap();
    fs::write(backup.join("copy1.bin"), b"backup payload").unwrap();
    fs::write(backup.join("copy2.bin"), b"backup payload").unwrap();
    fs::write(dir.path().join("keep1.bin"), b"kept payload!!").unwrap();
    fs::write(dir.path().join("keep2.bin"), b"kept payload!!").unwrap();

    let (sets, summary) = finder(WalkerConfig::default())
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert!(sets[0]
        .files
        .iter()
        .all(|f| !f.path.to_string_lossy().contains("Backups.backupdb")));
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_custom_exclusions_replace_default() {
    let dir = tempdir().unwrap();
    for name in ["Backups.backupdb", "cache", "data"] {
        let sub = dir.path().join(name);
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("x.bin"), b"shared bytes").unwrap();
    }

    let config = WalkerConfig::new(0, vec!["cache".to_string()], false);
    let (sets, _) = finder(config).find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    let mut names: Vec<String> = sets[0]
        .files
        .iter()
        .map(|f| {
            f.path
                .parent()
                .unwrap()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    assert_eq!(names, vec!["Backups.backupdb", "data"]);
}

#[test]
fn test_exclusion_matches_whole_name_only() {
    let dir = tempdir().unwrap();
    for name in ["cache", "cache_old", "my-cache"] {
        let sub = dir.path().join(name);
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("x.bin"), b"shared bytes").unwrap();
    }

    let config = WalkerConfig::new(0, vec!["cache".to_string()], false);
    let (sets, _) = finder(config).find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
}

#[test]
fn test_excluded_root_is_still_scanned() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Backups.backupdb");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a"), b"root level dupe").unwrap();
    fs::write(root.join("b"), b"root level dupe").unwrap();

    let (sets, _) = finder(WalkerConfig::default())
        .find_duplicates(&root)
        .unwrap();

    assert_eq!(sets.len(), 1);
}

#[test]
fn test_mount_boundary_not_crossed() {
    let dir = tempdir().unwrap();
    let mount = dir.path().join("mnt");
    fs::create_dir(&mount).unwrap();
    fs::write(mount.join("far.bin"), b"mounted dupes").unwrap();
    fs::write(dir.path().join("near.bin"), b"mounted dupes").unwrap();

    let fake: Arc<dyn FilesystemIdentity> = Arc::new(FakeMount {
        mount: mount.clone(),
    });

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::new(0, Vec::new(), false))
        .with_filesystem_identity(fake.clone());
    let (sets, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);

    let crossing = FinderConfig::default()
        .with_walker_config(WalkerConfig::new(0, Vec::new(), true))
        .with_filesystem_identity(fake);
    let (sets, _) = DuplicateFinder::new(crossing)
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(sets.len(), 1);
}
