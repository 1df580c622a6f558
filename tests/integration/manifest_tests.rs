use filedupe::config::Config;
use filedupe::run_with_config;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

struct Line {
    size: u64,
    digest: String,
    inode: u64,
    path: PathBuf,
}

fn parse(manifest: &str) -> Vec<Line> {
    manifest
        .lines()
        .map(|line| {
            let fields: Vec<&str> = line.splitn(4, ' ').collect();
            assert_eq!(fields.len(), 4, "malformed line: {line}");
            Line {
                size: fields[0].parse().unwrap(),
                digest: fields[1].to_string(),
                inode: fields[2].parse().unwrap(),
                path: PathBuf::from(fields[3]),
            }
        })
        .collect()
}

fn config_for(root: &Path, output: &Path) -> Config {
    Config {
        root: root.to_path_buf(),
        output: output.to_path_buf(),
        min_size: 10,
        quiet: true,
        ..Config::default()
    }
}

#[test]
fn test_manifest_for_nested_pair() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir_all(root.join("subdir")).unwrap();
    let content = b"duplicate_content_duplicate_content";
    fs::write(root.join("dupe1.txt"), content).unwrap();
    fs::write(root.join("subdir/dupe2.txt"), content).unwrap();
    fs::write(root.join("lonely.txt"), b"nothing like the others at all").unwrap();

    let output = dir.path().join("dupes.out");
    run_with_config(&config_for(&root, &output)).unwrap();

    let lines = parse(&fs::read_to_string(&output).unwrap());
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.size == content.len() as u64));
    assert_eq!(lines[0].digest, lines[1].digest);
    assert_eq!(lines[0].digest, blake3::hash(content).to_hex().to_string());

    let names: Vec<&str> = lines
        .iter()
        .map(|l| l.path.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, vec!["dupe1.txt", "dupe2.txt"]);
}

#[test]
fn test_manifest_empty_when_no_duplicates() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("file1.txt"), b"content1").unwrap();
    fs::write(root.join("file2.txt"), b"content2").unwrap();

    let output = dir.path().join("dupes.out");
    run_with_config(&config_for(&root, &output)).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_manifest_sorted_and_digests_verify() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();

    for (i, len) in [5000usize, 300, 90_000, 12].iter().enumerate() {
        let content: Vec<u8> = (0..*len).map(|b| (b % 251) as u8 ^ i as u8).collect();
        fs::write(root.join(format!("set{i}_a.bin")), &content).unwrap();
        fs::write(root.join(format!("set{i}_b.bin")), &content).unwrap();
    }

    let output = dir.path().join("dupes.out");
    run_with_config(&config_for(&root, &output)).unwrap();

    let lines = parse(&fs::read_to_string(&output).unwrap());
    assert_eq!(lines.len(), 8);
    assert!(lines.windows(2).all(|w| w[0].size <= w[1].size));

    for line in &lines {
        let bytes = fs::read(&line.path).unwrap();
        assert_eq!(bytes.len() as u64, line.size);
        assert_eq!(line.digest, blake3::hash(&bytes).to_hex().to_string());
    }
}

#[cfg(unix)]
#[test]
fn test_manifest_inode_field() {
    use std::os::unix::fs::MetadataExt;

    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.bin"), b"inode check content").unwrap();
    fs::write(root.join("b.bin"), b"inode check content").unwrap();

    let output = dir.path().join("dupes.out");
    run_with_config(&config_for(&root, &output)).unwrap();

    for line in parse(&fs::read_to_string(&output).unwrap()) {
        assert_eq!(line.inode, fs::metadata(&line.path).unwrap().ino());
    }
}

#[test]
fn test_manifest_overwrites_previous_run() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.bin"), b"first run content").unwrap();
    fs::write(root.join("b.bin"), b"first run content").unwrap();

    let output = dir.path().join("dupes.out");
    let config = config_for(&root, &output);
    run_with_config(&config).unwrap();
    assert_eq!(parse(&fs::read_to_string(&output).unwrap()).len(), 2);

    fs::remove_file(root.join("b.bin")).unwrap();
    run_with_config(&config).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[cfg(target_os = "linux")]
#[test]
fn test_manifest_keeps_non_utf8_path_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    let odd = root.join(OsStr::from_bytes(b"bad\xffname.bin"));
    fs::write(&odd, b"bytes shared by both files").unwrap();
    fs::write(root.join("good.bin"), b"bytes shared by both files").unwrap();

    let output = dir.path().join("dupes.out");
    run_with_config(&config_for(&root, &output)).unwrap();

    let manifest = fs::read(&output).unwrap();
    let lines: Vec<&[u8]> = manifest
        .split(|b| *b == b'\n')
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(lines.len(), 2);

    let expected = odd.as_os_str().as_bytes();
    let line = lines
        .iter()
        .find(|l| l.ends_with(expected))
        .expect("manifest line with the raw path");

    // The path field names the real file, so its digest can be recomputed.
    let digest = line.split(|b| *b == b' ').nth(1).unwrap();
    let content = fs::read(&odd).unwrap();
    assert_eq!(digest, blake3::hash(&content).to_hex().as_bytes());
}
