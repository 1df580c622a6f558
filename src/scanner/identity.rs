//! Platform file and filesystem identities.
//!
//! # Overview
//!
//! Two identities are read from file metadata:
//!
//! - [`FileIdentity`]: the (device, inode) pair of a file. It is carried into
//!   the manifest for reporting only and is never used to decide whether two
//!   paths are duplicates.
//! - [`DeviceId`]: the filesystem a directory lives on. The walker compares a
//!   directory's device with its parent's to detect mount boundaries.
//!
//! # Platform Support
//!
//! - **Unix**: Uses `dev`/`ino` from file metadata
//! - **Other**: No identity is available; file identities are zero and mount
//!   boundaries are never detected

use std::fs::Metadata;
use std::path::Path;

/// Identifier of the filesystem (volume) holding a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u64);

/// Platform identity of a file, used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    /// Device holding the file
    pub device: u64,
    /// Inode number (0 where the platform has no inode semantics)
    pub inode: u64,
}

impl FileIdentity {
    /// Read the identity from file metadata.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filedupe::scanner::FileIdentity;
    ///
    /// let meta = std::fs::symlink_metadata("Cargo.toml").unwrap();
    /// let identity = FileIdentity::from_metadata(&meta);
    /// println!("inode {}", identity.inode);
    /// ```
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        }
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Self {
        Self::default()
    }
}

/// Resolves which filesystem a path belongs to.
///
/// The walker only compares identities for equality. Returning `None`
/// means "unknown", which callers treat as "same filesystem".
pub trait FilesystemIdentity: Send + Sync {
    /// Device of the filesystem holding `path`, if it can be determined.
    fn device_of(&self, path: &Path) -> Option<DeviceId>;
}

/// [`FilesystemIdentity`] backed by `stat` on the running platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformFilesystem;

impl FilesystemIdentity for PlatformFilesystem {
    #[cfg(unix)]
    fn device_of(&self, path: &Path) -> Option<DeviceId> {
        use std::os::unix::fs::MetadataExt;
        std::fs::metadata(path).ok().map(|m| DeviceId(m.dev()))
    }

    #[cfg(not(unix))]
    fn device_of(&self, _path: &Path) -> Option<DeviceId> {
        // Volume serial numbers need an open handle on Windows.
        None
    }
}

/// Check whether `dir` sits on a different filesystem than its parent.
///
/// A directory without a parent, or one where either side cannot be
/// resolved, is not a boundary.
pub fn is_mount_boundary(fs: &dyn FilesystemIdentity, dir: &Path) -> bool {
    let Some(parent) = dir.parent() else {
        return false;
    };
    match (fs.device_of(dir), fs.device_of(parent)) {
        (Some(own), Some(parent_dev)) => own != parent_dev,
        _ => false,
    }
}
