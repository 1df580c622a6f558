//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Directory walking with exclusion and mount-boundary pruning
//! - Partial (bounded prefix) and full content hashing with BLAKE3
//! - Platform file and filesystem identities
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//! - [`identity`]: Device/inode identities
//!
//! # Example
//!
//! ```no_run
//! use filedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: 1024, // Only files strictly larger than 1KB
//!     ..Default::default()
//! };
//!
//! let traversal = Walker::new(Path::new("."), config).scan();
//! for record in &traversal.records {
//!     println!("{}: {} bytes", record.path.display(), record.size);
//! }
//! ```

pub mod hasher;
pub mod identity;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use hasher::{hash_to_hex, Digest, Hasher, PARTIAL_DIGEST_BUDGET};
pub use identity::{DeviceId, FileIdentity, FilesystemIdentity, PlatformFilesystem};
pub use walker::{Traversal, Walker};

/// Directory name excluded when no exclusions are configured.
pub const DEFAULT_EXCLUDE: &str = "Backups.backupdb";

/// Default minimum size; files must be strictly larger to be considered.
pub const DEFAULT_MIN_SIZE: u64 = 250_000;

/// A filesystem entry considered for deduplication.
///
/// Created by the walker, enriched with digests by the hashing stages.
/// `size` is read once at traversal time and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File size in bytes at traversal time
    pub size: u64,
    /// Path to the file, as discovered under the scan root
    pub path: PathBuf,
    /// Platform identity (reporting only)
    pub identity: FileIdentity,
    /// Digest of the bounded prefix, set by the partial stage
    pub partial_digest: Option<Digest>,
    /// Digest of the whole file, set by the full stage
    pub full_digest: Option<Digest>,
}

impl FileRecord {
    /// Create a record with no digests computed yet.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, identity: FileIdentity) -> Self {
        Self {
            size,
            path,
            identity,
            partial_digest: None,
            full_digest: None,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Files must be strictly larger than this many bytes.
    pub min_size: u64,

    /// Directory base names pruned from the walk.
    pub excludes: Vec<String>,

    /// Descend into directories on other filesystems.
    pub cross_mounts: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            excludes: vec![DEFAULT_EXCLUDE.to_string()],
            cross_mounts: false,
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// An empty `excludes` list falls back to [`DEFAULT_EXCLUDE`].
    #[must_use]
    pub fn new(min_size: u64, excludes: Vec<String>, cross_mounts: bool) -> Self {
        let excludes = if excludes.is_empty() {
            vec![DEFAULT_EXCLUDE.to_string()]
        } else {
            excludes
        };
        Self {
            min_size,
            excludes,
            cross_mounts,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened.
    #[error("Cannot open {path}: {source}")]
    Open {
        /// File that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A read failed before end of file.
    #[error("Read failed for {path}: {source}")]
    Read {
        /// File that failed to read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
