//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting [`FileRecord`]s for duplicate detection.
//!
//! # Features
//!
//! - Pruning of directories by base name (exclusion list)
//! - Pruning of directories on other filesystems (mount boundaries)
//! - Strict size threshold: only files larger than `min_size` are recorded
//! - Only regular files are recorded; symlinks are never followed
//! - Errors are collected and logged, and the affected subtree is skipped
//!
//! # Example
//!
//! ```no_run
//! use filedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::new(1024, vec!["node_modules".to_string()], false);
//! let traversal = Walker::new(Path::new("/home/user/Downloads"), config).scan();
//!
//! println!(
//!     "{} files in {} directories ({} errors)",
//!     traversal.records.len(),
//!     traversal.directories,
//!     traversal.errors.len()
//! );
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::identity::{is_mount_boundary, FileIdentity, FilesystemIdentity, PlatformFilesystem};
use super::{FileRecord, ScanError, WalkerConfig};
use crate::progress::{ProgressCallback, PHASE_WALKING};

/// Result of walking a directory tree.
#[derive(Debug, Default)]
pub struct Traversal {
    /// Regular files above the size threshold
    pub records: Vec<FileRecord>,
    /// Directories visited (root included, pruned directories excluded)
    pub directories: usize,
    /// Non-fatal errors; the affected path or subtree was skipped
    pub errors: Vec<ScanError>,
}

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Resolves filesystem identities for mount-boundary checks
    filesystem: Arc<dyn FilesystemIdentity>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish_non_exhaustive()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filedupe::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            filesystem: Arc::new(PlatformFilesystem),
            progress_callback: None,
        }
    }

    /// Replace the filesystem identity used for mount-boundary checks.
    #[must_use]
    pub fn with_filesystem_identity(mut self, filesystem: Arc<dyn FilesystemIdentity>) -> Self {
        self.filesystem = filesystem;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check that the root exists and is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`], [`ScanError::NotADirectory`] or the
    /// underlying I/O error.
    pub fn validate_root(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) => Err(handle_io_error(&self.root, e)),
        }
    }

    /// Check if a directory entry should be pruned with its whole subtree.
    fn should_prune(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        if self.config.excludes.iter().any(|e| *e == name) {
            log::debug!("Excluding directory: {}", entry.path().display());
            return true;
        }

        if !self.config.cross_mounts && is_mount_boundary(self.filesystem.as_ref(), entry.path())
        {
            log::debug!("Not crossing mount point: {}", entry.path().display());
            return true;
        }

        false
    }

    /// Walk the directory tree and collect file records.
    ///
    /// Errors never stop the walk; they are logged, collected in
    /// [`Traversal::errors`], and the affected path is skipped.
    #[must_use]
    pub fn scan(&self) -> Traversal {
        let mut traversal = Traversal::default();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.should_prune(entry));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        traversal.directories += 1;
                        continue;
                    }
                    if !file_type.is_file() {
                        log::trace!("Skipping non-regular file: {}", entry.path().display());
                        continue;
                    }
                    match self.process_file_entry(&entry) {
                        Some(Ok(record)) => {
                            traversal.records.push(record);
                            if let Some(ref callback) = self.progress_callback {
                                callback.on_progress(
                                    traversal.records.len(),
                                    entry.path().to_string_lossy().as_ref(),
                                );
                            }
                        }
                        Some(Err(e)) => traversal.errors.push(e),
                        None => {}
                    }
                }
                Err(e) => traversal.errors.push(handle_walk_error(e)),
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        log::debug!(
            "Walk of {} complete: {} files, {} directories, {} errors",
            self.root.display(),
            traversal.records.len(),
            traversal.directories,
            traversal.errors.len()
        );

        traversal
    }

    /// Create a FileRecord if the entry passes the size threshold.
    fn process_file_entry(&self, entry: &DirEntry) -> Option<Result<FileRecord, ScanError>> {
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(handle_walk_error(e))),
        };

        let size = metadata.len();
        if size <= self.config.min_size {
            log::trace!(
                "Skipping file at or below threshold ({}): {}",
                size,
                entry.path().display()
            );
            return None;
        }

        Some(Ok(FileRecord::new(
            entry.path().to_path_buf(),
            size,
            FileIdentity::from_metadata(&metadata),
        )))
    }
}

/// Classify an I/O error for a path.
fn handle_io_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => {
            log::warn!("Permission denied: {}", path.display());
            ScanError::PermissionDenied(path.to_path_buf())
        }
        ErrorKind::NotFound => {
            log::warn!("Path not found (may have been deleted): {}", path.display());
            ScanError::NotFound(path.to_path_buf())
        }
        _ => {
            log::warn!("I/O error for {}: {}", path.display(), error);
            ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}

/// Convert a walkdir error, keeping the underlying I/O error when present.
fn handle_walk_error(error: walkdir::Error) -> ScanError {
    let path = error.path().map(Path::to_path_buf).unwrap_or_default();
    let message = error.to_string();
    match error.into_io_error() {
        Some(io) => handle_io_error(&path, io),
        None => {
            log::warn!("Walker error for {}: {}", path.display(), message);
            ScanError::Io {
                path,
                source: std::io::Error::other(message),
            }
        }
    }
}
