//! Plain-text duplicate manifest.
//!
//! One line per duplicate file, fields separated by a single space:
//!
//! ```text
//! <size> <full-digest hex> <inode> <path>
//! ```
//!
//! Lines are sorted ascending by size. There is no header and no trailing
//! summary. Members of one duplicate set are written next to each other.
//!
//! # Example
//!
//! ```no_run
//! use filedupe::duplicates::DuplicateFinder;
//! use filedupe::output::ManifestWriter;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, _) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! ManifestWriter::new(&sets).write_file(Path::new("dupes.out")).unwrap();
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::DuplicateSet;
use crate::scanner::FileRecord;

/// Errors that can occur while writing the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The destination could not be created.
    #[error("Cannot create manifest {path}: {source}")]
    Create {
        /// Manifest path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing to the destination failed.
    #[error("Failed writing manifest {path}: {source}")]
    Write {
        /// Manifest path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Serializes confirmed duplicates as a size-sorted manifest.
#[derive(Debug)]
pub struct ManifestWriter<'a> {
    records: Vec<(&'a DuplicateSet, &'a FileRecord)>,
}

impl<'a> ManifestWriter<'a> {
    /// Flatten the sets into records ordered by size.
    ///
    /// Sets of equal size are ordered by digest and members by path, so
    /// the same duplicates always produce the same manifest.
    #[must_use]
    pub fn new(sets: &'a [DuplicateSet]) -> Self {
        let mut ordered: Vec<&DuplicateSet> = sets.iter().collect();
        ordered.sort_by(|a, b| a.size.cmp(&b.size).then(a.full_digest.cmp(&b.full_digest)));

        let mut records = Vec::with_capacity(ordered.iter().map(|s| s.len()).sum());
        for set in ordered {
            let mut files: Vec<&FileRecord> = set.files.iter().collect();
            files.sort_by(|a, b| a.path.cmp(&b.path));
            records.extend(files.into_iter().map(|f| (set, f)));
        }

        Self { records }
    }

    /// Number of lines the manifest will contain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the manifest has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the manifest lines to `writer`.
    ///
    /// Paths are written as their raw bytes on unix, so names that are not
    /// valid UTF-8 still name the real file.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error reported by the writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (set, file) in &self.records {
            write!(
                writer,
                "{} {} {} ",
                file.size,
                set.hash_hex(),
                file.identity.inode
            )?;
            write_path(&mut writer, &file.path)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    /// Create (or truncate) `path` and write the manifest into it.
    ///
    /// Lines written before a failure stay on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Create`] if the file cannot be created and
    /// [`ManifestError::Write`] if a write fails.
    pub fn write_file(&self, path: &Path) -> Result<(), ManifestError> {
        let file = File::create(path).map_err(|source| ManifestError::Create {
            path: path.to_path_buf(),
            source,
        })?;

        self.write_to(BufWriter::new(file))
            .map_err(|source| ManifestError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("Wrote {} manifest lines to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    writer.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    write!(writer, "{}", path.display())
}
