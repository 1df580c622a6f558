//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! The [`Hasher`] computes two digests per file:
//!
//! - **Partial digest**: over at most [`PARTIAL_DIGEST_BUDGET`] bytes from the
//!   start of the file (the whole file if it is shorter)
//! - **Full digest**: over the entire file content
//!
//! Both read through a fixed-size buffer, so memory use per file is bounded
//! regardless of file size. Any open or read failure is returned as a
//! [`HashError`]; reads are never retried.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;

/// A 32-byte BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Byte budget for the partial digest (80 KiB).
pub const PARTIAL_DIGEST_BUDGET: u64 = 80 * 1024;

/// Read buffer size (8 KiB).
const BUFFER_SIZE: usize = 8 * 1024;

/// Render a digest as lowercase hex.
///
/// # Example
///
/// ```
/// use filedupe::scanner::hash_to_hex;
///
/// let hex = hash_to_hex(&[0u8; 32]);
/// assert_eq!(hex.len(), 64);
/// assert!(hex.chars().all(|c| c == '0'));
/// ```
#[must_use]
pub fn hash_to_hex(digest: &Digest) -> String {
    blake3::Hash::from(*digest).to_hex().to_string()
}

/// Streaming BLAKE3 file hasher.
#[derive(Debug, Clone, Copy)]
pub struct Hasher {
    partial_budget: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default partial budget.
    #[must_use]
    pub fn new() -> Self {
        Self {
            partial_budget: PARTIAL_DIGEST_BUDGET,
        }
    }

    /// Create a hasher with a custom partial budget (at least one byte).
    #[must_use]
    pub fn with_partial_budget(budget: u64) -> Self {
        Self {
            partial_budget: budget.max(1),
        }
    }

    /// Bytes read for a partial digest.
    #[must_use]
    pub fn partial_budget(&self) -> u64 {
        self.partial_budget
    }

    /// Digest of the first `partial_budget` bytes of the file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails.
    pub fn partial_digest(&self, path: &Path) -> Result<Digest, HashError> {
        let file = open(path)?;
        digest_reader(file.take(self.partial_budget), path)
    }

    /// Digest of the entire file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails.
    pub fn full_digest(&self, path: &Path) -> Result<Digest, HashError> {
        let file = open(path)?;
        digest_reader(file, path)
    }
}

fn open(path: &Path) -> Result<File, HashError> {
    File::open(path).map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Hash everything `reader` yields until a clean end of stream.
///
/// `Interrupted` is treated like any other failure.
fn digest_reader<R: Read>(mut reader: R, path: &Path) -> Result<Digest, HashError> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(source) => {
                log::trace!(
                    "Read failed ({:?}) for {}",
                    source.kind(),
                    path.display()
                );
                return Err(HashError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    Ok(*hasher.finalize().as_bytes())
}
