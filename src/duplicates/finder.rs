//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: Collect file records (see [`crate::scanner::walker`])
//! 2. **Phase 1 - Size grouping**: Group files by size (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Partial hash**: Hash a bounded prefix of same-size files
//! 4. **Phase 3 - Full hash**: Hash entire content of partial-hash matches
//!
//! Phases 2 and 3 share one bounded worker pool ([`HashPool`]). Each worker
//! owns the record it is hashing and hands it back to the coordinating thread
//! together with the result, so no collection is shared between workers.
//!
//! A file that cannot be opened or read during either phase is dropped from
//! consideration. It is counted in [`StageStats::failed_files`] and never
//! reported as a duplicate.
//!
//! # Example
//!
//! ```no_run
//! use filedupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_pool_capacity(4));
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("{} duplicate sets, {} reclaimable", sets.len(), summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_size, DuplicateSet};
use crate::progress::{ProgressCallback, PHASE_FULL, PHASE_PARTIAL};
use crate::scanner::{
    Digest, FileRecord, FilesystemIdentity, HashError, Hasher, ScanError, Walker, WalkerConfig,
    PARTIAL_DIGEST_BUDGET,
};

/// Default number of concurrent hashing workers.
pub const DEFAULT_POOL_CAPACITY: usize = 8;

/// Bounded worker pool shared by the hashing phases.
///
/// At most `capacity` files are open and being read at any time,
/// however many files a single group holds.
pub struct HashPool {
    pool: rayon::ThreadPool,
    capacity: usize,
}

impl std::fmt::Debug for HashPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashPool")
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl HashPool {
    /// Build a pool with `capacity` worker threads (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if the threads cannot be spawned.
    pub fn new(capacity: usize) -> Result<Self, FinderError> {
        let capacity = capacity.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(capacity)
            .thread_name(|i| format!("filedupe-hash-{i}"))
            .build()?;
        Ok(Self { pool, capacity })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hash every record on the pool and wait for all of them.
    ///
    /// Each record moves into the worker that hashes it and comes back
    /// paired with its result. Output order is not meaningful.
    pub fn run_stage<F>(
        &self,
        phase: &str,
        files: Vec<FileRecord>,
        progress: Option<&Arc<dyn ProgressCallback>>,
        digest: F,
    ) -> Vec<(FileRecord, Result<Digest, HashError>)>
    where
        F: Fn(&Path) -> Result<Digest, HashError> + Sync,
    {
        if let Some(callback) = progress {
            callback.on_phase_start(phase, files.len());
        }

        let completed = AtomicUsize::new(0);
        let results = self.pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    let result = digest(&file.path);
                    if let Some(callback) = progress {
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(done, file.path.to_string_lossy().as_ref());
                    }
                    (file, result)
                })
                .collect()
        });

        if let Some(callback) = progress {
            callback.on_phase_end(phase);
        }

        results
    }
}

/// Statistics from one hashing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Files that entered the phase
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files dropped because they could not be opened or read
    pub failed_files: usize,
    /// Files dropped because no other file shared their digest
    pub unique_files: usize,
    /// Groups of 2+ files that survived the phase
    pub groups: usize,
    /// Files in the surviving groups
    pub surviving_files: usize,
}

impl StageStats {
    /// Percentage of input files eliminated by this phase.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let eliminated = self.input_files - self.surviving_files;
            (eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Key of a partial-digest group: (size, partial digest).
pub type PartialKey = (u64, Digest);

/// Collect stage results into groups, dropping failures and singletons.
fn collect_groups<K, F>(
    results: Vec<(FileRecord, Result<Digest, HashError>)>,
    mut key: F,
    stats: &mut StageStats,
) -> HashMap<K, Vec<FileRecord>>
where
    K: std::hash::Hash + Eq,
    F: FnMut(&mut FileRecord, Digest) -> K,
{
    let mut groups: HashMap<K, Vec<FileRecord>> = HashMap::new();

    for (mut file, result) in results {
        match result {
            Ok(digest) => {
                stats.hashed_files += 1;
                let k = key(&mut file, digest);
                groups.entry(k).or_default().push(file);
            }
            Err(e) => {
                stats.failed_files += 1;
                log::debug!("Dropping unreadable file: {}", e);
            }
        }
    }

    groups.retain(|_, files| {
        if files.len() < 2 {
            stats.unique_files += files.len();
            false
        } else {
            stats.groups += 1;
            stats.surviving_files += files.len();
            true
        }
    });

    groups
}

/// Group same-size files by partial digest (Phase 2).
///
/// Only files from size groups of 2+ should be passed in; singleton size
/// groups must never be hashed.
///
/// # Returns
///
/// Files grouped by (size, partial digest), only groups with 2+ files,
/// and statistics about the phase.
#[must_use]
pub fn phase2_partial(
    size_groups: HashMap<u64, Vec<FileRecord>>,
    hasher: &Hasher,
    pool: &HashPool,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> (HashMap<PartialKey, Vec<FileRecord>>, StageStats) {
    let files: Vec<FileRecord> = size_groups.into_values().flatten().collect();
    let mut stats = StageStats {
        input_files: files.len(),
        ..Default::default()
    };

    if files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (HashMap::new(), stats);
    }

    log::info!("Phase 2: Computing partial digests for {} files", files.len());

    let results = pool.run_stage(PHASE_PARTIAL, files, progress, |path| {
        hasher.partial_digest(path)
    });

    let groups = collect_groups(
        results,
        |file, digest| {
            file.partial_digest = Some(digest);
            (file.size, digest)
        },
        &mut stats,
    );

    log::info!(
        "Phase 2 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.input_files,
        stats.surviving_files,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Confirm duplicates by full digest (Phase 3).
///
/// # Returns
///
/// Confirmed duplicate sets and statistics about the phase.
#[must_use]
pub fn phase3_full(
    partial_groups: HashMap<PartialKey, Vec<FileRecord>>,
    hasher: &Hasher,
    pool: &HashPool,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> (Vec<DuplicateSet>, StageStats) {
    let files: Vec<FileRecord> = partial_groups.into_values().flatten().collect();
    let mut stats = StageStats {
        input_files: files.len(),
        ..Default::default()
    };

    if files.is_empty() {
        log::debug!("Phase 3: No files to process");
        return (Vec::new(), stats);
    }

    log::info!("Phase 3: Computing full digests for {} files", files.len());

    let results = pool.run_stage(PHASE_FULL, files, progress, |path| hasher.full_digest(path));

    let groups = collect_groups(
        results,
        |file, digest| {
            file.full_digest = Some(digest);
            // Partial digest is always set for records reaching this phase.
            (file.size, file.partial_digest.unwrap_or_default(), digest)
        },
        &mut stats,
    );

    let sets: Vec<DuplicateSet> = groups
        .into_iter()
        .map(|((size, partial_digest, full_digest), files)| {
            if files.len() > 2 {
                log::debug!(
                    "Duplicate set of {} files, {} bytes each",
                    files.len(),
                    size
                );
            }
            DuplicateSet {
                size,
                partial_digest,
                full_digest,
                files,
            }
        })
        .collect();

    log::info!(
        "Phase 3 complete: {} files → {} confirmed duplicates in {} sets",
        stats.input_files,
        stats.surviving_files,
        sets.len()
    );

    (sets, stats)
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum number of files hashed concurrently.
    pub pool_capacity: usize,
    /// Bytes read for the partial digest.
    pub partial_budget: u64,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional override for mount-boundary detection.
    pub filesystem: Option<Arc<dyn FilesystemIdentity>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("pool_capacity", &self.pool_capacity)
            .field("partial_budget", &self.partial_budget)
            .field("walker_config", &self.walker_config)
            .field("filesystem", &self.filesystem.as_ref().map(|_| "<identity>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            partial_budget: PARTIAL_DIGEST_BUDGET,
            walker_config: WalkerConfig::default(),
            filesystem: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of concurrent hashing workers (at least one).
    #[must_use]
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity.max(1);
        self
    }

    /// Set the partial digest byte budget (at least one byte).
    #[must_use]
    pub fn with_partial_budget(mut self, budget: u64) -> Self {
        self.partial_budget = budget.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the filesystem identity used for mount-boundary checks.
    #[must_use]
    pub fn with_filesystem_identity(mut self, filesystem: Arc<dyn FilesystemIdentity>) -> Self {
        self.filesystem = Some(filesystem);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Directories visited during the walk
    pub directories: usize,
    /// Files discovered above the size threshold
    pub total_files: usize,
    /// Total size of the discovered files in bytes
    pub total_size: u64,
    /// Files sharing their size with at least one other file
    pub size_candidates: usize,
    /// Partial digest phase statistics
    pub partial: StageStats,
    /// Full digest phase statistics
    pub full: StageStats,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Number of files in confirmed duplicate sets
    pub duplicate_files: usize,
    /// Space held by extra copies
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Non-fatal traversal errors
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Files processed by the hashing phases.
    #[must_use]
    pub fn processed_files(&self) -> usize {
        self.partial.input_files
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The hashing worker pool could not be created.
    #[error("Failed to build hashing pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The scan root is unusable.
    #[error(transparent)]
    Root(#[from] ScanError),
}

/// Duplicate finder that orchestrates the multi-phase detection pipeline.
///
/// # Example
///
/// ```no_run
/// use filedupe::duplicates::DuplicateFinder;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(Path::new(".")) {
///     Ok((sets, summary)) => {
///         println!("Found {} duplicate sets", sets.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::with_partial_budget(config.partial_budget);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given path.
    ///
    /// Traversal errors are logged and collected in
    /// [`ScanSummary::scan_errors`]; they never abort the scan.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the root does not exist or is not a
    /// directory, or if the hashing pool cannot be created.
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref fs) = self.config.filesystem {
            walker = walker.with_filesystem_identity(fs.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }
        walker.validate_root()?;

        log::info!("Starting duplicate scan of {}", path.display());
        let traversal = walker.scan();

        let (sets, mut summary) = self.find_duplicates_from_records(traversal.records)?;
        summary.directories = traversal.directories;
        summary.scan_errors = traversal.errors;
        summary.scan_duration = start_time.elapsed();

        Ok((sets, summary))
    }

    /// Find duplicates among already collected records.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the hashing pool cannot be created.
    pub fn find_duplicates_from_records(
        &self,
        records: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary {
            total_files: records.len(),
            total_size: records.iter().map(|r| r.size).sum(),
            ..Default::default()
        };
        log::info!(
            "Found {} files to be processed ({})",
            summary.total_files,
            summary.total_size_display()
        );

        let (size_groups, size_stats) = group_by_size(records);
        summary.size_candidates = size_stats.potential_duplicates;

        let mut sets = Vec::new();
        if !size_groups.is_empty() {
            let pool = HashPool::new(self.config.pool_capacity)?;
            let progress = self.config.progress_callback.as_ref();

            let (partial_groups, partial_stats) =
                phase2_partial(size_groups, &self.hasher, &pool, progress);
            summary.partial = partial_stats;

            let (full_sets, full_stats) =
                phase3_full(partial_groups, &self.hasher, &pool, progress);
            summary.full = full_stats;
            sets = full_sets;
        } else {
            log::info!("No potential duplicates found after size grouping");
        }

        log::info!("Processed {} files", summary.processed_files());

        summary.duplicate_sets = sets.len();
        summary.duplicate_files = sets.iter().map(DuplicateSet::len).sum();
        summary.reclaimable_space = sets.iter().map(DuplicateSet::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        Ok((sets, summary))
    }
}
