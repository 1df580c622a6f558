//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Partial digest comparison (Phase 2)
//! - Full digest comparison (Phase 3)

pub mod finder;
pub mod groups;

pub use finder::{
    phase2_partial, phase3_full, DuplicateFinder, FinderConfig, FinderError, HashPool,
    PartialKey, ScanSummary, StageStats, DEFAULT_POOL_CAPACITY,
};
pub use groups::{group_by_size, DuplicateSet, GroupingStats};
