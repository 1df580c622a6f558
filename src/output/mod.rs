//! Result output for duplicate scans.
//!
//! The only format is the plain-text manifest in [`manifest`].

pub mod manifest;

pub use manifest::{ManifestError, ManifestWriter};
