//! Command-line interface definitions for filedupe.
//!
//! The surface is deliberately small: a root directory, a size threshold,
//! an output path and repeatable directory exclusions.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory, write dupes.out
//! filedupe
//!
//! # Scan a photo library, only files over 1 MB
//! filedupe -d ~/Pictures -s 1000000 -f pictures.dupes
//!
//! # Skip two directory names anywhere below the root
//! filedupe -d /srv -e node_modules -e .git
//! ```

use clap::{ArgAction, Parser};
use serde::Serialize;
use std::path::PathBuf;

/// Find duplicate files by content.
///
/// Walks a directory tree, narrows candidates by size and a partial BLAKE3
/// digest, confirms them with a full digest, and writes a manifest of the
/// duplicates sorted by size.
///
/// Fields left unset fall back to the configuration file, `FILEDUPE_*`
/// environment variables, and finally built-in defaults.
#[derive(Debug, Default, Clone, Parser, Serialize)]
#[command(name = "filedupe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan [default: .]
    #[arg(short = 'd', value_name = "DIR")]
    #[serde(rename = "root", skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Only consider files strictly larger than this many bytes [default: 250000]
    #[arg(short = 's', value_name = "BYTES")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,

    /// Manifest output path [default: dupes.out]
    #[arg(short = 'f', value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Directory name to skip, repeatable [default: Backups.backupdb]
    #[arg(short = 'e', value_name = "NAME", action = ArgAction::Append)]
    #[serde(rename = "excludes", skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}
