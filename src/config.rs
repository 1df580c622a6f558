//! Layered application configuration.
//!
//! Values are merged with figment, later layers overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file: `$FILEDUPE_CONFIG`, or `config.toml` in the platform
//!    config directory. A missing file is skipped.
//! 3. `FILEDUPE_*` environment variables (e.g. `FILEDUPE_MIN_SIZE=1000`)
//! 4. Flags given on the command line
//!
//! # Example file
//!
//! ```toml
//! root = "/srv/media"
//! min_size = 1000000
//! excludes = ["Backups.backupdb", ".snapshots"]
//! pool_capacity = 4
//! verbose = 1
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::duplicates::{FinderConfig, DEFAULT_POOL_CAPACITY};
use crate::progress::ProgressCallback;
use crate::scanner::{WalkerConfig, DEFAULT_EXCLUDE, DEFAULT_MIN_SIZE, PARTIAL_DIGEST_BUDGET};

/// Environment variable prefix for configuration values.
pub const ENV_PREFIX: &str = "FILEDUPE_";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "FILEDUPE_CONFIG";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be parsed or has the wrong type.
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// What the value must satisfy
        reason: &'static str,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory to scan.
    pub root: PathBuf,
    /// Files must be strictly larger than this to be considered.
    pub min_size: u64,
    /// Manifest output path.
    pub output: PathBuf,
    /// Directory base names pruned from traversal.
    pub excludes: Vec<String>,
    /// Descend into directories on other filesystems.
    pub cross_mounts: bool,
    /// Maximum concurrent file reads while hashing.
    pub pool_capacity: usize,
    /// Bytes covered by the partial digest.
    pub partial_budget: u64,
    /// Log verbosity (0=info, 1=debug, 2+=trace).
    pub verbose: u8,
    /// Only log errors and hide progress bars.
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            min_size: DEFAULT_MIN_SIZE,
            output: PathBuf::from("dupes.out"),
            excludes: vec![DEFAULT_EXCLUDE.to_string()],
            cross_mounts: false,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            partial_budget: PARTIAL_DIGEST_BUDGET,
            verbose: 0,
            quiet: false,
        }
    }
}

impl Config {
    /// Load the full layered configuration for a command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer is malformed or a value is out of range.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = Self::config_path();
        if let Some(ref path) = file {
            log::debug!("Looking for configuration in {}", path.display());
        }
        Self::from_figment(Self::figment(file.as_deref()).merge(Serialized::defaults(cli)))
    }

    /// Defaults, optional TOML file and environment, without CLI flags.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    /// Extract and validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is out of range.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration file location, if one can be determined.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "filedupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "pool_capacity",
                reason: "must be at least 1",
            });
        }
        if self.partial_budget == 0 {
            return Err(ConfigError::Invalid {
                field: "partial_budget",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Traversal settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.min_size, self.excludes.clone(), self.cross_mounts)
    }

    /// Pipeline settings, optionally reporting progress.
    #[must_use]
    pub fn finder_config(&self, progress: Option<Arc<dyn ProgressCallback>>) -> FinderConfig {
        let config = FinderConfig::default()
            .with_pool_capacity(self.pool_capacity)
            .with_partial_budget(self.partial_budget)
            .with_walker_config(self.walker_config());
        match progress {
            Some(callback) => config.with_progress_callback(callback),
            None => config,
        }
    }
}
