//! Configuration loading for crate-index-cache
//!
//! One TOML file, chosen by `--config`, `CRATE_INDEX_CACHE_CONFIG`, or the
//! platform config directory. A missing file means defaults.

pub mod schema;

pub use schema::{Config, LogFormat};

use crate::error::{IndexCacheError, IndexCacheResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Result of writing a starter config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Written,
    AlreadyExists,
}

/// Locates, reads and writes the config file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Use `explicit` when given, the platform default otherwise
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let path = explicit.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("crate-index-cache")
                .join("config.toml")
        });
        Self { path }
    }

    /// The config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file, with relative directories anchored next to it
    pub async fn load(&self) -> IndexCacheResult<Config> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(IndexCacheError::io(
                    format!("reading config from {}", self.path.display()),
                    e,
                ))
            }
        };

        let mut config: Config = toml::from_str(&content).map_err(|e| self.invalid(e))?;
        config.validate().map_err(|e| self.invalid(e))?;
        config.anchor_paths(self.base_dir());
        debug!("Loaded config from {}", self.path.display());
        Ok(config)
    }

    /// Write the default configuration, keeping an existing file unless `force`
    pub async fn init(&self, force: bool) -> IndexCacheResult<InitOutcome> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| IndexCacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true);
        if force {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let write_err =
            |e| IndexCacheError::io(format!("writing config to {}", self.path.display()), e);
        let mut file = match options.open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Ok(InitOutcome::AlreadyExists)
            }
            Err(e) => return Err(write_err(e)),
        };

        let content = toml::to_string_pretty(&Config::default())?;
        file.write_all(content.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        info!("Configuration written to {}", self.path.display());
        Ok(InitOutcome::Written)
    }

    fn base_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn invalid(&self, reason: impl ToString) -> IndexCacheError {
        IndexCacheError::ConfigInvalid {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}
