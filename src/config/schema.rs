//! Configuration schema for crate-index-cache
//!
//! Configuration is stored at `~/.config/crate-index-cache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Fetch settings
    pub fetch: FetchConfig,
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log output format
    pub log_format: LogFormat,
}

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where sources come from and which tools fetch them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Downloads area holding `git2/<name>` mirrors and shallow tarballs.
    /// Relative paths are taken from the config file's directory.
    pub downloads_dir: PathBuf,

    /// git executable
    pub git: String,

    /// Parent directory for scratch trees (system temp dir when unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            downloads_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("crate-index-cache")
                .join("downloads"),
            git: "git".to_string(),
            scratch_dir: None,
        }
    }
}

impl Config {
    /// Resolve relative directories against `base`
    pub fn anchor_paths(&mut self, base: &Path) {
        if self.fetch.downloads_dir.is_relative() {
            self.fetch.downloads_dir = base.join(&self.fetch.downloads_dir);
        }
        if let Some(scratch) = self.fetch.scratch_dir.as_mut() {
            if scratch.is_relative() {
                *scratch = base.join(&*scratch);
            }
        }
    }

    /// Check values serde cannot reject on its own
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch.git.trim().is_empty() {
            return Err("fetch.git must name a git executable".to_string());
        }
        if self.fetch.downloads_dir.as_os_str().is_empty() {
            return Err("fetch.downloads_dir must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("log_format = \"text\""));
        assert!(toml.contains("[fetch]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.fetch.git, "git");
        assert_eq!(config.general.log_format, LogFormat::Text);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [general]
            log_format = "json"

            [fetch]
            downloads_dir = "/srv/downloads"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.general.log_format, LogFormat::Json);
        assert_eq!(config.fetch.downloads_dir, PathBuf::from("/srv/downloads"));
        assert_eq!(config.fetch.git, "git"); // default preserved
        assert!(config.fetch.scratch_dir.is_none());
    }

    #[test]
    fn unknown_log_format_rejected() {
        let result: Result<Config, _> = toml::from_str("[general]\nlog_format = \"yaml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn relative_paths_anchored() {
        let mut config: Config = toml::from_str(
            "[fetch]\ndownloads_dir = \"dl\"\nscratch_dir = \"/tmp/scratch\"\n",
        )
        .unwrap();
        config.anchor_paths(Path::new("/etc/cic"));

        assert_eq!(config.fetch.downloads_dir, PathBuf::from("/etc/cic/dl"));
        assert_eq!(config.fetch.scratch_dir, Some(PathBuf::from("/tmp/scratch")));
    }

    #[test]
    fn empty_git_rejected() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.fetch.git = " ".to_string();
        assert!(config.validate().is_err());
    }
}
