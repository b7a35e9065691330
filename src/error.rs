//! Error types for crate-index-cache
//!
//! All modules use `IndexCacheResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crate-index-cache operations
pub type IndexCacheResult<T> = Result<T, IndexCacheError>;

/// Pipeline stage a fatal error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turning a reference into a concrete revision
    Resolve,
    /// Producing the raw index tree
    Acquire,
    /// Large-file policy gate
    LfsCheck,
    /// Writing cache files
    Transcode,
    /// Stamping the completion marker and swapping the destination in
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolve => "resolve",
            Self::Acquire => "acquire",
            Self::LfsCheck => "lfs check",
            Self::Transcode => "transcode",
            Self::Finalize => "finalize",
        };
        write!(f, "{}", name)
    }
}

/// All errors that can occur in crate-index-cache
#[derive(Error, Debug)]
pub enum IndexCacheError {
    // Environment errors
    #[error("git not found. Install git and make sure it is on PATH")]
    GitNotFound,

    // Source errors
    #[error("Invalid source URL {url}: {reason}")]
    UrlInvalid { url: String, reason: String },

    #[error("Invalid revision '{0}': expected a hex commit id")]
    RevisionInvalid(String),

    #[error("Cannot expand abbreviated revision '{revision}': {reason}")]
    RevisionAbbreviated { revision: String, reason: String },

    #[error("No up to date source found: {}", .reasons.join("; "))]
    NoSourceFound { reasons: Vec<String> },

    #[error("Repository {repo_url} has LFS content, install git-lfs on host to download (or set lfs=0 to ignore it)")]
    LfsUnavailable { repo_url: String },

    // Cache errors
    #[error("Failed to transcode {path}: {reason}")]
    Transcode { path: PathBuf, reason: String },

    #[error("Malformed cache file: {0}")]
    CacheFormat(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // Pipeline errors
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<IndexCacheError>,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IndexCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a source URL error
    pub fn url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UrlInvalid {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Tag the error with the pipeline stage it came from.
    ///
    /// Already tagged errors keep their original stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error was raised in, if it came out of the pipeline
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error with any stage wrapper removed
    pub fn root(&self) -> &IndexCacheError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self.root() {
            Self::GitNotFound => Some("Install git from your distribution packages"),
            Self::NoSourceFound { .. } => Some(
                "Fetch the index into the downloads directory first, or enable shallow=1 with a shallow tarball",
            ),
            Self::LfsUnavailable { .. } => Some("Install git-lfs, or add ;lfs=0 to the source URL"),
            Self::RevisionInvalid(_) | Self::RevisionAbbreviated { .. } => {
                Some("Pass the full commit hash, e.g. --rev $(git rev-parse HEAD)")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IndexCacheError::GitNotFound;
        assert!(err.to_string().contains("git not found"));
    }

    #[test]
    fn no_source_found_lists_every_reason() {
        let err = IndexCacheError::NoSourceFound {
            reasons: vec![
                "clone directory not available or not up to date: /dl/git2/x".to_string(),
                "shallow clone not enabled".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "No up to date source found: clone directory not available or not up to date: /dl/git2/x; shallow clone not enabled"
        );
    }

    #[test]
    fn stage_wrapping() {
        let err = IndexCacheError::GitNotFound.in_stage(Stage::Acquire);
        assert_eq!(err.stage(), Some(Stage::Acquire));
        assert!(matches!(err.root(), IndexCacheError::GitNotFound));
        assert!(err.to_string().starts_with("acquire stage failed"));

        let rewrapped = err.in_stage(Stage::Finalize);
        assert_eq!(rewrapped.stage(), Some(Stage::Acquire));
    }

    #[test]
    fn error_hint_looks_through_stage() {
        let err = IndexCacheError::LfsUnavailable {
            repo_url: "https://example.com/index".to_string(),
        }
        .in_stage(Stage::LfsCheck);
        assert_eq!(
            err.hint(),
            Some("Install git-lfs, or add ;lfs=0 to the source URL")
        );
        assert_eq!(IndexCacheError::Internal("x".into()).hint(), None);
    }
}
