//! Index source description: URL, revision and download-area locations

pub mod revision;
pub mod url;

pub use revision::Revision;
pub use url::{SourceOptions, SourceUrl};

use std::path::PathBuf;

/// Where the pre-fetched material for one source lives in the downloads area
#[derive(Debug, Clone)]
pub struct SourceLocation {
    downloads_dir: PathBuf,
    source_name: String,
}

impl SourceLocation {
    /// Locate a source below a downloads directory
    pub fn new(downloads_dir: impl Into<PathBuf>, source: &SourceUrl) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            source_name: source.source_name(),
        }
    }

    /// Local mirror clone of the index repository
    pub fn clonedir(&self) -> PathBuf {
        self.downloads_dir.join("git2").join(&self.source_name)
    }

    /// Pre-built shallow tarball for a revision
    pub fn shallow_tarball(&self, revision: &Revision) -> PathBuf {
        self.downloads_dir.join(format!(
            "gitshallow_{}_{}.tar.gz",
            self.source_name, revision
        ))
    }
}
