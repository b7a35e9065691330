//! Large-file storage policy gate
//!
//! Crate indexes do not carry LFS content in practice, but a tree that does
//! would produce a cache full of pointer files. Decide whether that is fatal.

use crate::error::{IndexCacheError, IndexCacheResult};
use crate::vcs::VcsBackend;
use std::path::Path;
use tracing::{debug, info};

/// Whether large-file content must be materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfsPolicy {
    /// Large files are required (`lfs=1`)
    Fetch,
    /// Large files are intentionally not fetched (`lfs=0`)
    Skip,
}

impl LfsPolicy {
    /// Policy from the `lfs` source option
    pub fn from_option(required: bool) -> Self {
        if required {
            Self::Fetch
        } else {
            Self::Skip
        }
    }
}

/// Result of the LFS gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfsOutcome {
    /// No large-file content referenced
    Absent,
    /// Content referenced and tooling available
    Fetched,
    /// Content referenced but deliberately not fetched
    Skipped,
}

/// Inspect an acquired tree and enforce the large-file policy
pub async fn check(
    backend: &dyn VcsBackend,
    tree: &Path,
    policy: LfsPolicy,
    repo_url: &str,
) -> IndexCacheResult<LfsOutcome> {
    if !backend.contains_lfs(tree).await? {
        debug!("No LFS content in {}", repo_url);
        return Ok(LfsOutcome::Absent);
    }

    match policy {
        LfsPolicy::Fetch if !backend.lfs_available().await => Err(IndexCacheError::LfsUnavailable {
            repo_url: repo_url.to_string(),
        }),
        LfsPolicy::Fetch => Ok(LfsOutcome::Fetched),
        LfsPolicy::Skip => {
            info!(
                "Repository {} has LFS content but it is not being fetched",
                repo_url
            );
            Ok(LfsOutcome::Skipped)
        }
    }
}
