//! Snapshot acquisition with mirror / shallow tarball fallback
//!
//! Strategies are tried in order and the first success wins:
//!
//! 1. Mirror: the local clone contains the revision. An empty repository is
//!    initialized in the work directory, only that revision is fetched into
//!    it, and its tree is exported into a scratch directory.
//! 2. Shallow tarball: a pre-built tarball for the revision is extracted
//!    into the scratch directory.
//!
//! When both fail the error lists the reason each one was unusable.

use crate::error::{IndexCacheError, IndexCacheResult};
use crate::source::Revision;
use crate::vcs::{unpack_tar, MirrorStatus, VcsBackend};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// How a snapshot was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Fetched from the local mirror clone
    Mirror,
    /// Extracted from a shallow tarball
    ShallowTarball,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mirror => write!(f, "mirror"),
            Self::ShallowTarball => write!(f, "shallow tarball"),
        }
    }
}

/// Raw index tree for one revision.
///
/// The tree lives in a scratch directory that is removed when the snapshot
/// is dropped, whatever happens to the rest of the pipeline.
#[derive(Debug)]
pub struct Snapshot {
    dir: TempDir,
    strategy: Strategy,
}

impl Snapshot {
    /// Root of the raw index tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Strategy that produced the tree
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// Inputs for one acquisition
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    /// Revision to materialize
    pub revision: Revision,
    /// Directory receiving the fetched repository (mirror strategy)
    pub workdir: PathBuf,
    /// Shallow tarball to fall back to; `None` when shallow is disabled
    pub shallow_tarball: Option<PathBuf>,
    /// Parent for the scratch directory; system temp dir when `None`
    pub scratch_root: Option<PathBuf>,
}

/// Produces raw index trees through an injected backend
pub struct SnapshotAcquirer<'a> {
    backend: &'a dyn VcsBackend,
}

impl<'a> SnapshotAcquirer<'a> {
    /// Create an acquirer on top of a backend
    pub fn new(backend: &'a dyn VcsBackend) -> Self {
        Self { backend }
    }

    /// Acquire the raw index tree for a revision
    pub async fn acquire(&self, request: &SnapshotRequest) -> IndexCacheResult<Snapshot> {
        let scratch = create_scratch(request.scratch_root.as_deref())?;
        let mut reasons = Vec::new();

        match self.from_mirror(request, scratch.path()).await {
            Ok(()) => {
                info!("Snapshot {} acquired from mirror", request.revision);
                return Ok(Snapshot {
                    dir: scratch,
                    strategy: Strategy::Mirror,
                });
            }
            Err(reason) => {
                debug!("Mirror strategy unusable: {}", reason);
                reasons.push(reason);
            }
        }

        match self.from_shallow_tarball(request, scratch.path()).await {
            Ok(()) => {
                info!("Snapshot {} acquired from shallow tarball", request.revision);
                Ok(Snapshot {
                    dir: scratch,
                    strategy: Strategy::ShallowTarball,
                })
            }
            Err(reason) => {
                debug!("Shallow strategy unusable: {}", reason);
                reasons.push(reason);
                Err(IndexCacheError::NoSourceFound { reasons })
            }
        }
    }

    /// Mirror strategy; the error is the human-readable reason it was skipped
    async fn from_mirror(&self, request: &SnapshotRequest, scratch: &Path) -> Result<(), String> {
        let mirror = self.backend.mirror_path();
        let status = self
            .backend
            .is_mirror_current(&request.revision)
            .await
            .map_err(|e| format!("checking clone directory {} failed: {}", mirror.display(), e))?;

        if status != MirrorStatus::Current {
            return Err(format!(
                "clone directory not available or not up to date: {}",
                mirror.display()
            ));
        }

        if let Err(e) = self.export_from_mirror(request, scratch).await {
            warn!("Fetch from {} failed: {}", mirror.display(), e);
            reset_dir(&request.workdir);
            reset_dir(scratch);
            return Err(format!("fetch from clone directory failed: {}", e));
        }
        Ok(())
    }

    async fn export_from_mirror(
        &self,
        request: &SnapshotRequest,
        scratch: &Path,
    ) -> IndexCacheResult<()> {
        self.backend
            .fetch_revision_into(&request.workdir, &request.revision)
            .await?;
        let tar = self
            .backend
            .archive_revision(&request.workdir, &request.revision)
            .await?;

        let scratch = scratch.to_path_buf();
        tokio::task::spawn_blocking(move || unpack_tar(Cursor::new(tar), &scratch))
            .await
            .map_err(|e| IndexCacheError::Internal(format!("unpack task failed: {}", e)))?
    }

    /// Shallow strategy; the error is the human-readable reason it was skipped
    async fn from_shallow_tarball(
        &self,
        request: &SnapshotRequest,
        scratch: &Path,
    ) -> Result<(), String> {
        let tarball = request
            .shallow_tarball
            .as_deref()
            .ok_or_else(|| "shallow clone not enabled".to_string())?;

        if !tarball.exists() {
            return Err(format!("shallow clone not available: {}", tarball.display()));
        }

        self.backend
            .extract_shallow_bundle(tarball, scratch)
            .await
            .map_err(|e| format!("shallow clone extraction failed: {}", e))
    }
}

fn create_scratch(root: Option<&Path>) -> IndexCacheResult<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("crate-index-");

    match root {
        Some(root) => {
            std::fs::create_dir_all(root).map_err(|e| {
                IndexCacheError::io(format!("creating scratch root {}", root.display()), e)
            })?;
            builder.tempdir_in(root)
        }
        None => builder.tempdir(),
    }
    .map_err(|e| IndexCacheError::io("creating scratch directory", e))
}

/// Empty a directory in place, leaving it present
fn reset_dir(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let result = if path.is_dir() && !path.is_symlink() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        if let Err(e) = result {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
