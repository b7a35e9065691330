//! Version-control backend abstraction
//!
//! The acquisition pipeline only needs a handful of capabilities from the
//! version-control tool. Keeping them behind a trait lets the pipeline run
//! against the git CLI in production and an in-memory fake in tests.

use crate::error::IndexCacheResult;
use crate::source::Revision;
use async_trait::async_trait;
use std::path::Path;

/// State of the local mirror clone with respect to a revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorStatus {
    /// Mirror exists and contains the revision
    Current,
    /// No mirror clone on disk
    Missing,
    /// Mirror exists but does not contain the revision
    Stale,
}

/// Abstract version-control interface used by the snapshot acquirer
#[async_trait]
pub trait VcsBackend: Send + Sync {
    /// Resolve a named reference (branch, tag, `HEAD`) against the mirror
    async fn resolve_reference(&self, reference: &str) -> IndexCacheResult<Revision>;

    /// Check whether the local mirror can serve the revision
    async fn is_mirror_current(&self, revision: &Revision) -> IndexCacheResult<MirrorStatus>;

    /// Initialize an empty repository in `workdir` and fetch only `revision`
    /// from the mirror into it
    async fn fetch_revision_into(&self, workdir: &Path, revision: &Revision)
        -> IndexCacheResult<()>;

    /// Export the tree of `revision` from the repository in `workdir` as a
    /// tar stream
    async fn archive_revision(&self, workdir: &Path, revision: &Revision)
        -> IndexCacheResult<Vec<u8>>;

    /// Extract a shallow tarball into `dir`
    async fn extract_shallow_bundle(&self, bundle: &Path, dir: &Path) -> IndexCacheResult<()>;

    /// Check whether an extracted tree references large-file content
    async fn contains_lfs(&self, tree: &Path) -> IndexCacheResult<bool>;

    /// Check whether large-file tooling is installed
    async fn lfs_available(&self) -> bool;

    /// Path of the mirror clone, used in diagnostics
    fn mirror_path(&self) -> &Path;

    /// Human-readable backend name
    fn backend_name(&self) -> &'static str;
}
