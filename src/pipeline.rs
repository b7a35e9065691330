//! End-to-end unpack of a crate index into a cargo index cache
//!
//! Stages run strictly in order: resolve, acquire, LFS check, transcode,
//! finalize. Fatal errors are tagged with the stage they came from.

use crate::cache::{transcode_tree, Staging, TranscodeStats};
use crate::error::{IndexCacheError, IndexCacheResult, Stage};
use crate::snapshot::{lfs, LfsOutcome, LfsPolicy, SnapshotAcquirer, SnapshotRequest, Strategy};
use crate::source::{Revision, SourceLocation, SourceUrl};
use crate::vcs::VcsBackend;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything needed for one unpack
#[derive(Debug, Clone)]
pub struct UnpackRequest {
    /// Parsed source URL
    pub source: SourceUrl,
    /// Download-area locations for the source
    pub location: SourceLocation,
    /// Directory the destination suffix is resolved against
    pub unpack_root: PathBuf,
    /// Revision overriding the URL's `rev` option
    pub revision: Option<Revision>,
    /// Parent for the scratch directory
    pub scratch_root: Option<PathBuf>,
}

impl UnpackRequest {
    /// Final destination directory
    pub fn destination(&self) -> PathBuf {
        self.unpack_root.join(self.source.options.destsuffix())
    }
}

/// Summary of a successful unpack
#[derive(Debug, Clone)]
pub struct UnpackReport {
    pub destination: PathBuf,
    pub revision: Revision,
    pub strategy: Strategy,
    pub lfs: LfsOutcome,
    pub stats: TranscodeStats,
}

/// Runs the unpack stages against a version-control backend
pub struct IndexCachePipeline<'a> {
    backend: &'a dyn VcsBackend,
}

impl<'a> IndexCachePipeline<'a> {
    /// Create a pipeline on top of a backend
    pub fn new(backend: &'a dyn VcsBackend) -> Self {
        Self { backend }
    }

    /// Run all stages
    pub async fn run(&self, request: &UnpackRequest) -> IndexCacheResult<UnpackReport> {
        let options = &request.source.options;

        let revision = self
            .resolve(request)
            .await
            .map_err(|e| e.in_stage(Stage::Resolve))?;
        info!("Unpacking {} at {}", request.source.repo_url(), revision);

        let staging =
            Staging::create(&request.destination()).map_err(|e| e.in_stage(Stage::Acquire))?;

        let snapshot_request = SnapshotRequest {
            revision: revision.clone(),
            workdir: staging.path().to_path_buf(),
            shallow_tarball: options
                .shallow
                .then(|| request.location.shallow_tarball(&revision)),
            scratch_root: request.scratch_root.clone(),
        };
        let snapshot = SnapshotAcquirer::new(self.backend)
            .acquire(&snapshot_request)
            .await
            .map_err(|e| e.in_stage(Stage::Acquire))?;

        let lfs = lfs::check(
            self.backend,
            snapshot.path(),
            LfsPolicy::from_option(options.lfs),
            &request.source.repo_url(),
        )
        .await
        .map_err(|e| e.in_stage(Stage::LfsCheck))?;

        let raw_root = snapshot.path().to_path_buf();
        let cache_root = staging.cache_root();
        let transcode_rev = revision.clone();
        let stats = tokio::task::spawn_blocking(move || {
            transcode_tree(&raw_root, &cache_root, &transcode_rev)
        })
        .await
        .map_err(|e| IndexCacheError::Internal(format!("transcode task failed: {}", e)))
        .map_err(|e| e.in_stage(Stage::Transcode))?
        .map_err(|e| e.in_stage(Stage::Transcode))?;

        let strategy = snapshot.strategy();
        drop(snapshot);
        debug!("Raw index tree discarded");

        let destination = staging.commit().map_err(|e| e.in_stage(Stage::Finalize))?;

        Ok(UnpackReport {
            destination,
            revision,
            strategy,
            lfs,
            stats,
        })
    }

    /// Explicit revision first, then the URL's `rev`, then the reference.
    ///
    /// Abbreviated ids are expanded through the mirror; the full id is what
    /// gets fetched and stamped into cache headers.
    async fn resolve(&self, request: &UnpackRequest) -> IndexCacheResult<Revision> {
        let explicit = request
            .revision
            .as_ref()
            .or(request.source.options.rev.as_ref());

        if let Some(rev) = explicit {
            if rev.is_full() {
                return Ok(rev.clone());
            }
            debug!("Expanding abbreviated revision {}", rev);
            return self
                .backend
                .resolve_reference(rev.as_str())
                .await
                .map_err(|e| IndexCacheError::RevisionAbbreviated {
                    revision: rev.to_string(),
                    reason: e.to_string(),
                });
        }

        let reference = request.source.options.reference();
        debug!("Resolving {} via {}", reference, self.backend.backend_name());
        self.backend.resolve_reference(reference).await
    }
}
