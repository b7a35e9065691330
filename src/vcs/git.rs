//! Git CLI backend
//!
//! Implements the VcsBackend trait by shelling out to `git` against a local
//! mirror clone in the downloads area.

use crate::error::{IndexCacheError, IndexCacheResult};
use crate::source::Revision;
use crate::vcs::backend::{MirrorStatus, VcsBackend};
use crate::vcs::{tree_has_lfs_attributes, unpack_tar_gz};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

/// Backend driving the `git` command line tool
pub struct GitBackend {
    git: String,
    clonedir: PathBuf,
    skip_lfs_smudge: bool,
}

impl GitBackend {
    /// Create a backend for the mirror clone at `clonedir`
    pub fn new(git: impl Into<String>, clonedir: impl Into<PathBuf>) -> Self {
        Self {
            git: git.into(),
            clonedir: clonedir.into(),
            skip_lfs_smudge: false,
        }
    }

    /// Configure large-file handling.
    ///
    /// Unless large files are required, smudging is disabled on every git
    /// invocation so pointer files are never resolved over the network.
    pub fn with_lfs(mut self, required: bool) -> Self {
        self.skip_lfs_smudge = !required;
        self
    }

    /// Check if git is installed
    pub async fn is_installed(git: &str) -> bool {
        Command::new(git)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Check if the git-lfs extension is installed for `git`
    pub async fn is_lfs_installed(git: &str) -> bool {
        Command::new(git)
            .args(["lfs", "version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn describe<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect();
        format!("{} {}", self.git, args.join(" "))
    }

    /// Execute a git command in `workdir` and return the output
    async fn exec<S: AsRef<OsStr>>(&self, workdir: &Path, args: &[S]) -> IndexCacheResult<Output> {
        let command = self.describe(args);
        debug!("Executing: {} (in {})", command, workdir.display());

        let mut cmd = Command::new(&self.git);
        cmd.args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.skip_lfs_smudge {
            cmd.env("GIT_LFS_SKIP_SMUDGE", "1");
        }

        cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IndexCacheError::GitNotFound
            } else {
                IndexCacheError::command_failed(command, e)
            }
        })
    }

    /// Execute a git command and fail unless it exits successfully
    async fn run<S: AsRef<OsStr>>(&self, workdir: &Path, args: &[S]) -> IndexCacheResult<Output> {
        let output = self.exec(workdir, args).await?;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(IndexCacheError::command_exec(
                self.describe(args),
                stderr.trim().to_string(),
            ))
        }
    }
}

#[async_trait]
impl VcsBackend for GitBackend {
    async fn resolve_reference(&self, reference: &str) -> IndexCacheResult<Revision> {
        if !self.clonedir.is_dir() {
            return Err(IndexCacheError::PathNotFound(self.clonedir.clone()));
        }

        let spec = format!("{}^{{commit}}", reference);
        let output = self
            .run(&self.clonedir, &["rev-parse", "--verify", "--quiet", spec.as_str()])
            .await?;

        let revision = Revision::parse(&String::from_utf8_lossy(&output.stdout))?;
        info!("Resolved {} to {}", reference, revision);
        Ok(revision)
    }

    async fn is_mirror_current(&self, revision: &Revision) -> IndexCacheResult<MirrorStatus> {
        if !self.clonedir.is_dir() {
            debug!("Mirror clone missing: {}", self.clonedir.display());
            return Ok(MirrorStatus::Missing);
        }

        let spec = format!("{}^{{commit}}", revision);
        let output = self
            .exec(&self.clonedir, &["cat-file", "-e", spec.as_str()])
            .await?;

        if output.status.success() {
            Ok(MirrorStatus::Current)
        } else {
            debug!(
                "Mirror {} does not contain {}",
                self.clonedir.display(),
                revision
            );
            Ok(MirrorStatus::Stale)
        }
    }

    async fn fetch_revision_into(
        &self,
        workdir: &Path,
        revision: &Revision,
    ) -> IndexCacheResult<()> {
        tokio::fs::create_dir_all(workdir).await.map_err(|e| {
            IndexCacheError::io(format!("creating directory {}", workdir.display()), e)
        })?;

        self.run(workdir, &["init", "--quiet"]).await?;

        let fetch: [&OsStr; 4] = [
            OsStr::new("fetch"),
            OsStr::new("--quiet"),
            self.clonedir.as_os_str(),
            OsStr::new(revision.as_str()),
        ];
        self.run(workdir, &fetch).await?;

        info!("Fetched {} from {}", revision, self.clonedir.display());
        Ok(())
    }

    async fn archive_revision(
        &self,
        workdir: &Path,
        revision: &Revision,
    ) -> IndexCacheResult<Vec<u8>> {
        let output = self
            .run(workdir, &["archive", "--format=tar", revision.as_str()])
            .await?;
        debug!("Archived {} ({} bytes)", revision, output.stdout.len());
        Ok(output.stdout)
    }

    async fn extract_shallow_bundle(&self, bundle: &Path, dir: &Path) -> IndexCacheResult<()> {
        let bundle = bundle.to_path_buf();
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || unpack_tar_gz(&bundle, &dir))
            .await
            .map_err(|e| IndexCacheError::Internal(format!("extract task failed: {}", e)))?
    }

    async fn contains_lfs(&self, tree: &Path) -> IndexCacheResult<bool> {
        let tree = tree.to_path_buf();
        tokio::task::spawn_blocking(move || tree_has_lfs_attributes(&tree))
            .await
            .map_err(|e| IndexCacheError::Internal(format!("lfs scan task failed: {}", e)))?
    }

    async fn lfs_available(&self) -> bool {
        Self::is_lfs_installed(&self.git).await
    }

    fn mirror_path(&self) -> &Path {
        &self.clonedir
    }

    fn backend_name(&self) -> &'static str {
        "git"
    }
}
