//! Destination layout and completion marker
//!
//! A destination is built in a staging directory next to it and swapped into
//! place only after the completion marker is written. A failed run drops the
//! staging directory and leaves the previous destination as it was.

use crate::error::{IndexCacheError, IndexCacheResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Subdirectory holding the transcoded cache files
pub const CACHE_DIR: &str = ".cache";

/// Marker cargo uses to decide the index is populated
pub const COMPLETION_MARKER: &str = ".last-updated";

/// In-progress destination
#[derive(Debug)]
pub struct Staging {
    dir: TempDir,
    dest: PathBuf,
}

impl Staging {
    /// Create a staging directory for `dest` in its parent directory
    pub fn create(dest: &Path) -> IndexCacheResult<Self> {
        let dest = normalize(dest);
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                IndexCacheError::Internal(format!("destination {} has no name", dest.display()))
            })?;

        fs::create_dir_all(parent).map_err(|e| {
            IndexCacheError::io(format!("creating directory {}", parent.display()), e)
        })?;

        let dir = tempfile::Builder::new()
            .prefix(&format!(".{}.staging-", name))
            .tempdir_in(parent)
            .map_err(|e| {
                IndexCacheError::io(
                    format!("creating staging directory in {}", parent.display()),
                    e,
                )
            })?;

        debug!("Staging {} in {}", dest.display(), dir.path().display());
        Ok(Self { dir, dest })
    }

    /// Root of the staged destination
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where cache files are written
    pub fn cache_root(&self) -> PathBuf {
        self.dir.path().join(CACHE_DIR)
    }

    /// Stamp the completion marker and move the staged tree onto the
    /// destination, replacing whatever was there
    pub fn commit(self) -> IndexCacheResult<PathBuf> {
        mark_complete(self.dir.path())?;

        if self.dest.exists() {
            debug!("Removing previous {}", self.dest.display());
            fs::remove_dir_all(&self.dest).map_err(|e| {
                IndexCacheError::io(format!("removing {}", self.dest.display()), e)
            })?;
        }

        let staged = self.dir.keep();
        if let Err(e) = fs::rename(&staged, &self.dest) {
            let _ = fs::remove_dir_all(&staged);
            return Err(IndexCacheError::io(
                format!("moving {} to {}", staged.display(), self.dest.display()),
                e,
            ));
        }

        info!("Index cache ready at {}", self.dest.display());
        Ok(self.dest)
    }
}

/// Create the completion marker in `dir`
pub fn mark_complete(dir: &Path) -> IndexCacheResult<()> {
    let marker = dir.join(COMPLETION_MARKER);
    fs::File::create(&marker)
        .map_err(|e| IndexCacheError::io(format!("creating {}", marker.display()), e))?;
    Ok(())
}

/// Whether a destination carries the completion marker
pub fn is_populated(dest: &Path) -> bool {
    dest.join(COMPLETION_MARKER).is_file()
}

/// When the destination was last completed
pub fn last_updated(dest: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(dest.join(COMPLETION_MARKER))
        .and_then(|m| m.modified())
        .ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Strip trailing separators and `.` components so `git/` and `git` name
/// the same destination
fn normalize(dest: &Path) -> PathBuf {
    dest.components().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_creates_destination_with_marker() {
        let root = tempfile::TempDir::new().unwrap();
        let dest = root.path().join("registry/index/git");

        let staging = Staging::create(&dest).unwrap();
        fs::create_dir_all(staging.cache_root()).unwrap();
        fs::write(staging.cache_root().join("foo"), b"\x01abc\x00").unwrap();
        assert!(!is_populated(&dest));

        let committed = staging.commit().unwrap();

        assert_eq!(committed, dest);
        assert!(is_populated(&dest));
        assert!(dest.join(".cache/foo").is_file());
        assert_eq!(fs::metadata(dest.join(COMPLETION_MARKER)).unwrap().len(), 0);
        assert!(last_updated(&dest).is_some());
    }

    #[test]
    fn commit_replaces_previous_destination() {
        let root = tempfile::TempDir::new().unwrap();
        let dest = root.path().join("git");
        fs::create_dir_all(dest.join(".cache/stale")).unwrap();
        fs::write(dest.join("leftover"), b"old").unwrap();

        let staging = Staging::create(&dest).unwrap();
        fs::create_dir_all(staging.cache_root()).unwrap();
        staging.commit().unwrap();

        assert!(!dest.join("leftover").exists());
        assert!(!dest.join(".cache/stale").exists());
        assert!(is_populated(&dest));
    }

    #[test]
    fn dropped_staging_leaves_destination_alone() {
        let root = tempfile::TempDir::new().unwrap();
        let dest = root.path().join("git");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join(COMPLETION_MARKER), b"").unwrap();

        let staging = Staging::create(&dest).unwrap();
        let staged = staging.path().to_path_buf();
        fs::create_dir_all(staging.cache_root()).unwrap();
        drop(staging);

        assert!(!staged.exists());
        assert!(is_populated(&dest));
        let entries: Vec<_> = fs::read_dir(root.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn trailing_separator_names_same_destination() {
        let root = tempfile::TempDir::new().unwrap();
        let staging = Staging::create(&root.path().join("git/")).unwrap();
        assert!(staging.path().starts_with(root.path()));

        let committed = staging.commit().unwrap();
        assert_eq!(committed, root.path().join("git"));
        assert!(is_populated(&committed));
    }

    #[test]
    fn missing_marker_is_not_populated() {
        let root = tempfile::TempDir::new().unwrap();
        assert!(!is_populated(root.path()));
        assert!(last_updated(root.path()).is_none());
    }
}
