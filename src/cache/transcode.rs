//! Raw index tree to cache tree transcoding
//!
//! Every index file in the raw tree becomes one cache file at the same
//! relative path under the cache root. Bad lines are skipped one at a time;
//! a corrupt entry never denies access to the rest of the registry.

use crate::cache::format::{classify_line, CacheFileWriter, LineKind};
use crate::error::{IndexCacheError, IndexCacheResult};
use crate::source::Revision;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Registry-wide configuration document, never transcoded
pub const INDEX_CONFIG_FILE: &str = "config.json";

/// Counters for one transcode pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeStats {
    /// Cache files written
    pub files: usize,
    /// Records written across all files
    pub records: usize,
    /// Lines that were not valid JSON
    pub malformed: usize,
    /// Valid JSON lines without a version
    pub unversioned: usize,
    /// Files left out on purpose (registry config, symlinks)
    pub excluded: usize,
}

/// Transcode the raw tree at `raw_root` into `cache_root`
pub fn transcode_tree(
    raw_root: &Path,
    cache_root: &Path,
    revision: &Revision,
) -> IndexCacheResult<TranscodeStats> {
    let mut stats = TranscodeStats::default();

    let walker = WalkDir::new(raw_root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| IndexCacheError::Transcode {
            path: e.path().unwrap_or(raw_root).to_path_buf(),
            reason: e.to_string(),
        })?;

        let relative = entry
            .path()
            .strip_prefix(raw_root)
            .map_err(|e| IndexCacheError::Internal(format!("walk escaped root: {}", e)))?;
        let target = cache_root.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                IndexCacheError::io(format!("creating directory {}", target.display()), e)
            })?;
            continue;
        }

        if !file_type.is_file() {
            debug!("Skipping non-regular entry {}", entry.path().display());
            stats.excluded += 1;
            continue;
        }

        if entry.file_name() == INDEX_CONFIG_FILE {
            debug!("Skipping registry config {}", entry.path().display());
            stats.excluded += 1;
            continue;
        }

        transcode_file(entry.path(), &target, revision, &mut stats)?;
        stats.files += 1;
    }

    info!(
        "Transcoded {} files ({} records, {} malformed lines)",
        stats.files, stats.records, stats.malformed
    );
    Ok(stats)
}

/// Transcode a single index file into a cache file
pub fn transcode_file(
    source: &Path,
    target: &Path,
    revision: &Revision,
    stats: &mut TranscodeStats,
) -> IndexCacheResult<()> {
    let content = fs::read(source)
        .map_err(|e| IndexCacheError::io(format!("reading {}", source.display()), e))?;
    let text = String::from_utf8(content).map_err(|e| IndexCacheError::Transcode {
        path: source.to_path_buf(),
        reason: format!("not valid UTF-8: {}", e.utf8_error()),
    })?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            IndexCacheError::io(format!("creating directory {}", parent.display()), e)
        })?;
    }

    let write_err = |e| IndexCacheError::io(format!("writing {}", target.display()), e);
    let file = File::create(target).map_err(write_err)?;
    let mut writer = CacheFileWriter::new(BufWriter::new(file), revision).map_err(write_err)?;

    for line in text.lines() {
        match classify_line(line) {
            LineKind::Blank => {}
            LineKind::Malformed => {
                warn!("Invalid json line in {} - ignore", source.display());
                stats.malformed += 1;
            }
            LineKind::Unversioned => stats.unversioned += 1,
            LineKind::Record { version, line } => {
                writer.write_record(&version, &line).map_err(write_err)?;
                stats.records += 1;
            }
        }
    }

    writer.finish().map_err(write_err)?;
    Ok(())
}
