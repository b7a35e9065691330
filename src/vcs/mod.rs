//! Version-control plumbing for snapshot acquisition
//!
//! Provides the backend capability the acquirer depends on:
//! - [`VcsBackend`]: the abstract interface
//! - [`GitBackend`]: implementation on top of the git CLI

mod backend;
mod git;

pub use backend::{MirrorStatus, VcsBackend};
pub use git::GitBackend;

use crate::error::{IndexCacheError, IndexCacheResult};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tar::Archive;
use tracing::debug;
use walkdir::WalkDir;

/// Attribute marking a path as stored in large-file storage
const LFS_FILTER: &str = "filter=lfs";

/// Unpack a tar stream into `dest`
pub(crate) fn unpack_tar<R: Read>(reader: R, dest: &Path) -> IndexCacheResult<()> {
    let mut archive = Archive::new(reader);
    archive
        .unpack(dest)
        .map_err(|e| IndexCacheError::io(format!("unpacking archive into {}", dest.display()), e))
}

/// Unpack a gzip-compressed tarball into `dest`
pub(crate) fn unpack_tar_gz(tarball: &Path, dest: &Path) -> IndexCacheResult<()> {
    let file = File::open(tarball)
        .map_err(|e| IndexCacheError::io(format!("opening {}", tarball.display()), e))?;
    debug!("Extracting {} into {}", tarball.display(), dest.display());
    unpack_tar(GzDecoder::new(file), dest)
}

/// Scan a tree for `.gitattributes` files routing paths through LFS
pub(crate) fn tree_has_lfs_attributes(tree: &Path) -> IndexCacheResult<bool> {
    for entry in WalkDir::new(tree).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || entry.file_name() != ".gitattributes" {
            continue;
        }

        let content = fs::read(entry.path()).map_err(|e| {
            IndexCacheError::io(format!("reading {}", entry.path().display()), e)
        })?;
        if String::from_utf8_lossy(&content).contains(LFS_FILTER) {
            debug!("LFS attributes found in {}", entry.path().display());
            return Ok(true);
        }
    }
    Ok(false)
}


#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn build_tar(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn unpack_tar_stream() {
        let dest = TempDir::new().unwrap();
        let bytes = build_tar(&[("3/s/serde", "{}\n"), ("config.json", "{}")]);

        unpack_tar(std::io::Cursor::new(bytes), dest.path()).unwrap();

        assert!(dest.path().join("3/s/serde").is_file());
        assert!(dest.path().join("config.json").is_file());
    }

    #[test]
    fn unpack_gzip_tarball() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("gitshallow_index_abc.tar.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(&mut encoder, &build_tar(&[("ab/cd/abcd", "{}\n")])).unwrap();
        fs::write(&tarball, encoder.finish().unwrap()).unwrap();

        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        unpack_tar_gz(&tarball, &dest).unwrap();

        assert!(dest.join("ab/cd/abcd").is_file());
    }

    #[test]
    fn unpack_missing_tarball_fails() {
        let temp = TempDir::new().unwrap();
        assert!(unpack_tar_gz(&temp.path().join("absent.tar.gz"), temp.path()).is_err());
    }

    #[test]
    fn lfs_attributes_detected() {
        let temp = TempDir::new().unwrap();
        assert!(!tree_has_lfs_attributes(temp.path()).unwrap());

        fs::write(temp.path().join(".gitattributes"), "*.md text\n").unwrap();
        assert!(!tree_has_lfs_attributes(temp.path()).unwrap());

        fs::create_dir(temp.path().join("blobs")).unwrap();
        fs::write(
            temp.path().join("blobs/.gitattributes"),
            "*.bin filter=lfs diff=lfs merge=lfs -text\n",
        )
        .unwrap();
        assert!(tree_has_lfs_attributes(temp.path()).unwrap());
    }
}
