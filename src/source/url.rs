//! `crateindex://` source URL parsing
//!
//! The URL carries its options as a `;key=value` suffix:
//!
//! ```text
//! crateindex://github.com/rust-lang/crates.io-index;protocol=https;branch=master
//! ```
//!
//! Options are resolved once into [`SourceOptions`]; unknown keys are
//! rejected so typos do not silently change behavior.

use crate::error::{IndexCacheError, IndexCacheResult};
use crate::source::revision::Revision;
use std::fmt;
use tracing::debug;

/// URL scheme handled by this crate
pub const SCHEME: &str = "crateindex";

/// Options accepted for compatibility but without effect, since no working
/// checkout is ever produced
const IGNORED_OPTIONS: &[&str] = &["nocheckout", "bareclone"];

/// Typed view of the `;key=value` options of a source URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Transport used to reach the upstream repository
    pub protocol: String,
    /// Branch to resolve when no explicit revision is given
    pub branch: Option<String>,
    /// Tag to resolve when no explicit revision is given
    pub tag: Option<String>,
    /// Explicit revision to snapshot
    pub rev: Option<Revision>,
    /// Free-form source label
    pub name: Option<String>,
    /// Allow extracting a pre-built shallow tarball when the mirror is unusable
    pub shallow: bool,
    /// Large-file content is required
    pub lfs: bool,
    /// Subdirectory of interest; only shapes the default destination suffix
    pub subpath: Option<String>,
    /// Destination below the unpack root
    pub destsuffix: Option<String>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            protocol: "git".to_string(),
            branch: None,
            tag: None,
            rev: None,
            name: None,
            shallow: false,
            lfs: true,
            subpath: None,
            destsuffix: None,
        }
    }
}

impl SourceOptions {
    /// Reference to resolve when no revision is pinned (tag wins over branch)
    pub fn reference(&self) -> &str {
        self.tag
            .as_deref()
            .or(self.branch.as_deref())
            .unwrap_or("HEAD")
    }

    /// Destination suffix, defaulting to the subpath basename or `git/`
    pub fn destsuffix(&self) -> String {
        if let Some(ref suffix) = self.destsuffix {
            return suffix.clone();
        }

        match self.subpath.as_deref().map(|s| s.trim_end_matches('/')) {
            Some(subpath) if !subpath.is_empty() => {
                let base = subpath.rsplit('/').next().unwrap_or(subpath);
                format!("{}/", base)
            }
            _ => "git/".to_string(),
        }
    }
}

/// A parsed `crateindex://host/path;options` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    raw: String,
    /// Repository host
    pub host: String,
    /// Repository path including the leading slash
    pub path: String,
    /// Resolved options
    pub options: SourceOptions,
}

impl SourceUrl {
    /// Parse a source URL
    pub fn parse(raw: &str) -> IndexCacheResult<Self> {
        let mut segments = raw.split(';');
        let location = segments.next().unwrap_or_default();

        let (scheme, rest) = location
            .split_once("://")
            .ok_or_else(|| IndexCacheError::url(raw, "missing '://'"))?;
        if scheme != SCHEME {
            return Err(IndexCacheError::url(
                raw,
                format!("unsupported scheme '{}', expected '{}'", scheme, SCHEME),
            ));
        }

        let (host, path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, ""),
        };
        if host.is_empty() && path.is_empty() {
            return Err(IndexCacheError::url(raw, "missing host and path"));
        }

        let mut options = SourceOptions::default();
        for segment in segments.filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                IndexCacheError::url(raw, format!("option '{}' has no value", segment))
            })?;
            apply_option(&mut options, raw, key, value)?;
        }

        Ok(Self {
            raw: raw.to_string(),
            host: host.to_string(),
            path: path.to_string(),
            options,
        })
    }

    /// URL of the upstream repository, used in diagnostics
    pub fn repo_url(&self) -> String {
        format!("{}://{}{}", self.options.protocol, self.host, self.path)
    }

    /// Flattened name used for download-area entries
    ///
    /// `github.com/rust-lang/crates.io-index` becomes
    /// `github.com.rust-lang.crates.io-index`.
    pub fn source_name(&self) -> String {
        format!("{}{}", self.host, self.path.replace('/', "."))
            .replace('*', ".")
            .replace(' ', "_")
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn apply_option(
    options: &mut SourceOptions,
    raw: &str,
    key: &str,
    value: &str,
) -> IndexCacheResult<()> {
    let text = || -> IndexCacheResult<Option<String>> {
        if value.is_empty() {
            Err(IndexCacheError::url(raw, format!("option '{}' is empty", key)))
        } else {
            Ok(Some(value.to_string()))
        }
    };

    match key {
        "protocol" => options.protocol = text()?.unwrap_or_default(),
        "branch" => options.branch = text()?,
        "tag" => options.tag = text()?,
        "rev" => options.rev = Some(Revision::parse(value)?),
        "name" => options.name = text()?,
        "shallow" => options.shallow = parse_flag(raw, key, value)?,
        "lfs" => options.lfs = parse_flag(raw, key, value)?,
        "subpath" => options.subpath = text()?,
        "destsuffix" => options.destsuffix = text()?,
        k if IGNORED_OPTIONS.contains(&k) => {
            debug!("Ignoring option {}={} (no checkout is produced)", key, value);
        }
        _ => {
            return Err(IndexCacheError::url(
                raw,
                format!("unknown option '{}'", key),
            ))
        }
    }
    Ok(())
}

fn parse_flag(raw: &str, key: &str, value: &str) -> IndexCacheResult<bool> {
    match value {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(IndexCacheError::url(
            raw,
            format!("option '{}' expects 0 or 1, got '{}'", key, value),
        )),
    }
}
