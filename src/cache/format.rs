//! Cargo index cache file format
//!
//! ```text
//! 0x01 <revision> 0x00 { <version> 0x00 <json line> 0x00 }*
//! ```
//!
//! The leading byte is the format version. The revision binds the file to
//! the index snapshot it was generated from. Each record repeats the `vers`
//! field ahead of the JSON so readers can match versions by prefix without
//! parsing JSON.

use crate::error::{IndexCacheError, IndexCacheResult};
use crate::source::Revision;
use serde_json::Value;
use std::io::{self, Write};

/// Format version byte at the start of every cache file
pub const FORMAT_MARKER: u8 = 0x01;

/// Field delimiter
const NUL: u8 = 0x00;

/// Classification of one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing left after space stripping
    Blank,
    /// Not valid JSON
    Malformed,
    /// Valid JSON without a string `vers` field
    Unversioned,
    /// Indexable entry
    Record {
        /// Value of the `vers` field
        version: String,
        /// The space-stripped line, written verbatim
        line: String,
    },
}

/// Classify one line of an index file.
///
/// Every ASCII space is removed before parsing and the stripped line is what
/// gets stored. This also removes spaces inside string values.
pub fn classify_line(raw: &str) -> LineKind {
    let line = raw.replace(' ', "");
    if line.is_empty() {
        return LineKind::Blank;
    }

    let value: Value = match serde_json::from_str(&line) {
        Ok(v) => v,
        Err(_) => return LineKind::Malformed,
    };

    match value.get("vers").and_then(Value::as_str) {
        Some(version) => LineKind::Record {
            version: version.to_string(),
            line,
        },
        None => LineKind::Unversioned,
    }
}

/// Streaming writer for one cache file
pub struct CacheFileWriter<W: Write> {
    inner: W,
}

impl<W: Write> CacheFileWriter<W> {
    /// Start a cache file by writing the header
    pub fn new(mut inner: W, revision: &Revision) -> io::Result<Self> {
        inner.write_all(&[FORMAT_MARKER])?;
        inner.write_all(revision.as_bytes())?;
        inner.write_all(&[NUL])?;
        Ok(Self { inner })
    }

    /// Append one record
    pub fn write_record(&mut self, version: &str, line: &str) -> io::Result<()> {
        self.inner.write_all(version.as_bytes())?;
        self.inner.write_all(&[NUL])?;
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(&[NUL])
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// One decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub version: String,
    pub json: String,
}

/// A decoded cache file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFile {
    pub revision: String,
    pub records: Vec<CacheRecord>,
}

/// Decode a cache file
pub fn decode(bytes: &[u8]) -> IndexCacheResult<CacheFile> {
    let (&marker, rest) = bytes
        .split_first()
        .ok_or_else(|| IndexCacheError::CacheFormat("empty file".to_string()))?;
    if marker != FORMAT_MARKER {
        return Err(IndexCacheError::CacheFormat(format!(
            "unsupported format marker {:#04x}",
            marker
        )));
    }

    let mut fields = Fields { rest };
    let revision = fields
        .next_field()?
        .ok_or_else(|| IndexCacheError::CacheFormat("missing revision".to_string()))?;

    let mut records = Vec::new();
    while let Some(version) = fields.next_field()? {
        let json = fields.next_field()?.ok_or_else(|| {
            IndexCacheError::CacheFormat(format!("record {} has no JSON payload", version))
        })?;
        records.push(CacheRecord { version, json });
    }

    Ok(CacheFile { revision, records })
}

/// NUL-terminated UTF-8 fields
struct Fields<'a> {
    rest: &'a [u8],
}

impl Fields<'_> {
    fn next_field(&mut self) -> IndexCacheResult<Option<String>> {
        if self.rest.is_empty() {
            return Ok(None);
        }

        let end = self
            .rest
            .iter()
            .position(|&b| b == NUL)
            .ok_or_else(|| IndexCacheError::CacheFormat("unterminated field".to_string()))?;

        let field = std::str::from_utf8(&self.rest[..end])
            .map_err(|e| IndexCacheError::CacheFormat(format!("invalid UTF-8: {}", e)))?
            .to_string();
        self.rest = &self.rest[end + 1..];
        Ok(Some(field))
    }
}
