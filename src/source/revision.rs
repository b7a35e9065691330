//! Immutable snapshot identifiers

use crate::error::{IndexCacheError, IndexCacheResult};
use std::fmt;

/// Hex length of a full SHA-1 and SHA-256 object id
const FULL_LENGTHS: [usize; 2] = [40, 64];

/// A content-addressed revision of the index repository (a commit hash)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Parse a revision, accepting any non-empty run of hex digits
    pub fn parse(s: &str) -> IndexCacheResult<Self> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IndexCacheError::RevisionInvalid(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Whether this is a complete object id rather than an abbreviation
    pub fn is_full(&self) -> bool {
        FULL_LENGTHS.contains(&self.0.len())
    }

    /// The revision as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The revision as it is written into cache file headers
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
