//! crate-index-cache - offline cargo registry index cache builder
//!
//! Takes a snapshot of a git crate index from a local mirror or a shallow
//! tarball and writes the binary `.cache` tree cargo reads, plus the
//! `.last-updated` marker.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod snapshot;
pub mod source;
pub mod ui;
pub mod vcs;

pub use error::{IndexCacheError, IndexCacheResult};
