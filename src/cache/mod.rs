//! Cargo registry index cache
//!
//! Writes the binary `.cache` tree cargo keeps next to a fetched index and
//! the marker telling cargo the index is populated.
//!
//! # Layout
//!
//! ```text
//! <destsuffix>/
//!   .cache/<relative path of each index file>
//!   .last-updated
//! ```
//!
//! # Destination States
//!
//! | State | Marker | Description |
//! |-------|--------|-------------|
//! | Absent | - | Never built, or the first build failed |
//! | Staging | - | Build in progress in a sibling directory |
//! | Complete | yes | Fully populated for one revision |

pub mod format;
pub mod layout;
pub mod transcode;

pub use format::{decode, CacheFile, CacheFileWriter, CacheRecord, FORMAT_MARKER};
pub use layout::{is_populated, last_updated, mark_complete, Staging, CACHE_DIR, COMPLETION_MARKER};
pub use transcode::{transcode_tree, TranscodeStats, INDEX_CONFIG_FILE};
