//! Raw index snapshots
//!
//! Acquires the repository tree for one revision and gates it on the
//! large-file policy before it is handed to the transcoder.

pub mod acquire;
pub mod lfs;

pub use acquire::{Snapshot, SnapshotAcquirer, SnapshotRequest, Strategy};
pub use lfs::{LfsOutcome, LfsPolicy};
