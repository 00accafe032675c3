//! Persistence of registry state between runs

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotStore};
