//! JSON snapshot of every pool, farm and position

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

use crate::domain::accounts::{FarmAccount, PoolAccount};
use crate::shared::errors::AppError;
use crate::shared::types::TimestampMs;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub saved_at: TimestampMs,
    pub pools: Vec<PoolAccount>,
    pub farms: Vec<FarmAccount>,
}

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `None` when no snapshot has been written yet
    pub fn load(&self) -> Result<Option<Snapshot>, AppError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            AppError::StorageError(format!("corrupt snapshot {}: {}", self.path.display(), e))
        })?;
        info!(
            path = %self.path.display(),
            pools = snapshot.pools.len(),
            farms = snapshot.farms.len(),
            "loaded snapshot"
        );
        Ok(Some(snapshot))
    }

    /// Write to a sibling temp file, then rename over the target
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;

        info!(
            path = %self.path.display(),
            pools = snapshot.pools.len(),
            farms = snapshot.farms.len(),
            "saved snapshot"
        );
        Ok(())
    }
}
