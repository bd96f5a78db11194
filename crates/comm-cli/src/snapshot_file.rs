//! On-disk snapshot container.

use anyhow::{bail, Context, Result};
use comm_world::WorldSnapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub version: u32,
    /// Unix seconds at capture time
    pub timestamp: i64,
    pub snapshot: WorldSnapshot,
}

impl SnapshotFile {
    pub fn new(snapshot: WorldSnapshot) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            timestamp: chrono::Utc::now().timestamp(),
            snapshot,
        }
    }
}

/// Write the final world state with bincode
pub async fn write_snapshot(path: &Path, snapshot: WorldSnapshot) -> Result<()> {
    let file = SnapshotFile::new(snapshot);
    let bytes = bincode::serialize(&file).context("failed to serialize snapshot")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, &bytes)
        .await
        .with_context(|| format!("failed to write snapshot to {}", path.display()))?;

    info!(
        path = %path.display(),
        tick = file.snapshot.tick,
        bytes = bytes.len(),
        "Snapshot written"
    );
    Ok(())
}

pub async fn read_snapshot(path: &Path) -> Result<SnapshotFile> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("failed to read snapshot from {}", path.display()))?;
    let file: SnapshotFile = bincode::deserialize(&bytes).context("corrupt snapshot file")?;
    if file.version != SNAPSHOT_VERSION {
        bail!(
            "unsupported snapshot version {} (expected {})",
            file.version,
            SNAPSHOT_VERSION
        );
    }
    Ok(file)
}
