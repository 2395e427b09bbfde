// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writing and loading compressed snapshots.

use crate::snapshot::{rotate_bak_path, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
use crate::MaterializedState;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

const ZSTD_LEVEL: i32 = 3;

/// zstd frame magic, little-endian.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointResult {
    pub seq: u64,
    pub size_bytes: u64,
}

/// Writes snapshots atomically: compress to a temp file, fsync, rename.
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn checkpoint_sync(
        &self,
        seq: u64,
        state: &MaterializedState,
    ) -> Result<CheckpointResult, SnapshotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(&Snapshot::new(seq, state.clone()))?;
        let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(CheckpointResult { seq, size_bytes: compressed.len() as u64 })
    }
}

/// Load the snapshot at `path`, if any.
///
/// Accepts zstd-compressed or plain JSON. An unreadable snapshot is moved to
/// a `.bak` file and treated as absent, so recovery falls back to a full WAL
/// replay.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    let decoded = if bytes.starts_with(&ZSTD_MAGIC) {
        zstd::decode_all(bytes.as_slice())
    } else {
        Ok(bytes)
    };

    let parsed = decoded
        .map_err(SnapshotError::from)
        .and_then(|json| serde_json::from_slice::<Snapshot>(&json).map_err(SnapshotError::from));

    match parsed {
        Ok(snapshot) if snapshot.version > CURRENT_SNAPSHOT_VERSION => {
            Err(SnapshotError::TooNew(snapshot.version))
        }
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            let bak = rotate_bak_path(path);
            warn!(path = %path.display(), bak = %bak.display(), error = %e, "unreadable snapshot, moving aside");
            fs::rename(path, &bak)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
