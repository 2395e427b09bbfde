// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry configuration: state paths and retention.

use std::path::{Path, PathBuf};

use crate::{env, EngineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/scribe)
    pub state_dir: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// Exclusive lock held while a registry is open
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    /// Maximum retained jobs per project
    pub history_limit: usize,
    /// Applied events between automatic snapshots (0 = never)
    pub checkpoint_every: u64,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, EngineError> {
        Ok(Self::for_dir(env::state_dir()?))
    }

    /// Configuration rooted at `state_dir`; retention settings still come
    /// from the environment.
    pub fn for_dir(state_dir: impl AsRef<Path>) -> Self {
        let state_dir = state_dir.as_ref().to_path_buf();
        Self {
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.json.zst"),
            lock_path: state_dir.join("scribe.lock"),
            log_path: state_dir.join("scribe.log"),
            history_limit: env::history_limit(),
            checkpoint_every: env::checkpoint_every(),
            state_dir,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn with_checkpoint_every(mut self, every: u64) -> Self {
        self.checkpoint_every = every;
        self
    }
}
