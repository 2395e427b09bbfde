// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::path::PathBuf;

use crate::EngineError;

/// Jobs kept per project when `SCRIBE_HISTORY_LIMIT` is unset.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// WAL entries between snapshots when `SCRIBE_CHECKPOINT_EVERY` is unset.
pub const DEFAULT_CHECKPOINT_EVERY: u64 = 500;

/// Resolve state directory: SCRIBE_STATE_DIR > XDG_STATE_HOME/scribe > ~/.local/state/scribe
pub fn state_dir() -> Result<PathBuf, EngineError> {
    if let Some(dir) = non_empty("SCRIBE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("scribe"));
    }
    let home = non_empty("HOME").ok_or(EngineError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/scribe"))
}

/// Maximum retained jobs per project (at least 1).
pub fn history_limit() -> usize {
    non_empty("SCRIBE_HISTORY_LIMIT")
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
}

/// Applied events between automatic snapshots (0 disables them).
pub fn checkpoint_every() -> u64 {
    non_empty("SCRIBE_CHECKPOINT_EVERY")
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_CHECKPOINT_EVERY)
}

/// Log filter directive for the CLI's subscriber.
pub fn log_filter() -> String {
    non_empty("SCRIBE_LOG").unwrap_or_else(|| "info".to_string())
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
