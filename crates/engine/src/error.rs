// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use scribe_core::WorkflowError;
use scribe_storage::{SnapshotError, WalError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("state directory {0} is in use by another process")]
    Locked(PathBuf),

    #[error("driver loop has stopped")]
    DriverClosed,
}

impl EngineError {
    /// The workflow rejection behind this error, if that is what it is.
    pub fn workflow(&self) -> Option<&WorkflowError> {
        match self {
            Self::Workflow(e) => Some(e),
            _ => None,
        }
    }
}
