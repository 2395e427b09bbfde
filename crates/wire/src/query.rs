// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query types for reading registry state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Query {
    /// Most recent job of every project
    ListJobs,
    /// Job by id or unique id prefix
    GetJob {
        id: String,
    },
    /// Most recent job for a project
    GetProjectJob {
        project: String,
    },
    /// All retained jobs for a project, oldest first
    GetHistory {
        project: String,
    },
    /// Log entries with seq greater than `since`
    GetLogs {
        /// Job ID (prefix match supported)
        id: String,
        #[serde(default)]
        since: u64,
        /// Keep only the most recent N entries (0 = all)
        #[serde(default)]
        limit: usize,
    },
    GetSyncStatus {
        project: String,
        /// Commit currently at the head of the project's branch
        #[serde(default)]
        head: Option<String>,
    },
}
