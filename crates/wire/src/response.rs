// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use scribe_core::{JobId, SyncStatus};
use serde::{Deserialize, Serialize};

use super::{JobDetail, JobSummary, LogEntryDetail};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// List of jobs
    Jobs { jobs: Vec<JobSummary> },

    /// Single job details
    Job { job: Option<Box<JobDetail>> },

    /// Log entries after a cursor
    Logs {
        job_id: JobId,
        entries: Vec<LogEntryDetail>,
        /// Cursor for the next poll
        last_seq: u64,
    },

    Sync { project: String, status: SyncStatus },

    /// Error response
    Error { message: String },
}
