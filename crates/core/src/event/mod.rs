// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events emitted by the driver and recorded in the WAL.
//!
//! Each event is a fact about one job. The engine validates an event against
//! the current state before it is persisted, so replaying the WAL in order
//! rebuilds exactly the state readers saw.

mod methods;

use crate::job::JobId;
use crate::log::LogLevel;
use crate::project::{IntegrationSource, ProjectId};
use crate::workflow::WorkflowTemplate;
use serde::{Deserialize, Serialize};

fn first_attempt() -> u32 {
    1
}

/// Serializes with `{"type": "domain:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "job:created")]
    JobCreated {
        id: JobId,
        project: ProjectId,
        project_name: String,
        #[serde(default)]
        source: IntegrationSource,
        workflow: WorkflowTemplate,
        created_at_ms: u64,
        #[serde(default = "first_attempt")]
        attempt: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_of: Option<JobId>,
    },

    #[serde(rename = "job:cancelled")]
    JobCancelled { job_id: JobId, reason: String, at_ms: u64 },

    /// History pruning; removes the job from the registry entirely.
    #[serde(rename = "job:deleted")]
    JobDeleted { id: JobId },

    #[serde(rename = "step:started")]
    StepStarted { job_id: JobId, step: String, at_ms: u64 },

    #[serde(rename = "step:completed")]
    StepCompleted {
        job_id: JobId,
        step: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        at_ms: u64,
    },

    #[serde(rename = "step:failed")]
    StepFailed { job_id: JobId, step: String, error: String, at_ms: u64 },

    #[serde(rename = "step:skipped")]
    StepSkipped {
        job_id: JobId,
        step: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        at_ms: u64,
    },

    #[serde(rename = "log:appended")]
    LogAppended {
        job_id: JobId,
        level: LogLevel,
        message: String,
        /// Step name the message relates to
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<String>,
        at_ms: u64,
    },
}
