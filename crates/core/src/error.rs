// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by workflow state transitions and registry lookups.

use crate::job::{JobId, JobStatus};
use crate::project::ProjectId;
use crate::step::StepStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("invalid transition for step '{step}': {from} -> {to}")]
    InvalidTransition { step: String, from: StepStatus, to: StepStatus },

    #[error("step '{step}' cannot fail without an error message")]
    MissingErrorDetail { step: String },

    #[error("project '{project}' already has an active job ({job})")]
    AlreadyRunning { project: ProjectId, job: JobId },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("job {job} has no step '{step}'")]
    UnknownStep { job: JobId, step: String },

    #[error("job {job} is {status} and accepts no further changes")]
    JobClosed { job: JobId, status: JobStatus },

    #[error("job {job} is {status}; only failed jobs can be retried")]
    NotRetryable { job: JobId, status: JobStatus },

    #[error("job {0} already exists")]
    DuplicateJob(JobId),

    #[error("invalid workflow: {0}")]
    InvalidWorkflow(String),
}

impl WorkflowError {
    /// Short machine-readable tag, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::MissingErrorDetail { .. } => "missing_error_detail",
            Self::AlreadyRunning { .. } => "already_running",
            Self::NotFound(_) => "not_found",
            Self::UnknownStep { .. } => "unknown_step",
            Self::JobClosed { .. } => "job_closed",
            Self::NotRetryable { .. } => "not_retryable",
            Self::DuplicateJob(_) => "duplicate_job",
            Self::InvalidWorkflow(_) => "invalid_workflow",
        }
    }
}
