// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Constructors and accessors for [`Event`]

use super::Event;
use crate::job::{JobConfig, JobId};

impl Event {
    /// `job:created` for a job built from `config` at `at_ms`.
    pub fn job_created(config: JobConfig, at_ms: u64) -> Self {
        Event::JobCreated {
            id: config.id,
            project: config.project,
            project_name: config.project_name,
            source: config.source,
            workflow: config.workflow,
            created_at_ms: at_ms,
            attempt: config.attempt,
            retry_of: config.retry_of,
        }
    }

    /// Inverse of [`Event::job_created`]: the config and creation time.
    pub fn as_job_config(&self) -> Option<(JobConfig, u64)> {
        match self {
            Event::JobCreated {
                id,
                project,
                project_name,
                source,
                workflow,
                created_at_ms,
                attempt,
                retry_of,
            } => Some((
                JobConfig {
                    id: id.clone(),
                    project: project.clone(),
                    project_name: project_name.clone(),
                    source: source.clone(),
                    workflow: workflow.clone(),
                    attempt: *attempt,
                    retry_of: retry_of.clone(),
                },
                *created_at_ms,
            )),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::JobCreated { .. } => "job:created",
            Event::JobCancelled { .. } => "job:cancelled",
            Event::JobDeleted { .. } => "job:deleted",
            Event::StepStarted { .. } => "step:started",
            Event::StepCompleted { .. } => "step:completed",
            Event::StepFailed { .. } => "step:failed",
            Event::StepSkipped { .. } => "step:skipped",
            Event::LogAppended { .. } => "log:appended",
        }
    }

    /// One-line description for tracing output. Free text (errors, log
    /// messages, outputs) is left out.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::JobCreated { id, project, attempt, workflow, .. } => {
                format!(
                    "{t} id={id} project={project} attempt={attempt} steps={}",
                    workflow.step_count()
                )
            }
            Event::JobCancelled { job_id, .. } => format!("{t} job={job_id}"),
            Event::JobDeleted { id } => format!("{t} id={id}"),
            Event::StepStarted { job_id, step, .. }
            | Event::StepCompleted { job_id, step, .. }
            | Event::StepFailed { job_id, step, .. }
            | Event::StepSkipped { job_id, step, .. } => format!("{t} job={job_id} step={step}"),
            Event::LogAppended { job_id, level, .. } => format!("{t} job={job_id} level={level}"),
        }
    }

    pub fn job_id(&self) -> &JobId {
        match self {
            Event::JobCreated { id, .. } | Event::JobDeleted { id } => id,
            Event::JobCancelled { job_id, .. }
            | Event::StepStarted { job_id, .. }
            | Event::StepCompleted { job_id, .. }
            | Event::StepFailed { job_id, .. }
            | Event::StepSkipped { job_id, .. }
            | Event::LogAppended { job_id, .. } => job_id,
        }
    }
}

#[cfg(test)]
#[path = "method_tests.rs"]
mod method_tests;
