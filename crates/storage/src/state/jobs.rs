// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and step event handlers.

use scribe_core::{Event, Job, JobConfig, StepStatus, WorkflowError};

use super::helpers;
use super::MaterializedState;

/// Validate `event` without changing anything.
pub(crate) fn check(state: &MaterializedState, event: &Event) -> Result<(), WorkflowError> {
    match event {
        Event::JobCreated { .. } => check_created(state, event).map(|_| ()),
        Event::JobDeleted { id } => state
            .jobs
            .get(id.as_str())
            .map(|_| ())
            .ok_or_else(|| WorkflowError::NotFound(format!("job {id}"))),
        _ => check_for_job(helpers::job(&state.jobs, event.job_id())?, event),
    }
}

/// Same outcome as [`apply_to_job`] on `job`, without touching it.
fn check_for_job(job: &Job, event: &Event) -> Result<(), WorkflowError> {
    match event {
        Event::StepStarted { step, .. } => job.check_step(step, StepStatus::Running, ""),
        Event::StepCompleted { step, .. } => job.check_step(step, StepStatus::Completed, ""),
        Event::StepFailed { step, error, .. } => job.check_step(step, StepStatus::Failed, error),
        Event::StepSkipped { step, .. } => job.check_step(step, StepStatus::Skipped, ""),
        Event::JobCancelled { .. } | Event::LogAppended { .. } => job.check_open(),
        Event::JobCreated { .. } | Event::JobDeleted { .. } => Ok(()),
    }
}

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) -> Result<(), WorkflowError> {
    match event {
        Event::JobCreated { .. } => {
            let (config, created_at_ms) = check_created(state, event)?;
            let job = Job::new_with_epoch_ms(config, created_at_ms);
            state.history.entry(job.project.to_string()).or_default().push(job.id.clone());
            state.jobs.insert(job.id.to_string(), job);
        }

        Event::JobDeleted { id } => {
            let job = state
                .jobs
                .remove(id.as_str())
                .ok_or_else(|| WorkflowError::NotFound(format!("job {id}")))?;
            let project = job.project.to_string();
            if let Some(ids) = state.history.get_mut(&project) {
                ids.retain(|j| j != id);
                if ids.is_empty() {
                    state.history.remove(&project);
                }
            }
        }

        _ => apply_to_job(helpers::job_mut(&mut state.jobs, event.job_id())?, event)?,
    }
    Ok(())
}

fn check_created(
    state: &MaterializedState,
    event: &Event,
) -> Result<(JobConfig, u64), WorkflowError> {
    let Some((config, created_at_ms)) = event.as_job_config() else {
        return Err(WorkflowError::NotFound(format!("job {}", event.job_id())));
    };
    if state.jobs.contains_key(config.id.as_str()) {
        return Err(WorkflowError::DuplicateJob(config.id));
    }
    if let Some(active) = state.active_job(config.project.as_str()) {
        return Err(WorkflowError::AlreadyRunning {
            project: config.project,
            job: active.id.clone(),
        });
    }
    config.workflow.validate()?;
    Ok((config, created_at_ms))
}

/// Step, log, and cancellation events for an existing job.
fn apply_to_job(job: &mut Job, event: &Event) -> Result<(), WorkflowError> {
    match event {
        Event::JobCancelled { reason, at_ms, .. } => job.cancel(reason, *at_ms),
        Event::StepStarted { step, at_ms, .. } => job.start_step(step, *at_ms),
        Event::StepCompleted { step, output, at_ms, .. } => {
            job.complete_step(step, output.clone(), *at_ms)
        }
        Event::StepFailed { step, error, at_ms, .. } => job.fail_step(step, error, *at_ms),
        Event::StepSkipped { step, reason, at_ms, .. } => {
            job.skip_step(step, reason.as_deref(), *at_ms)
        }
        Event::LogAppended { level, message, step, at_ms, .. } => {
            job.append_log(*level, message, step.clone(), *at_ms).map(|_| ())
        }
        Event::JobCreated { .. } | Event::JobDeleted { .. } => Ok(()),
    }
}
