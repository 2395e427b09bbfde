// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::error::WorkflowError;
use crate::job::{Job, JobConfig, JobId};
use crate::step::{Step, StepStatus};
use crate::workflow::{PhaseTemplate, StepTemplate, WorkflowTemplate};
use crate::Event;

// ── Proptest strategies ─────────────────────────────────────────────────

/// A driver call against one step, used to fuzz the state machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    Start,
    Complete,
    Fail(String),
    Skip,
}

impl StepAction {
    pub fn apply(&self, step: &mut Step, now: u64) -> Result<(), WorkflowError> {
        match self {
            StepAction::Start => step.start(now),
            StepAction::Complete => step.complete(None, now),
            StepAction::Fail(error) => step.fail(error, now),
            StepAction::Skip => step.skip(now),
        }
    }

    pub fn apply_to_job(&self, job: &mut Job, step: &str, now: u64) -> Result<(), WorkflowError> {
        match self {
            StepAction::Start => job.start_step(step, now),
            StepAction::Complete => job.complete_step(step, None, now),
            StepAction::Fail(error) => job.fail_step(step, error, now),
            StepAction::Skip => job.skip_step(step, None, now),
        }
    }
}

/// Proptest strategies for core state machine types.
pub mod strategies {
    use super::StepAction;
    use crate::step::StepStatus;
    use proptest::prelude::*;

    pub fn arb_step_status() -> impl Strategy<Value = StepStatus> {
        prop_oneof![
            Just(StepStatus::Pending),
            Just(StepStatus::Running),
            Just(StepStatus::Completed),
            Just(StepStatus::Failed),
            Just(StepStatus::Skipped),
        ]
    }

    pub fn arb_step_action() -> impl Strategy<Value = StepAction> {
        prop_oneof![
            3 => Just(StepAction::Start),
            3 => Just(StepAction::Complete),
            1 => "[a-z ]{0,12}".prop_map(StepAction::Fail),
            1 => Just(StepAction::Skip),
        ]
    }
}

// ── Builders ────────────────────────────────────────────────────────────

/// A step driven into `status` through valid transitions.
#[allow(clippy::panic)]
pub fn step_with_status(id: &str, status: StepStatus) -> Step {
    let mut step = Step::new(id, id, "");
    let result = match status {
        StepStatus::Pending => Ok(()),
        StepStatus::Running => step.start(1),
        StepStatus::Completed => step.start(1).and_then(|_| step.complete(None, 2)),
        StepStatus::Failed => step.start(1).and_then(|_| step.fail("boom", 2)),
        StepStatus::Skipped => step.skip(1),
    };
    if let Err(e) = result {
        panic!("driving step to {status}: {e}");
    }
    step
}

/// Workflow from `(phase, [step ids])` pairs. Phase and step names equal
/// their ids.
pub fn workflow(layout: &[(&str, &[&str])]) -> WorkflowTemplate {
    WorkflowTemplate {
        phases: layout
            .iter()
            .map(|(phase, steps)| PhaseTemplate {
                id: phase.to_string(),
                name: phase.to_string(),
                steps: steps
                    .iter()
                    .map(|id| StepTemplate {
                        id: id.to_string(),
                        name: id.to_string(),
                        description: String::new(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

// ── Event factory functions ─────────────────────────────────────────────────

/// `job:created` for the standard documentation workflow at t=1_000_000.
pub fn job_created_event(id: &str, project: &str) -> Event {
    Event::job_created(JobConfig::builder(id, project).build(), 1_000_000)
}

pub fn job_deleted_event(id: &str) -> Event {
    Event::JobDeleted { id: JobId::from_string(id) }
}

pub fn step_started_event(job_id: &str, step: &str) -> Event {
    Event::StepStarted { job_id: JobId::from_string(job_id), step: step.to_string(), at_ms: 1_000_100 }
}

pub fn step_completed_event(job_id: &str, step: &str, output: Option<&str>) -> Event {
    Event::StepCompleted {
        job_id: JobId::from_string(job_id),
        step: step.to_string(),
        output: output.map(str::to_string),
        at_ms: 1_000_200,
    }
}

pub fn step_failed_event(job_id: &str, step: &str, error: &str) -> Event {
    Event::StepFailed {
        job_id: JobId::from_string(job_id),
        step: step.to_string(),
        error: error.to_string(),
        at_ms: 1_000_200,
    }
}

pub fn step_skipped_event(job_id: &str, step: &str) -> Event {
    Event::StepSkipped {
        job_id: JobId::from_string(job_id),
        step: step.to_string(),
        reason: None,
        at_ms: 1_000_200,
    }
}

pub fn job_cancelled_event(job_id: &str, reason: &str) -> Event {
    Event::JobCancelled {
        job_id: JobId::from_string(job_id),
        reason: reason.to_string(),
        at_ms: 1_000_300,
    }
}
