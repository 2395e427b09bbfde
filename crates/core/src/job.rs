// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, configuration, and aggregate state.
//!
//! A job owns its phases and log stream. Status, progress, and the
//! current phase/step pointers are derived from step state on every read.
//! Mutations go through methods that validate first and touch state only on
//! success, so a rejected call leaves the job exactly as it was.

use crate::clock::Clock;
use crate::error::WorkflowError;
use crate::log::{LogLevel, LogStream};
use crate::phase::{Phase, PhaseStatus};
use crate::project::{IntegrationSource, ProjectId};
use crate::step::{Step, StepStatus};
use crate::workflow::WorkflowTemplate;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for one run of the documentation workflow.
    pub struct JobId("job-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

crate::string_enum! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Pending or running: blocks another job for the same project.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// Configuration for creating a new job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub id: JobId,
    pub project: ProjectId,
    pub project_name: String,
    pub source: IntegrationSource,
    pub workflow: WorkflowTemplate,
    pub attempt: u32,
    pub retry_of: Option<JobId>,
}

impl JobConfig {
    pub fn builder(id: impl Into<JobId>, project: impl Into<ProjectId>) -> JobConfigBuilder {
        let project = project.into();
        JobConfigBuilder {
            id: id.into(),
            project_name: project.to_string(),
            project,
            source: IntegrationSource::default(),
            workflow: WorkflowTemplate::documentation(),
            attempt: 1,
            retry_of: None,
        }
    }
}

pub struct JobConfigBuilder {
    id: JobId,
    project: ProjectId,
    project_name: String,
    source: IntegrationSource,
    workflow: WorkflowTemplate,
    attempt: u32,
    retry_of: Option<JobId>,
}

impl JobConfigBuilder {
    crate::setters! {
        into {
            project_name: String,
            source: IntegrationSource,
        }
        set {
            workflow: WorkflowTemplate,
            attempt: u32,
        }
        option {
            retry_of: JobId,
        }
    }

    pub fn build(self) -> JobConfig {
        JobConfig {
            id: self.id,
            project: self.project,
            project_name: self.project_name,
            source: self.source,
            workflow: self.workflow,
            attempt: self.attempt,
            retry_of: self.retry_of,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub reason: String,
    pub at_ms: u64,
}

/// A documentation job instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project: ProjectId,
    pub project_name: String,
    pub source: IntegrationSource,
    pub created_at_ms: u64,
    /// 1 for the first run, incremented by each retry.
    pub attempt: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_of: Option<JobId>,
    phases: Vec<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cancelled: Option<Cancellation>,
    #[serde(default)]
    logs: LogStream,
}

impl Job {
    pub fn new(config: JobConfig, clock: &impl Clock) -> Self {
        Self::new_with_epoch_ms(config, clock.epoch_ms())
    }

    /// Create a job with an explicit creation time (WAL replay)
    pub fn new_with_epoch_ms(config: JobConfig, epoch_ms: u64) -> Self {
        let mut logs = LogStream::new();
        let message = match config.retry_of {
            Some(ref previous) => format!(
                "Job retried for project {} (attempt {}, previous {})",
                config.project_name, config.attempt, previous
            ),
            None => format!("Job started for project {}", config.project_name),
        };
        logs.append(LogLevel::Info, message, None, epoch_ms);
        Self {
            id: config.id,
            project: config.project,
            project_name: config.project_name,
            source: config.source,
            created_at_ms: epoch_ms,
            attempt: config.attempt,
            retry_of: config.retry_of,
            phases: config.workflow.instantiate(),
            cancelled: None,
            logs,
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn logs(&self) -> &LogStream {
        &self.logs
    }

    pub fn cancellation(&self) -> Option<&Cancellation> {
        self.cancelled.as_ref()
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.phases.iter().find_map(|p| p.step(id))
    }

    fn steps(&self) -> impl Iterator<Item = &Step> {
        self.phases.iter().flat_map(|p| p.steps.iter())
    }

    /// Source location shown to users (path or repository).
    pub fn source_path(&self) -> String {
        self.source.location()
    }

    /// Overall status.
    ///
    /// Cancelled or any failed phase: failed. Every phase completed:
    /// completed. A step running, or some progress made with work left (the
    /// driver is between steps): running. Otherwise pending.
    pub fn status(&self) -> JobStatus {
        if self.cancelled.is_some() {
            return JobStatus::Failed;
        }
        let statuses: Vec<PhaseStatus> = self.phases.iter().map(Phase::status).collect();
        if statuses.contains(&PhaseStatus::Failed) {
            JobStatus::Failed
        } else if statuses.iter().all(|s| *s == PhaseStatus::Completed) {
            JobStatus::Completed
        } else if statuses.contains(&PhaseStatus::Running)
            || self.steps().any(|s| s.status() != StepStatus::Pending)
        {
            JobStatus::Running
        } else {
            JobStatus::Pending
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Overall progress 0..=100: the mean of the phase completion ratios
    /// (each phase weighs the same regardless of its step count), rounded
    /// half-up. Steps only move forward, so this never decreases within a run.
    pub fn progress(&self) -> u8 {
        if self.phases.is_empty() {
            return 100;
        }
        let sum: f64 = self.phases.iter().map(Phase::progress_ratio).sum();
        let pct = (sum / self.phases.len() as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    /// First phase (in declared order) that is not fully completed/skipped.
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.iter().find(|p| !p.is_done())
    }

    /// Within the current phase: the running step, else the first pending
    /// one, else (failed phase with nothing left to run) the failed step.
    pub fn current_step(&self) -> Option<&Step> {
        let phase = self.current_phase()?;
        phase
            .current_step()
            .or_else(|| phase.steps.iter().find(|s| s.status() == StepStatus::Failed))
    }

    /// Top-level error: the cancellation reason, else the first failed
    /// step's message.
    pub fn error(&self) -> Option<&str> {
        self.cancelled
            .as_ref()
            .map(|c| c.reason.as_str())
            .or_else(|| self.steps().find_map(|s| s.error()))
    }

    /// When the job reached a terminal state.
    pub fn finished_at_ms(&self) -> Option<u64> {
        if !self.is_terminal() {
            return None;
        }
        let last_step = self.steps().filter_map(Step::completed_at_ms).max();
        let cancelled = self.cancelled.as_ref().map(|c| c.at_ms);
        last_step.max(cancelled).or(Some(self.created_at_ms))
    }

    pub fn elapsed_ms(&self, now: u64) -> u64 {
        self.finished_at_ms().unwrap_or(now).saturating_sub(self.created_at_ms)
    }

    /// Linear extrapolation from elapsed time and progress. Only defined
    /// while running with some but not all progress made.
    pub fn estimated_completion_ms(&self, now: u64) -> Option<u64> {
        if self.status() != JobStatus::Running {
            return None;
        }
        let progress = u64::from(self.progress());
        if progress == 0 || progress >= 100 {
            return None;
        }
        let elapsed = now.saturating_sub(self.created_at_ms);
        Some(now + elapsed * (100 - progress) / progress)
    }

    fn ensure_open(&self) -> Result<(), WorkflowError> {
        let status = self.status();
        if status.is_terminal() {
            return Err(WorkflowError::JobClosed { job: self.id.clone(), status });
        }
        Ok(())
    }

    /// Fails with `JobClosed` once the job is terminal.
    pub fn check_open(&self) -> Result<(), WorkflowError> {
        self.ensure_open()
    }

    /// Validate moving `step_id` to `to` without changing anything. `error`
    /// is the failure text when `to` is failed.
    pub fn check_step(
        &self,
        step_id: &str,
        to: StepStatus,
        error: &str,
    ) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        let step = self.step(step_id).ok_or_else(|| WorkflowError::UnknownStep {
            job: self.id.clone(),
            step: step_id.to_string(),
        })?;
        step.check(to, error)
    }

    fn step_mut(&mut self, id: &str) -> Result<&mut Step, WorkflowError> {
        let job = &self.id;
        self.phases
            .iter_mut()
            .find_map(|p| p.step_mut(id))
            .ok_or_else(|| WorkflowError::UnknownStep { job: job.clone(), step: id.to_string() })
    }

    pub fn start_step(&mut self, step_id: &str, now: u64) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        let step = self.step_mut(step_id)?;
        step.start(now)?;
        let name = step.name.clone();
        self.logs.append(LogLevel::Info, format!("Starting {name}"), Some(name), now);
        Ok(())
    }

    pub fn complete_step(
        &mut self,
        step_id: &str,
        output: Option<String>,
        now: u64,
    ) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        let step = self.step_mut(step_id)?;
        step.complete(output, now)?;
        let name = step.name.clone();
        let message = match step.output() {
            Some(output) => format!("{name} completed: {output}"),
            None => format!("{name} completed"),
        };
        self.logs.append(LogLevel::Info, message, Some(name), now);
        Ok(())
    }

    pub fn fail_step(&mut self, step_id: &str, error: &str, now: u64) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        let step = self.step_mut(step_id)?;
        step.fail(error, now)?;
        let name = step.name.clone();
        self.logs.append(LogLevel::Error, error, Some(name), now);
        Ok(())
    }

    pub fn skip_step(
        &mut self,
        step_id: &str,
        reason: Option<&str>,
        now: u64,
    ) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        let step = self.step_mut(step_id)?;
        step.skip(now)?;
        let name = step.name.clone();
        let message = match reason {
            Some(reason) => format!("Skipped {name}: {reason}"),
            None => format!("Skipped {name}"),
        };
        self.logs.append(LogLevel::Debug, message, Some(name), now);
        Ok(())
    }

    /// Append a driver log entry; returns its sequence number.
    pub fn append_log(
        &mut self,
        level: LogLevel,
        message: &str,
        step: Option<String>,
        now: u64,
    ) -> Result<u64, WorkflowError> {
        self.ensure_open()?;
        Ok(self.logs.append(level, message, step, now))
    }

    /// Cancel the job: running steps fail with `cancelled: <reason>` and the
    /// job becomes failed. A blank reason becomes "cancelled by user".
    pub fn cancel(&mut self, reason: &str, now: u64) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        let reason = match reason.trim() {
            "" => "cancelled by user",
            r => r,
        }
        .to_string();
        let error = format!("cancelled: {reason}");
        for step in self.phases.iter_mut().flat_map(|p| p.steps.iter_mut()) {
            if step.status() == StepStatus::Running {
                step.fail(&error, now)?;
            }
        }
        self.logs.append(LogLevel::Warn, format!("Job cancelled: {reason}"), None, now);
        self.cancelled = Some(Cancellation { reason, at_ms: now });
        Ok(())
    }

    /// Configuration for the next attempt of a failed job: same project and
    /// workflow layout, every step pending, a fresh log stream.
    pub fn retry_config(&self, new_id: JobId) -> Result<JobConfig, WorkflowError> {
        let status = self.status();
        if status != JobStatus::Failed {
            return Err(WorkflowError::NotRetryable { job: self.id.clone(), status });
        }
        Ok(JobConfig {
            id: new_id,
            project: self.project.clone(),
            project_name: self.project_name.clone(),
            source: self.source.clone(),
            workflow: WorkflowTemplate::from_phases(&self.phases),
            attempt: self.attempt + 1,
            retry_of: Some(self.id.clone()),
        })
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
