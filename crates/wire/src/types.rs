// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs for job state.

use scribe_core::{
    Job, JobId, JobStatus, LogEntry, LogLevel, Phase, PhaseStatus, Step, StepStatus,
};
use serde::{Deserialize, Serialize};

/// One row of a job listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: JobId,
    pub project: String,
    pub project_name: String,
    pub status: JobStatus,
    pub progress: u8,
    /// Display name of the phase being worked on
    #[serde(default)]
    pub current_phase: Option<String>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default = "first_attempt")]
    pub attempt: u32,
    pub created_at_ms: u64,
    pub elapsed_ms: u64,
}

fn first_attempt() -> u32 {
    1
}

impl JobSummary {
    pub fn from_job(job: &Job, now_ms: u64) -> Self {
        Self {
            id: job.id.clone(),
            project: job.project.to_string(),
            project_name: job.project_name.clone(),
            status: job.status(),
            progress: job.progress(),
            current_phase: job.current_phase().map(|p| p.name.clone()),
            current_step: job.current_step().map(|s| s.name.clone()),
            attempt: job.attempt,
            created_at_ms: job.created_at_ms,
            elapsed_ms: job.elapsed_ms(now_ms),
        }
    }
}

/// Everything a progress view renders for one job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobDetail {
    pub id: JobId,
    pub project: String,
    pub project_name: String,
    /// Filesystem path or repository location
    pub source: String,
    pub status: JobStatus,
    pub progress: u8,
    /// Id of the entry in `phases` being worked on
    pub current_phase: Option<String>,
    /// Id of the step being worked on
    pub current_step: Option<String>,
    pub attempt: u32,
    #[serde(default)]
    pub retry_of: Option<JobId>,
    pub created_at_ms: u64,
    #[serde(default)]
    pub finished_at_ms: Option<u64>,
    #[serde(default)]
    pub estimated_completion_ms: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    pub phases: Vec<PhaseDetail>,
    /// Most recent log entries
    #[serde(default)]
    pub logs: Vec<LogEntryDetail>,
}

impl JobDetail {
    /// `log_tail` limits the embedded log entries (0 = none).
    pub fn from_job(job: &Job, now_ms: u64, log_tail: usize) -> Self {
        Self {
            id: job.id.clone(),
            project: job.project.to_string(),
            project_name: job.project_name.clone(),
            source: job.source_path(),
            status: job.status(),
            progress: job.progress(),
            current_phase: job.current_phase().map(|p| p.id.clone()),
            current_step: job.current_step().map(|s| s.id.clone()),
            attempt: job.attempt,
            retry_of: job.retry_of.clone(),
            created_at_ms: job.created_at_ms,
            finished_at_ms: job.finished_at_ms(),
            estimated_completion_ms: job.estimated_completion_ms(now_ms),
            error: job.error().map(str::to_string),
            phases: job.phases().iter().map(PhaseDetail::from).collect(),
            logs: match log_tail {
                0 => Vec::new(),
                n => job.logs().tail(n).iter().map(LogEntryDetail::from).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseDetail {
    pub id: String,
    pub name: String,
    pub status: PhaseStatus,
    /// Completed or skipped steps
    pub completed: usize,
    pub total: usize,
    pub steps: Vec<StepDetail>,
}

impl From<&Phase> for PhaseDetail {
    fn from(phase: &Phase) -> Self {
        Self {
            id: phase.id.clone(),
            name: phase.name.clone(),
            status: phase.status(),
            completed: phase.completed_count(),
            total: phase.total(),
            steps: phase.steps.iter().map(StepDetail::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: StepStatus,
    #[serde(default)]
    pub started_at_ms: Option<u64>,
    #[serde(default)]
    pub completed_at_ms: Option<u64>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<&Step> for StepDetail {
    fn from(step: &Step) -> Self {
        Self {
            id: step.id.clone(),
            name: step.name.clone(),
            description: step.description.clone(),
            status: step.status(),
            started_at_ms: step.started_at_ms(),
            completed_at_ms: step.completed_at_ms(),
            output: step.output().map(str::to_string),
            error: step.error().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntryDetail {
    pub seq: u64,
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub step: Option<String>,
}

impl From<&LogEntry> for LogEntryDetail {
    fn from(entry: &LogEntry) -> Self {
        Self {
            seq: entry.seq,
            timestamp_ms: entry.timestamp_ms,
            level: entry.level,
            message: entry.message.clone(),
            step: entry.step.clone(),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
