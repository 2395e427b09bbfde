// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step status machine.
//!
//! ```text
//! pending ──► running ──► completed
//!    │           ├──────► failed
//!    └───────────┴──────► skipped
//! ```
//!
//! Completed, failed, and skipped are terminal for a job attempt.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

crate::string_enum! {
    StepStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Skipped => "skipped",
    }
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Counts toward progress: completed or skipped.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    pub fn can_transition_to(self, next: StepStatus) -> bool {
        use StepStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Pending, Skipped)
                | (Running, Skipped)
        )
    }
}

/// Smallest trackable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            status: StepStatus::Pending,
            started_at_ms: None,
            completed_at_ms: None,
            output: None,
            error: None,
        }
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn completed_at_ms(&self) -> Option<u64> {
        self.completed_at_ms
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Milliseconds spent running, up to completion or `now` while still running.
    pub fn elapsed_ms(&self, now: u64) -> Option<u64> {
        let started = self.started_at_ms?;
        Some(self.completed_at_ms.unwrap_or(now).saturating_sub(started))
    }

    /// Whether moving to `to` is allowed. `error` is the failure text and
    /// only matters when `to` is failed.
    pub fn check(&self, to: StepStatus, error: &str) -> Result<(), WorkflowError> {
        if !self.status.can_transition_to(to) {
            return Err(WorkflowError::InvalidTransition {
                step: self.id.clone(),
                from: self.status,
                to,
            });
        }
        if to == StepStatus::Failed && error.trim().is_empty() {
            return Err(WorkflowError::MissingErrorDetail { step: self.id.clone() });
        }
        Ok(())
    }

    pub fn start(&mut self, now: u64) -> Result<(), WorkflowError> {
        self.check(StepStatus::Running, "")?;
        self.status = StepStatus::Running;
        self.started_at_ms = Some(now);
        Ok(())
    }

    pub fn complete(&mut self, output: Option<String>, now: u64) -> Result<(), WorkflowError> {
        self.check(StepStatus::Completed, "")?;
        self.status = StepStatus::Completed;
        self.completed_at_ms = Some(now);
        self.output = output;
        Ok(())
    }

    /// Fails a running step. Blank error text is rejected with
    /// [`WorkflowError::MissingErrorDetail`] and leaves the step untouched.
    pub fn fail(&mut self, error: &str, now: u64) -> Result<(), WorkflowError> {
        self.check(StepStatus::Failed, error)?;
        self.status = StepStatus::Failed;
        self.completed_at_ms = Some(now);
        self.error = Some(error.to_string());
        Ok(())
    }

    pub fn skip(&mut self, now: u64) -> Result<(), WorkflowError> {
        self.check(StepStatus::Skipped, "")?;
        self.status = StepStatus::Skipped;
        self.completed_at_ms = Some(now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
