// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phases: ordered groups of steps with derived status.
//!
//! Nothing here is cached. Every aggregate is recomputed from the steps on
//! read, so a phase can never report a status its steps disagree with.

use crate::step::{Step, StepStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

crate::string_enum! {
    PhaseStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub name: String,
    pub steps: Vec<Step>,
}

impl Phase {
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self { id: id.into(), name: name.into(), steps }
    }

    /// Failed beats running beats completed; an empty phase is completed.
    pub fn status(&self) -> PhaseStatus {
        let has = |s: StepStatus| self.steps.iter().any(|step| step.status() == s);
        if has(StepStatus::Failed) {
            PhaseStatus::Failed
        } else if has(StepStatus::Running) {
            PhaseStatus::Running
        } else if self.steps.iter().all(|step| step.status().is_done()) {
            PhaseStatus::Completed
        } else {
            PhaseStatus::Pending
        }
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    /// Steps that are completed or skipped.
    pub fn completed_count(&self) -> usize {
        self.steps.iter().filter(|step| step.status().is_done()).count()
    }

    /// Fraction of steps done, in `0.0..=1.0`. A phase without steps has
    /// nothing left to do and reports `1.0`.
    pub fn progress_ratio(&self) -> f64 {
        if self.steps.is_empty() {
            return 1.0;
        }
        self.completed_count() as f64 / self.total() as f64
    }

    pub fn is_done(&self) -> bool {
        self.status() == PhaseStatus::Completed
    }

    /// First running step, else first pending step.
    pub fn current_step(&self) -> Option<&Step> {
        self.steps
            .iter()
            .find(|step| step.status() == StepStatus::Running)
            .or_else(|| self.steps.iter().find(|step| step.status() == StepStatus::Pending))
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub(crate) fn step_mut(&mut self, id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|step| step.id == id)
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
