// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

mod helpers;
mod jobs;

use scribe_core::{Event, Job, JobId, JobStatus, SyncStatus, WorkflowError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Materialized state built from WAL operations
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub jobs: HashMap<String, Job>,
    /// project id → job ids, oldest first. Kept in step with `jobs`.
    #[serde(default)]
    pub history: HashMap<String, Vec<JobId>>,
}

impl MaterializedState {
    /// Get a job by ID or unique prefix (like git commit hashes)
    pub fn get_job(&self, id: &str) -> Option<&Job> {
        helpers::find_by_prefix(&self.jobs, id)
    }

    /// Most recent job for a project.
    pub fn latest_for_project(&self, project: &str) -> Option<&Job> {
        self.history.get(project)?.last().and_then(|id| self.jobs.get(id.as_str()))
    }

    /// The project's pending or running job, if any.
    pub fn active_job(&self, project: &str) -> Option<&Job> {
        self.latest_for_project(project).filter(|job| !job.is_terminal())
    }

    /// Every job for a project, oldest first.
    pub fn history(&self, project: &str) -> Vec<&Job> {
        self.history
            .get(project)
            .map(|ids| ids.iter().filter_map(|id| self.jobs.get(id.as_str())).collect())
            .unwrap_or_default()
    }

    /// Most recent job of every project, ordered by project id.
    pub fn latest(&self) -> Vec<&Job> {
        let mut projects: Vec<&String> = self.history.keys().collect();
        projects.sort();
        projects.into_iter().filter_map(|p| self.latest_for_project(p)).collect()
    }

    /// Jobs to delete so that one more job for `project` keeps its history
    /// within `limit`. Only terminal jobs are candidates, oldest first.
    pub fn prunable(&self, project: &str, limit: usize) -> Vec<JobId> {
        let history = self.history(project);
        let excess = (history.len() + 1).saturating_sub(limit.max(1));
        history
            .into_iter()
            .filter(|job| job.is_terminal())
            .take(excess)
            .map(|job| job.id.clone())
            .collect()
    }

    /// Whether `head` has moved on since the project's last completed job.
    pub fn sync_status(&self, project: &str, head: Option<&str>) -> SyncStatus {
        let last_processed = self
            .history(project)
            .into_iter()
            .rev()
            .find(|job| job.status() == JobStatus::Completed)
            .map(|job| job.source.commit());
        SyncStatus::derive(last_processed, head)
    }

    /// Check that `event` would apply cleanly, without applying it.
    pub fn check_event(&self, event: &Event) -> Result<(), WorkflowError> {
        jobs::check(self, event)
    }

    /// Apply an event to derive state changes.
    ///
    /// Events are validated against the current state first; a rejected
    /// event leaves the state untouched and returns the reason. The engine
    /// persists only events that applied cleanly, so replay of a healthy log
    /// never sees a rejection.
    pub fn apply_event(&mut self, event: &Event) -> Result<(), WorkflowError> {
        jobs::apply(self, event)
    }
}

#[cfg(test)]
#[path = "../state_tests/mod.rs"]
mod tests;
