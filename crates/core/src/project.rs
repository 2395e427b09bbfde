// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project references. Projects are owned elsewhere; jobs only carry the
//! id, a display name, and where the code came from.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Identifier of the project a job documents. Usually chosen by the
    /// caller (`from_string`), so it need not carry the `prj-` prefix.
    pub struct ProjectId("prj-");
}

/// Where a project's code comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrationSource {
    Local {
        path: PathBuf,
    },
    #[serde(rename = "github")]
    GitHub {
        /// `owner/repo`
        full_name: String,
        branch: String,
        /// Commit the job processed, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commit: Option<String>,
    },
}

impl IntegrationSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    pub fn github(full_name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self::GitHub { full_name: full_name.into(), branch: branch.into(), commit: None }
    }

    /// Human-readable location: a filesystem path or `github.com/owner/repo@branch`.
    pub fn location(&self) -> String {
        match self {
            Self::Local { path } => path.display().to_string(),
            Self::GitHub { full_name, branch, .. } => format!("github.com/{full_name}@{branch}"),
        }
    }

    pub fn commit(&self) -> Option<&str> {
        match self {
            Self::Local { .. } => None,
            Self::GitHub { commit, .. } => commit.as_deref(),
        }
    }
}

impl Default for IntegrationSource {
    fn default() -> Self {
        Self::Local { path: PathBuf::new() }
    }
}

/// Whether a project's source has moved on since it was last documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    UpToDate,
    UpdatesAvailable,
    NotProcessed,
}

crate::string_enum! {
    SyncStatus {
        UpToDate => "up-to-date",
        UpdatesAvailable => "updates-available",
        NotProcessed => "not-processed",
    }
}

impl SyncStatus {
    /// `last_processed` is the commit of the latest completed job, `Some(None)`
    /// when that job had no commit (local sources), `None` when no job has
    /// completed. Unknown commits on either side count as up to date.
    pub fn derive(last_processed: Option<Option<&str>>, head: Option<&str>) -> Self {
        match (last_processed, head) {
            (None, _) => Self::NotProcessed,
            (Some(Some(done)), Some(head)) if done != head => Self::UpdatesAvailable,
            _ => Self::UpToDate,
        }
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
