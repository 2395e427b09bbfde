// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Answers presentation-layer queries from registry state.

use scribe_core::Clock;
use scribe_wire::{JobDetail, JobSummary, LogEntryDetail, Query, Response};

use crate::Registry;

/// Log entries embedded in a `GetJob` response.
const DETAIL_LOG_TAIL: usize = 50;

pub fn handle_query<C: Clock>(registry: &Registry<C>, query: Query) -> Response {
    let now = registry.now_ms();
    registry.read(|state| match query {
        Query::ListJobs => {
            Response::Jobs { jobs: state.latest().into_iter().map(|j| JobSummary::from_job(j, now)).collect() }
        }

        Query::GetJob { id } => Response::Job {
            job: state.get_job(&id).map(|j| Box::new(JobDetail::from_job(j, now, DETAIL_LOG_TAIL))),
        },

        Query::GetProjectJob { project } => Response::Job {
            job: state
                .latest_for_project(&project)
                .map(|j| Box::new(JobDetail::from_job(j, now, DETAIL_LOG_TAIL))),
        },

        Query::GetHistory { project } => Response::Jobs {
            jobs: state.history(&project).into_iter().map(|j| JobSummary::from_job(j, now)).collect(),
        },

        Query::GetLogs { id, since, limit } => match state.get_job(&id) {
            Some(job) => {
                let mut entries = job.logs().since(since);
                if limit > 0 && entries.len() > limit {
                    entries = &entries[entries.len() - limit..];
                }
                Response::Logs {
                    job_id: job.id.clone(),
                    entries: entries.iter().map(LogEntryDetail::from).collect(),
                    last_seq: job.logs().last_seq(),
                }
            }
            None => Response::Error { message: format!("job not found: {id}") },
        },

        Query::GetSyncStatus { project, head } => Response::Sync {
            status: state.sync_status(&project, head.as_deref()),
            project,
        },
    })
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
