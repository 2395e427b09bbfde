// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helper functions for state event handlers.

use scribe_core::{Job, JobId, WorkflowError};
use std::collections::HashMap;

/// Get a value by exact ID or unique prefix.
///
/// Matches against both the full key and the suffix after the type prefix
/// (e.g. "job-"), so short IDs displayed without their prefix resolve back
/// to the full entry.
pub(crate) fn find_by_prefix<'a, V>(map: &'a HashMap<String, V>, id: &str) -> Option<&'a V> {
    if let Some(val) = map.get(id) {
        return Some(val);
    }
    let mut matches = map.iter().filter(|(k, _)| scribe_core::id::prefix_matches(k, id));
    match (matches.next(), matches.next()) {
        (Some((_, val)), None) => Some(val),
        _ => None,
    }
}

/// Job lookup by exact ID.
pub(crate) fn job<'a>(jobs: &'a HashMap<String, Job>, id: &JobId) -> Result<&'a Job, WorkflowError> {
    jobs.get(id.as_str()).ok_or_else(|| WorkflowError::NotFound(format!("job {id}")))
}

/// Mutable job lookup by exact ID.
pub(crate) fn job_mut<'a>(
    jobs: &'a mut HashMap<String, Job>,
    id: &JobId,
) -> Result<&'a mut Job, WorkflowError> {
    jobs.get_mut(id.as_str()).ok_or_else(|| WorkflowError::NotFound(format!("job {id}")))
}
