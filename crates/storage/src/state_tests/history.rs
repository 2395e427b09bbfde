// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn run_and_cancel(state: &mut MaterializedState, job_id: &str, project: &str) {
    apply_all(state, &[job_created_event(job_id, project), job_cancelled_event(job_id, "stop")]);
}

#[test]
fn history_is_oldest_first() {
    let mut state = MaterializedState::default();
    run_and_cancel(&mut state, "job-1", "api");
    run_and_cancel(&mut state, "job-2", "api");
    state.apply_event(&job_created_event("job-3", "api")).unwrap();

    let ids: Vec<&str> = state.history("api").iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["job-1", "job-2", "job-3"]);
    assert!(state.history("web").is_empty());
}

#[test]
fn latest_returns_one_job_per_project() {
    let mut state = MaterializedState::default();
    run_and_cancel(&mut state, "job-1", "web");
    state.apply_event(&job_created_event("job-2", "web")).unwrap();
    state.apply_event(&job_created_event("job-3", "api")).unwrap();

    let latest: Vec<(&str, &str)> =
        state.latest().iter().map(|j| (j.project.as_str(), j.id.as_str())).collect();
    assert_eq!(latest, vec![("api", "job-3"), ("web", "job-2")]);
}

#[yare::parameterized(
    under_limit = { 2, 5, 0 },
    at_limit    = { 3, 3, 1 },
    over_limit  = { 5, 3, 3 },
    limit_one   = { 2, 1, 2 },
)]
fn prunable_makes_room_for_one_more(existing: usize, limit: usize, expected: usize) {
    let mut state = MaterializedState::default();
    for i in 0..existing {
        run_and_cancel(&mut state, &format!("job-{i}"), "api");
    }
    let prunable = state.prunable("api", limit);
    assert_eq!(prunable.len(), expected);
    // Oldest first
    for (i, id) in prunable.iter().enumerate() {
        assert_eq!(id.as_str(), format!("job-{i}"));
    }
}

#[test]
fn prunable_never_offers_active_jobs() {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();
    assert!(state.prunable("api", 1).is_empty());
}
