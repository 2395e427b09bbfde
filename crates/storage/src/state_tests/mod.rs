// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use scribe_core::test_support::*;
use scribe_core::{IntegrationSource, JobConfig, JobStatus, LogLevel};

mod history;

fn apply_all(state: &mut MaterializedState, events: &[Event]) {
    for event in events {
        state.apply_event(event).unwrap();
    }
}

/// Drive every step of a job's default workflow to completion.
fn complete_all(state: &mut MaterializedState, job_id: &str) {
    let steps: Vec<String> = state.jobs[job_id]
        .phases()
        .iter()
        .flat_map(|p| p.steps.iter().map(|s| s.id.clone()))
        .collect();
    for step in steps {
        apply_all(
            state,
            &[step_started_event(job_id, &step), step_completed_event(job_id, &step, None)],
        );
    }
}

#[test]
fn job_created_inserts_job_and_history() {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();

    let job = state.get_job("job-1").unwrap();
    assert_eq!(job.status(), JobStatus::Pending);
    assert_eq!(job.created_at_ms, 1_000_000);
    assert_eq!(state.history["api"], vec![JobId::from_string("job-1")]);
    assert_eq!(state.active_job("api").map(|j| j.id.as_str()), Some("job-1"));
}

#[test]
fn duplicate_creation_is_rejected() {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();
    let err = state.apply_event(&job_created_event("job-1", "web")).unwrap_err();
    assert_eq!(err, WorkflowError::DuplicateJob(JobId::from_string("job-1")));
    assert!(state.history.get("web").is_none());
}

#[test]
fn second_active_job_is_rejected() {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();
    let err = state.apply_event(&job_created_event("job-2", "api")).unwrap_err();
    assert_eq!(err.kind(), "already_running");
    assert_eq!(state.history["api"].len(), 1);
}

#[test]
fn new_job_allowed_after_terminal() {
    let mut state = MaterializedState::default();
    apply_all(&mut state, &[job_created_event("job-1", "api"), job_cancelled_event("job-1", "stop")]);
    state.apply_event(&job_created_event("job-2", "api")).unwrap();
    assert_eq!(state.latest_for_project("api").map(|j| j.id.as_str()), Some("job-2"));
}

#[test]
fn step_events_drive_the_job() {
    let mut state = MaterializedState::default();
    apply_all(
        &mut state,
        &[
            job_created_event("job-1", "api"),
            step_started_event("job-1", "step-1-1"),
            step_completed_event("job-1", "step-1-1", Some("cloned")),
            step_started_event("job-1", "step-1-2"),
        ],
    );
    let job = state.get_job("job-1").unwrap();
    assert_eq!(job.status(), JobStatus::Running);
    assert_eq!(job.step("step-1-1").and_then(|s| s.output()), Some("cloned"));
    assert_eq!(job.current_step().map(|s| s.id.as_str()), Some("step-1-2"));
}

#[test]
fn rejected_event_leaves_state_untouched() {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();
    let before = state.jobs["job-1"].clone();

    let err = state.apply_event(&step_completed_event("job-1", "step-1-1", None)).unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
    let err = state.apply_event(&step_started_event("job-1", "nope")).unwrap_err();
    assert_eq!(err.kind(), "unknown_step");
    let err = state.apply_event(&step_failed_event("job-1", "step-1-1", " ")).unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");

    assert_eq!(state.jobs["job-1"], before);
}

#[test]
fn events_for_unknown_job_are_not_found() {
    let mut state = MaterializedState::default();
    let err = state.apply_event(&step_started_event("job-404", "a")).unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
    let err = state.apply_event(&job_deleted_event("job-404")).unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[test]
fn log_appended_goes_to_job_stream() {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();
    state
        .apply_event(&Event::LogAppended {
            job_id: JobId::from_string("job-1"),
            level: LogLevel::Warn,
            message: "rate limited".into(),
            step: Some("Clone Repository".into()),
            at_ms: 1_000_050,
        })
        .unwrap();
    let logs = state.jobs["job-1"].logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs.entries()[1].level, LogLevel::Warn);
}

#[test]
fn job_deleted_removes_job_and_history() {
    let mut state = MaterializedState::default();
    apply_all(
        &mut state,
        &[
            job_created_event("job-1", "api"),
            job_cancelled_event("job-1", "stop"),
            job_deleted_event("job-1"),
        ],
    );
    assert!(state.jobs.is_empty());
    assert!(state.history.is_empty());
    assert!(state.latest_for_project("api").is_none());
}

#[test]
fn get_job_by_unique_prefix() {
    let mut state = MaterializedState::default();
    apply_all(
        &mut state,
        &[job_created_event("job-abc111", "api"), job_created_event("job-abd222", "web")],
    );
    assert_eq!(state.get_job("abc").map(|j| j.id.as_str()), Some("job-abc111"));
    assert_eq!(state.get_job("job-abd").map(|j| j.id.as_str()), Some("job-abd222"));
    assert!(state.get_job("ab").is_none());
    assert!(state.get_job("zzz").is_none());
}

#[test]
fn invalid_workflow_is_rejected() {
    let mut state = MaterializedState::default();
    let config = JobConfig::builder("job-1", "api").workflow(workflow(&[])).build();
    let err = state.apply_event(&Event::job_created(config, 5)).unwrap_err();
    assert_eq!(err.kind(), "invalid_workflow");
    assert!(state.jobs.is_empty());
}

#[yare::parameterized(
    never_completed = { None, Some("abc"), SyncStatus::NotProcessed },
    same_commit     = { Some("abc"), Some("abc"), SyncStatus::UpToDate },
    moved_on        = { Some("abc"), Some("def"), SyncStatus::UpdatesAvailable },
    unknown_head    = { Some("abc"), None, SyncStatus::UpToDate },
)]
fn sync_status_from_history(completed_commit: Option<&str>, head: Option<&str>, expected: SyncStatus) {
    let mut state = MaterializedState::default();
    let source = IntegrationSource::GitHub {
        full_name: "acme/api".into(),
        branch: "main".into(),
        commit: Some("abc".into()),
    };
    let config = JobConfig::builder("job-1", "api").source(source).build();
    state.apply_event(&Event::job_created(config, 1)).unwrap();
    if let Some(commit) = completed_commit {
        assert_eq!(commit, "abc");
        complete_all(&mut state, "job-1");
    }
    assert_eq!(state.sync_status("api", head), expected);
}

#[test]
fn check_event_matches_apply_without_mutating() {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();
    let before = state.jobs["job-1"].clone();

    assert!(state.check_event(&step_started_event("job-1", "step-1-1")).is_ok());
    assert_eq!(
        state.check_event(&step_completed_event("job-1", "step-1-1", None)).unwrap_err().kind(),
        "invalid_transition"
    );
    assert_eq!(state.check_event(&job_created_event("job-2", "api")).unwrap_err().kind(), "already_running");
    assert!(state.check_event(&job_deleted_event("job-1")).is_ok());
    assert!(state.check_event(&job_deleted_event("job-2")).is_err());

    assert_eq!(state.jobs["job-1"], before);
    assert_eq!(state.jobs.len(), 1);
}

fn log_event(job_id: &str) -> Event {
    Event::LogAppended {
        job_id: JobId::from_string(job_id),
        level: LogLevel::Info,
        message: "Scanning files".to_string(),
        step: None,
        at_ms: 1_000_150,
    }
}

#[yare::parameterized(
    fresh     = { &[] },
    running   = { &["start"] },
    completed = { &["start", "complete"] },
    failed    = { &["start", "fail"] },
    cancelled = { &["cancel"] },
)]
fn check_event_agrees_with_apply(setup: &[&str]) {
    let mut state = MaterializedState::default();
    state.apply_event(&job_created_event("job-1", "api")).unwrap();
    for action in setup {
        let event = match *action {
            "start" => step_started_event("job-1", "step-1-1"),
            "complete" => step_completed_event("job-1", "step-1-1", None),
            "fail" => step_failed_event("job-1", "step-1-1", "boom"),
            _ => job_cancelled_event("job-1", "stop"),
        };
        state.apply_event(&event).unwrap();
    }

    let candidates = [
        step_started_event("job-1", "step-1-1"),
        step_completed_event("job-1", "step-1-1", Some("ok")),
        step_failed_event("job-1", "step-1-1", "boom"),
        step_failed_event("job-1", "step-1-1", "  "),
        step_skipped_event("job-1", "step-1-1"),
        step_started_event("job-1", "step-9-9"),
        log_event("job-1"),
        job_cancelled_event("job-1", ""),
    ];
    for event in &candidates {
        let before = state.jobs["job-1"].clone();
        let checked = state.check_event(event);
        assert_eq!(state.jobs["job-1"], before);

        let mut scratch = state.clone();
        let applied = scratch.apply_event(event);
        assert_eq!(checked, applied, "{}", event.log_summary());
    }
}
