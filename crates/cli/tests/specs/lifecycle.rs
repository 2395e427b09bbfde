// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle specs: starting, driving steps, failure, and retry.

use crate::prelude::*;

#[test]
fn start_prints_job_id() {
    let state = State::empty();
    state
        .scribe()
        .args(&["start", "api", "--id", "job-first", "--name", "API Server"])
        .passes()
        .stdout_eq("Started job job-first for API Server (14 steps)\n");
}

#[test]
fn completing_every_step_completes_the_job() {
    let state = State::empty();
    state.start("api", "job-a");
    state.finish_steps("job-a", &DOC_STEPS);

    let job = state.status_json("api");
    assert_eq!(job["status"], "completed");
    assert_eq!(job["progress"], 100);
    assert_eq!(job["current_phase"], Value::Null);
    assert_eq!(job["current_step"], Value::Null);
    assert!(job["finished_at_ms"].is_u64());
}

#[test]
fn progress_weighs_each_phase_equally() {
    let state = State::empty();
    let workflow = state.file("small.toml", SMALL_WORKFLOW);
    state
        .scribe()
        .args(&["start", "api", "--id", "job-b", "--workflow", workflow.to_str().unwrap()])
        .passes()
        .stdout_has("(4 steps)");
    state.finish_steps("job-b", &["s1", "s2"]);
    state.scribe().args(&["step", "start", "job-b", "s3"]).passes();

    let job = state.status_json("api");
    assert_eq!(job["status"], "running");
    assert_eq!(job["progress"], 50);
    assert_eq!(job["current_phase"], "p2");
    assert_eq!(job["current_step"], "s3");
}

#[test]
fn failing_a_step_fails_the_job_and_keeps_the_message() {
    let state = State::empty();
    state.start("api", "job-c");
    state.finish_steps("job-c", &["step-1-1"]);
    state.scribe().args(&["step", "start", "job-c", "step-1-2"]).passes();
    state
        .scribe()
        .args(&["step", "fail", "job-c", "step-1-2", "Timeout while processing large file"])
        .passes()
        .stdout_has("failed");

    let job = state.status_json("api");
    assert_eq!(job["status"], "failed");
    assert_eq!(job["error"], "Timeout while processing large file");
    assert_eq!(job["phases"][0]["steps"][1]["error"], "Timeout while processing large file");

    state
        .scribe()
        .args(&["step", "start", "job-c", "step-1-3"])
        .fails_with(1)
        .stderr_has("accepts no further changes");
}

#[test]
fn second_start_while_active_is_rejected() {
    let state = State::empty();
    state.start("api", "job-d");
    state
        .scribe()
        .args(&["start", "api", "--id", "job-d2"])
        .fails_with(4)
        .stderr_has("already has an active job (job-d)");

    // A different project is independent
    state.start("web", "job-w");
}

#[test]
fn retry_starts_a_fresh_attempt() {
    let state = State::empty();
    state.start("api", "job-e");
    state.finish_steps("job-e", &["step-1-1"]);
    state.scribe().args(&["step", "start", "job-e", "step-1-2"]).passes();
    state.scribe().args(&["step", "fail", "job-e", "step-1-2", "boom"]).passes();

    let retried = state.scribe().args(&["retry", "job-e", "-o", "json"]).passes().json();
    assert_ne!(retried["id"], "job-e");
    assert_eq!(retried["attempt"], 2);
    assert_eq!(retried["retry_of"], "job-e");
    assert_eq!(retried["progress"], 0);
    assert_eq!(retried["status"], "pending");
    for phase in retried["phases"].as_array().unwrap() {
        for step in phase["steps"].as_array().unwrap() {
            assert_eq!(step["status"], "pending");
            assert_eq!(step["started_at_ms"], Value::Null);
        }
    }

    let history = state.scribe().args(&["history", "api", "-o", "json"]).passes().json();
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["status"], "failed");
}

#[test]
fn retry_of_active_job_is_rejected() {
    let state = State::empty();
    state.start("api", "job-r");
    state.scribe().args(&["retry", "job-r"]).fails_with(1).stderr_has("only failed jobs");
}

#[test]
fn blank_failure_message_is_rejected() {
    let state = State::empty();
    state.start("api", "job-f");
    state.scribe().args(&["step", "start", "job-f", "step-1-1"]).passes();
    state
        .scribe()
        .args(&["step", "fail", "job-f", "step-1-1", "   "])
        .fails_with(1)
        .stderr_has("without an error message");

    let job = state.status_json("api");
    assert_eq!(job["phases"][0]["steps"][0]["status"], "running");
}

#[test]
fn invalid_transition_is_reported() {
    let state = State::empty();
    state.start("api", "job-t");
    state
        .scribe()
        .args(&["step", "complete", "job-t", "step-1-1"])
        .fails_with(1)
        .stderr_has("invalid transition for step 'step-1-1': pending -> completed");
}

#[test]
fn skipped_steps_count_toward_progress() {
    let state = State::empty();
    let workflow = state.file("small.toml", SMALL_WORKFLOW);
    state
        .scribe()
        .args(&["start", "api", "--id", "job-s", "--workflow", workflow.to_str().unwrap()])
        .passes();
    state
        .scribe()
        .args(&["step", "skip", "job-s", "s1", "--reason", "already cloned"])
        .passes();

    let job = state.status_json("api");
    assert_eq!(job["progress"], 25);
    assert_eq!(job["phases"][0]["steps"][0]["status"], "skipped");
}

#[test]
fn cancel_fails_running_steps() {
    let state = State::empty();
    state.start("api", "job-x");
    state.scribe().args(&["step", "start", "job-x", "step-1-1"]).passes();
    state
        .scribe()
        .args(&["cancel", "job-x", "--reason", "user request"])
        .passes()
        .stdout_eq("Cancelled job job-x (user request)\n");

    let job = state.status_json("api");
    assert_eq!(job["status"], "failed");
    assert_eq!(job["phases"][0]["steps"][0]["status"], "failed");

    // Terminal jobs accept nothing more, but a new job may start
    state.scribe().args(&["cancel", "job-x"]).fails_with(1);
    state.start("api", "job-y");
}

#[test]
fn unknown_job_is_not_found() {
    let state = State::empty();
    state.scribe().args(&["step", "start", "job-nope", "step-1-1"]).fails_with(3);
    state.scribe().args(&["status", "ghost"]).fails_with(3).stderr_has("not found: project ghost");
}
