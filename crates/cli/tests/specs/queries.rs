// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side specs: listings, logs, status views, and sync status.

use crate::prelude::*;

#[test]
fn list_empty() {
    let state = State::empty();
    state.scribe().args(&["list"]).passes().stdout_eq("No jobs\n");
}

#[test]
fn list_shows_latest_job_per_project() {
    let state = State::empty();
    state.start("api", "job-old");
    state.scribe().args(&["cancel", "job-old"]).passes();
    state.start("api", "job-new");
    state.start("web", "job-web");

    let jobs = state.scribe().args(&["list", "-o", "json"]).passes().json();
    let ids: Vec<&str> = jobs.as_array().unwrap().iter().map(|j| j["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["job-new", "job-web"]);

    state
        .scribe()
        .args(&["list"])
        .passes()
        .stdout_has("PROJECT")
        .stdout_has("api")
        .stdout_has("web")
        .stdout_lacks("old");
}

#[test]
fn status_text_shows_phases() {
    let state = State::empty();
    state.start("api", "job-1");
    state.scribe().args(&["step", "start", "job-1", "step-1-1"]).passes();

    state
        .scribe()
        .args(&["status", "api"])
        .passes()
        .stdout_has("Status:   running")
        .stdout_has("Repository Analysis  0/3")
        .stdout_has("▸ Clone Repository  running")
        .stdout_has("Finalization  0/3")
        .stdout_has("Recent log:");
}

#[test]
fn status_by_job_prefix() {
    let state = State::empty();
    state.start("api", "job-prefixed");
    let job = state.scribe().args(&["status", "--job", "prefix", "-o", "json"]).passes().json();
    assert_eq!(job["id"], "job-prefixed");
    assert_eq!(job["status"], "pending");
    assert_eq!(job["current_step"], "step-1-1");
}

#[test]
fn logs_follow_a_cursor() {
    let state = State::empty();
    state.start("api", "job-1");
    state.scribe().args(&["step", "start", "job-1", "step-1-1"]).passes();
    state
        .scribe()
        .args(&["log", "job-1", "Found 42 source files", "--level", "warn", "--step", "Clone Repository"])
        .passes()
        .stdout_eq("Logged #3 to job-1\n");

    state
        .scribe()
        .args(&["logs", "job-1"])
        .passes()
        .stdout_eq(
            "#1 info  Job started for project api\n\
             #2 info  [Clone Repository] Starting Clone Repository\n\
             #3 warn  [Clone Repository] Found 42 source files\n",
        );

    let entries = state.scribe().args(&["logs", "job-1", "--since", "2", "-o", "json"]).passes().json();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["seq"], 3);
    assert_eq!(entries[0]["level"], "warn");

    state.scribe().args(&["logs", "job-1", "-n", "1"]).passes().stdout_has("#3 ").stdout_lacks("#2 ");
}

#[test]
fn logs_reject_unknown_level_and_job() {
    let state = State::empty();
    state.start("api", "job-1");
    state.scribe().args(&["log", "job-1", "hello", "--level", "loud"]).fails_with(2);
    state.scribe().args(&["logs", "job-zzz"]).fails_with(3).stderr_has("job not found: job-zzz");
}

#[test]
fn history_lists_attempts_oldest_first() {
    let state = State::empty();
    state.start("api", "job-1");
    state.scribe().args(&["cancel", "job-1"]).passes();
    state.scribe().args(&["retry", "job-1"]).passes();

    state.scribe().args(&["history", "api"]).passes().stdout_has("ATTEMPT").stdout_has("failed");
    let history = state.scribe().args(&["history", "api", "-o", "json"]).passes().json();
    assert_eq!(history[0]["id"], "job-1");
    assert_eq!(history[0]["attempt"], 1);
    assert_eq!(history[1]["attempt"], 2);
}

#[test]
fn history_is_capped_by_limit() {
    let state = State::empty();
    for n in 0..4 {
        let id = format!("job-{n}");
        state.scribe().args(&["start", "api", "--id", &id]).passes();
        state.scribe().args(&["cancel", &id]).passes();
    }
    let history = state
        .scribe()
        .env("SCRIBE_HISTORY_LIMIT", "2")
        .args(&["history", "api", "-o", "json"])
        .passes()
        .json();
    // Pruning happens when a job starts
    assert_eq!(history.as_array().unwrap().len(), 4);

    state.scribe().env("SCRIBE_HISTORY_LIMIT", "2").args(&["start", "api", "--id", "job-4"]).passes();
    let history = state.scribe().args(&["history", "api", "-o", "json"]).passes().json();
    let ids: Vec<&str> = history.as_array().unwrap().iter().map(|j| j["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["job-3", "job-4"]);
}

#[test]
fn sync_compares_documented_commit() {
    let state = State::empty();
    state.scribe().args(&["sync", "api", "--head", "abc123"]).passes().stdout_eq("api: not-processed\n");

    state
        .scribe()
        .args(&["start", "api", "--id", "job-1", "--github", "acme/api", "--commit", "abc123"])
        .passes();
    state.finish_steps("job-1", &DOC_STEPS);

    state.scribe().args(&["sync", "api", "--head", "abc123"]).passes().stdout_eq("api: up-to-date\n");
    let sync = state.scribe().args(&["sync", "api", "--head", "def456", "-o", "json"]).passes().json();
    assert_eq!(sync["type"], "Sync");
    assert_eq!(sync["status"], "updates-available");
}
