// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence specs: WAL inspection, compaction, driver replay, and
//! recovery from a damaged log.

use std::io::Write;

use crate::prelude::*;

const APPLY_EVENTS: &str = r#"
{"type":"job:created","id":"job-ap","project":"api","project_name":"API","workflow":{"phases":[{"id":"p1","name":"Only","steps":[{"id":"a","name":"A"}]}]},"created_at_ms":1000}
{"type":"step:started","job_id":"job-ap","step":"a","at_ms":2000}
{"type":"step:completed","job_id":"job-ap","step":"a","output":"done","at_ms":3000}
"#;

const REJECTED_EVENTS: &str = r#"
{"type":"job:created","id":"job-bp","project":"web","project_name":"Web","workflow":{"phases":[{"id":"p1","name":"Only","steps":[{"id":"a","name":"A"}]}]},"created_at_ms":4000}
{"type":"step:completed","job_id":"job-bp","step":"a","at_ms":5000}
{"type":"step:started","job_id":"job-bp","step":"a","at_ms":6000}
"#;

#[test]
fn events_lists_the_wal() {
    let state = State::empty();
    state.start("api", "job-1");
    state.scribe().args(&["step", "start", "job-1", "step-1-1"]).passes();

    state.scribe().args(&["events"]).passes().stdout_eq(
        "#1 job:created id=job-1 project=api attempt=1 steps=14\n\
         #2 step:started job=job-1 step=step-1-1\n",
    );
    state
        .scribe()
        .args(&["events", "--since", "1", "-o", "json"])
        .passes()
        .stdout_has(r#""seq":2"#)
        .stdout_has(r#""type":"step:started""#)
        .stdout_lacks("job:created");
}

#[test]
fn compact_folds_the_wal_into_a_snapshot() {
    let state = State::empty();
    state.start("api", "job-1");
    state.scribe().args(&["step", "start", "job-1", "step-1-1"]).passes();

    state.scribe().args(&["compact"]).passes().stdout_has("Snapshot at seq 2 (");
    assert!(state.path().join("snapshot.json.zst").exists());
    state.scribe().args(&["events"]).passes().stdout_eq("");

    // State comes back from the snapshot and new events continue the sequence
    state.scribe().args(&["step", "complete", "job-1", "step-1-1"]).passes();
    let line = state.scribe().args(&["events", "-o", "json"]).passes().json();
    assert_eq!(line["seq"], 3);
    assert_eq!(line["event"]["type"], "step:completed");

    let job = state.status_json("api");
    assert_eq!(job["phases"][0]["completed"], 1);
}

#[test]
fn apply_drives_jobs_from_an_event_stream() {
    let state = State::empty();
    let events = state.file("events.jsonl", APPLY_EVENTS);
    state
        .scribe()
        .args(&["apply", events.to_str().unwrap()])
        .passes()
        .stdout_eq(
            "#1 job:created (line 2)\n\
             #2 step:started (line 3)\n\
             #3 step:completed (line 4)\n",
        );

    let job = state.status_json("api");
    assert_eq!(job["status"], "completed");
    assert_eq!(job["project_name"], "API");
    assert_eq!(job["phases"][0]["steps"][0]["output"], "done");
}

#[test]
fn apply_stops_at_the_first_rejection() {
    let state = State::empty();
    state.scribe().args(&["apply"]).stdin(APPLY_EVENTS).passes();
    state
        .scribe()
        .args(&["apply"])
        .stdin(REJECTED_EVENTS)
        .fails_with(1)
        .stdout_eq("#4 job:created (line 2)\n")
        .stderr_has("line 3: invalid transition");

    let job = state.status_json("web");
    assert_eq!(job["status"], "pending");
}

#[test]
fn apply_rejects_malformed_input_before_applying() {
    let state = State::empty();
    state.scribe().args(&["apply"]).stdin("{\"type\":\"job:exploded\"}\n").fails_with(1).stderr_has("line 1:");
    state.scribe().args(&["list"]).passes().stdout_eq("No jobs\n");
}

#[test]
fn damaged_wal_tail_is_set_aside() {
    let state = State::empty();
    state.start("api", "job-1");
    state.scribe().args(&["step", "start", "job-1", "step-1-1"]).passes();

    let wal = state.path().join("wal").join("events.wal");
    let mut file = std::fs::OpenOptions::new().append(true).open(&wal).unwrap();
    file.write_all(b"{\"seq\":3,\"event\":{\"type\":\"step:comp").unwrap();
    drop(file);

    let job = state.status_json("api");
    assert_eq!(job["phases"][0]["steps"][0]["status"], "running");
    assert!(state.path().join("wal").join("events.bak").exists());

    // The log keeps working after recovery
    state.scribe().args(&["step", "complete", "job-1", "step-1-1"]).passes();
    state.scribe().args(&["events", "--since", "2"]).passes().stdout_has("#3 step:completed");
}
