// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow template specs

use crate::prelude::*;

#[test]
fn show_prints_the_standard_workflow() {
    cli()
        .args(&["workflow", "show"])
        .passes()
        .stdout_has("[[phases]]")
        .stdout_has("Repository Analysis")
        .stdout_has("Finalization");
}

#[test]
fn show_json_has_four_phases() {
    let template = cli().args(&["workflow", "show", "-o", "json"]).passes().json();
    assert_eq!(template["phases"].as_array().unwrap().len(), 4);
    assert_eq!(template["phases"][0]["steps"][0]["id"], "step-1-1");
}

#[test]
fn validate_accepts_a_good_template() {
    let state = State::empty();
    let path = state.file("small.toml", SMALL_WORKFLOW);
    state
        .scribe()
        .args(&["workflow", "validate", path.to_str().unwrap()])
        .passes()
        .stdout_has("2 phases, 4 steps");
}

#[test]
fn validate_rejects_duplicate_step_ids() {
    let state = State::empty();
    let path = state.file("dup.toml", &SMALL_WORKFLOW.replace("\"s4\"", "\"s1\""));
    state
        .scribe()
        .args(&["workflow", "validate", path.to_str().unwrap()])
        .fails_with(1)
        .stderr_has("duplicate step id 's1'");
}

#[test]
fn start_with_invalid_template_creates_nothing() {
    let state = State::empty();
    let path = state.file("empty.toml", "phases = []\n");
    state
        .scribe()
        .args(&["start", "api", "--workflow", path.to_str().unwrap()])
        .fails_with(1)
        .stderr_has("workflow has no phases");
    state.scribe().args(&["list"]).passes().stdout_eq("No jobs\n");
}
