// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("status")
        .stdout_has("retry")
        .stdout_has("workflow");
}

#[test]
fn step_help_shows_transitions() {
    cli()
        .args(&["step", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("complete")
        .stdout_has("fail")
        .stdout_has("skip");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn missing_arguments_are_usage_errors() {
    cli().args(&["step", "fail", "job-1", "step-1-1"]).fails_with(2).stderr_has("Usage:");
}
