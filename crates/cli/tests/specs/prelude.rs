// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers: an isolated state directory per test and a fluent
//! wrapper over `assert_cmd`.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub use serde_json::Value;

/// Step ids of the standard documentation workflow, in order.
pub const DOC_STEPS: [&str; 14] = [
    "step-1-1", "step-1-2", "step-1-3", "step-2-1", "step-2-2", "step-2-3", "step-2-4", "step-3-1",
    "step-3-2", "step-3-3", "step-3-4", "step-4-1", "step-4-2", "step-4-3",
];

/// Two phases of two steps each.
pub const SMALL_WORKFLOW: &str = r#"
[[phases]]
id = "p1"
name = "Analysis"

[[phases.steps]]
id = "s1"
name = "Clone"

[[phases.steps]]
id = "s2"
name = "Scan"

[[phases]]
id = "p2"
name = "Writing"

[[phases.steps]]
id = "s3"
name = "Draft"

[[phases.steps]]
id = "s4"
name = "Publish"
"#;

fn base_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scribe"));
    cmd.env("NO_COLOR", "1")
        .env_remove("COLOR")
        .env_remove("SCRIBE_HISTORY_LIMIT")
        .env_remove("SCRIBE_CHECKPOINT_EVERY")
        .env_remove("SCRIBE_LOG");
    cmd
}

/// The binary with no state directory configured.
pub fn cli() -> Cli {
    let mut cmd = base_command();
    cmd.env_remove("SCRIBE_STATE_DIR");
    Cli { cmd }
}

/// A throwaway state directory.
pub struct State {
    dir: TempDir,
}

impl State {
    pub fn empty() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn scribe(&self) -> Cli {
        let mut cmd = base_command();
        cmd.env("SCRIBE_STATE_DIR", self.dir.path());
        Cli { cmd }
    }

    /// Write a file into a scratch directory inside the state directory.
    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join("scratch").join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Start a documentation job with a fixed id.
    pub fn start(&self, project: &str, id: &str) {
        self.scribe().args(&["start", project, "--id", id]).passes();
    }

    /// Run `step start` then `step complete` for each step.
    pub fn finish_steps(&self, job: &str, steps: &[&str]) {
        for step in steps {
            self.scribe().args(&["step", "start", job, step]).passes();
            self.scribe().args(&["step", "complete", job, step]).passes();
        }
    }

    /// `scribe status <project> -o json`
    pub fn status_json(&self, project: &str) -> Value {
        self.scribe().args(&["status", project, "-o", "json"]).passes().json()
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.cmd.write_stdin(input);
        self
    }

    fn run(mut self) -> (Option<i32>, Output) {
        let output = self.cmd.output().unwrap();
        (
            output.status.code(),
            Output {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
        )
    }

    #[track_caller]
    pub fn passes(self) -> Output {
        let (code, output) = self.run();
        assert_eq!(
            code,
            Some(0),
            "expected success\nstdout:\n{}\nstderr:\n{}",
            output.stdout,
            output.stderr
        );
        output
    }

    #[track_caller]
    pub fn fails_with(self, expected: i32) -> Output {
        let (code, output) = self.run();
        assert_eq!(
            code,
            Some(expected),
            "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
            output.stdout,
            output.stderr
        );
        output
    }
}

pub struct Output {
    stdout: String,
    stderr: String,
}

impl Output {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    #[track_caller]
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}:\n{}", self.stdout);
        self
    }

    #[track_caller]
    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}:\n{}", self.stdout);
        self
    }

    #[track_caller]
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    #[track_caller]
    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}:\n{}", self.stderr);
        self
    }

    #[track_caller]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}
