// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use scribe_core::{JobStatus, LogLevel, StepStatus};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Muted / secondary text: darker grey
    pub const MUTED: u8 = 240;
    /// Completed work: soft green
    pub const GOOD: u8 = 114;
    /// Running work and warnings: amber
    pub const ACTIVE: u8 = 179;
    /// Failures: soft red
    pub const BAD: u8 = 167;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

pub fn job_status(status: JobStatus) -> String {
    let code = match status {
        JobStatus::Pending => codes::MUTED,
        JobStatus::Running => codes::ACTIVE,
        JobStatus::Completed => codes::GOOD,
        JobStatus::Failed => codes::BAD,
    };
    paint(code, status.as_str())
}

pub fn step_status(status: StepStatus, text: &str) -> String {
    let code = match status {
        StepStatus::Pending | StepStatus::Skipped => codes::MUTED,
        StepStatus::Running => codes::ACTIVE,
        StepStatus::Completed => codes::GOOD,
        StepStatus::Failed => codes::BAD,
    };
    paint(code, text)
}

pub fn log_level(level: LogLevel) -> String {
    let code = match level {
        LogLevel::Debug => codes::MUTED,
        LogLevel::Info => codes::CONTEXT,
        LogLevel::Warn => codes::ACTIVE,
        LogLevel::Error => codes::BAD,
    };
    paint(code, level.as_str())
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
