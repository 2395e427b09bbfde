// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribe log` and `scribe logs`

use anyhow::Result;
use clap::Args;
use scribe_core::{LogLevel, SystemClock};
use scribe_engine::{handle_query, Registry};
use scribe_wire::{LogEntryDetail, Query, Response};
use serde::Serialize;

use super::unexpected;
use crate::color;
use crate::exit_error::{ExitError, NOT_FOUND};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct LogArgs {
    /// Job ID (prefix match)
    pub job: String,
    pub message: String,
    /// debug, info, warn, or error
    #[arg(short, long, default_value = "info")]
    pub level: LogLevel,
    /// Step the entry relates to
    #[arg(long)]
    pub step: Option<String>,
}

#[derive(Args)]
pub struct LogsArgs {
    /// Job ID (prefix match)
    pub job: String,
    /// Only entries after this sequence number
    #[arg(long, default_value_t = 0)]
    pub since: u64,
    /// Keep only the most recent N entries (0 = all)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Serialize)]
struct Appended {
    job_id: String,
    seq: u64,
}

pub fn append(registry: &Registry<SystemClock>, args: LogArgs, format: OutputFormat) -> Result<()> {
    registry.log(&args.job, args.level, &args.message, args.step).map_err(ExitError::from)?;
    let job = registry.get_job_by_id(&args.job).map_err(ExitError::from)?;
    let appended = Appended { job_id: job.id.to_string(), seq: job.logs().last_seq() };
    format_or_json(format, &appended, |a| format!("Logged #{} to {}\n", a.seq, a.job_id))
}

pub fn show(registry: &Registry<SystemClock>, args: LogsArgs, format: OutputFormat) -> Result<()> {
    let query = Query::GetLogs { id: args.job.clone(), since: args.since, limit: args.limit };
    match handle_query(registry, query) {
        Response::Logs { entries, .. } => {
            format_or_json(format, &entries, |entries| render_logs(entries))
        }
        Response::Error { message } => Err(ExitError::new(NOT_FOUND, message).into()),
        other => Err(unexpected(&other)),
    }
}

/// One line per entry: `#3 warn  [Clone Repository] slow network`.
pub(crate) fn render_logs(entries: &[LogEntryDetail]) -> String {
    let mut out = String::new();
    for entry in entries {
        let step = entry.step.as_deref().map(|s| format!("[{s}] ")).unwrap_or_default();
        let pad = " ".repeat(5usize.saturating_sub(entry.level.as_str().len()));
        out.push_str(&format!(
            "#{} {}{pad} {}{}\n",
            entry.seq,
            color::log_level(entry.level),
            color::context(&step),
            entry.message
        ));
    }
    out
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
