// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribe apply`, `scribe events`, `scribe compact`

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use scribe_core::{Event, SystemClock};
use scribe_engine::{EventLoop, Registry};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::exit_error::{ExitError, REJECTED};
use crate::output::{format_or_json, OutputFormat};

/// Events queued ahead of the driver loop.
const APPLY_QUEUE: usize = 64;

#[derive(Debug, Serialize)]
struct Applied {
    line: usize,
    seq: u64,
    event: &'static str,
}

/// Parse one event per non-blank line; reports the first bad line.
pub(crate) fn parse_events(source: &str) -> Result<Vec<(usize, Event)>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            let line_no = n + 1;
            serde_json::from_str(line).map(|event| (line_no, event)).map_err(|e| {
                anyhow::Error::from(ExitError::new(REJECTED, format!("line {line_no}: {e}")))
            })
        })
        .collect()
}

/// Feed events through the driver loop in order, stopping at the first
/// rejection. Events before it stay applied.
pub fn apply(
    registry: Arc<Registry<SystemClock>>,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let source = match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let events = parse_events(&source)?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let (applied, failure) = runtime.block_on(async move {
        let (event_loop, handle) = EventLoop::new(registry, APPLY_QUEUE, CancellationToken::new());
        let task = tokio::spawn(event_loop.run());

        let mut applied = Vec::new();
        let mut failure = None;
        for (line, event) in events {
            let name = event.name();
            match handle.send(event).await {
                Ok(seq) => applied.push(Applied { line, seq, event: name }),
                Err(e) => {
                    failure = Some(format!("line {line}: {e}"));
                    break;
                }
            }
        }
        drop(handle);
        task.await??;
        anyhow::Ok((applied, failure))
    })?;

    format_or_json(format, &applied, |applied| {
        applied.iter().map(|a| format!("#{} {} (line {})\n", a.seq, a.event, a.line)).collect()
    })?;
    match failure {
        Some(message) => Err(ExitError::new(REJECTED, message).into()),
        None => Ok(()),
    }
}

/// WAL entries after `since`: raw JSON lines, or one-line summaries as text.
pub fn events(registry: &Registry<SystemClock>, since: u64, format: OutputFormat) -> Result<()> {
    let entries = registry.events_after(since).map_err(ExitError::from)?;
    for entry in &entries {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(entry)?),
            OutputFormat::Text => println!("#{} {}", entry.seq, entry.event.log_summary()),
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Compacted {
    seq: u64,
    size_bytes: u64,
}

pub fn compact(registry: &Registry<SystemClock>, format: OutputFormat) -> Result<()> {
    let result = registry.checkpoint().map_err(ExitError::from)?;
    let compacted = Compacted { seq: result.seq, size_bytes: result.size_bytes };
    format_or_json(format, &compacted, |c| {
        format!("Snapshot at seq {} ({} bytes)\n", c.seq, c.size_bytes)
    })
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
