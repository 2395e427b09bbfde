// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only per-job log stream.
//!
//! Entries are numbered from 1 in append order; the number doubles as the
//! entry id and as the cursor for incremental reads (`since`). Timestamps are
//! clamped so they never go backwards within a stream.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

crate::string_enum! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
    /// Name of the step this entry relates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogStream {
    entries: Vec<LogEntry>,
}

impl LogStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its sequence number.
    pub fn append(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        step: Option<String>,
        timestamp_ms: u64,
    ) -> u64 {
        let (seq, floor) = match self.entries.last() {
            Some(last) => (last.seq + 1, last.timestamp_ms),
            None => (1, 0),
        };
        self.entries.push(LogEntry {
            seq,
            timestamp_ms: timestamp_ms.max(floor),
            level,
            message: message.into(),
            step,
        });
        seq
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries appended after `seq`, in order. `since(0)` is everything.
    pub fn since(&self, seq: u64) -> &[LogEntry] {
        let start = self.entries.partition_point(|e| e.seq <= seq);
        &self.entries[start..]
    }

    /// The most recent `n` entries.
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }

    /// Sequence number of the newest entry, 0 when empty.
    pub fn last_seq(&self) -> u64 {
        self.entries.last().map_or(0, |e| e.seq)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
