// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of driver events.
//!
//! One JSON object per line: `{"seq": N, "event": {...}}`. Appends are
//! buffered and written by [`Wal::flush`]; readers only ever see complete,
//! newline-terminated lines. A failed flush discards the buffered entries
//! and cuts the file back to its last good length. A corrupt tail found at open is moved aside to a
//! `.bak` file and the valid prefix rewritten in place.

use crate::snapshot::rotate_bak_path;
use scribe_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("WAL io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAL encode error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

impl WalEntry {
    /// Parse one line; `None` for anything that is not a complete entry.
    fn parse(line: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(line).ok()?;
        serde_json::from_str(text.trim_end()).ok()
    }
}

pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    /// Byte offset of the next line `next_unprocessed` will read.
    read_offset: u64,
    /// Highest seq handed out by `next_unprocessed`.
    read_seq: u64,
    buffer: Vec<WalEntry>,
    /// File length covering every flushed entry.
    flushed_len: u64,
}

impl Wal {
    /// Open (or create) the log at `path`. Entries up to `processed_seq` are
    /// already reflected in the caller's state and are not returned by
    /// [`Wal::next_unprocessed`].
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // A snapshot may cover every entry the log ever held
        let recovered = if path.exists() { recover(path)? } else { 0 };
        let write_seq = recovered.max(processed_seq);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let flushed_len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_seq,
            processed_seq,
            read_offset: 0,
            read_seq: 0,
            buffer: Vec::new(),
            flushed_len,
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Buffer an event; returns its sequence number.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        self.buffer.push(WalEntry { seq: self.write_seq, event: event.clone() });
        Ok(self.write_seq)
    }

    /// Write buffered entries and sync them to disk.
    ///
    /// On failure none of the buffered entries are kept: their sequence
    /// numbers are handed out again and any partial write is cut off.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let entries = std::mem::take(&mut self.buffer);
        match self.write_entries(&entries) {
            Ok(len) => {
                self.flushed_len += len;
                Ok(())
            }
            Err(e) => {
                self.write_seq -= entries.len() as u64;
                if let Err(cut) = self.file.set_len(self.flushed_len) {
                    warn!(path = %self.path.display(), error = %cut, "could not cut back WAL");
                }
                warn!(
                    path = %self.path.display(),
                    dropped = entries.len(),
                    error = %e,
                    "WAL flush failed"
                );
                Err(e)
            }
        }
    }

    fn write_entries(&mut self, entries: &[WalEntry]) -> Result<u64, WalError> {
        let mut out = Vec::new();
        for entry in entries {
            serde_json::to_writer(&mut out, entry)?;
            out.push(b'\n');
        }
        self.file.write_all(&out)?;
        self.file.sync_data()?;
        Ok(out.len() as u64)
    }

    /// Next entry after `processed_seq` not yet returned. Flushes first.
    ///
    /// A corrupt line is skipped and yields `Ok(None)`; entries appended after
    /// it are returned by later calls.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        self.flush()?;
        let mut reader = BufReader::new(File::open(&self.path)?);
        reader.seek(SeekFrom::Start(self.read_offset))?;

        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 || line.last() != Some(&b'\n') {
                return Ok(None);
            }
            self.read_offset += n as u64;
            match WalEntry::parse(&line) {
                Some(entry) if entry.seq <= self.processed_seq.max(self.read_seq) => continue,
                Some(entry) => {
                    self.read_seq = entry.seq;
                    return Ok(Some(entry));
                }
                None => {
                    warn!(path = %self.path.display(), offset = self.read_offset, "skipping corrupt WAL entry");
                    return Ok(None);
                }
            }
        }
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// Entries with seq greater than `seq`, in order, including buffered
    /// ones. Reading stops at the first corrupt line.
    pub fn entries_after(&self, seq: u64) -> Result<Vec<WalEntry>, WalError> {
        let mut entries: Vec<WalEntry> =
            read_valid(&self.path)?.into_iter().map(|(entry, _)| entry).collect();
        let on_disk = entries.last().map_or(0, |e| e.seq);
        entries.extend(self.buffer.iter().filter(|e| e.seq > on_disk).cloned());
        entries.retain(|e| e.seq > seq);
        Ok(entries)
    }

    /// Drop entries with seq below `seq` (they are covered by a snapshot).
    pub fn truncate_before(&mut self, seq: u64) -> Result<(), WalError> {
        self.flush()?;
        let kept: Vec<(WalEntry, usize)> =
            read_valid(&self.path)?.into_iter().filter(|(e, _)| e.seq >= seq).collect();

        let tmp = self.path.with_extension("tmp");
        {
            let mut out = File::create(&tmp)?;
            for (entry, _) in &kept {
                serde_json::to_writer(&mut out, entry)?;
                out.write_all(b"\n")?;
            }
            out.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.flushed_len = self.file.metadata()?.len();
        self.read_offset = kept
            .iter()
            .filter(|(e, _)| e.seq <= self.read_seq)
            .map(|(_, len)| *len as u64)
            .sum();
        Ok(())
    }
}

/// Valid entries from the start of the file with the byte length of each
/// line, stopping at the first corrupt or incomplete line.
fn read_valid(path: &Path) -> Result<Vec<(WalEntry, usize)>, WalError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 || line.last() != Some(&b'\n') {
            break;
        }
        match WalEntry::parse(&line) {
            Some(entry) => entries.push((entry, n)),
            None => break,
        }
    }
    Ok(entries)
}

/// Scan an existing log. When anything follows the valid prefix, move the
/// file aside and rewrite the prefix. Returns the last valid seq.
fn recover(path: &Path) -> Result<u64, WalError> {
    let bytes = fs::read(path)?;
    let valid = read_valid(path)?;
    let valid_len: usize = valid.iter().map(|(_, n)| n).sum();
    let last_seq = valid.last().map_or(0, |(e, _)| e.seq);

    if valid_len < bytes.len() {
        let bak = rotate_bak_path(path);
        warn!(
            path = %path.display(),
            bak = %bak.display(),
            valid_entries = valid.len(),
            "corrupt WAL tail, moving aside"
        );
        fs::rename(path, &bak)?;
        fs::write(path, &bytes[..valid_len])?;
    }
    Ok(last_seq)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
