// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job registry: the single write path over the materialized state.
//!
//! Every mutation takes the state write guard, validates the event, appends
//! it to the WAL, applies it, and only then releases the guard. Readers see
//! either none or all of an event's effect.

use std::fs::{self, File, OpenOptions};

use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use scribe_core::{
    Clock, Event, Job, JobConfig, JobId, LogEntry, LogLevel, ProjectId, SyncStatus, SystemClock,
    WorkflowError,
};
use scribe_storage::{load_snapshot, CheckpointResult, Checkpointer, MaterializedState, Wal, WalEntry};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{Config, EngineError};

/// Buffered updates per subscriber before it starts lagging.
const UPDATE_CAPACITY: usize = 256;

/// Notification sent to subscribers after an event is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    /// WAL sequence number of the event
    pub seq: u64,
    pub job_id: JobId,
    pub project: ProjectId,
    /// Event tag, e.g. `step:completed`
    pub kind: &'static str,
}

struct Journal {
    wal: Wal,
    since_checkpoint: u64,
}

pub struct Registry<C: Clock = SystemClock> {
    config: Config,
    state: RwLock<MaterializedState>,
    journal: Mutex<Journal>,
    updates: broadcast::Sender<JobUpdate>,
    clock: C,
    _lock: File,
}

impl<C: Clock> Registry<C> {
    /// Open the registry under `config.state_dir`: take the directory lock,
    /// load the snapshot, and replay the WAL written after it.
    pub fn open(config: Config, clock: C) -> Result<Self, EngineError> {
        fs::create_dir_all(&config.state_dir)?;
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&config.lock_path)?;
        lock.try_lock_exclusive().map_err(|_| EngineError::Locked(config.state_dir.clone()))?;

        let (mut state, processed_seq) = match load_snapshot(&config.snapshot_path)? {
            Some(snapshot) => {
                info!(seq = snapshot.seq, jobs = snapshot.state.jobs.len(), "loaded snapshot");
                (snapshot.state, snapshot.seq)
            }
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(&config.wal_path, processed_seq)?;
        let mut replayed = 0usize;
        while let Some(entry) = wal.next_unprocessed()? {
            match state.apply_event(&entry.event) {
                Ok(()) => replayed += 1,
                Err(e) => warn!(
                    seq = entry.seq,
                    error = %e,
                    "skipping WAL entry: {}",
                    entry.event.log_summary()
                ),
            }
            wal.mark_processed(entry.seq);
        }
        if replayed > 0 {
            info!(replayed, after_seq = processed_seq, "replayed WAL");
        }
        info!(jobs = state.jobs.len(), projects = state.history.len(), "recovered state");

        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Ok(Self {
            config,
            state: RwLock::new(state),
            journal: Mutex::new(Journal { wal, since_checkpoint: replayed as u64 }),
            updates,
            clock,
            _lock: lock,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobUpdate> {
        self.updates.subscribe()
    }

    // ── Write path ─────────────────────────────────────────────────────────

    /// Validate, persist, and apply one driver event. Returns its WAL seq.
    ///
    /// `job:created` goes through the same path as [`Registry::start_job`],
    /// so history is pruned before the new job lands.
    pub fn apply(&self, event: Event) -> Result<u64, EngineError> {
        let mut state = self.state.write();
        let mut journal = self.journal.lock();
        match event.as_job_config() {
            Some((config, created_at_ms)) => {
                self.create(&mut state, &mut journal, config, created_at_ms)
            }
            None => self.commit(&mut state, &mut journal, event),
        }
    }

    /// Start a job; rejected with `AlreadyRunning` while the project has a
    /// pending or running job. Old terminal jobs beyond the history limit
    /// are pruned first.
    pub fn start_job(&self, config: JobConfig) -> Result<JobId, EngineError> {
        let mut state = self.state.write();
        let mut journal = self.journal.lock();
        let id = config.id.clone();
        self.create(&mut state, &mut journal, config, self.clock.epoch_ms())?;
        Ok(id)
    }

    /// Start the next attempt of a failed job. Returns the new job's id.
    pub fn retry(&self, job: &str) -> Result<JobId, EngineError> {
        let mut state = self.state.write();
        let mut journal = self.journal.lock();
        let config = resolve(&state, job)?.retry_config(JobId::new())?;
        let id = config.id.clone();
        self.create(&mut state, &mut journal, config, self.clock.epoch_ms())?;
        Ok(id)
    }

    pub fn start_step(&self, job: &str, step: &str) -> Result<u64, EngineError> {
        self.emit(job, |job_id, at_ms| Event::StepStarted { job_id, step: step.to_string(), at_ms })
    }

    pub fn complete_step(
        &self,
        job: &str,
        step: &str,
        output: Option<String>,
    ) -> Result<u64, EngineError> {
        self.emit(job, |job_id, at_ms| Event::StepCompleted {
            job_id,
            step: step.to_string(),
            output,
            at_ms,
        })
    }

    pub fn fail_step(&self, job: &str, step: &str, error: &str) -> Result<u64, EngineError> {
        self.emit(job, |job_id, at_ms| Event::StepFailed {
            job_id,
            step: step.to_string(),
            error: error.to_string(),
            at_ms,
        })
    }

    pub fn skip_step(
        &self,
        job: &str,
        step: &str,
        reason: Option<String>,
    ) -> Result<u64, EngineError> {
        self.emit(job, |job_id, at_ms| Event::StepSkipped {
            job_id,
            step: step.to_string(),
            reason,
            at_ms,
        })
    }

    pub fn log(
        &self,
        job: &str,
        level: LogLevel,
        message: &str,
        step: Option<String>,
    ) -> Result<u64, EngineError> {
        self.emit(job, |job_id, at_ms| Event::LogAppended {
            job_id,
            level,
            message: message.to_string(),
            step,
            at_ms,
        })
    }

    pub fn cancel(&self, job: &str, reason: &str) -> Result<u64, EngineError> {
        self.emit(job, |job_id, at_ms| Event::JobCancelled {
            job_id,
            reason: reason.to_string(),
            at_ms,
        })
    }

    /// Write a snapshot of the current state and drop the WAL entries it
    /// covers.
    pub fn checkpoint(&self) -> Result<CheckpointResult, EngineError> {
        let state = self.state.read();
        let mut journal = self.journal.lock();
        self.checkpoint_locked(&state, &mut journal)
    }

    /// Snapshot anything applied since the last checkpoint.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        let state = self.state.read();
        let mut journal = self.journal.lock();
        journal.wal.flush()?;
        if journal.since_checkpoint > 0 {
            self.checkpoint_locked(&state, &mut journal)?;
        }
        info!("registry closed");
        Ok(())
    }

    fn emit(
        &self,
        job: &str,
        build: impl FnOnce(JobId, u64) -> Event,
    ) -> Result<u64, EngineError> {
        let mut state = self.state.write();
        let mut journal = self.journal.lock();
        let job_id = resolve(&state, job)?.id.clone();
        let event = build(job_id, self.clock.epoch_ms());
        self.commit(&mut state, &mut journal, event)
    }

    fn create(
        &self,
        state: &mut MaterializedState,
        journal: &mut Journal,
        config: JobConfig,
        created_at_ms: u64,
    ) -> Result<u64, EngineError> {
        let id = config.id.clone();
        let project = config.project.clone();
        let event = Event::job_created(config, created_at_ms);
        if let Err(e) = state.check_event(&event) {
            warn!(project = %project, error = %e, "job not started");
            return Err(e.into());
        }

        for old in state.prunable(project.as_str(), self.config.history_limit) {
            debug!(job_id = %old, project = %project, "pruning job history");
            self.commit(state, journal, Event::JobDeleted { id: old })?;
        }
        let seq = self.commit(state, journal, event)?;
        info!(job_id = %id, project = %project, "job started");
        Ok(seq)
    }

    fn commit(
        &self,
        state: &mut MaterializedState,
        journal: &mut Journal,
        event: Event,
    ) -> Result<u64, EngineError> {
        if let Err(e) = state.check_event(&event) {
            warn!(error = %e, "rejected {}", event.log_summary());
            return Err(e.into());
        }
        let project = match &event {
            Event::JobCreated { project, .. } => Some(project.clone()),
            other => state.jobs.get(other.job_id().as_str()).map(|j| j.project.clone()),
        };

        let seq = journal.wal.append(&event)?;
        journal.wal.flush()?;
        state.apply_event(&event)?;
        journal.wal.mark_processed(seq);
        journal.since_checkpoint += 1;
        debug!(seq, "applied {}", event.log_summary());

        if let Some(project) = project {
            // No receivers is fine
            let _ = self.updates.send(JobUpdate {
                seq,
                job_id: event.job_id().clone(),
                project,
                kind: event.name(),
            });
        }

        let every = self.config.checkpoint_every;
        if every > 0 && journal.since_checkpoint >= every {
            if let Err(e) = self.checkpoint_locked(state, journal) {
                warn!(error = %e, "automatic checkpoint failed");
            }
        }
        Ok(seq)
    }

    fn checkpoint_locked(
        &self,
        state: &MaterializedState,
        journal: &mut Journal,
    ) -> Result<CheckpointResult, EngineError> {
        journal.wal.flush()?;
        let seq = journal.wal.processed_seq();
        let result = Checkpointer::new(self.config.snapshot_path.clone()).checkpoint_sync(seq, state)?;
        journal.wal.truncate_before(seq + 1)?;
        journal.since_checkpoint = 0;
        info!(seq = result.seq, size_bytes = result.size_bytes, "saved snapshot");
        Ok(result)
    }

    // ── Read path ──────────────────────────────────────────────────────────

    /// Run `f` against a consistent view of the state.
    pub fn read<R>(&self, f: impl FnOnce(&MaterializedState) -> R) -> R {
        f(&self.state.read())
    }

    /// Most recent job for a project.
    pub fn get_job(&self, project: &str) -> Result<Job, EngineError> {
        self.read(|state| state.latest_for_project(project).cloned())
            .ok_or_else(|| WorkflowError::NotFound(format!("no jobs for project {project}")).into())
    }

    /// Job by exact id or unique prefix.
    pub fn get_job_by_id(&self, id: &str) -> Result<Job, EngineError> {
        self.read(|state| resolve(state, id).cloned()).map_err(EngineError::from)
    }

    /// Every retained job for a project, oldest first.
    pub fn list_history(&self, project: &str) -> Vec<Job> {
        self.read(|state| state.history(project).into_iter().cloned().collect())
    }

    /// Most recent job of every project.
    pub fn list_latest(&self) -> Vec<Job> {
        self.read(|state| state.latest().into_iter().cloned().collect())
    }

    /// Log entries of a job with seq greater than `since`.
    pub fn logs_since(&self, job: &str, since: u64) -> Result<Vec<LogEntry>, EngineError> {
        self.read(|state| resolve(state, job).map(|j| j.logs().since(since).to_vec()))
            .map_err(EngineError::from)
    }

    pub fn sync_status(&self, project: &str, head: Option<&str>) -> SyncStatus {
        self.read(|state| state.sync_status(project, head))
    }

    /// Raw events after `seq` still held in the WAL (older ones are folded
    /// into the snapshot). Lets a lagging subscriber catch up.
    pub fn events_after(&self, seq: u64) -> Result<Vec<WalEntry>, EngineError> {
        Ok(self.journal.lock().wal.entries_after(seq)?)
    }
}

fn resolve<'a>(state: &'a MaterializedState, id: &str) -> Result<&'a Job, WorkflowError> {
    state.get_job(id).ok_or_else(|| WorkflowError::NotFound(format!("job {id}")))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
