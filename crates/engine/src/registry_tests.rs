// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use scribe_core::test_support::strategies::arb_step_action;
use scribe_core::test_support::{workflow, StepAction};
use scribe_core::{FakeClock, IntegrationSource, JobStatus, StepStatus};
use std::time::Duration;
use tempfile::TempDir;

fn open(dir: &TempDir, clock: &FakeClock) -> Registry<FakeClock> {
    let config = Config::for_dir(dir.path()).with_history_limit(20).with_checkpoint_every(0);
    Registry::open(config, clock.clone()).unwrap()
}

fn small_job(project: &str) -> JobConfig {
    JobConfig::builder(JobId::new(), project)
        .workflow(workflow(&[("p1", &["a", "b"]), ("p2", &["c", "d"])]))
        .build()
}

fn kind(err: EngineError) -> &'static str {
    err.workflow().map(|e| e.kind()).unwrap_or("other")
}

#[test]
fn start_job_and_drive_to_completion() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::at(10_000);
    let registry = open(&dir, &clock);

    let id = registry.start_job(small_job("api")).unwrap();
    for step in ["a", "b", "c", "d"] {
        clock.advance(Duration::from_secs(1));
        registry.start_step(&id, step).unwrap();
        clock.advance(Duration::from_secs(1));
        registry.complete_step(&id, step, None).unwrap();
    }

    let job = registry.get_job("api").unwrap();
    assert_eq!(job.id, id);
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.progress(), 100);
    assert_eq!(job.finished_at_ms(), Some(18_000));
    assert!(job.current_step().is_none());
}

#[test]
fn scenario_b_progress_and_pointers() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let id = registry.start_job(small_job("api")).unwrap();
    for step in ["a", "b"] {
        registry.start_step(&id, step).unwrap();
        registry.complete_step(&id, step, None).unwrap();
    }
    registry.start_step(&id, "c").unwrap();

    let job = registry.get_job_by_id(&id).unwrap();
    // Equal weight per phase: (1.0 + 0.0) / 2
    assert_eq!(job.progress(), 50);
    assert_eq!(job.current_phase().map(|p| p.id.as_str()), Some("p2"));
    assert_eq!(job.current_step().map(|s| s.id.as_str()), Some("c"));
}

#[test]
fn scenario_c_failure_text_is_preserved() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let id = registry.start_job(small_job("api")).unwrap();
    registry.start_step(&id, "a").unwrap();
    registry.fail_step(&id, "a", "Timeout while processing large file").unwrap();

    let job = registry.get_job_by_id(&id).unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.step("a").and_then(|s| s.error()), Some("Timeout while processing large file"));
    assert_eq!(kind(registry.start_step(&id, "b").unwrap_err()), "job_closed");
}

#[test]
fn scenario_d_second_start_is_rejected() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let first = registry.start_job(small_job("api")).unwrap();
    registry.start_step(&first, "a").unwrap();

    let err = registry.start_job(small_job("api")).unwrap_err();
    assert_eq!(kind(err), "already_running");
    assert_eq!(registry.list_history("api").len(), 1);

    // Other projects are unaffected
    registry.start_job(small_job("web")).unwrap();
}

#[test]
fn scenario_e_retry_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let first = registry.start_job(small_job("api")).unwrap();
    registry.start_step(&first, "a").unwrap();
    registry.complete_step(&first, "a", None).unwrap();
    registry.start_step(&first, "b").unwrap();
    registry.fail_step(&first, "b", "boom").unwrap();

    let second = registry.retry(&first).unwrap();
    assert_ne!(second, first);
    let job = registry.get_job("api").unwrap();
    assert_eq!(job.id, second);
    assert_eq!(job.attempt, 2);
    assert_eq!(job.retry_of.as_ref(), Some(&first));
    assert_eq!(job.progress(), 0);
    assert!(job.phases().iter().flat_map(|p| &p.steps).all(|s| s.status() == StepStatus::Pending
        && s.started_at_ms().is_none()
        && s.completed_at_ms().is_none()));

    // The failed attempt stays in history, untouched
    let history = registry.list_history("api");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status(), JobStatus::Failed);
}

#[test]
fn retry_of_running_job_is_rejected() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let id = registry.start_job(small_job("api")).unwrap();
    assert_eq!(kind(registry.retry(&id).unwrap_err()), "not_retryable");
}

#[test]
fn lookups_report_not_found() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    assert_eq!(kind(registry.get_job("nope").unwrap_err()), "not_found");
    assert_eq!(kind(registry.get_job_by_id("job-nope").unwrap_err()), "not_found");
    assert_eq!(kind(registry.start_step("job-nope", "a").unwrap_err()), "not_found");
}

#[test]
fn prefix_ids_resolve_for_driver_calls() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let config = JobConfig::builder("job-abc123", "api")
        .workflow(workflow(&[("p1", &["a"])]))
        .build();
    registry.start_job(config).unwrap();
    registry.start_step("abc", "a").unwrap();
    assert_eq!(
        registry.get_job_by_id("job-abc").unwrap().step("a").map(|s| s.status()),
        Some(StepStatus::Running)
    );
}

#[test]
fn logs_since_and_cancel() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let id = registry.start_job(small_job("api")).unwrap();
    registry.start_step(&id, "a").unwrap();
    registry.log(&id, LogLevel::Info, "Found 42 files", Some("a".into())).unwrap();

    let all = registry.logs_since(&id, 0).unwrap();
    assert_eq!(all.len(), 3);
    let later = registry.logs_since(&id, 2).unwrap();
    assert_eq!(later.len(), 1);
    assert_eq!(later[0].message, "Found 42 files");

    registry.cancel(&id, "").unwrap();
    let job = registry.get_job_by_id(&id).unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.error(), Some("cancelled by user"));
    assert_eq!(kind(registry.log(&id, LogLevel::Info, "late", None).unwrap_err()), "job_closed");
}

#[test]
fn rejected_events_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::new();
    let id = {
        let registry = open(&dir, &clock);
        let id = registry.start_job(small_job("api")).unwrap();
        assert!(registry.complete_step(&id, "a", None).is_err());
        assert!(registry.fail_step(&id, "zzz", "x").is_err());
        assert_eq!(registry.events_after(0).unwrap().len(), 1);
        id
    };
    let registry = open(&dir, &clock);
    assert_eq!(registry.get_job_by_id(&id).unwrap().status(), JobStatus::Pending);
}

#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::new();
    let (id, before) = {
        let registry = open(&dir, &clock);
        let id = registry.start_job(small_job("api")).unwrap();
        registry.start_step(&id, "a").unwrap();
        registry.complete_step(&id, "a", Some("cloned".into())).unwrap();
        registry.log(&id, LogLevel::Warn, "slow disk", None).unwrap();
        let before = registry.get_job_by_id(&id).unwrap();
        (id, before)
    };

    let registry = open(&dir, &clock);
    assert_eq!(registry.get_job_by_id(&id).unwrap(), before);
}

#[test]
fn checkpoint_truncates_wal_and_reopens_from_snapshot() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::new();
    let (id, before) = {
        let registry = open(&dir, &clock);
        let id = registry.start_job(small_job("api")).unwrap();
        registry.start_step(&id, "a").unwrap();
        let result = registry.checkpoint().unwrap();
        assert_eq!(result.seq, 2);
        assert!(registry.events_after(0).unwrap().is_empty());

        registry.complete_step(&id, "a", None).unwrap();
        assert_eq!(registry.events_after(0).unwrap().len(), 1);
        let before = registry.get_job_by_id(&id).unwrap();
        (id, before)
    };

    assert!(dir.path().join("snapshot.json.zst").exists());
    let registry = open(&dir, &clock);
    assert_eq!(registry.get_job_by_id(&id).unwrap(), before);
}

#[test]
fn automatic_checkpoint_after_threshold() {
    let dir = TempDir::new().unwrap();
    let config = Config::for_dir(dir.path()).with_checkpoint_every(3);
    let registry = Registry::open(config, FakeClock::new()).unwrap();
    let id = registry.start_job(small_job("api")).unwrap();
    registry.start_step(&id, "a").unwrap();
    assert!(!dir.path().join("snapshot.json.zst").exists());
    registry.complete_step(&id, "a", None).unwrap();
    assert!(dir.path().join("snapshot.json.zst").exists());
    assert!(registry.events_after(0).unwrap().is_empty());
}

#[test]
fn history_is_pruned_to_limit() {
    let dir = TempDir::new().unwrap();
    let config = Config::for_dir(dir.path()).with_history_limit(2).with_checkpoint_every(0);
    let registry = Registry::open(config, FakeClock::new()).unwrap();

    let mut ids = Vec::new();
    for _ in 0..4 {
        let id = registry.start_job(small_job("api")).unwrap();
        registry.cancel(&id, "next").unwrap();
        ids.push(id);
    }
    let kept: Vec<JobId> = registry.list_history("api").into_iter().map(|j| j.id).collect();
    assert_eq!(kept, ids[2..].to_vec());
    assert_eq!(kind(registry.get_job_by_id(&ids[0]).unwrap_err()), "not_found");
}

#[test]
fn history_is_pruned_for_jobs_created_by_events() {
    let dir = TempDir::new().unwrap();
    let config = Config::for_dir(dir.path()).with_history_limit(2).with_checkpoint_every(0);
    let registry = Registry::open(config, FakeClock::new()).unwrap();

    let mut ids = Vec::new();
    for n in 0..4u64 {
        let config = small_job("api");
        let id = config.id.clone();
        let seq = registry.apply(Event::job_created(config, 5_000 + n)).unwrap();
        assert_eq!(registry.events_after(seq - 1).unwrap()[0].event.name(), "job:created");
        registry.cancel(&id, "next").unwrap();
        ids.push(id);
    }

    let history = registry.list_history("api");
    let kept: Vec<&JobId> = history.iter().map(|j| &j.id).collect();
    assert_eq!(kept, vec![&ids[2], &ids[3]]);
    assert_eq!(history[1].created_at_ms, 5_003);
}

#[test]
fn list_latest_one_per_project() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let old = registry.start_job(small_job("api")).unwrap();
    registry.cancel(&old, "again").unwrap();
    let new = registry.start_job(small_job("api")).unwrap();
    let web = registry.start_job(small_job("web")).unwrap();

    let latest: Vec<JobId> = registry.list_latest().into_iter().map(|j| j.id).collect();
    assert_eq!(latest, vec![new, web]);
}

#[test]
fn subscribers_see_updates_in_order() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let mut updates = registry.subscribe();

    let id = registry.start_job(small_job("api")).unwrap();
    registry.start_step(&id, "a").unwrap();
    let _ = registry.complete_step(&id, "b", None);

    let first = updates.try_recv().unwrap();
    assert_eq!((first.seq, first.kind), (1, "job:created"));
    assert_eq!(first.project, "api");
    let second = updates.try_recv().unwrap();
    assert_eq!((second.seq, second.kind), (2, "step:started"));
    assert_eq!(second.job_id, id);
    // The rejected completion produced nothing
    assert!(updates.try_recv().is_err());
}

#[test]
fn sync_status_follows_completed_commit() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir, &FakeClock::new());
    let source = IntegrationSource::GitHub {
        full_name: "acme/api".into(),
        branch: "main".into(),
        commit: Some("c0ffee".into()),
    };
    let config = JobConfig::builder(JobId::new(), "api")
        .source(source)
        .workflow(workflow(&[("p1", &["a"])]))
        .build();
    assert_eq!(registry.sync_status("api", Some("c0ffee")), SyncStatus::NotProcessed);

    let id = registry.start_job(config).unwrap();
    registry.start_step(&id, "a").unwrap();
    registry.complete_step(&id, "a", None).unwrap();
    assert_eq!(registry.sync_status("api", Some("c0ffee")), SyncStatus::UpToDate);
    assert_eq!(registry.sync_status("api", Some("beef")), SyncStatus::UpdatesAvailable);
}

#[test]
fn second_open_of_same_dir_is_locked() {
    let dir = TempDir::new().unwrap();
    let _registry = open(&dir, &FakeClock::new());
    let config = Config::for_dir(dir.path());
    assert!(matches!(Registry::open(config, FakeClock::new()), Err(EngineError::Locked(_))));
}

fn drive(registry: &Registry<FakeClock>, job: &JobId, step: &str, action: &StepAction) -> bool {
    let result = match action {
        StepAction::Start => registry.start_step(job, step),
        StepAction::Complete => registry.complete_step(job, step, None),
        StepAction::Fail(error) => registry.fail_step(job, step, error),
        StepAction::Skip => registry.skip_step(job, step, None),
    };
    result.is_ok()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn driver_calls_keep_progress_monotonic_and_failure_sticky(
        actions in prop::collection::vec((0usize..4, arb_step_action()), 0..24),
    ) {
        let dir = TempDir::new().unwrap();
        let clock = FakeClock::new();
        let ids = ["a", "b", "c", "d"];
        let (id, last) = {
            let registry = open(&dir, &clock);
            let id = registry.start_job(small_job("api")).unwrap();
            let mut last = registry.get_job_by_id(&id).unwrap();
            for (idx, action) in &actions {
                clock.advance(Duration::from_secs(1));
                let applied = drive(&registry, &id, ids[*idx], action);
                let job = registry.get_job_by_id(&id).unwrap();
                prop_assert!(job.progress() >= last.progress());
                if last.status() == JobStatus::Failed {
                    prop_assert!(!applied);
                    prop_assert_eq!(job.status(), JobStatus::Failed);
                }
                last = job;
            }
            (id, last)
        };

        // Replaying the WAL rebuilds what readers saw
        let registry = open(&dir, &clock);
        prop_assert_eq!(registry.get_job_by_id(&id).unwrap(), last);
    }
}
