// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scribe-core: workflow model for Scribe documentation jobs

pub mod macros;

pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod job;
pub mod log;
pub mod phase;
pub mod project;
pub mod step;
pub mod time_fmt;
pub mod workflow;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::WorkflowError;
pub use event::Event;
pub use id::short;
pub use job::{Cancellation, Job, JobConfig, JobConfigBuilder, JobId, JobStatus};
pub use log::{LogEntry, LogLevel, LogStream};
pub use phase::{Phase, PhaseStatus};
pub use project::{IntegrationSource, ProjectId, SyncStatus};
pub use step::{Step, StepStatus};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
pub use workflow::{PhaseTemplate, StepTemplate, WorkflowTemplate};
