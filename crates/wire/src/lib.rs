// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side protocol for presentation layers.
//!
//! Queries and responses are plain JSON documents; the DTOs flatten a job's
//! derived state (status, progress, pointers) so callers never recompute it.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod query;
mod response;
mod types;
mod wire;

pub use query::Query;
pub use response::Response;
pub use types::{JobDetail, JobSummary, LogEntryDetail, PhaseDetail, StepDetail};
pub use wire::{decode, encode, ProtocolError};
