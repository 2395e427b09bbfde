// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod admin;
pub mod job;
pub mod logs;
pub mod status;
pub mod step;
pub mod workflow;

use anyhow::Result;
use scribe_core::SystemClock;
use scribe_engine::{handle_query, Registry};
use scribe_wire::{JobDetail, Query, Response};

use crate::exit_error::{ExitError, NOT_FOUND, REJECTED};

/// Fetch a job's detail view through the query handler.
pub(crate) fn job_detail(registry: &Registry<SystemClock>, id: &str) -> Result<JobDetail> {
    expect_job(handle_query(registry, Query::GetJob { id: id.to_string() }), id)
}

pub(crate) fn expect_job(response: Response, what: &str) -> Result<JobDetail> {
    match response {
        Response::Job { job: Some(job) } => Ok(*job),
        Response::Job { job: None } => {
            Err(ExitError::new(NOT_FOUND, format!("not found: {what}")).into())
        }
        Response::Error { message } => Err(ExitError::new(REJECTED, message).into()),
        other => Err(unexpected(&other)),
    }
}

pub(crate) fn unexpected(response: &Response) -> anyhow::Error {
    anyhow::anyhow!("unexpected response: {response:?}")
}
