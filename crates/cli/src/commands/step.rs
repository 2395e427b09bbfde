// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribe step` - Step transitions reported by the driver

use anyhow::Result;
use clap::{Args, Subcommand};
use scribe_core::SystemClock;
use scribe_engine::Registry;
use scribe_wire::JobDetail;

use super::job_detail;
use crate::color;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, step_marker, OutputFormat};

#[derive(Args)]
pub struct StepArgs {
    #[command(subcommand)]
    pub command: StepCommand,
}

#[derive(Subcommand)]
pub enum StepCommand {
    /// Mark a pending step running
    Start {
        /// Job ID (prefix match)
        job: String,
        step: String,
    },
    /// Mark a running step completed
    Complete {
        job: String,
        step: String,
        /// Result summary kept as the step's output
        #[arg(long)]
        result: Option<String>,
    },
    /// Mark a running step failed
    Fail {
        job: String,
        step: String,
        /// What went wrong (required)
        error: String,
    },
    /// Skip a pending or running step
    Skip {
        job: String,
        step: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

pub fn handle(registry: &Registry<SystemClock>, args: StepArgs, format: OutputFormat) -> Result<()> {
    let (job, step) = match args.command {
        StepCommand::Start { job, step } => {
            registry.start_step(&job, &step).map_err(ExitError::from)?;
            (job, step)
        }
        StepCommand::Complete { job, step, result } => {
            registry.complete_step(&job, &step, result).map_err(ExitError::from)?;
            (job, step)
        }
        StepCommand::Fail { job, step, error } => {
            registry.fail_step(&job, &step, &error).map_err(ExitError::from)?;
            (job, step)
        }
        StepCommand::Skip { job, step, reason } => {
            registry.skip_step(&job, &step, reason).map_err(ExitError::from)?;
            (job, step)
        }
    };

    let detail = job_detail(registry, &job)?;
    format_or_json(format, &detail, |detail| step_line(detail, &step))
}

/// `✓ Clone Repository completed · job-abc 7% running`
pub(crate) fn step_line(job: &JobDetail, step_id: &str) -> String {
    let Some(step) = job.phases.iter().flat_map(|p| &p.steps).find(|s| s.id == step_id) else {
        return format!("{step_id}: no such step in {}\n", job.id);
    };
    format!(
        "{} {} {} · {} {}% {}\n",
        step_marker(step.status),
        step.name,
        color::step_status(step.status, step.status.as_str()),
        color::muted(job.id.as_str()),
        job.progress,
        color::job_status(job.status)
    )
}
