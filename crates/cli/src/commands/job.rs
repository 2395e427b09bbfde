// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribe start`, `scribe cancel`, `scribe retry`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use scribe_core::{IntegrationSource, JobConfig, JobId, SystemClock, WorkflowTemplate};
use scribe_engine::Registry;
use scribe_wire::JobDetail;

use super::job_detail;
use crate::color;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct StartArgs {
    /// Project identifier
    pub project: String,

    /// Display name (default: the project identifier)
    #[arg(long)]
    pub name: Option<String>,

    /// Local checkout being documented
    #[arg(long, conflicts_with = "github")]
    pub path: Option<PathBuf>,

    /// GitHub repository as owner/repo
    #[arg(long)]
    pub github: Option<String>,

    /// Branch of the GitHub repository
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Commit being documented
    #[arg(long, requires = "github")]
    pub commit: Option<String>,

    /// Workflow template (TOML) replacing the standard pipeline
    #[arg(long)]
    pub workflow: Option<PathBuf>,

    /// Job ID to use instead of a generated one
    #[arg(long)]
    pub id: Option<String>,
}

impl StartArgs {
    fn source(&self) -> IntegrationSource {
        match (&self.github, &self.path) {
            (Some(full_name), _) => IntegrationSource::GitHub {
                full_name: full_name.clone(),
                branch: self.branch.clone(),
                commit: self.commit.clone(),
            },
            (None, Some(path)) => IntegrationSource::local(path),
            (None, None) => IntegrationSource::default(),
        }
    }

    fn into_config(self) -> Result<JobConfig> {
        let workflow = match &self.workflow {
            Some(path) => super::workflow::load(path)?,
            None => WorkflowTemplate::documentation(),
        };
        let id = self.id.clone().map(JobId::from).unwrap_or_default();
        let source = self.source();
        let mut builder = JobConfig::builder(id, self.project).source(source).workflow(workflow);
        if let Some(name) = self.name {
            builder = builder.project_name(name);
        }
        Ok(builder.build())
    }
}

pub fn start(registry: &Registry<SystemClock>, args: StartArgs, format: OutputFormat) -> Result<()> {
    let id = registry.start_job(args.into_config()?).map_err(ExitError::from)?;
    let detail = job_detail(registry, &id)?;
    format_or_json(format, &detail, |job| {
        format!(
            "Started job {} for {} ({} steps)\n",
            color::header(job.id.as_str()),
            job.project_name,
            job.phases.iter().map(|p| p.total).sum::<usize>()
        )
    })
}

pub fn cancel(
    registry: &Registry<SystemClock>,
    job: &str,
    reason: &str,
    format: OutputFormat,
) -> Result<()> {
    let id = job_detail(registry, job)?.id;
    registry.cancel(&id, reason).map_err(ExitError::from)?;
    let detail = job_detail(registry, &id)?;
    format_or_json(format, &detail, |job| {
        format!("Cancelled job {} ({})\n", job.id, job.error.as_deref().unwrap_or("cancelled"))
    })
}

pub fn retry(registry: &Registry<SystemClock>, job: &str, format: OutputFormat) -> Result<()> {
    let id = registry.retry(job).map_err(ExitError::from)?;
    let detail = job_detail(registry, &id)?;
    format_or_json(format, &detail, retried)
}

fn retried(job: &JobDetail) -> String {
    let previous = job.retry_of.as_ref().map(|id| id.as_str()).unwrap_or("-");
    format!(
        "Started job {} for {} (attempt {}, retry of {previous})\n",
        color::header(job.id.as_str()),
        job.project_name,
        job.attempt
    )
}
