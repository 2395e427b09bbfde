// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribe status`, `scribe list`, `scribe history`, `scribe sync`

use anyhow::Result;
use clap::Args;
use scribe_core::{format_elapsed, format_elapsed_ms, PhaseStatus, StepStatus, SystemClock};
use scribe_engine::{handle_query, Registry};
use scribe_wire::{JobDetail, JobSummary, Query, Response, StepDetail};

use super::logs::render_logs;
use super::{expect_job, unexpected};
use crate::color;
use crate::output::{format_or_json, format_time_ago, progress_bar, step_marker, truncate, OutputFormat};

/// Log entries shown under the phase view.
const STATUS_LOG_TAIL: usize = 5;

#[derive(Args)]
pub struct StatusArgs {
    /// Project whose latest job to show
    #[arg(required_unless_present = "job")]
    pub project: Option<String>,

    /// Show a specific job instead (prefix match)
    #[arg(long, conflicts_with = "project")]
    pub job: Option<String>,
}

pub fn status(registry: &Registry<SystemClock>, args: StatusArgs, format: OutputFormat) -> Result<()> {
    let (query, what) = match (args.job, args.project) {
        (Some(id), _) => (Query::GetJob { id: id.clone() }, format!("job {id}")),
        (None, Some(project)) => {
            let what = format!("project {project}");
            (Query::GetProjectJob { project }, what)
        }
        (None, None) => anyhow::bail!("a project or --job is required"),
    };
    let job = expect_job(handle_query(registry, query), &what)?;
    let now = registry.now_ms();
    format_or_json(format, &job, |job| render_detail(job, now))
}

pub fn list(registry: &Registry<SystemClock>, format: OutputFormat) -> Result<()> {
    let jobs = expect_jobs(handle_query(registry, Query::ListJobs))?;
    let now = registry.now_ms();
    format_or_json(format, &jobs, |jobs| render_table(jobs, now, true))
}

pub fn history(registry: &Registry<SystemClock>, project: String, format: OutputFormat) -> Result<()> {
    let jobs = expect_jobs(handle_query(registry, Query::GetHistory { project }))?;
    let now = registry.now_ms();
    format_or_json(format, &jobs, |jobs| render_table(jobs, now, false))
}

pub fn sync(
    registry: &Registry<SystemClock>,
    project: String,
    head: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let response = handle_query(registry, Query::GetSyncStatus { project, head });
    let Response::Sync { .. } = &response else {
        return Err(unexpected(&response));
    };
    format_or_json(format, &response, |response| match response {
        Response::Sync { project, status } => format!("{project}: {status}\n"),
        _ => String::new(),
    })
}

fn expect_jobs(response: Response) -> Result<Vec<JobSummary>> {
    match response {
        Response::Jobs { jobs } => Ok(jobs),
        other => Err(unexpected(&other)),
    }
}

fn phase_marker(status: PhaseStatus) -> &'static str {
    step_marker(match status {
        PhaseStatus::Pending => StepStatus::Pending,
        PhaseStatus::Running => StepStatus::Running,
        PhaseStatus::Completed => StepStatus::Completed,
        PhaseStatus::Failed => StepStatus::Failed,
    })
}

fn step_note(step: &StepDetail, now: u64) -> String {
    match (step.status, step.started_at_ms, step.completed_at_ms) {
        (StepStatus::Running, Some(started), _) => {
            format!("running {}", format_elapsed_ms(now.saturating_sub(started)))
        }
        (StepStatus::Completed, Some(started), Some(done)) => {
            let took = format_elapsed_ms(done.saturating_sub(started));
            match &step.output {
                Some(output) => format!("{took}: {}", truncate(output, 60)),
                None => took,
            }
        }
        (StepStatus::Failed, ..) => step.error.clone().unwrap_or_default(),
        (StepStatus::Skipped, ..) => "skipped".to_string(),
        _ => String::new(),
    }
}

/// Phase-by-phase progress view of one job.
pub(crate) fn render_detail(job: &JobDetail, now: u64) -> String {
    let mut out = format!(
        "{} {}  attempt {}\n",
        color::header(&job.project_name),
        color::muted(job.id.as_str()),
        job.attempt
    );
    out.push_str(&format!(
        "Status:   {} {} {}%\n",
        color::job_status(job.status),
        progress_bar(job.progress, 20),
        job.progress
    ));
    out.push_str(&format!("Source:   {}\n", job.source));

    let elapsed = job.finished_at_ms.unwrap_or(now).saturating_sub(job.created_at_ms);
    out.push_str(&format!("Elapsed:  {}", format_elapsed(elapsed / 1000)));
    if let Some(eta) = job.estimated_completion_ms {
        out.push_str(&format!("  (about {} left)", format_elapsed(eta.saturating_sub(now) / 1000)));
    }
    out.push('\n');
    if let Some(error) = &job.error {
        out.push_str(&format!("Error:    {error}\n"));
    }

    for phase in &job.phases {
        out.push_str(&format!(
            "\n{} {}  {}/{}\n",
            phase_marker(phase.status),
            phase.name,
            phase.completed,
            phase.total
        ));
        for step in &phase.steps {
            let note = step_note(step, now);
            let line = format!("{} {}", step_marker(step.status), step.name);
            out.push_str(&format!("    {}", color::step_status(step.status, &line)));
            if !note.is_empty() {
                out.push_str(&format!("  {}", color::muted(&note)));
            }
            out.push('\n');
        }
    }

    let tail = &job.logs[job.logs.len().saturating_sub(STATUS_LOG_TAIL)..];
    if !tail.is_empty() {
        out.push_str("\nRecent log:\n");
        out.push_str(&render_logs(tail));
    }
    out
}

/// Column-aligned job listing. `with_project` shows the project column
/// (listing across projects) instead of the attempt column (one project).
pub(crate) fn render_table(jobs: &[JobSummary], now: u64, with_project: bool) -> String {
    if jobs.is_empty() {
        return "No jobs\n".to_string();
    }
    let first = if with_project { "PROJECT" } else { "ATTEMPT" };
    let mut rows = vec![[first, "JOB", "STATUS", "PROGRESS", "STEP", "AGE"].map(String::from)];
    for job in jobs {
        rows.push([
            if with_project { job.project.clone() } else { job.attempt.to_string() },
            job.id.short(8).to_string(),
            job.status.to_string(),
            format!("{}%", job.progress),
            truncate(job.current_step.as_deref().unwrap_or("-"), 28),
            format_time_ago(job.created_at_ms, now),
        ]);
    }

    let mut widths = [0usize; 6];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let mut out = String::new();
    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
