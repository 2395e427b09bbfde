// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribe workflow` - Workflow templates

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use scribe_core::WorkflowTemplate;

use crate::exit_error::{ExitError, REJECTED};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommand,
}

#[derive(Subcommand)]
pub enum WorkflowCommand {
    /// Print a template as TOML (default: the standard documentation workflow)
    Show {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Check a template file for errors
    Validate { file: PathBuf },
}

pub fn handle(args: WorkflowArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        WorkflowCommand::Show { file } => {
            let template = match file {
                Some(path) => load(&path)?,
                None => WorkflowTemplate::documentation(),
            };
            let toml = template.to_toml().map_err(|e| ExitError::new(REJECTED, e.to_string()))?;
            format_or_json(format, &template, |_| toml)
        }
        WorkflowCommand::Validate { file } => {
            let template = load(&file)?;
            format_or_json(format, &template, |t| {
                format!(
                    "{}: {} phases, {} steps\n",
                    file.display(),
                    t.phases.len(),
                    t.step_count()
                )
            })
        }
    }
}

pub(crate) fn load(path: &Path) -> Result<WorkflowTemplate> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let template = WorkflowTemplate::from_toml(&source)
        .map_err(|e| ExitError::new(REJECTED, format!("{}: {e}", path.display())))?;
    Ok(template)
}
