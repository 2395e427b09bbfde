// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `scribe` - documentation job tracker

mod color;
mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use scribe_core::SystemClock;
use scribe_engine::{env, Config, Registry};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::{admin, job, logs, status, step, workflow};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(
    name = "scribe",
    version = VERSION,
    about = "Scribe - track documentation jobs through their workflow",
    styles = color::styles()
)]
struct Cli {
    /// State directory (default: $SCRIBE_STATE_DIR or ~/.local/state/scribe)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a documentation job for a project
    Start(job::StartArgs),
    /// Report step progress for a job
    Step(step::StepArgs),
    /// Append an entry to a job's log
    Log(logs::LogArgs),
    /// Cancel a pending or running job
    Cancel {
        /// Job ID (prefix match)
        job: String,
        /// Reason recorded on the job
        #[arg(short, long, default_value = "")]
        reason: String,
    },
    /// Start a new attempt of a failed job
    Retry {
        /// Job ID (prefix match)
        job: String,
    },
    /// Show progress of a project's latest job
    Status(status::StatusArgs),
    /// Show a job's log
    Logs(logs::LogsArgs),
    /// List every retained job for a project, oldest first
    History { project: String },
    /// List the latest job of every project
    List,
    /// Compare a project's documented commit with its branch head
    Sync {
        project: String,
        /// Commit currently at the head of the branch
        #[arg(long)]
        head: Option<String>,
    },
    /// Apply driver events (one JSON object per line) from a file or stdin
    Apply {
        /// Events file (default: stdin)
        file: Option<PathBuf>,
    },
    /// Print raw WAL events after a sequence number
    Events {
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
    /// Snapshot state and truncate the WAL
    Compact,
    /// Print or validate workflow templates
    Workflow(workflow::WorkflowArgs),
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("error: {}", exit.message);
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("error: {err:#}");
                std::process::exit(exit_error::REJECTED);
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let format = cli.output;
    let command = match cli.command {
        Some(command) => command,
        None => {
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
    };

    // Template commands never touch state
    let command = match command {
        Commands::Workflow(args) => return workflow::handle(args, format),
        other => other,
    };

    let config = match cli.state_dir {
        Some(dir) => Config::for_dir(dir),
        None => Config::load().map_err(ExitError::from)?,
    };
    let _guard = init_tracing(&config);
    tracing::debug!(version = VERSION, state_dir = %config.state_dir.display(), "scribe starting");
    let registry = Arc::new(Registry::open(config, SystemClock).map_err(ExitError::from)?);

    match command {
        Commands::Start(args) => job::start(&registry, args, format),
        Commands::Step(args) => step::handle(&registry, args, format),
        Commands::Log(args) => logs::append(&registry, args, format),
        Commands::Cancel { job, reason } => job::cancel(&registry, &job, &reason, format),
        Commands::Retry { job } => job::retry(&registry, &job, format),
        Commands::Status(args) => status::status(&registry, args, format),
        Commands::Logs(args) => logs::show(&registry, args, format),
        Commands::History { project } => status::history(&registry, project, format),
        Commands::List => status::list(&registry, format),
        Commands::Sync { project, head } => status::sync(&registry, project, head, format),
        Commands::Apply { file } => admin::apply(registry, file.as_deref(), format),
        Commands::Events { since } => admin::events(&registry, since, format),
        Commands::Compact => admin::compact(&registry, format),
        Commands::Workflow(_) => Ok(()),
    }
}

/// Log to `<state_dir>/scribe.log`. Returns `None` (and logs nowhere) when
/// the file cannot be set up; commands still run.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let dir = config.log_path.parent()?;
    std::fs::create_dir_all(dir).ok()?;
    let appender = tracing_appender::rolling::never(dir, config.log_path.file_name()?);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
        .try_init()
        .ok()?;
    Some(guard)
}
