// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rln: command line for RELION projects

mod color;
mod commands;
mod context;
mod exit_error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rln_engine::EditMode;
use rln_jobs::Registry;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::{classes, job, project, watch};
use crate::context::Context;
use crate::exit_error::{exit_code, ExitError, GENERAL};
use crate::output::OutputFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("RLN_BUILD_HASH"), ")");

#[derive(Parser)]
#[command(name = "rln", version = VERSION, about = "Inspect and drive RELION projects", styles = color::styles())]
struct Cli {
    /// Project directory (default: search upward from the working directory)
    #[arg(short = 'C', long = "project", global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every job with its state
    Status,
    /// Show one job: state, lineage, files and options
    Show {
        /// Job id, alias or number
        job: String,
    },
    /// Print the job graph
    Dag,
    /// List job commands, or describe one
    Classes {
        /// Command id (e.g. rln.class3d)
        id: Option<String>,
    },
    /// Create a job and run it (or schedule it until its inputs exist)
    Run {
        /// Command id (e.g. rln.class3d)
        command: String,
        /// Parameters as name=value (composite fields as name.field=value)
        #[arg(value_parser = job::parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Rewrite a job's parameters and run it again from scratch
    Overwrite {
        job: String,
        #[arg(value_parser = job::parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Continue a job from its last iteration
    Continue {
        job: String,
        #[arg(value_parser = job::parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Create a new job with the parameters of an existing one
    Clone { job: String },
    /// Ask a running job to stop
    Abort { job: String },
    /// Remove a job's outputs and state markers
    Clear { job: String },
    /// Delete intermediate files of a job
    Clean {
        job: String,
        /// Also delete files kept by a gentle clean
        #[arg(long)]
        harsh: bool,
    },
    /// Move a job and everything downstream of it to Trash/
    Trash { job: String },
    /// Bring jobs back from Trash/ (all of them when no job is given)
    Restore { job: Option<String> },
    /// Set or remove a job alias
    Alias {
        job: String,
        alias: Option<String>,
        #[arg(long, conflicts_with = "alias")]
        remove: bool,
    },
    /// Suggest follow-up jobs
    Suggest {
        job: String,
        /// Only print the parameters for this command
        #[arg(long)]
        command: Option<String>,
    },
    /// Follow changes to a job, or to the pipeline when no job is given
    Watch { job: Option<String> },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(rln_core::env::log_filter()))
        .init();

    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = if cli.json { OutputFormat::Json } else { cli.output };
    if let Command::Classes { id } = &cli.command {
        let registry = Registry::builtin();
        return match id {
            Some(id) => classes::describe(&registry, format, id),
            None => classes::list(&registry, format),
        };
    }
    let ctx = Context::load(cli.project.as_deref(), format)?;

    match cli.command {
        Command::Status => project::status(&ctx),
        Command::Show { job } => project::show(&ctx, &job),
        Command::Dag => project::dag(&ctx),
        // handled above
        Command::Classes { .. } => Ok(()),
        Command::Run { command, params } => job::run(&ctx, &command, &params).await,
        Command::Overwrite { job: id, params } => job::edit(&ctx, &id, &params, EditMode::Overwrite).await,
        Command::Continue { job: id, params } => job::edit(&ctx, &id, &params, EditMode::Continue).await,
        Command::Clone { job: id } => job::clone(&ctx, &id).await,
        Command::Abort { job: id } => job::abort(&ctx, &id),
        Command::Clear { job: id } => job::clear(&ctx, &id),
        Command::Clean { job: id, harsh } => job::clean(&ctx, &id, harsh).await,
        Command::Trash { job } => project::trash(&ctx, &job),
        Command::Restore { job } => project::restore(&ctx, job.as_deref()),
        Command::Alias { job, alias, remove } => match (alias, remove) {
            (Some(alias), false) => project::alias(&ctx, &job, Some(alias.as_str())),
            (None, true) => project::alias(&ctx, &job, None),
            _ => Err(ExitError::new(GENERAL, "give an alias or --remove").into()),
        },
        Command::Suggest { job, command: None } => classes::suggest(&ctx, &job),
        Command::Suggest { job, command: Some(command) } => classes::suggestion_for(&ctx, &job, &command),
        Command::Watch { job } => watch::watch(&ctx, job.as_deref()).await,
    }
}
