// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln watch`

use anyhow::Result;
use rln_core::{JobId, Pipeline, ProcessRow, ProcessStatus};
use rln_engine::{pump, Change, JobUpdate, JobUpdateHandler, JobWatcher, PipelineUpdated, PipelineWatcher};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::color;
use crate::context::Context;
use crate::output::{print_json_line, OutputFormat};

/// Follow one job directory, or the project pipeline when `job` is absent,
/// until interrupted.
pub async fn watch(ctx: &Context, job: Option<&str>) -> Result<()> {
    match job {
        Some(job) => watch_job(ctx, job).await,
        None => watch_pipeline(ctx).await,
    }
}

struct Printer {
    format: OutputFormat,
}

impl JobUpdateHandler for Printer {
    fn on_job_updated(&mut self, update: &JobUpdate) {
        if self.format == OutputFormat::Json {
            if let Err(e) = print_json_line(update) {
                tracing::warn!(error = %e, "failed to write update");
            }
            return;
        }
        let changes: Vec<String> = update.changes.iter().map(describe).collect();
        println!(
            "{} {}  {}",
            color::header(update.job.as_str()),
            color::state(update.state),
            color::muted(&changes.join(", "))
        );
    }
}

pub(crate) fn describe(change: &Change) -> String {
    match change {
        Change::Sentinel => "state".to_string(),
        Change::Pipeline => "pipeline".to_string(),
        Change::Options => "options".to_string(),
        Change::Content { paths } if paths.len() == 1 => "1 file".to_string(),
        Change::Content { paths } => format!("{} files", paths.len()),
    }
}

async fn watch_job(ctx: &Context, job: &str) -> Result<()> {
    let dir = ctx.job(job)?;
    if ctx.format == OutputFormat::Text {
        println!("Watching {} {}", color::header(dir.job_id().as_str()), color::muted("(ctrl-c to stop)"));
    }
    let (tx, rx) = mpsc::channel(32);
    let handle = JobWatcher::spawn(dir, tx, &ctx.config.watch)?;
    let mut printer = Printer { format: ctx.format };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    tokio::select! {
        _ = pump(rx, &mut printer) => {}
        _ = &mut ctrl_c => {}
    }
    handle.stop();
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusChange {
    pub job: JobId,
    pub from: Option<ProcessStatus>,
    pub to: ProcessStatus,
}

/// Rows of `next` that are new or whose status differs from `prev`.
pub(crate) fn status_changes(prev: &Pipeline, next: &Pipeline) -> Vec<StatusChange> {
    next.processes
        .iter()
        .filter_map(|ProcessRow { name, status, .. }| {
            let from = prev.status_of(name.as_str());
            (from != Some(*status)).then(|| StatusChange { job: name.clone(), from, to: *status })
        })
        .collect()
}

async fn watch_pipeline(ctx: &Context) -> Result<()> {
    let mut last = ctx.project.read_pipeline()?;
    if ctx.format == OutputFormat::Text {
        println!(
            "Watching {} {}",
            color::header(&ctx.project.pipeline_path().display().to_string()),
            color::muted("(ctrl-c to stop)")
        );
    }
    let (tx, mut rx) = mpsc::channel(8);
    let handle = PipelineWatcher::spawn(ctx.project.clone(), tx, &ctx.config.watch)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            updated = rx.recv() => {
                let Some(PipelineUpdated(pipeline)) = updated else { break };
                for change in status_changes(&last, &pipeline) {
                    print_status_change(ctx.format, &change)?;
                }
                last = pipeline;
            }
            _ = &mut ctrl_c => break,
        }
    }
    handle.stop();
    Ok(())
}

fn print_status_change(format: OutputFormat, change: &StatusChange) -> Result<()> {
    match format {
        OutputFormat::Json => print_json_line(change),
        OutputFormat::Text => {
            match change.from {
                Some(from) => println!("{} {} -> {}", color::header(change.job.as_str()), from, change.to),
                None => println!("{} {} {}", color::header(change.job.as_str()), change.to, color::muted("(new)")),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
