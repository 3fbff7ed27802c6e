// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln status`, `show`, `dag`, `trash`, `restore` and `alias`

use std::path::PathBuf;

use anyhow::Result;
use rln_core::{JobId, JobState, Options};
use serde::Serialize;

use crate::color;
use crate::context::Context;
use crate::output::{format_or_json, handle_list, Table};

#[derive(Debug, Serialize)]
pub struct JobRow {
    pub job: JobId,
    pub alias: Option<String>,
    /// Command id of the dispatched class, else the raw type label.
    pub class: String,
    pub state: JobState,
}

pub fn status(ctx: &Context) -> Result<()> {
    let pipeline = ctx.project.read_pipeline()?;
    let rows: Vec<JobRow> = ctx
        .project
        .jobs()?
        .into_iter()
        .map(|dir| {
            let state = dir.state_in(&pipeline);
            let alias = dir.alias();
            let typed = ctx.registry.resolve(dir);
            let class = match typed.class {
                Some(class) => class.command_id(),
                None => typed.dir.job_star().map(|s| s.type_label).unwrap_or_default(),
            };
            JobRow { job: typed.dir.job_id().clone(), alias, class, state }
        })
        .collect();

    handle_list(ctx.format, &rows, "No jobs", |rows, out| {
        let mut table = Table::new(&["JOB", "STATE", "CLASS", "ALIAS"]);
        for row in rows {
            table.row(vec![
                row.job.to_string(),
                color::state(row.state),
                color::literal(&row.class),
                row.alias.as_deref().map(color::muted).unwrap_or_default(),
            ]);
        }
        table.render(out)
    })
}

#[derive(Debug, Serialize)]
pub struct JobDetails {
    pub job: JobId,
    pub type_label: String,
    pub command: Option<String>,
    pub title: Option<String>,
    pub state: JobState,
    pub alias: Option<String>,
    pub is_tomo: bool,
    pub is_continue: bool,
    pub parents: Vec<JobId>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub note: Option<String>,
    pub options: Options,
}

pub fn show(ctx: &Context, job: &str) -> Result<()> {
    let typed = ctx.typed(job)?;
    let dir = &typed.dir;
    let job_star = dir.job_star()?;
    let relative = |paths: Vec<PathBuf>| -> Vec<String> {
        paths.iter().map(|p| dir.make_relative_path(p).display().to_string()).collect()
    };
    let details = JobDetails {
        job: dir.job_id().clone(),
        type_label: job_star.type_label.clone(),
        command: typed.class.map(|c| c.command_id()),
        title: typed.class.map(|c| c.title()),
        state: dir.state(),
        alias: dir.alias(),
        is_tomo: job_star.is_tomo,
        is_continue: job_star.is_continue,
        parents: dir.parent_jobs()?.iter().map(|p| p.job_id().clone()).collect(),
        inputs: relative(dir.input_paths()?),
        outputs: relative(dir.output_paths()?),
        note: dir.note(),
        options: job_star.options,
    };

    format_or_json(ctx.format, &details, || print_details(&details))
}

fn print_details(d: &JobDetails) {
    println!("{} {}", color::header("Job:"), d.job);
    println!("  {} {}", color::context("State:"), color::state(d.state));
    match (&d.command, &d.title) {
        (Some(command), Some(title)) => {
            println!("  {} {} ({})", color::context("Class:"), color::literal(command), title)
        }
        _ => println!("  {} {}", color::context("Class:"), color::muted("unknown")),
    }
    println!("  {} {}", color::context("Type:"), d.type_label);
    if let Some(alias) = &d.alias {
        println!("  {} {}", color::context("Alias:"), alias);
    }
    if d.is_tomo {
        println!("  {} yes", color::context("Tomo:"));
    }
    if d.is_continue {
        println!("  {} yes", color::context("Continue:"));
    }
    print_list("Parents", d.parents.iter().map(|p| p.to_string()));
    print_list("Inputs", d.inputs.iter().cloned());
    print_list("Outputs", d.outputs.iter().cloned());
    if let Some(note) = d.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        println!("\n{}", color::header("Note:"));
        for line in note.lines() {
            println!("  {line}");
        }
    }
    if !d.options.is_empty() {
        println!("\n{}", color::header("Options:"));
        let width = d.options.keys().map(|k| k.len()).max().unwrap_or(0);
        for (key, value) in &d.options {
            println!("  {}  {}", color::context(&format!("{key:width$}")), value);
        }
    }
}

fn print_list(label: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return;
    }
    println!("\n{}", color::header(&format!("{label}:")));
    for item in items {
        println!("  {item}");
    }
}

pub fn dag(ctx: &Context) -> Result<()> {
    let pipeline = ctx.project.read_pipeline()?;
    let dag = pipeline.build_dag();
    format_or_json(ctx.format, &dag, || {
        for (job, entry) in &dag {
            let outputs: Vec<&str> = entry.outputs.iter().map(JobId::as_str).collect();
            if outputs.is_empty() {
                println!("{}", color::header(job.as_str()));
            } else {
                println!("{} -> {}", color::header(job.as_str()), outputs.join(", "));
            }
        }
    })
}

pub fn trash(ctx: &Context, job: &str) -> Result<()> {
    let dir = ctx.job(job)?;
    let report = rln_project::trash(&ctx.project, dir.job_id())?;
    format_or_json(ctx.format, &report, || {
        for id in &report.trashed {
            println!("Trashed {}", color::header(id.as_str()));
        }
        for id in &report.failed_moves {
            eprintln!("warning: directory of {id} could not be moved to Trash/");
        }
    })
}

pub fn restore(ctx: &Context, job: Option<&str>) -> Result<()> {
    let report = match job {
        Some(job) => rln_project::restore_job(&ctx.project, &JobId::new(job))?,
        None => rln_project::restore(&ctx.project)?,
    };
    format_or_json(ctx.format, &report, || {
        for id in &report.restored {
            println!("Restored {}", color::header(id.as_str()));
        }
        for skipped in &report.skipped {
            println!("Skipped {} {}", skipped.job, color::muted(&format!("({})", skipped.reason)));
        }
        if report.restored.is_empty() && report.skipped.is_empty() {
            println!("Nothing to restore in {}", ctx.project.trash_dir().display());
        }
    })
}

#[derive(Serialize)]
struct AliasChange<'a> {
    job: &'a JobId,
    alias: Option<&'a str>,
}

pub fn alias(ctx: &Context, job: &str, alias: Option<&str>) -> Result<()> {
    let dir = ctx.job(job)?;
    dir.set_alias(alias)?;
    let change = AliasChange { job: dir.job_id(), alias };
    format_or_json(ctx.format, &change, || match alias {
        Some(alias) => println!("Aliased {} as {}", color::header(dir.job_id().as_str()), alias),
        None => println!("Removed alias of {}", color::header(dir.job_id().as_str())),
    })
}
