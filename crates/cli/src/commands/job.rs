// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln run`, `overwrite`, `continue`, `clone` and the per-job actions

use anyhow::Result;
use rln_core::{Kwargs, ParamValue};
use rln_engine::{EditMode, Launch};
use rln_jobs::ClassRef;
use serde::Serialize;

use crate::color;
use crate::context::Context;
use crate::exit_error::{ExitError, REFUSED};
use crate::output::format_or_json;

pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=').ok_or_else(|| format!("invalid parameter '{}': must be name=value", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn parse_params(class: ClassRef, params: &[(String, String)]) -> Result<Kwargs> {
    Ok(class.parse_kwargs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?)
}

/// Lay `extra` over `base`. Composite values merge field by field.
pub(crate) fn overlay(base: &mut Kwargs, extra: Kwargs) {
    for (name, value) in extra {
        match (base.get_mut(&name), value) {
            (Some(ParamValue::Composite(fields)), ParamValue::Composite(new)) => fields.extend(new),
            (_, value) => {
                base.insert(name, value);
            }
        }
    }
}

fn print_launch(ctx: &Context, verb: &str, launch: &Launch) -> Result<()> {
    format_or_json(ctx.format, launch, || {
        let id = launch.job.job_id();
        match &launch.process {
            Some(run) => match run.pid {
                Some(pid) => println!("{verb} {} (pid {pid})", color::header(id.as_str())),
                None => println!("{verb} {}", color::header(id.as_str())),
            },
            None => println!(
                "{verb} {} {}",
                color::header(id.as_str()),
                color::muted("(scheduled, waiting for inputs)")
            ),
        }
    })
}

pub async fn run(ctx: &Context, command: &str, params: &[(String, String)]) -> Result<()> {
    let class = ctx.command(command)?;
    if class.is_continue {
        return Err(ExitError::new(
            REFUSED,
            format!("'{command}' continues an existing job; use `rln continue <job>`"),
        )
        .into());
    }
    let kwargs = parse_params(class, params)?;
    let launch = ctx.scheduler().create_and_run(class, &kwargs).await?;
    print_launch(ctx, "Started", &launch)
}

/// `rln overwrite` and `rln continue`: current parameters with `params`
/// laid over them.
pub async fn edit(ctx: &Context, job: &str, params: &[(String, String)], mode: EditMode) -> Result<()> {
    let typed = ctx.typed(job)?;
    let class = ctx.class_of(&typed)?;
    let mut kwargs = class.normalize_kwargs_inv(&typed.dir.job_params()?)?;
    overlay(&mut kwargs, parse_params(class, params)?);
    let launch = ctx.scheduler().edit_and_run(&typed.dir, class, &kwargs, mode).await?;
    let verb = match mode {
        EditMode::Overwrite => "Overwrote",
        EditMode::Continue => "Continued",
    };
    print_launch(ctx, verb, &launch)
}

pub async fn clone(ctx: &Context, job: &str) -> Result<()> {
    let typed = ctx.typed(job)?;
    let launch = ctx.scheduler().clone_job(&typed).await?;
    print_launch(ctx, "Cloned into", &launch)
}

#[derive(Serialize)]
struct Done<'a> {
    job: &'a str,
    action: &'a str,
}

fn print_done(ctx: &Context, job: &str, action: &str) -> Result<()> {
    format_or_json(ctx.format, &Done { job, action }, || println!("{} {}", action, color::header(job)))
}

pub fn abort(ctx: &Context, job: &str) -> Result<()> {
    let dir = ctx.job(job)?;
    ctx.scheduler().abort(&dir)?;
    print_done(ctx, dir.job_id().as_str(), "Abort requested for")
}

pub fn clear(ctx: &Context, job: &str) -> Result<()> {
    let dir = ctx.job(job)?;
    ctx.scheduler().clear(&dir)?;
    print_done(ctx, dir.job_id().as_str(), "Cleared")
}

pub async fn clean(ctx: &Context, job: &str, harsh: bool) -> Result<()> {
    let dir = ctx.job(job)?;
    ctx.scheduler().clean(&dir, harsh).await?;
    let action = if harsh { "Harsh-cleaned" } else { "Gently cleaned" };
    print_done(ctx, dir.job_id().as_str(), action)
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
