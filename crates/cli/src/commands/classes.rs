// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln classes` and `rln suggest`

use std::io::Write;

use anyhow::Result;
use rln_core::{Kwargs, ParamValue};
use rln_jobs::{ParamKind, Registry, Suggestion};
use serde::Serialize;

use crate::color;
use crate::context::{lookup_command, Context};
use crate::output::{format_or_json, handle_list, OutputFormat, Table};

#[derive(Debug, Serialize)]
struct ClassRow<'a> {
    id: &'a str,
    title: &'a str,
    type_label: &'static str,
    is_tomo: bool,
}

/// Needs no project, so it takes the registry directly.
pub fn list(registry: &Registry, format: OutputFormat) -> Result<()> {
    let rows: Vec<ClassRow> = registry
        .commands()
        .map(|entry| ClassRow {
            id: &entry.id,
            title: &entry.title,
            type_label: entry.class.type_label(),
            is_tomo: entry.class.job_is_tomo(),
        })
        .collect();
    handle_list(format, &rows, "No job classes registered", |rows, out| {
        let mut table = Table::new(&["COMMAND", "TITLE", "TYPE"]);
        for row in rows {
            table.row(vec![color::literal(row.id), row.title.to_string(), color::muted(row.type_label)]);
        }
        table.render(out)
    })
}

#[derive(Debug, Serialize)]
struct ParamRow {
    name: &'static str,
    kind: &'static str,
    default: ParamValue,
}

/// Parameters of one command with their defaults.
pub fn describe(registry: &Registry, format: OutputFormat, id: &str) -> Result<()> {
    let class = lookup_command(registry, id)?;
    let defaults = class.default_kwargs();
    let rows: Vec<ParamRow> = class
        .parameters()
        .iter()
        .map(|spec| ParamRow {
            name: spec.name,
            kind: match spec.kind {
                ParamKind::Scalar(..) => "scalar",
                ParamKind::Tuple(..) => "tuple",
                ParamKind::Composite(_) => "composite",
            },
            default: defaults.get(spec.name).cloned().unwrap_or(ParamValue::None),
        })
        .collect();
    if format == OutputFormat::Text {
        println!("{} {}", color::header(&class.command_id()), class.title());
        println!("  {} {}\n", color::context("Type:"), class.type_label());
    }
    handle_list(format, &rows, "No parameters", |rows, out| {
        let mut table = Table::new(&["PARAMETER", "KIND", "DEFAULT"]);
        for row in rows {
            table.row(vec![row.name.to_string(), color::muted(row.kind), display_value(&row.default)]);
        }
        table.render(out)
    })
}

/// Human form of a value, matching what `rln run` accepts for it.
pub(crate) fn display_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Tuple(items) => items.iter().map(ParamValue::encode).collect::<Vec<_>>().join(","),
        ParamValue::Composite(fields) => fields
            .iter()
            .map(|(field, v)| format!("{field}={}", display_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.encode(),
    }
}

/// `name=value` arguments reproducing `kwargs` on the command line.
pub(crate) fn cli_args(kwargs: &Kwargs) -> Vec<String> {
    let quote = |s: String| if s.contains(char::is_whitespace) { format!("'{s}'") } else { s };
    let mut args = Vec::new();
    for (name, value) in kwargs {
        match value {
            ParamValue::Composite(fields) => {
                for (field, v) in fields {
                    args.push(format!("{name}.{field}={}", quote(display_value(v))));
                }
            }
            other => args.push(format!("{name}={}", quote(display_value(other)))),
        }
    }
    args
}

pub fn suggest(ctx: &Context, job: &str) -> Result<()> {
    let typed = ctx.typed(job)?;
    let suggestions: Vec<Suggestion> = ctx.registry.suggestions(&typed);
    handle_list(ctx.format, &suggestions, "No suggestions", |suggestions, out| {
        for s in suggestions {
            let command = if s.post.is_continue {
                format!("rln continue {}", typed.dir.job_id())
            } else {
                format!("rln run {}", s.post.command_id())
            };
            let args = cli_args(&s.kwargs);
            writeln!(out, "{}  {}", color::header(&s.post.title()), color::muted(&s.post.command_id()))?;
            if args.is_empty() {
                writeln!(out, "  {command}")?;
            } else {
                writeln!(out, "  {command} {}", args.join(" "))?;
            }
        }
        Ok(())
    })
}

/// Print the seeded kwargs of the suggestion for `command` after `job`.
pub fn suggestion_for(ctx: &Context, job: &str, command: &str) -> Result<()> {
    let typed = ctx.typed(job)?;
    let wanted = ctx.command(command)?;
    let found = ctx.registry.suggestions(&typed).into_iter().find(|s| s.post == wanted);
    format_or_json(ctx.format, &found, || match &found {
        Some(s) => println!("{}", cli_args(&s.kwargs).join(" ")),
        None => println!("{} does not follow {}", command, typed.dir.job_id()),
    })
}

#[cfg(test)]
#[path = "classes_tests.rs"]
mod tests;
