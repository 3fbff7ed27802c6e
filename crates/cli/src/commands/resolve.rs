// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lookup from a command-line argument.
//!
//! A job can be named by its id (`Class3D/job007/`, trailing slash optional),
//! by its alias (`Class3D/best` or just `best`), or by its number (`7`,
//! `job007`). Exact ids win over aliases, which win over numbers.

use rln_core::{is_job_dir_name, JobId, Pipeline};
use rln_project::alias::alias_name;

use crate::exit_error::ExitError;

pub fn resolve_job_id(pipeline: &Pipeline, query: &str) -> Result<JobId, ExitError> {
    let query = query.trim();
    let exact = JobId::new(query);
    if pipeline.contains(exact.as_str()) {
        return Ok(exact);
    }

    let by_alias: Vec<&JobId> = pipeline
        .processes
        .iter()
        .filter(|p| {
            p.alias.as_deref().is_some_and(|label| {
                label.trim_end_matches('/') == query.trim_end_matches('/') || alias_name(label) == query
            })
        })
        .map(|p| &p.name)
        .collect();
    match by_alias.as_slice() {
        [one] => return Ok((*one).clone()),
        [] => {}
        many => {
            let names: Vec<&str> = many.iter().map(|id| id.as_str()).collect();
            return Err(ExitError::new(
                crate::exit_error::GENERAL,
                format!("alias '{query}' is ambiguous: {}", names.join(", ")),
            ));
        }
    }

    if let Some(number) = parse_number(query) {
        if let Some(p) = pipeline.processes.iter().find(|p| p.name.number() == Some(number)) {
            return Ok(p.name.clone());
        }
    }
    Err(ExitError::not_found(format!("no job matches '{query}'")))
}

fn parse_number(query: &str) -> Option<u32> {
    if is_job_dir_name(query) {
        return query[rln_core::id::JOB_DIR_PREFIX.len()..].parse().ok();
    }
    query.parse().ok()
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
