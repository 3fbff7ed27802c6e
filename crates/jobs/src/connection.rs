// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declared pre → post job suggestions.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use rln_core::params::{Kwargs, ParamValue};
use rln_project::JobDirectory;
use serde::Serialize;

use crate::class::{ClassRef, JobClass};

/// Where a node mapping finds its file inside the pre-job directory.
#[derive(Clone, Copy)]
pub enum NodeSource {
    File(&'static str),
    /// Name computed from the job directory, e.g. the latest iteration.
    Func(fn(&Path) -> Option<String>),
}

impl std::fmt::Debug for NodeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeSource::File(name) => write!(f, "File({name:?})"),
            NodeSource::Func(_) => f.write_str("Func(..)"),
        }
    }
}

pub type ValueSource = fn(&Path) -> Option<ParamValue>;

#[derive(Debug, Clone, Copy)]
pub struct Connection {
    pub pre: &'static JobClass,
    pub post: ClassRef,
    /// Source file and target parameter. A `.` in the target addresses a
    /// composite field.
    pub nodes: &'static [(NodeSource, &'static str)],
    pub values: &'static [(ValueSource, &'static str)],
}

/// A suggested next job with seeded kwargs.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    #[serde(serialize_with = "ser_command_id")]
    pub post: ClassRef,
    pub kwargs: Kwargs,
}

fn ser_command_id<S: serde::Serializer>(post: &ClassRef, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&post.command_id())
}

impl Connection {
    /// Seed kwargs for `post` from the finished `job`. Sources that do not
    /// resolve to an existing file are skipped.
    pub fn suggest(&self, job: &JobDirectory) -> Suggestion {
        let mut kwargs = Kwargs::new();
        for (source, target) in self.nodes {
            let Some(rel) = node_path(job, source) else {
                tracing::debug!(job = %job.job_id(), target, "node source unavailable");
                continue;
            };
            insert_target(&mut kwargs, target, ParamValue::Path(rel));
        }
        for (source, target) in self.values {
            match source(job.path()) {
                Some(value) => insert_target(&mut kwargs, target, value),
                None => tracing::debug!(job = %job.job_id(), target, "value source unavailable"),
            }
        }
        Suggestion { post: self.post, kwargs }
    }
}

fn node_path(job: &JobDirectory, source: &NodeSource) -> Option<PathBuf> {
    let name = match source {
        NodeSource::File(name) => (*name).to_string(),
        NodeSource::Func(f) => f(job.path())?,
    };
    let path = job.path().join(name);
    path.exists().then(|| job.make_relative_path(&path))
}

fn insert_target(kwargs: &mut Kwargs, target: &str, value: ParamValue) {
    match target.split_once('.') {
        Some((name, field)) => {
            let entry =
                kwargs.entry(name.to_string()).or_insert_with(|| ParamValue::Composite(IndexMap::new()));
            if let ParamValue::Composite(fields) = entry {
                fields.insert(field.to_string(), value);
            }
        }
        None => {
            kwargs.insert(target.to_string(), value);
        }
    }
}

/// Name of the highest-numbered `run_itNNN_<suffix>` in `dir`.
pub fn latest_iteration(dir: &Path, suffix: &str) -> Option<String> {
    let re = Regex::new(&format!(r"^run(?:_ct\d+)?_it(\d{{3}})_{}$", regex::escape(suffix))).ok()?;
    let pattern = dir.join(format!("run*_it*_{suffix}"));
    let entries = glob::glob(&pattern.to_string_lossy()).ok()?;
    entries
        .filter_map(Result::ok)
        .filter_map(|p| {
            let name = p.file_name()?.to_str()?.to_string();
            let iter: u32 = re.captures(&name)?.get(1)?.as_str().parse().ok()?;
            Some((iter, name))
        })
        .max_by_key(|(iter, _)| *iter)
        .map(|(_, name)| name)
}

/// Latest `run_itNNN_optimiser.star`.
pub fn latest_optimiser(dir: &Path) -> Option<String> {
    latest_iteration(dir, "optimiser.star")
}

/// Latest `run_itNNN_class001.mrc`.
pub fn latest_class_map(dir: &Path) -> Option<String> {
    latest_iteration(dir, "class001.mrc")
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
