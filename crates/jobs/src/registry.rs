// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Class registry: command table, directory dispatch and suggestions.

use indexmap::IndexMap;
use rln_core::{JobStar, Options};
use rln_project::JobDirectory;
use serde::Serialize;

use crate::class::{ClassRef, JobClass};
use crate::classes;
use crate::connection::{Connection, Suggestion};

/// One entry of the command table.
#[derive(Debug, Clone, Serialize)]
pub struct CommandEntry {
    pub id: String,
    pub title: String,
    #[serde(skip)]
    pub class: ClassRef,
}

#[derive(Debug, Default)]
pub struct Registry {
    classes: Vec<&'static JobClass>,
    commands: IndexMap<String, CommandEntry>,
    connections: Vec<Connection>,
}

/// A job directory together with the class it dispatched to.
#[derive(Debug, Clone)]
pub struct TypedJob {
    pub dir: JobDirectory,
    pub class: Option<ClassRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every shipped class and connection.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for &class in classes::ALL {
            registry.register(class);
        }
        for connection in classes::CONNECTIONS {
            registry.connect(*connection);
        }
        registry
    }

    /// Install `class` and its commands. Returns false when a class with the
    /// same command id is already registered.
    pub fn register(&mut self, class: &'static JobClass) -> bool {
        if self.commands.contains_key(class.command_id) {
            return false;
        }
        self.classes.push(class);
        let mut refs = vec![ClassRef::new(class)];
        if class.continuable {
            refs.push(ClassRef::continued(class));
        }
        for class_ref in refs {
            let id = class_ref.command_id();
            tracing::trace!(command = %id, "registered");
            self.commands.insert(id.clone(), CommandEntry { id, title: class_ref.title(), class: class_ref });
        }
        true
    }

    pub fn connect(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn classes(&self) -> &[&'static JobClass] {
        &self.classes
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandEntry> {
        self.commands.values()
    }

    pub fn command(&self, id: &str) -> Option<ClassRef> {
        self.commands.get(id).map(|entry| entry.class)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// First class matching label, predicate and tomo flag. When none
    /// matches exactly, a class differing only in the tomo flag is accepted.
    pub fn dispatch(&self, type_label: &str, is_tomo: bool, options: &Options) -> Option<ClassRef> {
        let candidates = || {
            self.classes
                .iter()
                .copied()
                .filter(move |c| c.type_label == type_label && (c.param_matches)(options))
        };
        if let Some(class) = candidates().find(|c| c.is_tomo == is_tomo) {
            return Some(ClassRef::new(class));
        }
        let fallback = candidates().next()?;
        tracing::debug!(type_label, is_tomo, command = fallback.command_id, "tomo flag mismatch accepted");
        Some(ClassRef::new(fallback))
    }

    pub fn dispatch_job_star(&self, job_star: &JobStar) -> Option<ClassRef> {
        self.dispatch(&job_star.type_label, job_star.is_tomo, &job_star.options)
    }

    /// Attach a class to `dir`. An unreadable `job.star` yields no class.
    pub fn resolve(&self, dir: JobDirectory) -> TypedJob {
        let class = match dir.job_star() {
            Ok(job_star) => self.dispatch_job_star(&job_star),
            Err(e) => {
                tracing::debug!(job = %dir.job_id(), error = %e, "job.star unreadable");
                None
            }
        };
        TypedJob { dir, class }
    }

    /// Next-job suggestions for every connection leaving the job's class.
    pub fn suggestions(&self, job: &TypedJob) -> Vec<Suggestion> {
        let Some(class) = job.class else {
            return Vec::new();
        };
        self.connections
            .iter()
            .filter(|c| c.pre.command_id == class.class.command_id)
            .map(|c| c.suggest(&job.dir))
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
