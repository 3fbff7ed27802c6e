// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project, configuration and registry shared by every command.

use std::path::Path;

use anyhow::{Context as _, Result};
use rln_core::Config;
use rln_engine::{RelionPipeliner, Scheduler};
use rln_jobs::{ClassRef, Environment, Registry, TypedJob};
use rln_project::{JobDirectory, Project};

use crate::commands::resolve::resolve_job_id;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

pub struct Context {
    pub project: Project,
    pub config: Config,
    pub registry: Registry,
    pub format: OutputFormat,
}

impl Context {
    /// Find the project at or above `dir` (default: the working directory)
    /// and load its configuration layers.
    pub fn load(dir: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let start = match dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("cannot read the working directory")?,
        };
        let project = Project::discover(&start)?;
        let config = Config::load(Some(project.root()))?;
        tracing::debug!(root = %project.root().display(), pipeliner = %config.pipeliner.display(), "project loaded");
        Ok(Self { project, config, registry: Registry::builtin(), format })
    }

    pub fn scheduler(&self) -> Scheduler<RelionPipeliner> {
        Scheduler::new(
            self.project.clone(),
            Environment::from_config(&self.config),
            RelionPipeliner::new(&self.config.pipeliner),
        )
    }

    pub fn job(&self, query: &str) -> Result<JobDirectory> {
        let pipeline = self.project.read_pipeline()?;
        let id = resolve_job_id(&pipeline, query)?;
        Ok(self.project.job(&id)?)
    }

    pub fn typed(&self, query: &str) -> Result<TypedJob> {
        Ok(self.registry.resolve(self.job(query)?))
    }

    /// Class of `job`, or an error naming its type label.
    pub fn class_of(&self, job: &TypedJob) -> Result<ClassRef> {
        match job.class {
            Some(class) => Ok(class),
            None => {
                let label = job.dir.job_star().map(|s| s.type_label).unwrap_or_default();
                Err(ExitError::not_found(format!("no job class handles {} ({label})", job.dir.job_id())).into())
            }
        }
    }

    pub fn command(&self, id: &str) -> Result<ClassRef> {
        lookup_command(&self.registry, id)
    }
}

/// Class behind a command id such as `rln.class3d`.
pub fn lookup_command(registry: &Registry, id: &str) -> Result<ClassRef> {
    registry
        .command(id)
        .ok_or_else(|| ExitError::not_found(format!("unknown command '{id}' (see `rln classes`)")).into())
}
