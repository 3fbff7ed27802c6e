// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Creating, running and editing jobs through the pipeliner.

use std::path::PathBuf;

use rln_core::params::{Kwargs, ParamError};
use rln_core::{JobId, PipelineError, ProcessStatus, JOB_STAR};
use rln_jobs::{ClassRef, Environment, TypedJob};
use rln_project::{JobDirectory, Project, ProjectError};
use serde::Serialize;
use thiserror::Error;

use crate::pipeliner::{Pipeliner, PipelinerError, RunHandle};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("relion_pipeliner failed (exit {code:?}): {}", stderr.trim())]
    Failure { code: Option<i32>, stdout: String, stderr: String, job_star: Option<String> },
    #[error("{0} cannot be continued")]
    NotContinuable(String),
    #[error("{0} cannot be aborted")]
    NotAbortable(JobId),
    #[error("no job class matches {0}")]
    UnknownClass(JobId),
    #[error("relion_pipeliner did not add a job")]
    NoNewJob,
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Pipeliner(#[from] PipelinerError),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

/// How [`Scheduler::edit_and_run`] reuses an existing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Discard previous outputs and run from scratch.
    Overwrite,
    /// Resume from the previous run.
    Continue,
}

/// A job the scheduler created or edited. `process` is `None` when the job
/// was left scheduled because its inputs are not ready.
#[derive(Debug, Clone, Serialize)]
pub struct Launch {
    #[serde(serialize_with = "ser_job")]
    pub job: JobDirectory,
    pub process: Option<RunHandle>,
}

fn ser_job<S: serde::Serializer>(job: &JobDirectory, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(job.job_id().as_str())
}

pub struct Scheduler<P: Pipeliner> {
    project: Project,
    env: Environment,
    pipeliner: P,
}

impl<P: Pipeliner> Scheduler<P> {
    pub fn new(project: Project, env: Environment, pipeliner: P) -> Self {
        Self { project, env, pipeliner }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn pipeliner(&self) -> &P {
        &self.pipeliner
    }

    /// Stage a `job.star` for `class`, let the pipeliner add it, and run it
    /// when its inputs exist.
    pub async fn create_and_run(&self, class: ClassRef, kwargs: &Kwargs) -> Result<Launch, SchedulerError> {
        let job_star = class.prep_job_star(kwargs, &self.env)?;
        let staging = tempfile::Builder::new()
            .prefix("rln-")
            .tempdir()
            .map_err(|source| SchedulerError::Io { path: std::env::temp_dir(), source })?;
        let staged = staging.path().join(JOB_STAR);
        job_star.write(&staged).map_err(|source| SchedulerError::Io { path: staged.clone(), source })?;

        let before = self.project.read_pipeline()?;
        let output = self.pipeliner.add_job_from_star(self.project.root(), &staged).await?;
        if !output.success {
            return Err(SchedulerError::Failure {
                code: output.code,
                stdout: output.stdout,
                stderr: output.stderr,
                job_star: Some(job_star.serialize()),
            });
        }

        let after = self.project.read_pipeline()?;
        let id = match after.latest_process() {
            Some(p) if !before.contains(p.name.as_str()) => p.name.clone(),
            _ => return Err(SchedulerError::NoNewJob),
        };
        let job = self.project.job(&id)?;
        tracing::info!(job = %id, command = %class.command_id(), "job created");
        self.run_if_ready(job).await
    }

    /// Start `job` with `--RunJobs`.
    pub async fn run_jobs(&self, job: &JobDirectory) -> Result<RunHandle, SchedulerError> {
        Ok(self.pipeliner.run_jobs(self.project.root(), job.job_id()).await?)
    }

    /// Rewrite `job.star` of an existing job and run it again.
    pub async fn edit_and_run(
        &self,
        job: &JobDirectory,
        class: ClassRef,
        kwargs: &Kwargs,
        mode: EditMode,
    ) -> Result<Launch, SchedulerError> {
        let class = match mode {
            EditMode::Continue if !class.class.continuable => {
                return Err(SchedulerError::NotContinuable(class.command_id()))
            }
            EditMode::Continue => ClassRef::continued(class.class),
            EditMode::Overwrite => ClassRef::new(class.class),
        };
        let job_star = class.prep_job_star(kwargs, &self.env)?;
        let path = job.job_star_path();
        job_star.write(&path).map_err(|source| SchedulerError::Io { path: path.clone(), source })?;
        if mode == EditMode::Overwrite {
            self.clear(job)?;
        }
        tracing::info!(job = %job.job_id(), ?mode, "job.star rewritten");
        self.run_if_ready(job.clone()).await
    }

    /// Create a fresh job with the parameters of `job`.
    pub async fn clone_job(&self, job: &TypedJob) -> Result<Launch, SchedulerError> {
        let class = job.class.ok_or_else(|| SchedulerError::UnknownClass(job.dir.job_id().clone()))?;
        let kwargs = class.normalize_kwargs_inv(&job.dir.job_params()?)?;
        self.create_and_run(ClassRef::new(class.class), &kwargs).await
    }

    /// Ask the runner to stop `job`.
    pub fn abort(&self, job: &JobDirectory) -> Result<(), SchedulerError> {
        if !job.can_abort() {
            return Err(SchedulerError::NotAbortable(job.job_id().clone()));
        }
        Ok(job.request_abort()?)
    }

    /// Remove outputs and sentinels of `job`.
    pub fn clear(&self, job: &JobDirectory) -> Result<(), SchedulerError> {
        job.clear()?;
        job.remove_sentinels()?;
        Ok(())
    }

    /// `--gentle_clean` or `--harsh_clean` for `job`.
    pub async fn clean(&self, job: &JobDirectory, harsh: bool) -> Result<(), SchedulerError> {
        let output = self.pipeliner.clean(self.project.root(), job.job_id(), harsh).await?;
        if !output.success {
            return Err(SchedulerError::Failure {
                code: output.code,
                stdout: output.stdout,
                stderr: output.stderr,
                job_star: None,
            });
        }
        Ok(())
    }

    async fn run_if_ready(&self, job: JobDirectory) -> Result<Launch, SchedulerError> {
        if job.all_inputs_ready() {
            let process = self.run_jobs(&job).await?;
            return Ok(Launch { job, process: Some(process) });
        }
        tracing::info!(job = %job.job_id(), "inputs not ready, leaving job scheduled");
        let id = job.job_id().clone();
        self.project.edit_pipeline(|pipeline| {
            if pipeline.update_process_status(id.as_str(), ProcessStatus::Scheduled) {
                Ok(())
            } else {
                Err(PipelineError::UnknownProcess(id.clone()).into())
            }
        })?;
        Ok(Launch { job, process: None })
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
