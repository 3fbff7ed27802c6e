// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external `relion_pipeliner` program.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use rln_core::JobId;
use serde::Serialize;
use thiserror::Error;

/// Upper bound for the short pipeliner calls (`--addJobFromStar`, cleans).
pub const PIPELINER_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum PipelinerError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn { program: PathBuf, source: std::io::Error },
    #[error("{command} timed out after {}s", after.as_secs())]
    Timeout { command: String, after: Duration },
    #[error("{command}: {source}")]
    Io { command: String, source: std::io::Error },
}

/// Captured result of a finished pipeliner call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self { success: true, code: Some(0), ..Self::default() }
    }
}

/// A detached `--RunJobs` child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunHandle {
    pub job: JobId,
    pub pid: Option<u32>,
}

#[async_trait]
pub trait Pipeliner: Clone + Send + Sync + 'static {
    /// `--addJobFromStar`: materialize the next job from a `job.star`.
    async fn add_job_from_star(&self, project: &Path, job_star: &Path) -> Result<CommandOutput, PipelinerError>;

    /// `--RunJobs`: start `job` without waiting for it.
    async fn run_jobs(&self, project: &Path, job: &JobId) -> Result<RunHandle, PipelinerError>;

    /// `--gentle_clean` or `--harsh_clean`.
    async fn clean(&self, project: &Path, job: &JobId, harsh: bool) -> Result<CommandOutput, PipelinerError>;
}

/// Runs the real `relion_pipeliner` inside the project directory.
#[derive(Debug, Clone)]
pub struct RelionPipeliner {
    program: PathBuf,
    timeout: Duration,
}

impl RelionPipeliner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), timeout: PIPELINER_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, project: &Path) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        // RELION helper scripts pick a Qt binding from QT_API
        cmd.current_dir(project).env("QT_API", "");
        cmd
    }

    async fn run(&self, mut cmd: tokio::process::Command, label: &str) -> Result<CommandOutput, PipelinerError> {
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
        let child = cmd
            .spawn()
            .map_err(|source| PipelinerError::Spawn { program: self.program.clone(), source })?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => return Err(PipelinerError::Io { command: label.to_string(), source }),
            Err(_) => {
                return Err(PipelinerError::Timeout { command: label.to_string(), after: self.timeout })
            }
        };
        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if result.success {
            tracing::debug!(command = label, "pipeliner call succeeded");
        } else {
            tracing::warn!(command = label, code = ?result.code, stderr = %result.stderr.trim(), "pipeliner call failed");
        }
        Ok(result)
    }
}

#[async_trait]
impl Pipeliner for RelionPipeliner {
    async fn add_job_from_star(&self, project: &Path, job_star: &Path) -> Result<CommandOutput, PipelinerError> {
        let mut cmd = self.command(project);
        cmd.arg("--addJobFromStar").arg(job_star);
        self.run(cmd, "--addJobFromStar").await
    }

    async fn run_jobs(&self, project: &Path, job: &JobId) -> Result<RunHandle, PipelinerError> {
        let mut cmd = self.command(project);
        cmd.arg("--RunJobs")
            .arg(job.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // Own process group so the run outlives the invoking terminal
        #[cfg(unix)]
        cmd.process_group(0);
        let mut child = cmd
            .spawn()
            .map_err(|source| PipelinerError::Spawn { program: self.program.clone(), source })?;
        let pid = child.id();
        tracing::info!(job = %job, ?pid, "started relion_pipeliner --RunJobs");
        let reaped = job.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!(job = %reaped, %status, "--RunJobs exited"),
                Err(e) => tracing::warn!(job = %reaped, error = %e, "--RunJobs wait failed"),
            }
        });
        Ok(RunHandle { job: job.clone(), pid })
    }

    async fn clean(&self, project: &Path, job: &JobId, harsh: bool) -> Result<CommandOutput, PipelinerError> {
        let flag = if harsh { "--harsh_clean" } else { "--gentle_clean" };
        let number = job.number().unwrap_or_default();
        let mut cmd = self.command(project);
        cmd.arg(flag).arg(number.to_string());
        self.run(cmd, flag).await
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    // Simulated pipeliner failures abort the test
    #![allow(clippy::panic)]

    use std::path::Path;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rln_core::{JobId, JobStar, Pipeline, ProcessRow, ProcessStatus, JOB_PIPELINE, JOB_STAR};
    use rln_project::Project;

    use super::{CommandOutput, Pipeliner, PipelinerError, RunHandle};

    /// Job groups RELION uses for each type label family.
    const GROUPS: &[(&str, &str)] = &[
        ("relion.import", "Import"),
        ("relion.motioncorr", "MotionCorr"),
        ("relion.ctffind", "CtfFind"),
        ("relion.autopick", "AutoPick"),
        ("relion.extract", "Extract"),
        ("relion.class2d", "Class2D"),
        ("relion.initialmodel", "InitialModel"),
        ("relion.class3d", "Class3D"),
        ("relion.refine3d", "Refine3D"),
        ("relion.maskcreate", "MaskCreate"),
        ("relion.postprocess", "PostProcess"),
        ("relion.importtomo", "ImportTomo"),
        ("relion.aligntiltseries", "AlignTiltSeries"),
        ("relion.reconstructtomograms", "Tomograms"),
        ("relion.pseudosubtomo", "PseudoSubtomo"),
    ];

    const INPUT_NODE_TYPE: &str = "ParticleGroupMetadata.star.relion";

    fn group_for(type_label: &str) -> String {
        let family: Vec<&str> = type_label.splitn(3, '.').take(2).collect();
        let family = family.join(".");
        GROUPS
            .iter()
            .find(|(label, _)| *label == family)
            .map(|(_, group)| group.to_string())
            .unwrap_or_else(|| "External".to_string())
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PipelinerCall {
        AddJobFromStar(JobStar),
        RunJobs(JobId),
        Clean { job: JobId, harsh: bool },
    }

    #[derive(Default)]
    struct FakePipelinerState {
        calls: Vec<PipelinerCall>,
        next_number: u32,
        fail_add: Option<String>,
    }

    /// In-process stand-in for `relion_pipeliner`.
    ///
    /// `--addJobFromStar` creates the next job directory, writes its
    /// `job.star` and `job_pipeline.star`, and appends a `Scheduled` row.
    #[derive(Clone, Default)]
    pub struct FakePipeliner {
        inner: Arc<Mutex<FakePipelinerState>>,
    }

    impl FakePipeliner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Lowest number handed out to the next job.
        pub fn starting_at(self, number: u32) -> Self {
            self.inner.lock().next_number = number;
            self
        }

        /// Make the next `--addJobFromStar` exit non-zero with `stderr`.
        pub fn fail_next_add(&self, stderr: &str) {
            self.inner.lock().fail_add = Some(stderr.to_string());
        }

        pub fn calls(&self) -> Vec<PipelinerCall> {
            self.inner.lock().calls.clone()
        }

        pub fn run_calls(&self) -> Vec<JobId> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    PipelinerCall::RunJobs(id) => Some(id),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl Pipeliner for FakePipeliner {
        async fn add_job_from_star(&self, project: &Path, job_star: &Path) -> Result<CommandOutput, PipelinerError> {
            let parsed = JobStar::read(job_star).unwrap_or_else(|e| panic!("fake pipeliner: {e}"));
            let mut state = self.inner.lock();
            state.calls.push(PipelinerCall::AddJobFromStar(parsed.clone()));
            if let Some(stderr) = state.fail_add.take() {
                return Ok(CommandOutput { success: false, code: Some(1), stdout: String::new(), stderr });
            }

            let project = Project::open(project).unwrap_or_else(|e| panic!("fake pipeliner: {e}"));
            let mut lock = project.lock_pipeline().unwrap_or_else(|e| panic!("fake pipeliner: {e}"));
            let mut pipeline = lock.read().unwrap_or_else(|e| panic!("fake pipeliner: {e}"));
            let highest = pipeline.processes.iter().filter_map(|p| p.name.number()).max().unwrap_or(0);
            let number = state.next_number.max(highest + 1);
            state.next_number = number + 1;

            let id = JobId::from_parts(&group_for(&parsed.type_label), &format!("job{number:03}"));
            let row = ProcessRow {
                name: id.clone(),
                alias: None,
                type_label: parsed.type_label.clone(),
                status: ProcessStatus::Scheduled,
            };
            let dir = project.job_path(&id);
            std::fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("fake pipeliner: {e}"));
            parsed.write(&dir.join(JOB_STAR)).unwrap_or_else(|e| panic!("fake pipeliner: {e}"));
            let mut job_pipeline = Pipeline::default();
            job_pipeline.add_process(row.clone());
            pipeline.add_process(row);
            // Options naming another job's file become input edges
            for value in parsed.options.values().filter(|v| Pipeline::node_owner(v).is_some()) {
                job_pipeline.append_input(value, id.as_str(), INPUT_NODE_TYPE);
                pipeline.append_input(value, id.as_str(), INPUT_NODE_TYPE);
            }
            std::fs::write(dir.join(JOB_PIPELINE), job_pipeline.serialize())
                .unwrap_or_else(|e| panic!("fake pipeliner: {e}"));

            lock.write(&pipeline).unwrap_or_else(|e| panic!("fake pipeliner: {e}"));
            Ok(CommandOutput::ok())
        }

        async fn run_jobs(&self, _project: &Path, job: &JobId) -> Result<RunHandle, PipelinerError> {
            self.inner.lock().calls.push(PipelinerCall::RunJobs(job.clone()));
            Ok(RunHandle { job: job.clone(), pid: None })
        }

        async fn clean(&self, _project: &Path, job: &JobId, harsh: bool) -> Result<CommandOutput, PipelinerError> {
            self.inner.lock().calls.push(PipelinerCall::Clean { job: job.clone(), harsh });
            Ok(CommandOutput::ok())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePipeliner, PipelinerCall};

#[cfg(test)]
#[path = "pipeliner_tests.rs"]
mod tests;
