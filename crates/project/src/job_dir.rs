// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed handle for one job directory.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use rln_core::job_star::{Options, JOB_STAR};
use rln_core::pipeline::JOB_PIPELINE;
use rln_core::state::sentinel;
use rln_core::{JobId, JobStar, JobState, Pipeline, PipelineError};

use crate::alias::{alias_label, alias_name, validate_alias, AliasError};
use crate::project::Project;
use crate::ProjectError;

/// Free-text note kept next to the job options.
pub const NOTE_FILE: &str = "note.txt";

/// Files that survive [`JobDirectory::clear`].
const KEEP_ON_CLEAR: [&str; 3] = [JOB_STAR, JOB_PIPELINE, NOTE_FILE];

/// A job directory inside a project.
///
/// A value object: two handles on the same directory compare equal and
/// nothing is cached, so every query reflects the filesystem at call time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobDirectory {
    path: PathBuf,
    id: JobId,
    project: Project,
}

impl JobDirectory {
    /// Open the job directory at `path`. Symlinked aliases resolve to their
    /// target.
    pub fn from_path(path: &Path) -> Result<Self, ProjectError> {
        let path = match path.canonicalize() {
            Ok(p) if p.is_dir() => p,
            _ => return Err(ProjectError::DirectoryMissing(path.to_path_buf())),
        };
        let id = JobId::from_dir(&path).ok_or_else(|| ProjectError::NotAJob(path.clone()))?;
        let root = path
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| ProjectError::NotAJob(path.clone()))?;
        let project = Project::from_canonical(root.to_path_buf());
        Ok(Self { path, id, project })
    }

    /// Open the job owning the `job.star` at `path`.
    pub fn from_job_star(path: &Path) -> Result<Self, ProjectError> {
        if path.file_name().and_then(|n| n.to_str()) != Some(JOB_STAR) || !path.is_file() {
            return Err(ProjectError::NotAJob(path.to_path_buf()));
        }
        let dir = path.parent().ok_or_else(|| ProjectError::NotAJob(path.to_path_buf()))?;
        Self::from_path(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn job_id(&self) -> &JobId {
        &self.id
    }

    /// Zero-padded job number, `"007"` for `job007`.
    pub fn job_number(&self) -> &str {
        self.id.job_number().unwrap_or_default()
    }

    /// Numeric value of [`JobDirectory::job_number`].
    pub fn number(&self) -> u32 {
        self.id.number().unwrap_or_default()
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_root(&self) -> &Path {
        self.project.root()
    }

    /// The group directory holding this job and its alias symlinks.
    pub fn group_dir(&self) -> PathBuf {
        self.project.root().join(self.id.group())
    }

    pub fn job_star_path(&self) -> PathBuf {
        self.path.join(JOB_STAR)
    }

    pub fn job_pipeline_path(&self) -> PathBuf {
        self.path.join(JOB_PIPELINE)
    }

    pub fn job_star(&self) -> Result<JobStar, ProjectError> {
        Ok(JobStar::read(&self.job_star_path())?)
    }

    pub fn job_pipeline(&self) -> Result<Pipeline, ProjectError> {
        Ok(Pipeline::read(&self.job_pipeline_path())?)
    }

    /// Options of `job.star` in file order, values as written.
    pub fn job_params(&self) -> Result<Options, ProjectError> {
        Ok(self.job_star()?.options)
    }

    pub fn is_tomo(&self) -> bool {
        self.job_star().map(|j| j.is_tomo).unwrap_or(false)
    }

    /// Current state, consulting `default_pipeline.star` only when no
    /// sentinel decides it.
    pub fn state(&self) -> JobState {
        if let Some(state) = JobState::from_sentinel(&self.path) {
            return state;
        }
        let status = match self.project.read_pipeline() {
            Ok(pipeline) => pipeline.status_of(self.id.as_str()),
            Err(e) => {
                tracing::debug!(job = %self.id, error = %e, "pipeline unreadable for state");
                None
            }
        };
        JobState::detect(&self.path, status)
    }

    /// State against an already loaded project pipeline.
    pub fn state_in(&self, pipeline: &Pipeline) -> JobState {
        JobState::detect(&self.path, pipeline.status_of(self.id.as_str()))
    }

    /// Per-job pipeline, or an empty one when the job has none yet.
    fn job_pipeline_or_empty(&self) -> Result<Pipeline, ProjectError> {
        match Pipeline::read(&self.job_pipeline_path()) {
            Ok(p) => Ok(p),
            Err(e) if e.is_not_found() => Ok(Pipeline::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Jobs owning the nodes this job consumes, deduplicated in edge order.
    pub fn parent_jobs(&self) -> Result<Vec<JobDirectory>, ProjectError> {
        let pipeline = self.job_pipeline_or_empty()?;
        let owners: IndexSet<JobId> = pipeline
            .input_edges
            .iter()
            .filter_map(|e| Pipeline::node_owner(&e.from_node))
            .filter(|owner| owner != &self.id)
            .collect();
        Ok(owners
            .into_iter()
            .filter_map(|id| match self.project.job(&id) {
                Ok(job) => Some(job),
                Err(e) => {
                    tracing::debug!(job = %self.id, parent = %id, error = %e, "parent not on disk");
                    None
                }
            })
            .collect())
    }

    /// Absolute paths of the nodes this job consumes.
    pub fn input_paths(&self) -> Result<Vec<PathBuf>, ProjectError> {
        let pipeline = self.job_pipeline_or_empty()?;
        Ok(pipeline.input_edges.iter().map(|e| self.resolve_path(Path::new(&e.from_node))).collect())
    }

    /// Absolute paths of the nodes this job produces.
    pub fn output_paths(&self) -> Result<Vec<PathBuf>, ProjectError> {
        let pipeline = self.job_pipeline_or_empty()?;
        Ok(pipeline.output_edges.iter().map(|e| self.resolve_path(Path::new(&e.to_node))).collect())
    }

    /// True if every input node exists on disk.
    pub fn all_inputs_ready(&self) -> bool {
        match self.input_paths() {
            Ok(paths) => paths.iter().all(|p| p.exists()),
            Err(e) => {
                tracing::warn!(job = %self.id, error = %e, "cannot determine inputs");
                false
            }
        }
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.project.resolve_path(path)
    }

    pub fn make_relative_path(&self, path: &Path) -> PathBuf {
        self.project.make_relative_path(path)
    }

    /// Remove every file except `job.star`, `job_pipeline.star` and
    /// `note.txt`, and every subdirectory.
    pub fn clear(&self) -> Result<(), ProjectError> {
        let entries = std::fs::read_dir(&self.path).map_err(ProjectError::io(&self.path))?;
        for entry in entries {
            let entry = entry.map_err(ProjectError::io(&self.path))?;
            let path = entry.path();
            // symlinks are removed, never followed
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                std::fs::remove_dir_all(&path).map_err(ProjectError::io(&path))?;
                continue;
            }
            if entry.file_name().to_str().is_some_and(|n| KEEP_ON_CLEAR.contains(&n)) {
                continue;
            }
            std::fs::remove_file(&path).map_err(ProjectError::io(&path))?;
        }
        tracing::info!(job = %self.id, "cleared job outputs");
        Ok(())
    }

    /// Remove every sentinel file, ignoring absent ones.
    pub fn remove_sentinels(&self) -> Result<(), ProjectError> {
        for name in sentinel::ALL {
            let path = self.path.join(name);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ProjectError::Io { path, source: e }),
            }
        }
        Ok(())
    }

    /// True iff no `RELION_JOB_*` sentinel is present.
    pub fn can_abort(&self) -> bool {
        let Ok(entries) = std::fs::read_dir(&self.path) else {
            return false;
        };
        !entries
            .flatten()
            .any(|e| e.file_name().to_str().is_some_and(sentinel::is_sentinel))
    }

    /// Drop `RELION_JOB_ABORT_NOW` for the runner to notice.
    pub fn request_abort(&self) -> Result<(), ProjectError> {
        let path = self.path.join(sentinel::ABORT_NOW);
        std::fs::File::create(&path).map_err(ProjectError::io(&path))?;
        tracing::info!(job = %self.id, "abort requested");
        Ok(())
    }

    /// Apply `f` to `job_pipeline.star` and persist it with temp + rename.
    pub fn edit_job_pipeline<T>(&self, f: impl FnOnce(&mut Pipeline) -> T) -> Result<T, ProjectError> {
        let path = self.job_pipeline_path();
        let mut pipeline = self.job_pipeline()?;
        let out = f(&mut pipeline);
        let tmp = path.with_extension("star.tmp");
        std::fs::write(&tmp, pipeline.serialize())
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(ProjectError::io(&path))?;
        Ok(out)
    }

    /// Bare alias name from the project pipeline.
    pub fn alias(&self) -> Option<String> {
        let pipeline = self.project.read_pipeline().ok()?;
        let label = pipeline.process(self.id.as_str())?.alias.as_deref()?;
        Some(alias_name(label).to_string())
    }

    /// Set or remove the alias. An existing alias symlink is renamed rather
    /// than duplicated, and the pipeline row is updated under the lock.
    pub fn set_alias(&self, alias: Option<&str>) -> Result<(), ProjectError> {
        if let Some(alias) = alias {
            validate_alias(alias)?;
        }
        let group_dir = self.group_dir();
        self.project.edit_pipeline(|pipeline| {
            let row = pipeline
                .process(self.id.as_str())
                .ok_or_else(|| PipelineError::UnknownProcess(self.id.clone()))?;
            let previous = row.alias.as_deref().map(|l| alias_name(l).to_string());
            if previous.as_deref() == alias {
                return Ok(());
            }
            if let Some(alias) = alias {
                if group_dir.join(alias).symlink_metadata().is_ok() {
                    return Err(AliasError::Exists(alias.to_string()).into());
                }
            }

            let old_link = previous
                .map(|name| group_dir.join(name))
                .filter(|link| link.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()));
            match (old_link, alias) {
                (Some(old), Some(new)) => {
                    let new = group_dir.join(new);
                    std::fs::rename(&old, &new).map_err(ProjectError::io(&new))?;
                }
                (Some(old), None) => {
                    std::fs::remove_file(&old).map_err(ProjectError::io(&old))?;
                }
                (None, Some(new)) => {
                    let link = group_dir.join(new);
                    symlink_dir(Path::new(self.id.dir_name()), &link)
                        .map_err(ProjectError::io(&link))?;
                }
                (None, None) => {}
            }

            let label = alias.map(|a| alias_label(self.id.group(), a));
            pipeline.update_process_alias(self.id.as_str(), label.as_deref());
            tracing::info!(job = %self.id, alias = ?alias, "alias updated");
            Ok(())
        })
    }

    /// Contents of `note.txt`, if any.
    pub fn note(&self) -> Option<String> {
        std::fs::read_to_string(self.path.join(NOTE_FILE)).ok()
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(test)]
#[path = "job_dir_tests.rs"]
mod tests;
