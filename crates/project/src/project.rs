// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project root discovery and pipeline access.

use std::path::{Path, PathBuf};

use rln_core::{JobId, Pipeline, DEFAULT_PIPELINE};

use crate::job_dir::JobDirectory;
use crate::lock::PipelineLock;
use crate::ProjectError;

/// Directory trashed jobs are moved into.
pub const TRASH_DIR: &str = "Trash";

/// A RELION project directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Open the project rooted at `root`. The directory must exist.
    pub fn open(root: &Path) -> Result<Self, ProjectError> {
        let root = root
            .canonicalize()
            .map_err(|_| ProjectError::DirectoryMissing(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(ProjectError::DirectoryMissing(root));
        }
        Ok(Self { root })
    }

    pub(crate) fn from_canonical(root: PathBuf) -> Self {
        Self { root }
    }

    /// Walk up from `start` to the first directory holding `default_pipeline.star`.
    pub fn discover(start: &Path) -> Result<Self, ProjectError> {
        let start = start
            .canonicalize()
            .map_err(|_| ProjectError::DirectoryMissing(start.to_path_buf()))?;
        start
            .ancestors()
            .find(|dir| dir.join(DEFAULT_PIPELINE).is_file())
            .map(|root| Self { root: root.to_path_buf() })
            .ok_or(ProjectError::NotAProject(start))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pipeline_path(&self) -> PathBuf {
        self.root.join(DEFAULT_PIPELINE)
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join(TRASH_DIR)
    }

    /// Read `default_pipeline.star` without locking.
    pub fn read_pipeline(&self) -> Result<Pipeline, ProjectError> {
        Ok(Pipeline::read(&self.pipeline_path())?)
    }

    pub fn lock_pipeline(&self) -> Result<PipelineLock, ProjectError> {
        let path = self.pipeline_path();
        PipelineLock::acquire(&path).map_err(ProjectError::io(path))
    }

    /// Locked read-modify-write of `default_pipeline.star`. The file is
    /// rewritten only when `f` returns `Ok`.
    pub fn edit_pipeline<T>(
        &self,
        f: impl FnOnce(&mut Pipeline) -> Result<T, ProjectError>,
    ) -> Result<T, ProjectError> {
        let mut lock = self.lock_pipeline()?;
        let mut pipeline = lock.read()?;
        let out = f(&mut pipeline)?;
        lock.write(&pipeline).map_err(ProjectError::io(self.pipeline_path()))?;
        Ok(out)
    }

    /// Absolute directory of `id`, whether or not it exists.
    pub fn job_path(&self, id: &JobId) -> PathBuf {
        self.root.join(id.relative_path())
    }

    pub fn job(&self, id: &JobId) -> Result<JobDirectory, ProjectError> {
        JobDirectory::from_path(&self.job_path(id))
    }

    /// Job directories for every process row whose directory exists, in
    /// pipeline order.
    pub fn jobs(&self) -> Result<Vec<JobDirectory>, ProjectError> {
        let pipeline = self.read_pipeline()?;
        Ok(pipeline
            .processes
            .iter()
            .filter_map(|p| match self.job(&p.name) {
                Ok(job) => Some(job),
                Err(e) => {
                    tracing::debug!(job = %p.name, error = %e, "skipping process without directory");
                    None
                }
            })
            .collect())
    }

    /// Absolute form of a project-relative path.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// `path` relative to the project root, or unchanged when outside it.
    pub fn make_relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
