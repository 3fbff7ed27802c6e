// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk project fixtures for tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

// Fixture setup failures abort the test
#![allow(clippy::panic)]

use std::path::{Path, PathBuf};

use rln_core::{JobId, JobStar, Pipeline};
use tempfile::TempDir;

use crate::{JobDirectory, Project};

/// A temporary project materialized from a pipeline.
///
/// Every process gets a directory holding a `job.star` with its type label
/// and a `job_pipeline.star` restricted to its own rows.
pub struct ProjectFixture {
    _dir: TempDir,
    project: Project,
}

impl ProjectFixture {
    pub fn new(pipeline: &Pipeline) -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let root = dir.path().to_path_buf();
        write(&root.join(rln_core::DEFAULT_PIPELINE), &pipeline.serialize());
        let project = Project::open(&root).unwrap_or_else(|e| panic!("open project: {e}"));
        let fixture = Self { _dir: dir, project };
        for process in &pipeline.processes {
            let job_dir = fixture.project.job_path(&process.name);
            std::fs::create_dir_all(&job_dir).unwrap_or_else(|e| panic!("mkdir: {e}"));
            let job_star = JobStar::new(process.type_label.clone(), false);
            write(&job_dir.join(rln_core::JOB_STAR), &job_star.serialize());
            let rows = pipeline.restrict_to(&process.name);
            write(&job_dir.join(rln_core::JOB_PIPELINE), &rows.serialize());
        }
        fixture
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn root(&self) -> &Path {
        self.project.root()
    }

    pub fn job(&self, id: &str) -> JobDirectory {
        self.project.job(&JobId::new(id)).unwrap_or_else(|e| panic!("job {id}: {e}"))
    }

    /// Create an empty file at the project-relative `path`.
    pub fn touch(&self, path: &str) -> PathBuf {
        let path = self.root().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
        }
        write(&path, "");
        path
    }

    pub fn write_job_star(&self, id: &str, job_star: &JobStar) {
        let path = self.project.job_path(&JobId::new(id)).join(rln_core::JOB_STAR);
        write(&path, &job_star.serialize());
    }

    pub fn pipeline(&self) -> Pipeline {
        self.project.read_pipeline().unwrap_or_else(|e| panic!("read pipeline: {e}"))
    }
}

fn write(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}
