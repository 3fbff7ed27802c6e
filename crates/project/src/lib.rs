// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rln-project: filesystem view of a RELION project and its job directories

pub mod alias;
pub mod job_dir;
pub mod lock;
pub mod project;
pub mod trash;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use std::path::PathBuf;

use thiserror::Error;

use rln_core::PipelineError;

pub use alias::{validate_alias, AliasError};
pub use job_dir::JobDirectory;
pub use lock::PipelineLock;
pub use project::Project;
pub use trash::{restore, restore_job, trash, RestoreReport, SkippedEntry, TrashReport};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("directory does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),
    #[error("not a job: {}", .0.display())]
    NotAJob(PathBuf),
    #[error("no RELION project found at or above {}", .0.display())]
    NotAProject(PathBuf),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Alias(#[from] AliasError),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

impl ProjectError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ProjectError::Io { path, source }
    }
}
