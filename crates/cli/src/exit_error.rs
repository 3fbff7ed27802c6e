// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` (or a library error that [`exit_code`] knows)
//! instead of calling `std::process::exit()`, so `main()` owns termination.

use std::fmt;

use rln_engine::SchedulerError;
use rln_project::ProjectError;

/// Anything not classified below.
pub const GENERAL: i32 = 1;
/// Unknown job, class or command.
pub const NOT_FOUND: i32 = 3;
/// The job exists but refuses the operation (not abortable, not continuable).
pub const REFUSED: i32 = 4;
/// `relion_pipeliner` failed or could not be started.
pub const PIPELINER: i32 = 5;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(NOT_FOUND, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Exit code for an error returned from a command handler.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<ExitError>() {
        return e.code;
    }
    if let Some(e) = err.downcast_ref::<SchedulerError>() {
        return match e {
            SchedulerError::NotAbortable(_) | SchedulerError::NotContinuable(_) => REFUSED,
            SchedulerError::UnknownClass(_) => NOT_FOUND,
            SchedulerError::Failure { .. } | SchedulerError::Pipeliner(_) | SchedulerError::NoNewJob => PIPELINER,
            SchedulerError::Project(e) => project_code(e),
            SchedulerError::Param(_) | SchedulerError::Io { .. } => GENERAL,
        };
    }
    if let Some(e) = err.downcast_ref::<ProjectError>() {
        return project_code(e);
    }
    GENERAL
}

fn project_code(err: &ProjectError) -> i32 {
    match err {
        ProjectError::DirectoryMissing(_) | ProjectError::NotAJob(_) | ProjectError::NotAProject(_) => NOT_FOUND,
        _ => GENERAL,
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
