// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job states: pipeline status labels and sentinel-derived state.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sentinel file names dropped into a job directory.
pub mod sentinel {
    pub const PREFIX: &str = "RELION_JOB_";
    pub const EXIT_SUCCESS: &str = "RELION_JOB_EXIT_SUCCESS";
    pub const EXIT_FAILURE: &str = "RELION_JOB_EXIT_FAILURE";
    pub const EXIT_ABORTED: &str = "RELION_JOB_EXIT_ABORTED";
    pub const ABORT_NOW: &str = "RELION_JOB_ABORT_NOW";

    /// All sentinels, highest precedence first.
    pub const ALL: [&str; 4] = [EXIT_SUCCESS, EXIT_FAILURE, EXIT_ABORTED, ABORT_NOW];

    /// Returns true if `name` is a sentinel-like file name.
    pub fn is_sentinel(name: &str) -> bool {
        name.starts_with(PREFIX)
    }
}

/// Status label of a process row in `default_pipeline.star`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessStatus {
    Scheduled,
    Running,
    Succeeded,
    Failed,
    Aborted,
}

crate::simple_display! {
    ProcessStatus {
        Scheduled => "Scheduled",
        Running => "Running",
        Succeeded => "Succeeded",
        Failed => "Failed",
        Aborted => "Aborted",
    }
}

impl std::str::FromStr for ProcessStatus {
    type Err = String;

    /// Case-insensitive parse of a status label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scheduled" => Ok(ProcessStatus::Scheduled),
            "running" => Ok(ProcessStatus::Running),
            "succeeded" => Ok(ProcessStatus::Succeeded),
            "failed" => Ok(ProcessStatus::Failed),
            "aborted" => Ok(ProcessStatus::Aborted),
            _ => Err(format!("unknown process status '{s}'")),
        }
    }
}

/// Observed state of a job directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Scheduled,
    Running,
    Succeeded,
    Failed,
    Aborted,
    /// `RELION_JOB_ABORT_NOW` written, runner has not reacted yet.
    AbortRequested,
}

crate::simple_display! {
    JobState {
        Scheduled => "scheduled",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Aborted => "aborted",
        AbortRequested => "abort requested",
    }
}

impl JobState {
    /// Derive the state of the job directory at `dir`.
    ///
    /// Sentinels win in the order success, failure, aborted, abort-requested.
    /// Without any sentinel the pipeline row decides between scheduled and
    /// running; an unknown row counts as running.
    pub fn detect(dir: &Path, pipeline_status: Option<ProcessStatus>) -> Self {
        Self::from_sentinel(dir).unwrap_or(match pipeline_status {
            Some(ProcessStatus::Scheduled) => JobState::Scheduled,
            _ => JobState::Running,
        })
    }

    /// State implied by sentinel files alone.
    pub fn from_sentinel(dir: &Path) -> Option<Self> {
        sentinel::ALL.iter().find(|name| dir.join(name).exists()).map(|name| match *name {
            sentinel::EXIT_SUCCESS => JobState::Succeeded,
            sentinel::EXIT_FAILURE => JobState::Failed,
            sentinel::EXIT_ABORTED => JobState::Aborted,
            _ => JobState::AbortRequested,
        })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::Aborted)
    }

    /// Pipeline status label matching this state, if any.
    pub fn as_process_status(&self) -> Option<ProcessStatus> {
        match self {
            JobState::Scheduled => Some(ProcessStatus::Scheduled),
            JobState::Running => Some(ProcessStatus::Running),
            JobState::Succeeded => Some(ProcessStatus::Succeeded),
            JobState::Failed => Some(ProcessStatus::Failed),
            JobState::Aborted => Some(ProcessStatus::Aborted),
            JobState::AbortRequested => None,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
