// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project-relative job identifiers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory-name prefix shared by every job directory (`job001`, `job042`).
pub const JOB_DIR_PREFIX: &str = "job";

/// Returns true if `name` looks like `jobNNN`.
pub fn is_job_dir_name(name: &str) -> bool {
    name.strip_prefix(JOB_DIR_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Canonical process name of a job: `"<Group>/jobNNN/"`.
///
/// Construction always canonicalizes: backslashes become slashes, empty
/// components are dropped, only the last two components are kept, and a
/// single trailing slash is appended. `Class3D/job007`, `/abs/P/Class3D/job007/`
/// and `Class3D//job007/` all name the same job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    pub fn new(name: &str) -> Self {
        let normalized = name.replace('\\', "/");
        let parts: Vec<&str> = normalized.split('/').filter(|p| !p.is_empty()).collect();
        let tail = &parts[parts.len().saturating_sub(2)..];
        let mut id = tail.join("/");
        id.push('/');
        Self(id)
    }

    pub fn from_parts(group: &str, job_dir: &str) -> Self {
        Self(format!("{group}/{job_dir}/"))
    }

    /// Identifier of the job directory at `path`, if its name is `jobNNN`.
    pub fn from_dir(path: &Path) -> Option<Self> {
        let job_dir = path.file_name()?.to_str()?;
        if !is_job_dir_name(job_dir) {
            return None;
        }
        let group = path.parent()?.file_name()?.to_str()?;
        Some(Self::from_parts(group, job_dir))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The job-type group, e.g. `Class3D`.
    pub fn group(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    /// The directory name inside the group, e.g. `job007`.
    pub fn dir_name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or_default()
    }

    /// The zero-padded number after the `job` prefix, e.g. `"007"`.
    pub fn job_number(&self) -> Option<&str> {
        let name = self.dir_name();
        is_job_dir_name(name).then(|| &name[JOB_DIR_PREFIX.len()..])
    }

    /// Numeric value of [`JobId::job_number`], used for ordering.
    pub fn number(&self) -> Option<u32> {
        self.job_number().and_then(|n| n.parse().ok())
    }

    /// `Group/jobNNN` as a relative path (no trailing slash).
    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.group()).join(self.dir_name())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JobId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for JobId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
