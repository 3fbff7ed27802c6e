// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Move jobs (and everything downstream of them) into `Trash/` and back.
//!
//! Both directions hold the pipeline lock for the whole operation. Pipeline
//! edits are all-or-nothing; individual directory moves are best effort and
//! reported.

use std::path::{Path, PathBuf};

use rln_core::state::JobState;
use rln_core::{JobId, Pipeline, PipelineError, ProcessStatus, JOB_PIPELINE};
use serde::Serialize;

use crate::project::Project;
use crate::ProjectError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrashReport {
    /// Jobs removed from the pipeline, target first.
    pub trashed: Vec<JobId>,
    /// Jobs whose directory could not be moved.
    pub failed_moves: Vec<JobId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub job: JobId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub restored: Vec<JobId>,
    pub skipped: Vec<SkippedEntry>,
}

/// Trash `target` and every job that transitively consumes its outputs.
pub fn trash(project: &Project, target: &JobId) -> Result<TrashReport, ProjectError> {
    let mut lock = project.lock_pipeline()?;
    let mut pipeline = lock.read()?;
    if !pipeline.contains(target.as_str()) {
        return Err(PipelineError::UnknownProcess(target.clone()).into());
    }

    let closure = pipeline.downstream_closure(target);
    // restore needs each job's own rows, snapshot them before removal
    let snapshots: Vec<(JobId, Pipeline)> =
        closure.iter().map(|id| (id.clone(), pipeline.restrict_to(id))).collect();

    pipeline.remove_processes(&closure);
    lock.write(&pipeline).map_err(ProjectError::io(project.pipeline_path()))?;

    let mut report = TrashReport::default();
    for (id, rows) in snapshots {
        let src = project.job_path(&id);
        ensure_job_pipeline(&src, &rows);
        let dest = project.trash_dir().join(id.relative_path());
        match move_dir(&src, &dest) {
            Ok(()) => tracing::info!(job = %id, "moved to trash"),
            Err(e) => {
                tracing::warn!(job = %id, error = %e, "failed to move job to trash");
                report.failed_moves.push(id.clone());
            }
        }
        report.trashed.push(id);
    }
    drop(lock);
    Ok(report)
}

/// Restore every job under `Trash/`.
pub fn restore(project: &Project) -> Result<RestoreReport, ProjectError> {
    let entries = trashed_jobs(&project.trash_dir());
    restore_entries(project, &entries)
}

/// Restore one trashed job.
pub fn restore_job(project: &Project, id: &JobId) -> Result<RestoreReport, ProjectError> {
    restore_entries(project, std::slice::from_ref(id))
}

fn restore_entries(project: &Project, ids: &[JobId]) -> Result<RestoreReport, ProjectError> {
    let mut report = RestoreReport::default();
    if ids.is_empty() {
        return Ok(report);
    }

    let mut lock = project.lock_pipeline()?;
    let mut pipeline = lock.read()?;
    for id in ids {
        match restore_one(project, &mut pipeline, id) {
            Ok(()) => {
                tracing::info!(job = %id, "restored from trash");
                report.restored.push(id.clone());
            }
            Err(reason) => {
                tracing::warn!(job = %id, reason = %reason, "skipping trashed job");
                report.skipped.push(SkippedEntry { job: id.clone(), reason });
            }
        }
    }
    pipeline.sort_processes_by_job_number();
    lock.write(&pipeline).map_err(ProjectError::io(project.pipeline_path()))?;
    drop(lock);

    for id in &report.restored {
        // fails harmlessly while other jobs of the group are still trashed
        let _ = std::fs::remove_dir(project.trash_dir().join(id.group()));
    }
    Ok(report)
}

/// Merge one trashed job back. The directory moves before its rows are
/// merged so a failed move leaves the pipeline untouched.
fn restore_one(project: &Project, pipeline: &mut Pipeline, id: &JobId) -> Result<(), String> {
    let src = project.trash_dir().join(id.relative_path());
    let dest = project.job_path(id);
    if !src.is_dir() {
        return Err("not in trash".to_string());
    }
    if dest.exists() {
        return Err(format!("{} already exists", dest.display()));
    }
    if pipeline.contains(id.as_str()) {
        return Err("already in the pipeline".to_string());
    }
    let mut rows = Pipeline::read(&src.join(JOB_PIPELINE)).map_err(|e| e.to_string())?;
    promote_finished(&mut rows, &src);

    move_dir(&src, &dest).map_err(|e| e.to_string())?;
    pipeline.merge(&rows);
    Ok(())
}

/// Replace a stale `Running` status with the outcome its sentinels record.
fn promote_finished(rows: &mut Pipeline, dir: &Path) {
    let finished = JobState::from_sentinel(dir).and_then(|s| match s {
        JobState::Succeeded => Some(ProcessStatus::Succeeded),
        JobState::Failed => Some(ProcessStatus::Failed),
        JobState::Aborted => Some(ProcessStatus::Aborted),
        _ => None,
    });
    let Some(status) = finished else {
        return;
    };
    for process in rows.processes.iter_mut().filter(|p| p.status == ProcessStatus::Running) {
        process.status = status;
    }
}

/// Write the job's own rows if the runner never left a `job_pipeline.star`.
fn ensure_job_pipeline(job_dir: &Path, rows: &Pipeline) {
    let path = job_dir.join(JOB_PIPELINE);
    if !job_dir.is_dir() || path.exists() {
        return;
    }
    if let Err(e) = std::fs::write(&path, rows.serialize()) {
        tracing::warn!(path = %path.display(), error = %e, "failed to write job pipeline");
    }
}

/// `Trash/<Group>/jobNNN` entries in name order.
fn trashed_jobs(trash_dir: &Path) -> Vec<JobId> {
    let mut ids = Vec::new();
    for group in subdirs(trash_dir) {
        for job in subdirs(&group) {
            if let Some(id) = JobId::from_dir(&job) {
                ids.push(id);
            }
        }
    }
    ids.sort_by_key(|id| (id.number().unwrap_or(u32::MAX), id.clone()));
    ids
}

fn subdirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

/// Move `src` to `dest`, replacing whatever is at `dest`.
fn move_dir(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::symlink_metadata(src)?;
    if dest.exists() {
        std::fs::remove_dir_all(dest)?;
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::rename(src, dest)
}

#[cfg(test)]
#[path = "trash_tests.rs"]
mod tests;
