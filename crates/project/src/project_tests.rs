// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::ProjectFixture;
use rln_core::test_support::PipelineBuilder;
use rln_core::{PipelineError, ProcessStatus};

fn fixture() -> ProjectFixture {
    ProjectFixture::new(
        &PipelineBuilder::new()
            .process("Import/job001/", "relion.importmovies", ProcessStatus::Succeeded)
            .process("MotionCorr/job002/", "relion.motioncorr.own", ProcessStatus::Running)
            .build(),
    )
}

#[test]
fn open_requires_directory() {
    let fx = fixture();
    let err = Project::open(&fx.root().join("missing")).unwrap_err();
    assert!(matches!(err, ProjectError::DirectoryMissing(_)));
}

#[test]
fn discover_walks_up_to_pipeline() {
    let fx = fixture();
    let nested = fx.root().join("MotionCorr/job002");
    assert_eq!(Project::discover(&nested).unwrap().root(), fx.root());
}

#[test]
fn discover_fails_outside_projects() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(matches!(Project::discover(dir.path()), Err(ProjectError::NotAProject(_))));
}

#[test]
fn jobs_skip_rows_without_directory() {
    let fx = fixture();
    std::fs::remove_dir_all(fx.root().join("Import/job001")).unwrap();
    let ids: Vec<_> = fx.project().jobs().unwrap().iter().map(|j| j.job_id().to_string()).collect();
    assert_eq!(ids, ["MotionCorr/job002/"]);
}

#[test]
fn edit_pipeline_writes_on_success() {
    let fx = fixture();
    fx.project()
        .edit_pipeline(|p| {
            p.update_process_status("MotionCorr/job002/", ProcessStatus::Succeeded);
            Ok(())
        })
        .unwrap();
    assert_eq!(fx.pipeline().status_of("MotionCorr/job002/"), Some(ProcessStatus::Succeeded));
}

#[test]
fn edit_pipeline_keeps_file_on_error() {
    let fx = fixture();
    let before = std::fs::read_to_string(fx.project().pipeline_path()).unwrap();
    let result: Result<(), _> = fx.project().edit_pipeline(|p| {
        p.processes.clear();
        Err(PipelineError::UnknownProcess(JobId::new("X/job009")).into())
    });
    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(fx.project().pipeline_path()).unwrap(), before);
}

#[test]
fn job_paths() {
    let fx = fixture();
    let id = JobId::new("Class3D/job007");
    assert_eq!(fx.project().job_path(&id), fx.root().join("Class3D/job007"));
    assert!(fx.project().job(&id).is_err());
    assert_eq!(fx.project().trash_dir(), fx.root().join("Trash"));
}
