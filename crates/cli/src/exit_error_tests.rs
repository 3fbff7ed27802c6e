// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use super::*;
use rln_core::JobId;

#[test]
fn exit_error_keeps_its_code() {
    let err = anyhow::Error::new(ExitError::new(7, "boom"));
    assert_eq!(exit_code(&err), 7);
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn scheduler_errors_are_classified() {
    let refused = anyhow::Error::new(SchedulerError::NotAbortable(JobId::new("Class3D/job007/")));
    assert_eq!(exit_code(&refused), REFUSED);

    let failed = anyhow::Error::new(SchedulerError::Failure {
        code: Some(1),
        stdout: String::new(),
        stderr: "bad".into(),
        job_star: None,
    });
    assert_eq!(exit_code(&failed), PIPELINER);
}

#[test]
fn missing_project_is_not_found() {
    let err = anyhow::Error::new(ProjectError::NotAProject(PathBuf::from("/tmp")));
    assert_eq!(exit_code(&err), NOT_FOUND);
}

#[test]
fn context_does_not_hide_the_code() {
    let err = anyhow::Error::new(ExitError::not_found("no such job")).context("while resolving");
    assert_eq!(exit_code(&err), NOT_FOUND);
}

#[test]
fn anything_else_is_general() {
    assert_eq!(exit_code(&anyhow::anyhow!("oops")), GENERAL);
}
