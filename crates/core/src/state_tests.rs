// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn dir_with(sentinels: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in sentinels {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    dir
}

#[yare::parameterized(
    success           = { &[sentinel::EXIT_SUCCESS], JobState::Succeeded },
    failure           = { &[sentinel::EXIT_FAILURE], JobState::Failed },
    aborted           = { &[sentinel::EXIT_ABORTED], JobState::Aborted },
    abort_requested   = { &[sentinel::ABORT_NOW], JobState::AbortRequested },
    success_and_abort = { &[sentinel::ABORT_NOW, sentinel::EXIT_SUCCESS], JobState::Succeeded },
    failure_over_abrt = { &[sentinel::EXIT_ABORTED, sentinel::EXIT_FAILURE], JobState::Failed },
    aborted_over_req  = { &[sentinel::ABORT_NOW, sentinel::EXIT_ABORTED], JobState::Aborted },
)]
fn sentinel_precedence(sentinels: &[&str], expected: JobState) {
    let dir = dir_with(sentinels);
    assert_eq!(JobState::detect(dir.path(), Some(ProcessStatus::Scheduled)), expected);
}

#[test]
fn no_sentinel_uses_pipeline_status() {
    let dir = dir_with(&[]);
    assert_eq!(JobState::detect(dir.path(), Some(ProcessStatus::Scheduled)), JobState::Scheduled);
    assert_eq!(JobState::detect(dir.path(), Some(ProcessStatus::Running)), JobState::Running);
    assert_eq!(JobState::detect(dir.path(), None), JobState::Running);
}

#[yare::parameterized(
    canonical = { "Succeeded", ProcessStatus::Succeeded },
    lower     = { "scheduled", ProcessStatus::Scheduled },
    upper     = { "RUNNING", ProcessStatus::Running },
    mixed     = { "fAiLeD", ProcessStatus::Failed },
)]
fn status_parse_is_case_insensitive(input: &str, expected: ProcessStatus) {
    assert_eq!(input.parse::<ProcessStatus>().unwrap(), expected);
}

#[test]
fn status_display_is_canonical() {
    assert_eq!("aborted".parse::<ProcessStatus>().unwrap().to_string(), "Aborted");
    assert!("finished".parse::<ProcessStatus>().is_err());
}

#[test]
fn sentinel_names_are_recognized() {
    assert!(sentinel::is_sentinel("RELION_JOB_EXIT_SUCCESS"));
    assert!(sentinel::is_sentinel("RELION_JOB_SOMETHING_NEW"));
    assert!(!sentinel::is_sentinel("run.out"));
}
