// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln trash` and `rln restore`

use crate::prelude::*;

#[test]
fn trash_takes_downstream_jobs_along() {
    let temp = Project::two_jobs();
    temp.rln()
        .args(&["trash", "1"])
        .passes()
        .stdout_has("Trashed Import/job001/")
        .stdout_has("Trashed MotionCorr/job002/");

    assert!(temp.join("Trash/Import/job001/job.star").is_file());
    assert!(!temp.join("Import/job001").exists());
    temp.rln().args(&["status"]).passes().stdout_eq("No jobs\n");
}

#[test]
fn restore_brings_trashed_jobs_back() {
    let temp = Project::two_jobs();
    temp.rln().args(&["trash", "1"]).passes();

    temp.rln().args(&["restore"]).passes().stdout_has("Restored Import/job001/");

    assert!(temp.join("Import/job001/job.star").is_file());
    temp.rln()
        .args(&["status"])
        .passes()
        .stdout_has("Import/job001/")
        .stdout_has("MotionCorr/job002/")
        .stdout_lacks("No jobs");
}

#[test]
fn restore_with_empty_trash() {
    let temp = Project::two_jobs();
    temp.rln().args(&["restore"]).passes().stdout_has("Nothing to restore");
}
