// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln show` and job lookup

use crate::prelude::*;

#[test]
fn show_by_number() {
    let temp = Project::two_jobs();
    temp.rln()
        .args(&["show", "1"])
        .passes()
        .stdout_has("Import/job001/")
        .stdout_has("relion.import.movies")
        .stdout_has("succeeded")
        .stdout_has("angpix");
}

#[test]
fn show_lists_parents_as_json() {
    let temp = Project::two_jobs();
    let details = temp.rln().args(&["show", "MotionCorr/job002", "--json"]).passes().json();
    assert_eq!(details["job"], "MotionCorr/job002/");
    assert_eq!(details["parents"][0], "Import/job001/");
    assert_eq!(details["options"]["bin_factor"], "1");
}

#[test]
fn show_unknown_job_is_not_found() {
    let temp = Project::two_jobs();
    temp.rln().args(&["show", "9"]).fails().code(3).stderr_has("no job matches");
}
