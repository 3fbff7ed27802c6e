// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln status` and `rln dag`

use crate::prelude::*;

#[test]
fn status_outside_a_project_is_not_found() {
    let temp = Project::empty();
    temp.rln().args(&["status"]).fails().code(3);
}

#[test]
fn status_lists_jobs_with_state() {
    let temp = Project::two_jobs();
    temp.rln()
        .args(&["status"])
        .passes()
        .stdout_has("JOB")
        .stdout_has("Import/job001/")
        .stdout_has("succeeded")
        .stdout_has("MotionCorr/job002/")
        .stdout_has("running");
}

#[test]
fn status_runs_from_a_subdirectory() {
    let temp = Project::two_jobs();
    let sub = temp.join("Import/job001");
    temp.rln().args(&["-C", sub.to_str().unwrap(), "status"]).passes().stdout_has("MotionCorr/job002/");
}

#[test]
fn status_as_json() {
    let temp = Project::two_jobs();
    let rows = temp.rln().args(&["status", "--json"]).passes().json();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["job"], "Import/job001/");
    assert_eq!(rows[0]["state"], "succeeded");
    assert_eq!(rows[1]["job"], "MotionCorr/job002/");
    assert_eq!(rows[1]["state"], "running");
}

#[test]
fn status_of_empty_project() {
    let temp = Project::empty();
    temp.file(
        "default_pipeline.star",
        "data_pipeline_processes\n\nloop_\n_rlnPipeLineProcessName #1\n_rlnPipeLineProcessAlias #2\n\
         _rlnPipeLineProcessTypeLabel #3\n_rlnPipeLineProcessStatusLabel #4\n",
    );
    temp.rln().args(&["status"]).passes().stdout_eq("No jobs\n");
}

#[test]
fn dag_links_consumer_to_producer() {
    let temp = Project::two_jobs();
    let dag = temp.rln().args(&["dag", "-o", "json"]).passes().json();
    assert_eq!(dag["Import/job001/"]["outputs"][0], "MotionCorr/job002/");
    assert_eq!(dag["MotionCorr/job002/"]["inputs"][0], "Import/job001/");

    temp.rln().args(&["dag"]).passes().stdout_has("Import/job001/ -> MotionCorr/job002/");
}
