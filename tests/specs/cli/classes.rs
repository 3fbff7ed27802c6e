// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln classes` works with or without a project.

use crate::prelude::*;

#[test]
fn classes_list_outside_a_project() {
    let temp = Project::empty();
    temp.rln().args(&["classes"]).passes().stdout_has("rln.class3d").stdout_has("3D classification");
}

#[test]
fn classes_describe_as_json() {
    let temp = Project::empty();
    let run = temp.rln().args(&["classes", "rln.class3d", "--json"]).passes();
    let params = run.json();
    let nr_iter = params
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "nr_iter")
        .expect("nr_iter listed");
    assert_eq!(nr_iter["default"], 25);
    assert_eq!(nr_iter["kind"], "scalar");
}

#[test]
fn classes_unknown_command_is_not_found() {
    cli().args(&["classes", "rln.nope"]).fails().code(3).stderr_has("unknown command");
}
