// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rln alias`

use crate::prelude::*;

#[test]
fn alias_resolves_in_later_commands() {
    let temp = Project::two_jobs();
    temp.rln().args(&["alias", "1", "movies"]).passes().stdout_has("Aliased Import/job001/");

    temp.rln().args(&["status"]).passes().stdout_has("movies");
    temp.rln().args(&["show", "movies"]).passes().stdout_has("Import/job001/");
}

#[test]
fn alias_remove_forgets_the_name() {
    let temp = Project::two_jobs();
    temp.rln().args(&["alias", "1", "movies"]).passes();
    temp.rln().args(&["alias", "1", "--remove"]).passes().stdout_has("Removed alias");

    temp.rln().args(&["show", "movies"]).fails().code(3);
}

#[test]
fn alias_needs_a_name_or_remove() {
    let temp = Project::two_jobs();
    temp.rln().args(&["alias", "1"]).fails().code(1).stderr_has("--remove");
}
