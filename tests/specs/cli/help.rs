// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output

use crate::prelude::*;

#[test]
fn rln_help_lists_commands() {
    cli().args(&["--help"]).passes().stdout_has("Usage:").stdout_has("status").stdout_has("trash");
}

#[test]
fn rln_without_command_prints_usage() {
    cli().fails().code(2).stderr_has("Usage:");
}

#[test]
fn rln_run_help_describes_parameters() {
    cli().args(&["run", "--help"]).passes().stdout_has("name=value");
}

#[test]
fn rln_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2.0");
}
