// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    job_prefix = { "job_foo", "starts with job" },
    slash      = { "a/b", "invalid characters" },
    dot        = { ".", "reserved name" },
    dotdot     = { "..", "reserved name" },
    empty      = { "", "empty" },
    star       = { "best*", "invalid characters" },
    dollar     = { "cost$", "invalid characters" },
    backslash  = { "a\\b", "invalid characters" },
)]
fn rejected(alias: &str, rule: &str) {
    let err = validate_alias(alias).unwrap_err();
    assert_eq!(err.rule(), rule);
}

#[yare::parameterized(
    simple     = { "first_pass" },
    dash       = { "ref-3A" },
    inner_job  = { "myjob" },
    upper_job  = { "Job1" },
)]
fn accepted(alias: &str) {
    assert_eq!(validate_alias(alias), Ok(()));
}

#[test]
fn forbidden_char_is_reported() {
    assert_eq!(
        validate_alias("a/b"),
        Err(AliasError::ForbiddenChar { alias: "a/b".into(), ch: '/' })
    );
}

#[test]
fn label_round_trip() {
    let label = alias_label("Class3D", "first_pass");
    assert_eq!(label, "Class3D/first_pass/");
    assert_eq!(alias_name(&label), "first_pass");
    assert_eq!(alias_name("bare"), "bare");
}
