// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rln_core::test_support::PipelineBuilder;
use rln_core::ProcessStatus;
use yare::parameterized;

fn pipeline() -> Pipeline {
    PipelineBuilder::new()
        .process("Import/job001/", "relion.import", ProcessStatus::Succeeded)
        .process("Class3D/job007/", "relion.class3d", ProcessStatus::Running)
        .alias("Class3D/job007/", "Class3D/best/")
        .process("Refine3D/job012/", "relion.refine3d", ProcessStatus::Scheduled)
        .alias("Refine3D/job012/", "Refine3D/job001/")
        .build()
}

#[parameterized(
    exact = { "Class3D/job007/", "Class3D/job007/" },
    no_trailing_slash = { "Class3D/job007", "Class3D/job007/" },
    alias_label = { "Class3D/best", "Class3D/job007/" },
    bare_alias = { "best", "Class3D/job007/" },
    number = { "12", "Refine3D/job012/" },
    job_dir = { "job007", "Class3D/job007/" },
    padded = { "007", "Class3D/job007/" },
)]
fn resolves(query: &str, expected: &str) {
    assert_eq!(resolve_job_id(&pipeline(), query).unwrap(), JobId::new(expected));
}

#[test]
fn exact_id_wins_over_alias() {
    // Refine3D/job012 is aliased "job001", yet the query names Import/job001
    assert_eq!(resolve_job_id(&pipeline(), "Import/job001").unwrap(), JobId::new("Import/job001/"));
}

#[test]
fn alias_wins_over_number() {
    assert_eq!(resolve_job_id(&pipeline(), "job001").unwrap(), JobId::new("Refine3D/job012/"));
}

#[parameterized(
    unknown_number = { "99" },
    unknown_alias = { "worst" },
    empty = { "" },
)]
fn unknown_is_not_found(query: &str) {
    let err = resolve_job_id(&pipeline(), query).unwrap_err();
    assert_eq!(err.code, crate::exit_error::NOT_FOUND);
}

#[test]
fn ambiguous_alias_is_rejected() {
    let pipeline = PipelineBuilder::new()
        .process("Class3D/job007/", "relion.class3d", ProcessStatus::Running)
        .alias("Class3D/job007/", "Class3D/best/")
        .process("Refine3D/job008/", "relion.refine3d", ProcessStatus::Running)
        .alias("Refine3D/job008/", "Refine3D/best/")
        .build();
    let err = resolve_job_id(&pipeline, "best").unwrap_err();
    assert!(err.message.contains("ambiguous"), "{}", err.message);
}
