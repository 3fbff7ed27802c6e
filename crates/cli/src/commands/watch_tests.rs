// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use super::*;
use rln_core::test_support::PipelineBuilder;

#[test]
fn describe_counts_content_files() {
    assert_eq!(describe(&Change::Sentinel), "state");
    assert_eq!(describe(&Change::Content { paths: vec![PathBuf::from("run.out")] }), "1 file");
    assert_eq!(
        describe(&Change::Content { paths: vec![PathBuf::from("run.out"), PathBuf::from("run.err")] }),
        "2 files"
    );
}

#[test]
fn status_changes_report_new_and_changed_rows() {
    let prev = PipelineBuilder::new()
        .process("Import/job001/", "relion.import", ProcessStatus::Succeeded)
        .process("Class3D/job007/", "relion.class3d", ProcessStatus::Running)
        .build();
    let next = PipelineBuilder::new()
        .process("Import/job001/", "relion.import", ProcessStatus::Succeeded)
        .process("Class3D/job007/", "relion.class3d", ProcessStatus::Succeeded)
        .process("Refine3D/job008/", "relion.refine3d", ProcessStatus::Scheduled)
        .build();

    let changes = status_changes(&prev, &next);
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].job, JobId::new("Class3D/job007/"));
    assert_eq!(changes[0].from, Some(ProcessStatus::Running));
    assert_eq!(changes[0].to, ProcessStatus::Succeeded);
    assert_eq!(changes[1].job, JobId::new("Refine3D/job008/"));
    assert_eq!(changes[1].from, None);
}

#[test]
fn unchanged_pipeline_reports_nothing() {
    let pipeline = PipelineBuilder::new()
        .process("Import/job001/", "relion.import", ProcessStatus::Succeeded)
        .build();
    assert!(status_changes(&pipeline, &pipeline).is_empty());
}
