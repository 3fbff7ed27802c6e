// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::ProjectFixture;
use rln_core::test_support::PipelineBuilder;

fn chain() -> Pipeline {
    PipelineBuilder::new()
        .process("Import/job001/", "relion.importmovies", ProcessStatus::Succeeded)
        .output("Import/job001/", "Import/job001/movies.star")
        .process("MotionCorr/job002/", "relion.motioncorr.own", ProcessStatus::Succeeded)
        .input("Import/job001/movies.star", "MotionCorr/job002/")
        .output("MotionCorr/job002/", "MotionCorr/job002/corrected_micrographs.star")
        .process("CtfFind/job003/", "relion.ctffind.ctffind4", ProcessStatus::Running)
        .input("MotionCorr/job002/corrected_micrographs.star", "CtfFind/job003/")
        .output("CtfFind/job003/", "CtfFind/job003/micrographs_ctf.star")
        .build()
}

fn id(s: &str) -> JobId {
    JobId::new(s)
}

#[test]
fn trash_removes_downstream_closure() {
    let fx = ProjectFixture::new(&chain());
    let report = trash(fx.project(), &id("MotionCorr/job002/")).unwrap();
    assert_eq!(report.trashed, [id("MotionCorr/job002/"), id("CtfFind/job003/")]);
    assert!(report.failed_moves.is_empty());

    let pipeline = fx.pipeline();
    let names: Vec<_> = pipeline.processes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Import/job001/"]);
    assert_eq!(pipeline.process("Import/job001/"), chain().process("Import/job001/"));
    for edge in &pipeline.input_edges {
        let owner = Pipeline::node_owner(&edge.from_node).unwrap();
        assert!(!report.trashed.contains(&owner));
    }
    assert!(pipeline.output_edges.iter().all(|e| !report.trashed.contains(&e.process)));

    let root = fx.root();
    assert!(root.join("Trash/MotionCorr/job002").is_dir());
    assert!(root.join("Trash/CtfFind/job003").is_dir());
    assert!(!root.join("MotionCorr/job002").exists());
    assert!(!root.join("CtfFind/job003").exists());
    assert!(root.join("Import/job001").is_dir());
}

#[test]
fn trash_unknown_process_fails_without_changes() {
    let fx = ProjectFixture::new(&chain());
    let err = trash(fx.project(), &id("Class3D/job009/")).unwrap_err();
    assert!(matches!(err, ProjectError::Pipeline(PipelineError::UnknownProcess(_))));
    assert_eq!(fx.pipeline(), chain());
}

#[test]
fn trash_replaces_existing_destination() {
    let fx = ProjectFixture::new(&chain());
    fx.touch("Trash/CtfFind/job003/stale.txt");
    trash(fx.project(), &id("CtfFind/job003/")).unwrap();
    let dest = fx.root().join("Trash/CtfFind/job003");
    assert!(dest.join("job.star").exists());
    assert!(!dest.join("stale.txt").exists());
}

#[test]
fn trash_then_restore_round_trips() {
    let fx = ProjectFixture::new(&chain());
    trash(fx.project(), &id("MotionCorr/job002/")).unwrap();

    let report = restore(fx.project()).unwrap();
    assert_eq!(report.restored, [id("MotionCorr/job002/"), id("CtfFind/job003/")]);
    assert!(report.skipped.is_empty());

    let pipeline = fx.pipeline();
    let names: Vec<_> = pipeline.processes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Import/job001/", "MotionCorr/job002/", "CtfFind/job003/"]);
    assert_eq!(pipeline.build_dag(), chain().build_dag());
    assert!(fx.root().join("CtfFind/job003").is_dir());
    assert!(!fx.root().join("Trash/CtfFind").exists());
}

#[test]
fn restore_promotes_running_from_sentinel() {
    let fx = ProjectFixture::new(&chain());
    fx.touch("CtfFind/job003/RELION_JOB_EXIT_SUCCESS");
    trash(fx.project(), &id("CtfFind/job003/")).unwrap();

    restore_job(fx.project(), &id("CtfFind/job003/")).unwrap();
    assert_eq!(fx.pipeline().status_of("CtfFind/job003/"), Some(ProcessStatus::Succeeded));
}

#[test]
fn restore_skips_conflicts() {
    let fx = ProjectFixture::new(&chain());
    trash(fx.project(), &id("CtfFind/job003/")).unwrap();
    std::fs::create_dir_all(fx.root().join("CtfFind/job003")).unwrap();

    let report = restore(fx.project()).unwrap();
    assert!(report.restored.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].job, id("CtfFind/job003/"));
    assert!(fx.root().join("Trash/CtfFind/job003").is_dir());
    assert!(!fx.pipeline().contains("CtfFind/job003/"));
}

#[test]
fn restore_skips_unparsable_job_pipeline() {
    let fx = ProjectFixture::new(&chain());
    trash(fx.project(), &id("CtfFind/job003/")).unwrap();
    std::fs::write(fx.root().join("Trash/CtfFind/job003/job_pipeline.star"), "data_nothing\n").unwrap();

    let report = restore(fx.project()).unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert!(report.restored.is_empty());
}

#[test]
fn restore_with_empty_trash_is_noop() {
    let fx = ProjectFixture::new(&chain());
    assert_eq!(restore(fx.project()).unwrap(), RestoreReport::default());
}

#[test]
fn trash_writes_missing_job_pipeline() {
    let fx = ProjectFixture::new(&chain());
    std::fs::remove_file(fx.root().join("CtfFind/job003/job_pipeline.star")).unwrap();
    trash(fx.project(), &id("CtfFind/job003/")).unwrap();
    let rows = Pipeline::read(&fx.root().join("Trash/CtfFind/job003/job_pipeline.star")).unwrap();
    assert_eq!(rows, chain().restrict_to(&id("CtfFind/job003/")));
}
