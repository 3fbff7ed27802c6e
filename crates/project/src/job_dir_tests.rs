// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::ProjectFixture;
use rln_core::test_support::PipelineBuilder;
use rln_core::ProcessStatus;

fn fixture() -> ProjectFixture {
    let pipeline = PipelineBuilder::new()
        .process("Import/job001/", "relion.importmovies", ProcessStatus::Succeeded)
        .output("Import/job001/", "Import/job001/movies.star")
        .process("MotionCorr/job002/", "relion.motioncorr.own", ProcessStatus::Running)
        .input("Import/job001/movies.star", "MotionCorr/job002/")
        .output("MotionCorr/job002/", "MotionCorr/job002/corrected_micrographs.star")
        .process("CtfFind/job003/", "relion.ctffind.ctffind4", ProcessStatus::Scheduled)
        .input("MotionCorr/job002/corrected_micrographs.star", "CtfFind/job003/")
        .input("Import/job001/movies.star", "CtfFind/job003/")
        .input("MotionCorr/job002/logfile.pdf", "CtfFind/job003/")
        .build();
    ProjectFixture::new(&pipeline)
}

#[test]
fn from_path_requires_existing_directory() {
    let fx = fixture();
    let err = JobDirectory::from_path(&fx.root().join("Class3D/job009")).unwrap_err();
    assert!(matches!(err, ProjectError::DirectoryMissing(_)));
}

#[test]
fn from_path_requires_job_name() {
    let fx = fixture();
    let err = JobDirectory::from_path(&fx.root().join("Import")).unwrap_err();
    assert!(matches!(err, ProjectError::NotAJob(_)));
}

#[test]
fn from_job_star_requires_job_star_name() {
    let fx = fixture();
    let job = fx.job("Import/job001/");
    let other = fx.touch("Import/job001/movies.star");
    assert!(matches!(JobDirectory::from_job_star(&other), Err(ProjectError::NotAJob(_))));
    assert_eq!(JobDirectory::from_job_star(&job.job_star_path()).unwrap(), job);
}

#[test]
fn handles_on_same_path_are_equal() {
    let fx = fixture();
    let a = fx.job("MotionCorr/job002/");
    let b = JobDirectory::from_path(&fx.root().join("MotionCorr/./job002")).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.job_id(), "MotionCorr/job002/");
    assert_eq!(a.number(), 2);
    assert_eq!(a.job_number(), "002");
    assert_eq!(a.project_root(), fx.root());
}

#[test]
fn success_beats_abort_request() {
    let fx = fixture();
    fx.touch("MotionCorr/job002/RELION_JOB_EXIT_SUCCESS");
    fx.touch("MotionCorr/job002/RELION_JOB_ABORT_NOW");
    assert_eq!(fx.job("MotionCorr/job002/").state(), JobState::Succeeded);
}

#[yare::parameterized(
    scheduled_row = { "CtfFind/job003/", JobState::Scheduled },
    running_row   = { "MotionCorr/job002/", JobState::Running },
    succeeded_row = { "Import/job001/", JobState::Running },
)]
fn state_without_sentinel(id: &str, expected: JobState) {
    let fx = fixture();
    assert_eq!(fx.job(id).state(), expected);
}

#[test]
fn abort_request_flow() {
    let fx = fixture();
    let job = fx.job("MotionCorr/job002/");
    assert!(job.can_abort());
    job.request_abort().unwrap();
    assert_eq!(job.state(), JobState::AbortRequested);
    assert!(!job.can_abort());
}

#[test]
fn params_keep_file_order_and_strings() {
    let fx = fixture();
    let mut star = JobStar::new("relion.class3d", false);
    star.options.insert("nr_classes".into(), "4".into());
    star.options.insert("fn_mask".into(), "".into());
    star.options.insert("do_ctf_correction".into(), "Yes".into());
    fx.write_job_star("MotionCorr/job002/", &star);

    let params = fx.job("MotionCorr/job002/").job_params().unwrap();
    let pairs: Vec<_> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(pairs, [("nr_classes", "4"), ("fn_mask", ""), ("do_ctf_correction", "Yes")]);
}

#[test]
fn is_tomo_reads_flag() {
    let fx = fixture();
    assert!(!fx.job("Import/job001/").is_tomo());
    fx.write_job_star("Import/job001/", &JobStar::new("relion.importtomo", true));
    assert!(fx.job("Import/job001/").is_tomo());
}

#[test]
fn parent_jobs_are_deduplicated() {
    let fx = fixture();
    let parents = fx.job("CtfFind/job003/").parent_jobs().unwrap();
    let ids: Vec<_> = parents.iter().map(|p| p.job_id().as_str()).collect();
    assert_eq!(ids, ["MotionCorr/job002/", "Import/job001/"]);
    assert!(fx.job("Import/job001/").parent_jobs().unwrap().is_empty());
}

#[test]
fn inputs_ready_once_nodes_exist() {
    let fx = fixture();
    let job = fx.job("MotionCorr/job002/");
    assert!(!job.all_inputs_ready());
    fx.touch("Import/job001/movies.star");
    assert!(job.all_inputs_ready());
    assert_eq!(job.output_paths().unwrap(), [fx.root().join("MotionCorr/job002/corrected_micrographs.star")]);
}

#[test]
fn path_helpers() {
    let fx = fixture();
    let job = fx.job("Import/job001/");
    let abs = job.resolve_path(Path::new("Import/job001/movies.star"));
    assert_eq!(abs, fx.root().join("Import/job001/movies.star"));
    assert_eq!(job.make_relative_path(&abs), PathBuf::from("Import/job001/movies.star"));
    assert_eq!(job.make_relative_path(Path::new("/elsewhere/x")), PathBuf::from("/elsewhere/x"));
    assert_eq!(job.resolve_path(Path::new("/elsewhere/x")), PathBuf::from("/elsewhere/x"));
}

#[test]
fn clear_keeps_options_pipeline_note_only() {
    let fx = fixture();
    let job = fx.job("MotionCorr/job002/");
    fx.touch("MotionCorr/job002/note.txt");
    fx.touch("MotionCorr/job002/run.out");
    fx.touch("MotionCorr/job002/RELION_JOB_EXIT_FAILURE");
    fx.touch("MotionCorr/job002/Movies/mic001.mrc");
    fx.touch("MotionCorr/job002/Movies/Raw/mic001.tiff");

    job.clear().unwrap();

    let mut names: Vec<_> = std::fs::read_dir(job.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["job.star", "job_pipeline.star", "note.txt"]);
    assert!(!job.path().join("Movies").exists());
}

#[test]
fn remove_sentinels_ignores_absent() {
    let fx = fixture();
    let job = fx.job("MotionCorr/job002/");
    fx.touch("MotionCorr/job002/RELION_JOB_EXIT_ABORTED");
    job.remove_sentinels().unwrap();
    assert!(job.can_abort());
}

#[test]
fn edit_job_pipeline_persists() {
    let fx = fixture();
    let job = fx.job("MotionCorr/job002/");
    let changed = job
        .edit_job_pipeline(|p| p.update_process_status("MotionCorr/job002/", ProcessStatus::Failed))
        .unwrap();
    assert!(changed);
    assert_eq!(job.job_pipeline().unwrap().status_of("MotionCorr/job002/"), Some(ProcessStatus::Failed));
    assert!(!job.path().join("job_pipeline.star.tmp").exists());
}

#[test]
fn alias_set_rename_remove() {
    let fx = fixture();
    let job = fx.job("MotionCorr/job002/");
    let group = job.group_dir();

    job.set_alias(Some("first")).unwrap();
    assert_eq!(job.alias().as_deref(), Some("first"));
    assert_eq!(std::fs::read_link(group.join("first")).unwrap(), PathBuf::from("job002"));
    assert_eq!(fx.pipeline().process("MotionCorr/job002/").unwrap().alias.as_deref(), Some("MotionCorr/first/"));
    assert_eq!(JobDirectory::from_path(&group.join("first")).unwrap(), job);

    job.set_alias(Some("second")).unwrap();
    assert!(group.join("first").symlink_metadata().is_err());
    assert!(group.join("second").symlink_metadata().unwrap().file_type().is_symlink());

    job.set_alias(None).unwrap();
    assert_eq!(job.alias(), None);
    assert!(group.join("second").symlink_metadata().is_err());
}

#[yare::parameterized(
    job_prefix = { "job_foo" },
    slash      = { "a/b" },
    dot        = { "." },
)]
fn alias_rejected(alias: &str) {
    let fx = fixture();
    let job = fx.job("MotionCorr/job002/");
    let err = job.set_alias(Some(alias)).unwrap_err();
    assert!(matches!(err, ProjectError::Alias(_)));
    assert_eq!(job.alias(), None);
}

#[test]
fn alias_collision_is_rejected() {
    let fx = fixture();
    fx.touch("MotionCorr/taken");
    let err = fx.job("MotionCorr/job002/").set_alias(Some("taken")).unwrap_err();
    assert!(matches!(err, ProjectError::Alias(AliasError::Exists(name)) if name == "taken"));
}

#[test]
fn note_is_read_when_present() {
    let fx = fixture();
    let job = fx.job("Import/job001/");
    assert_eq!(job.note(), None);
    std::fs::write(job.path().join(NOTE_FILE), "first import").unwrap();
    assert_eq!(job.note().as_deref(), Some("first import"));
}
