// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

#[yare::parameterized(
    canonical      = { "Class3D/job007/", "Class3D/job007/" },
    no_slash       = { "Class3D/job007", "Class3D/job007/" },
    absolute       = { "/data/project/Class3D/job007/", "Class3D/job007/" },
    double_slash   = { "Class3D//job007", "Class3D/job007/" },
    backslash      = { "Class3D\\job007\\", "Class3D/job007/" },
)]
fn canonicalizes(input: &str, expected: &str) {
    assert_eq!(JobId::new(input).as_str(), expected);
}

#[test]
fn parts_and_number() {
    let id = JobId::new("Import/job001");
    assert_eq!(id.group(), "Import");
    assert_eq!(id.dir_name(), "job001");
    assert_eq!(id.job_number(), Some("001"));
    assert_eq!(id.number(), Some(1));
    assert_eq!(id.relative_path(), PathBuf::from("Import/job001"));
}

#[test]
fn non_job_directory_has_no_number() {
    let id = JobId::new("Class3D/first_try");
    assert_eq!(id.job_number(), None);
}

#[yare::parameterized(
    job007    = { "job007", true },
    job1      = { "job1", true },
    bare      = { "job", false },
    alias     = { "jobless", false },
    other     = { "run1", false },
)]
fn job_dir_names(name: &str, expected: bool) {
    assert_eq!(is_job_dir_name(name), expected);
}

#[test]
fn from_dir_requires_job_name() {
    assert_eq!(
        JobId::from_dir(Path::new("/p/MotionCorr/job002")),
        Some(JobId::new("MotionCorr/job002/"))
    );
    assert_eq!(JobId::from_dir(Path::new("/p/MotionCorr/my_alias")), None);
}

#[test]
fn hash_map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(JobId::new("Import/job001"), 42);
    assert_eq!(map.get("Import/job001/"), Some(&42));
}

#[test]
fn serde_canonicalizes() {
    let id: JobId = serde_json::from_str("\"Refine3D/job010\"").unwrap();
    assert_eq!(id, "Refine3D/job010/");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"Refine3D/job010/\"");
}
