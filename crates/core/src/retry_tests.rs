// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn missing_file_fails_without_retrying() {
    let dir = TempDir::new().unwrap();
    let started = std::time::Instant::now();
    let err = read_star(&dir.path().join("absent.star")).unwrap_err();
    assert!(err.is_not_found());
    assert!(started.elapsed() < READ_RETRY_DELAY);
}

#[test]
fn empty_file_surfaces_after_retries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.star");
    std::fs::write(&path, "").unwrap();
    assert!(matches!(read_star(&path), Err(StarReadError::Empty { .. })));
}

#[test]
fn file_filled_while_retrying_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("late.star");
    std::fs::write(&path, "").unwrap();

    let writer_path = path.clone();
    let writer = std::thread::spawn(move || {
        std::thread::sleep(READ_RETRY_DELAY);
        std::fs::write(&writer_path, "data_job\n_rlnJobTypeLabel relion.import\n").unwrap();
    });

    let doc = read_star(&path).unwrap();
    writer.join().unwrap();
    assert!(doc.record("job").is_some());
}
