// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory lock over `default_pipeline.star`.
//!
//! Every read-modify-write of the project pipeline holds the same open
//! handle from read to write, so concurrent editors (including
//! `relion_pipeliner`) serialize on `flock`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fs2::FileExt;
use rln_core::{Pipeline, PipelineError};

/// An exclusively locked pipeline file. Unlocks on drop.
#[derive(Debug)]
pub struct PipelineLock {
    file: File,
    path: PathBuf,
}

impl PipelineLock {
    /// Open `path` read-write and block until the exclusive lock is held.
    pub fn acquire(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        file.lock_exclusive()?;
        tracing::trace!(path = %path.display(), "pipeline lock acquired");
        Ok(Self { file, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the current file contents through the held handle.
    pub fn read(&mut self) -> Result<Pipeline, PipelineError> {
        let path = &self.path;
        let io_err = |source: std::io::Error| PipelineError::Io { path: path.clone(), source };
        self.file.seek(SeekFrom::Start(0)).map_err(io_err)?;
        let mut text = String::new();
        self.file.read_to_string(&mut text).map_err(io_err)?;
        Pipeline::parse(&text)
    }

    /// Replace the file contents through the held handle and touch its mtime.
    pub fn write(&mut self, pipeline: &Pipeline) -> std::io::Result<()> {
        let text = pipeline.serialize();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        self.file.write_all(text.as_bytes())?;
        self.file.flush()?;
        self.file.set_modified(SystemTime::now())?;
        Ok(())
    }
}

impl Drop for PipelineLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release pipeline lock");
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
