// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reading STAR files that may be mid-write.
//!
//! RELION rewrites pipeline files in place, so a reader can observe a
//! zero-length or truncated file for a short window. Reads are retried a
//! few times before the error is surfaced.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::star::{StarDoc, StarError};

/// Number of read attempts before giving up.
pub const READ_ATTEMPTS: u32 = 5;

/// Delay between read attempts.
pub const READ_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum StarReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Star { path: PathBuf, source: StarError },
    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },
}

impl StarReadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StarReadError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Read and parse a STAR file, retrying on empty or unparsable content.
///
/// A missing file fails immediately.
pub fn read_star(path: &Path) -> Result<StarDoc, StarReadError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let err = match std::fs::read_to_string(path) {
            Err(source) => {
                let err = StarReadError::Io { path: path.to_path_buf(), source };
                if err.is_not_found() {
                    return Err(err);
                }
                err
            }
            Ok(text) if text.trim().is_empty() => StarReadError::Empty { path: path.to_path_buf() },
            Ok(text) => match StarDoc::parse(&text) {
                Ok(doc) => return Ok(doc),
                Err(source) => StarReadError::Star { path: path.to_path_buf(), source },
            },
        };
        if attempt >= READ_ATTEMPTS {
            return Err(err);
        }
        tracing::debug!(path = %path.display(), attempt, error = %err, "retrying STAR read");
        std::thread::sleep(READ_RETRY_DELAY);
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
