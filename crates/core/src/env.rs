// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::path::PathBuf;
use std::time::Duration;

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Resolve config directory: RLN_CONFIG_DIR > XDG_CONFIG_HOME/rln > ~/.config/rln
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = var("RLN_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join("rln"))
}

/// Path of the `relion_pipeliner` executable.
pub fn pipeliner() -> Option<PathBuf> {
    var("RLN_PIPELINER").map(PathBuf::from)
}

pub fn queue_name() -> Option<String> {
    var("RLN_QUEUE_NAME")
}

/// Queue submission command (e.g. `sbatch`).
pub fn qsub() -> Option<String> {
    var("RLN_QSUB")
}

pub fn qsub_script() -> Option<PathBuf> {
    var("RLN_QSUB_SCRIPT").map(PathBuf::from)
}

/// A RELION executable override such as `RELION_CTFFIND_EXECUTABLE`.
pub fn relion_executable(name: &str) -> Option<PathBuf> {
    var(name).map(PathBuf::from)
}

/// Watcher debounce window override
pub fn debounce() -> Option<Duration> {
    var("RLN_DEBOUNCE_MS").and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Tracing filter directive for the CLI (default `warn`).
pub fn log_filter() -> String {
    var("RLN_LOG").unwrap_or_else(|| "warn".to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
