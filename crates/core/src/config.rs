// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered user configuration.
//!
//! Layers, lowest first: built-in defaults, `<config_dir>/config.toml`,
//! `<project>/.rln.toml`, then `RLN_*` environment variables. Each file
//! layer only needs to name the keys it overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env;

/// File name of the per-project config layer.
pub const PROJECT_CONFIG: &str = ".rln.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `relion_pipeliner` executable.
    pub pipeliner: PathBuf,
    /// Executable paths keyed by the `job.star` variable that takes them
    /// (e.g. `fn_motioncor2_exe`).
    pub executables: IndexMap<String, PathBuf>,
    pub queue: QueueConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Submit jobs to the queue instead of running locally.
    pub enabled: bool,
    pub name: String,
    pub qsub: String,
    pub script: PathBuf,
    pub min_dedicated: u32,
    pub other_args: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeliner: PathBuf::from("relion_pipeliner"),
            executables: IndexMap::new(),
            queue: QueueConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "openmpi".to_string(),
            qsub: "sbatch".to_string(),
            script: PathBuf::new(),
            min_dedicated: 1,
            other_args: String::new(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 400 }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Load all layers. `project` adds the project-local layer.
    pub fn load(project: Option<&Path>) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        if let Some(dir) = env::config_dir() {
            layers.push(dir.join("config.toml"));
        }
        if let Some(project) = project {
            layers.push(project.join(PROJECT_CONFIG));
        }
        let mut config = Self::from_files(&layers)?;
        config.apply_env();
        Ok(config)
    }

    /// Merge the given files over the defaults, skipping missing ones.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = match toml::Value::try_from(Self::default()) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => toml::Table::new(),
            Err(e) => return Err(ConfigError::Invalid(e.to_string())),
        };
        for path in paths {
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ConfigError::Read { path: path.clone(), source }),
            };
            let layer: toml::Table = toml::from_str(&text)
                .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
            tracing::debug!(path = %path.display(), "loaded config layer");
            merge_tables(&mut merged, layer);
        }
        let path = paths.last().cloned().unwrap_or_default();
        toml::Value::Table(merged)
            .try_into()
            .map_err(|source| ConfigError::Parse { path, source })
    }

    fn apply_env(&mut self) {
        if let Some(p) = env::pipeliner() {
            self.pipeliner = p;
        }
        if let Some(name) = env::queue_name() {
            self.queue.name = name;
        }
        if let Some(qsub) = env::qsub() {
            self.queue.qsub = qsub;
        }
        if let Some(script) = env::qsub_script() {
            self.queue.script = script;
        }
        if let Some(d) = env::debounce() {
            self.watch.debounce_ms = d.as_millis() as u64;
        }
    }
}

/// Recursively overlay `layer` onto `base`. Tables merge key by key, any
/// other value replaces.
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
