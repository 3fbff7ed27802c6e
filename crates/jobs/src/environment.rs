// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-provided `job.star` keys: executable paths and queue settings.
//!
//! These never appear in a class's parameter list; they are injected on the
//! way out and dropped on the way back.

use indexmap::IndexMap;
use rln_core::{env, Config, Options, QueueConfig};
use serde::Serialize;

/// Queue variables RELION reads from every queue-capable job.
pub const QUEUE_VARS: [&str; 6] =
    ["do_queue", "queuename", "qsub", "qsubscript", "min_dedicated", "other_args"];

/// An executable option and where to find its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Executable {
    /// `job.star` variable.
    pub var: &'static str,
    /// RELION environment variable overriding the default.
    pub env: &'static str,
    pub default: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvKey {
    Executable(Executable),
    Queue,
}

impl EnvKey {
    pub fn vars(&self) -> Vec<&'static str> {
        match self {
            EnvKey::Executable(exe) => vec![exe.var],
            EnvKey::Queue => QUEUE_VARS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    executables: IndexMap<String, String>,
    queue: QueueConfig,
}

impl Environment {
    pub fn from_config(config: &Config) -> Self {
        Self {
            executables: config
                .executables
                .iter()
                .map(|(var, path)| (var.clone(), path.display().to_string()))
                .collect(),
            queue: config.queue.clone(),
        }
    }

    pub fn queue(&self) -> &QueueConfig {
        &self.queue
    }

    /// Configured path, else the RELION environment variable, else the
    /// program name.
    pub fn executable(&self, exe: &Executable) -> String {
        if let Some(path) = self.executables.get(exe.var) {
            return path.clone();
        }
        env::relion_executable(exe.env)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| exe.default.to_string())
    }

    /// Write the values of `keys` into `options`.
    pub fn inject(&self, keys: &[EnvKey], options: &mut Options) {
        for key in keys {
            match key {
                EnvKey::Executable(exe) => {
                    options.insert(exe.var.to_string(), self.executable(exe));
                }
                EnvKey::Queue => {
                    let q = &self.queue;
                    let do_queue = if q.enabled { "Yes" } else { "No" };
                    options.insert("do_queue".into(), do_queue.into());
                    options.insert("queuename".into(), q.name.clone());
                    options.insert("qsub".into(), q.qsub.clone());
                    options.insert("qsubscript".into(), q.script.display().to_string());
                    options.insert("min_dedicated".into(), q.min_dedicated.to_string());
                    options.insert("other_args".into(), q.other_args.clone());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
