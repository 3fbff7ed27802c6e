// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rln-core: STAR documents, the pipeline model and job state for RELION projects

pub mod macros;

pub mod config;
pub mod env;
pub mod id;
pub mod job_star;
pub mod params;
pub mod pipeline;
pub mod retry;
pub mod star;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{Config, ConfigError, QueueConfig, WatchConfig};
pub use id::{is_job_dir_name, JobId};
pub use job_star::{JobStar, Options, JOB_STAR};
pub use params::{Kwargs, ParamError, ParamType, ParamValue};
pub use pipeline::{
    DagEntry, InputEdge, NodeRow, OutputEdge, Pipeline, PipelineError, ProcessRow,
    DEFAULT_PIPELINE, JOB_PIPELINE,
};
pub use retry::{read_star, StarReadError};
pub use star::{Block, Record, StarDoc, StarError, Table};
pub use state::{sentinel, JobState, ProcessStatus};
