// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rln-engine: relion_pipeliner adapter, job scheduling and filesystem watchers

pub mod pipeliner;
pub mod scheduler;
pub mod watch;

pub use pipeliner::{CommandOutput, Pipeliner, PipelinerError, RelionPipeliner, RunHandle, PIPELINER_TIMEOUT};
pub use scheduler::{EditMode, Launch, Scheduler, SchedulerError};
pub use watch::{
    classify, pump, Change, ChangeKind, Coalescer, JobUpdate, JobUpdateHandler, JobWatcher, PipelineUpdated,
    PipelineWatcher, WatchError, WatchHandle,
};

#[cfg(any(test, feature = "test-support"))]
pub use pipeliner::{FakePipeliner, PipelinerCall};
