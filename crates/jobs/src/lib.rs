// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rln-jobs: RELION job classes, parameter schemas, dispatch and next-job suggestions

pub mod class;
pub mod classes;
pub mod connection;
pub mod environment;
pub mod registry;
pub mod schema;

pub use class::{ClassRef, JobClass, CONTINUE_SUFFIX};
pub use connection::{latest_iteration, latest_optimiser, Connection, NodeSource, Suggestion};
pub use environment::{EnvKey, Environment, Executable, QUEUE_VARS};
pub use registry::{CommandEntry, Registry, TypedJob};
pub use schema::{DefaultValue, Field, ParamKind, ParamSpec};
