// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod classes;
pub mod job;
pub mod project;
pub mod resolve;
pub mod watch;
