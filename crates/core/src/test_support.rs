// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::pipeline::{Pipeline, ProcessRow};
use crate::state::ProcessStatus;
use crate::JobId;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for pipeline types.
pub mod strategies {
    use crate::pipeline::{InputEdge, NodeRow, OutputEdge, Pipeline, ProcessRow};
    use crate::state::ProcessStatus;
    use crate::JobId;
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = ProcessStatus> {
        prop_oneof![
            Just(ProcessStatus::Scheduled),
            Just(ProcessStatus::Running),
            Just(ProcessStatus::Succeeded),
            Just(ProcessStatus::Failed),
            Just(ProcessStatus::Aborted),
        ]
    }

    fn arb_group() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Import"),
            Just("MotionCorr"),
            Just("CtfFind"),
            Just("Class2D"),
            Just("Class3D"),
            Just("Refine3D"),
        ]
        .prop_map(str::to_string)
    }

    fn arb_file() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,12}\\.(star|mrc|pdf)"
    }

    /// Pipelines with unique process names and edges between their nodes.
    pub fn arb_pipeline() -> impl Strategy<Value = Pipeline> {
        let processes = prop::collection::vec(
            (arb_group(), proptest::option::of("[a-z][a-z0-9_]{0,8}"), arb_status()),
            0..6,
        );
        (processes, prop::collection::vec(arb_file(), 0..6), any::<u64>()).prop_map(
            |(rows, files, seed)| {
                let mut pipeline = Pipeline::default();
                for (i, (group, alias, status)) in rows.into_iter().enumerate() {
                    let name = JobId::from_parts(&group, &format!("job{:03}", i + 1));
                    pipeline.processes.push(ProcessRow {
                        alias: alias.map(|a| format!("{group}/{a}/")),
                        name,
                        type_label: format!("relion.{}", group.to_lowercase()),
                        status,
                    });
                }
                if pipeline.processes.is_empty() {
                    return pipeline;
                }
                let count = pipeline.processes.len();
                for (i, file) in files.into_iter().enumerate() {
                    let producer = pipeline.processes[i % count].name.clone();
                    let consumer =
                        pipeline.processes[(i + (seed as usize % count)) % count].name.clone();
                    let node = format!("{producer}{file}");
                    pipeline.nodes.push(NodeRow {
                        name: node.clone(),
                        type_label: "MicrographGroupMetadata.star.relion".to_string(),
                        depth: 1 + (i as u32 % 2),
                    });
                    pipeline.output_edges.push(OutputEdge { process: producer, to_node: node.clone() });
                    if consumer != pipeline.processes[i % count].name {
                        pipeline.input_edges.push(InputEdge { from_node: node, process: consumer });
                    }
                }
                pipeline
            },
        )
    }
}

// ── Builders ─────────────────────────────────────────────────────────────

/// Fluent builder for pipelines in tests.
#[derive(Default)]
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(mut self, name: &str, type_label: &str, status: ProcessStatus) -> Self {
        self.pipeline.add_process(ProcessRow {
            name: JobId::new(name),
            alias: None,
            type_label: type_label.to_string(),
            status,
        });
        self
    }

    pub fn alias(mut self, name: &str, alias: &str) -> Self {
        self.pipeline.update_process_alias(name, Some(alias));
        self
    }

    pub fn output(mut self, process: &str, node: &str) -> Self {
        self.pipeline.append_output(process, node, "MicrographGroupMetadata.star.relion");
        self
    }

    pub fn input(mut self, node: &str, process: &str) -> Self {
        self.pipeline.append_input(node, process, "MicrographGroupMetadata.star.relion");
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}
