// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed model of `default_pipeline.star` and `job_pipeline.star`.
//!
//! Both files share one schema: a freeform `pipeline_general` record plus
//! four tables (processes, nodes, input edges, output edges). The per-job
//! file is simply restricted to a single process.

use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::{is_job_dir_name, JobId};
use crate::retry::{read_star, StarReadError};
use crate::star::{Block, Record, StarDoc, StarError, Table};
use crate::state::ProcessStatus;

/// File name of the project-level pipeline.
pub const DEFAULT_PIPELINE: &str = "default_pipeline.star";

/// File name of the per-job pipeline.
pub const JOB_PIPELINE: &str = "job_pipeline.star";

/// Block and column names.
pub mod schema {
    pub const GENERAL: &str = "pipeline_general";
    pub const PROCESSES: &str = "pipeline_processes";
    pub const NODES: &str = "pipeline_nodes";
    pub const INPUT_EDGES: &str = "pipeline_input_edges";
    pub const OUTPUT_EDGES: &str = "pipeline_output_edges";

    pub const PROCESS_NAME: &str = "rlnPipeLineProcessName";
    pub const PROCESS_ALIAS: &str = "rlnPipeLineProcessAlias";
    pub const PROCESS_TYPE: &str = "rlnPipeLineProcessTypeLabel";
    pub const PROCESS_STATUS: &str = "rlnPipeLineProcessStatusLabel";

    pub const NODE_NAME: &str = "rlnPipeLineNodeName";
    pub const NODE_TYPE: &str = "rlnPipeLineNodeTypeLabel";
    pub const NODE_DEPTH: &str = "rlnPipeLineNodeTypeLabelDepth";

    pub const EDGE_FROM_NODE: &str = "rlnPipeLineEdgeFromNode";
    pub const EDGE_PROCESS: &str = "rlnPipeLineEdgeProcess";
    pub const EDGE_TO_NODE: &str = "rlnPipeLineEdgeToNode";

    /// Alias value RELION writes for "no alias".
    pub const NO_ALIAS: &str = "None";
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed pipeline: {0}")]
    Malformed(String),
    #[error("unknown process: {0}")]
    UnknownProcess(JobId),
    #[error("failed to read pipeline {}: {source}", path.display())]
    Io { path: std::path::PathBuf, source: std::io::Error },
}

impl From<StarError> for PipelineError {
    fn from(e: StarError) -> Self {
        PipelineError::Malformed(e.to_string())
    }
}

impl From<StarReadError> for PipelineError {
    fn from(e: StarReadError) -> Self {
        match e {
            StarReadError::Io { path, source } => PipelineError::Io { path, source },
            other => PipelineError::Malformed(other.to_string()),
        }
    }
}

impl PipelineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// One row of `pipeline_processes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRow {
    pub name: JobId,
    pub alias: Option<String>,
    pub type_label: String,
    pub status: ProcessStatus,
}

/// One row of `pipeline_nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    pub name: String,
    pub type_label: String,
    pub depth: u32,
}

/// "Process consumes node".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEdge {
    pub from_node: String,
    pub process: JobId,
}

/// "Process produces node".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputEdge {
    pub process: JobId,
    pub to_node: String,
}

/// Upstream and downstream processes of one process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DagEntry {
    pub inputs: Vec<JobId>,
    pub outputs: Vec<JobId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub general: Record,
    pub processes: Vec<ProcessRow>,
    pub nodes: Vec<NodeRow>,
    pub input_edges: Vec<InputEdge>,
    pub output_edges: Vec<OutputEdge>,
}

fn required(table: &Table, block: &str, columns: &[&str]) -> Result<(), PipelineError> {
    for column in columns {
        if !table.has_column(column) {
            return Err(PipelineError::Malformed(format!("{block} is missing column {column}")));
        }
    }
    Ok(())
}

fn cell<'r>(row: &crate::star::Row<'r>, column: &str) -> &'r str {
    row.get(column).unwrap_or_default()
}

impl Pipeline {
    pub fn parse(text: &str) -> Result<Self, PipelineError> {
        Self::from_doc(&StarDoc::parse(text)?)
    }

    /// Read a pipeline file, retrying while it is being rewritten.
    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        Self::from_doc(&read_star(path)?)
    }

    pub fn from_doc(doc: &StarDoc) -> Result<Self, PipelineError> {
        use schema::*;

        let general = doc.record(GENERAL).cloned().unwrap_or_default();

        let processes_table = doc
            .table(PROCESSES)
            .ok_or_else(|| PipelineError::Malformed(format!("missing {PROCESSES} block")))?;
        required(
            processes_table,
            PROCESSES,
            &[PROCESS_NAME, PROCESS_ALIAS, PROCESS_TYPE, PROCESS_STATUS],
        )?;
        let mut processes: Vec<ProcessRow> = Vec::with_capacity(processes_table.len());
        for row in processes_table.rows() {
            let name = JobId::new(cell(&row, PROCESS_NAME));
            if processes.iter().any(|p| p.name == name) {
                return Err(PipelineError::Malformed(format!("duplicate process {name}")));
            }
            let alias = cell(&row, PROCESS_ALIAS);
            let status = cell(&row, PROCESS_STATUS);
            processes.push(ProcessRow {
                name,
                alias: (!alias.is_empty() && alias != NO_ALIAS).then(|| alias.to_string()),
                type_label: cell(&row, PROCESS_TYPE).to_string(),
                status: status.parse().map_err(PipelineError::Malformed)?,
            });
        }

        let mut nodes = Vec::new();
        if let Some(table) = doc.table(NODES) {
            required(table, NODES, &[NODE_NAME, NODE_TYPE])?;
            for row in table.rows() {
                nodes.push(NodeRow {
                    name: cell(&row, NODE_NAME).to_string(),
                    type_label: cell(&row, NODE_TYPE).to_string(),
                    depth: row.get(NODE_DEPTH).and_then(|d| d.parse().ok()).unwrap_or(1),
                });
            }
        }

        let mut input_edges = Vec::new();
        if let Some(table) = doc.table(INPUT_EDGES) {
            required(table, INPUT_EDGES, &[EDGE_FROM_NODE, EDGE_PROCESS])?;
            for row in table.rows() {
                input_edges.push(InputEdge {
                    from_node: cell(&row, EDGE_FROM_NODE).to_string(),
                    process: JobId::new(cell(&row, EDGE_PROCESS)),
                });
            }
        }

        let mut output_edges = Vec::new();
        if let Some(table) = doc.table(OUTPUT_EDGES) {
            required(table, OUTPUT_EDGES, &[EDGE_PROCESS, EDGE_TO_NODE])?;
            for row in table.rows() {
                output_edges.push(OutputEdge {
                    process: JobId::new(cell(&row, EDGE_PROCESS)),
                    to_node: cell(&row, EDGE_TO_NODE).to_string(),
                });
            }
        }

        Ok(Self { general, processes, nodes, input_edges, output_edges })
    }

    pub fn to_doc(&self) -> StarDoc {
        use schema::*;

        let mut doc = StarDoc::new();
        if !self.general.is_empty() {
            doc.insert(GENERAL, Block::Record(self.general.clone()));
        }

        let mut processes =
            Table::new([PROCESS_NAME, PROCESS_ALIAS, PROCESS_TYPE, PROCESS_STATUS]);
        for p in &self.processes {
            processes.push_row([
                p.name.to_string(),
                p.alias.clone().unwrap_or_else(|| NO_ALIAS.to_string()),
                p.type_label.clone(),
                p.status.to_string(),
            ]);
        }
        doc.insert(PROCESSES, Block::Loop(processes));

        let mut nodes = Table::new([NODE_NAME, NODE_TYPE, NODE_DEPTH]);
        for n in &self.nodes {
            nodes.push_row([n.name.clone(), n.type_label.clone(), n.depth.to_string()]);
        }
        doc.insert(NODES, Block::Loop(nodes));

        let mut inputs = Table::new([EDGE_FROM_NODE, EDGE_PROCESS]);
        for e in &self.input_edges {
            inputs.push_row([e.from_node.clone(), e.process.to_string()]);
        }
        doc.insert(INPUT_EDGES, Block::Loop(inputs));

        let mut outputs = Table::new([EDGE_PROCESS, EDGE_TO_NODE]);
        for e in &self.output_edges {
            outputs.push_row([e.process.to_string(), e.to_node.clone()]);
        }
        doc.insert(OUTPUT_EDGES, Block::Loop(outputs));

        doc
    }

    pub fn serialize(&self) -> String {
        self.to_doc().to_string()
    }

    pub fn process(&self, name: &str) -> Option<&ProcessRow> {
        let id = JobId::new(name);
        self.processes.iter().find(|p| p.name == id)
    }

    fn process_mut(&mut self, name: &str) -> Option<&mut ProcessRow> {
        let id = JobId::new(name);
        self.processes.iter_mut().find(|p| p.name == id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.process(name).is_some()
    }

    pub fn status_of(&self, name: &str) -> Option<ProcessStatus> {
        self.process(name).map(|p| p.status)
    }

    /// The most recently appended process.
    pub fn latest_process(&self) -> Option<&ProcessRow> {
        self.processes.last()
    }

    /// Returns whether a row was matched.
    pub fn update_process_status(&mut self, name: &str, status: ProcessStatus) -> bool {
        match self.process_mut(name) {
            Some(row) => {
                row.status = status;
                true
            }
            None => false,
        }
    }

    /// Returns whether a row was matched.
    pub fn update_process_alias(&mut self, name: &str, alias: Option<&str>) -> bool {
        match self.process_mut(name) {
            Some(row) => {
                row.alias = alias.map(str::to_string);
                true
            }
            None => false,
        }
    }

    /// Append a process row. Returns false if the name is already present.
    pub fn add_process(&mut self, row: ProcessRow) -> bool {
        if self.contains(row.name.as_str()) {
            return false;
        }
        self.processes.push(row);
        true
    }

    /// Record that `process` produces `node`. Idempotent.
    pub fn append_output(&mut self, process: &str, node: &str, type_label: &str) {
        let process = JobId::new(process);
        if !self.nodes.iter().any(|n| n.name == node) {
            self.nodes.push(NodeRow {
                name: node.to_string(),
                type_label: type_label.to_string(),
                depth: 1,
            });
        }
        let edge = OutputEdge { process, to_node: node.to_string() };
        if !self.output_edges.contains(&edge) {
            self.output_edges.push(edge);
        }
    }

    /// Record that `process` consumes `node`. Idempotent.
    pub fn append_input(&mut self, node: &str, process: &str, type_label: &str) {
        if !self.nodes.iter().any(|n| n.name == node) {
            self.nodes.push(NodeRow {
                name: node.to_string(),
                type_label: type_label.to_string(),
                depth: 1,
            });
        }
        let edge = InputEdge { from_node: node.to_string(), process: JobId::new(process) };
        if !self.input_edges.contains(&edge) {
            self.input_edges.push(edge);
        }
    }

    /// Nodes consumed by `process`.
    pub fn inputs_of(&self, process: &str) -> Vec<&str> {
        let id = JobId::new(process);
        self.input_edges.iter().filter(|e| e.process == id).map(|e| e.from_node.as_str()).collect()
    }

    /// Nodes produced by `process`.
    pub fn outputs_of(&self, process: &str) -> Vec<&str> {
        let id = JobId::new(process);
        self.output_edges.iter().filter(|e| e.process == id).map(|e| e.to_node.as_str()).collect()
    }

    /// The job whose directory contains `node`, judged by its path prefix.
    pub fn node_owner(node: &str) -> Option<JobId> {
        let mut parts = node.split('/').filter(|p| !p.is_empty());
        let group = parts.next()?;
        let job = parts.next()?;
        is_job_dir_name(job).then(|| JobId::from_parts(group, job))
    }

    /// Process producing `node`: the output edge if one exists, otherwise the
    /// job directory that contains it.
    fn producer_of(&self, node: &str) -> Option<JobId> {
        self.output_edges
            .iter()
            .find(|e| e.to_node == node)
            .map(|e| e.process.clone())
            .or_else(|| Self::node_owner(node))
    }

    /// Process-level DAG: edge `p1 → p2` iff a node is output of `p1` and
    /// input of `p2`. Computed on demand.
    pub fn build_dag(&self) -> IndexMap<JobId, DagEntry> {
        let mut dag: IndexMap<JobId, DagEntry> =
            self.processes.iter().map(|p| (p.name.clone(), DagEntry::default())).collect();

        for edge in &self.input_edges {
            let Some(producer) = self.producer_of(&edge.from_node) else {
                continue;
            };
            if producer == edge.process || !dag.contains_key(&producer) {
                continue;
            }
            if let Some(entry) = dag.get_mut(&edge.process) {
                if !entry.inputs.contains(&producer) {
                    entry.inputs.push(producer.clone());
                }
            }
            if let Some(entry) = dag.get_mut(&producer) {
                if !entry.outputs.contains(&edge.process) {
                    entry.outputs.push(edge.process.clone());
                }
            }
        }
        dag
    }

    /// `target` plus every process that (transitively) consumes a node
    /// produced inside the set.
    pub fn downstream_closure(&self, target: &JobId) -> IndexSet<JobId> {
        let mut closure = IndexSet::new();
        closure.insert(target.clone());
        loop {
            let mut added = false;
            for edge in &self.input_edges {
                if closure.contains(&edge.process) {
                    continue;
                }
                let from_closure =
                    self.producer_of(&edge.from_node).is_some_and(|p| closure.contains(&p));
                if from_closure {
                    closure.insert(edge.process.clone());
                    added = true;
                }
            }
            if !added {
                return closure;
            }
        }
    }

    /// Drop `removed` processes together with their nodes and every edge
    /// touching them.
    pub fn remove_processes(&mut self, removed: &IndexSet<JobId>) {
        let owned_by_removed =
            |node: &str| Self::node_owner(node).is_some_and(|owner| removed.contains(&owner));
        let produced_by_removed: IndexSet<String> = self
            .output_edges
            .iter()
            .filter(|e| removed.contains(&e.process))
            .map(|e| e.to_node.clone())
            .collect();

        self.processes.retain(|p| !removed.contains(&p.name));
        self.nodes.retain(|n| !owned_by_removed(&n.name) && !produced_by_removed.contains(&n.name));
        self.input_edges.retain(|e| {
            !removed.contains(&e.process)
                && !owned_by_removed(&e.from_node)
                && !produced_by_removed.contains(&e.from_node)
        });
        self.output_edges.retain(|e| !removed.contains(&e.process));
    }

    /// The rows of `process` alone: its process row, every edge touching it
    /// and the nodes those edges name. This is the shape of `job_pipeline.star`.
    pub fn restrict_to(&self, process: &JobId) -> Pipeline {
        let input_edges: Vec<InputEdge> =
            self.input_edges.iter().filter(|e| &e.process == process).cloned().collect();
        let output_edges: Vec<OutputEdge> =
            self.output_edges.iter().filter(|e| &e.process == process).cloned().collect();
        let named = |node: &str| {
            input_edges.iter().any(|e| e.from_node == node)
                || output_edges.iter().any(|e| e.to_node == node)
        };
        Pipeline {
            general: self.general.clone(),
            processes: self.processes.iter().filter(|p| &p.name == process).cloned().collect(),
            nodes: self.nodes.iter().filter(|n| named(&n.name)).cloned().collect(),
            input_edges: input_edges.clone(),
            output_edges: output_edges.clone(),
        }
    }

    /// Append rows of `other` that are not already present.
    pub fn merge(&mut self, other: &Pipeline) {
        for process in &other.processes {
            self.add_process(process.clone());
        }
        for node in &other.nodes {
            if !self.nodes.iter().any(|n| n.name == node.name) {
                self.nodes.push(node.clone());
            }
        }
        for edge in &other.input_edges {
            if !self.input_edges.contains(edge) {
                self.input_edges.push(edge.clone());
            }
        }
        for edge in &other.output_edges {
            if !self.output_edges.contains(edge) {
                self.output_edges.push(edge.clone());
            }
        }
    }

    /// Stable sort of processes by job number; names without one go last.
    pub fn sort_processes_by_job_number(&mut self) {
        self.processes.sort_by_key(|p| p.name.number().unwrap_or(u32::MAX));
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
