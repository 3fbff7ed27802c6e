// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `job.star`: job type header plus the option variable/value table.

use std::path::Path;

use indexmap::IndexMap;

use crate::pipeline::PipelineError;
use crate::retry::read_star;
use crate::star::{Block, Record, StarDoc, Table};

/// File name of the job options file inside a job directory.
pub const JOB_STAR: &str = "job.star";

pub mod schema {
    pub const JOB: &str = "job";
    pub const OPTIONS: &str = "joboptions_values";

    pub const TYPE_LABEL: &str = "rlnJobTypeLabel";
    pub const IS_CONTINUE: &str = "rlnJobIsContinue";
    pub const IS_TOMO: &str = "rlnJobIsTomo";

    pub const VARIABLE: &str = "rlnJobOptionVariable";
    pub const VALUE: &str = "rlnJobOptionValue";
}

/// Option variables in file order, values as written on disk.
pub type Options = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStar {
    pub type_label: String,
    pub is_continue: bool,
    pub is_tomo: bool,
    pub options: Options,
}

fn flag(record: &Record, key: &str) -> bool {
    matches!(
        record.get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}

impl JobStar {
    pub fn new(type_label: impl Into<String>, is_tomo: bool) -> Self {
        Self { type_label: type_label.into(), is_tomo, ..Self::default() }
    }

    pub fn parse(text: &str) -> Result<Self, PipelineError> {
        Self::from_doc(&StarDoc::parse(text)?)
    }

    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        Self::from_doc(&read_star(path)?)
    }

    pub fn from_doc(doc: &StarDoc) -> Result<Self, PipelineError> {
        use schema::*;

        let job = doc
            .record(JOB)
            .ok_or_else(|| PipelineError::Malformed(format!("missing {JOB} block")))?;
        let type_label = job
            .get(TYPE_LABEL)
            .cloned()
            .ok_or_else(|| PipelineError::Malformed(format!("missing {TYPE_LABEL}")))?;

        let mut options = Options::new();
        if let Some(table) = doc.table(OPTIONS) {
            if !table.has_column(VARIABLE) || !table.has_column(VALUE) {
                return Err(PipelineError::Malformed(format!(
                    "{OPTIONS} must have {VARIABLE} and {VALUE} columns"
                )));
            }
            for row in table.rows() {
                let variable = row.get(VARIABLE).unwrap_or_default();
                let value = row.get(VALUE).unwrap_or_default();
                options.insert(variable.to_string(), value.to_string());
            }
        }

        Ok(Self {
            type_label,
            is_continue: flag(job, IS_CONTINUE),
            is_tomo: flag(job, IS_TOMO),
            options,
        })
    }

    pub fn to_doc(&self) -> StarDoc {
        use schema::*;

        let mut job = Record::new();
        job.insert(TYPE_LABEL.to_string(), self.type_label.clone());
        job.insert(IS_CONTINUE.to_string(), u8::from(self.is_continue).to_string());
        job.insert(IS_TOMO.to_string(), u8::from(self.is_tomo).to_string());

        let mut options = Table::new([VARIABLE, VALUE]);
        for (variable, value) in &self.options {
            options.push_row([variable.as_str(), value.as_str()]);
        }

        let mut doc = StarDoc::new();
        doc.insert(JOB, Block::Record(job));
        doc.insert(OPTIONS, Block::Loop(options));
        doc
    }

    pub fn serialize(&self) -> String {
        self.to_doc().to_string()
    }

    /// Write to `path`, replacing any existing file. Fails with
    /// `InvalidInput` if an option value cannot be quoted.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some((name, _)) = self.options.iter().find(|(_, v)| !crate::star::is_writable(v)) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("value of {name} cannot be quoted"),
            ));
        }
        std::fs::write(path, self.serialize())
    }
}

#[cfg(test)]
#[path = "job_star_tests.rs"]
mod tests;
