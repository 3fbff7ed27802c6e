// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin named-block view over STAR documents.
//!
//! A document is an ordered list of `data_<name>` blocks. Each block is
//! either a record (`_key value` lines) or a loop (a table with named
//! columns). Names are stored without the leading underscore, and loop
//! column declarations drop RELION's trailing `#N` index.
//!
//! Only the subset of the dialect that RELION writes for pipeline and job
//! files is understood: no multi-line text fields, no global blocks.

mod parse;
mod write;

pub use write::is_writable;

use indexmap::IndexMap;
use thiserror::Error;

/// Ordered key/value pairs of a record block.
pub type Record = IndexMap<String, String>;

/// Errors raised while reading STAR text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StarError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl StarError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        StarError::Syntax { line, message: message.into() }
    }
}

/// One `data_` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Record(Record),
    Loop(Table),
}

impl Block {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Block::Record(r) => Some(r),
            Block::Loop(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Loop(t) => Some(t),
            Block::Record(_) => None,
        }
    }
}

/// A loop block: named columns over rows of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row. Short rows are padded with empty strings and long rows
    /// are truncated to the column count.
    pub fn push_row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = values.into_iter().map(Into::into).collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Keep only rows for which `keep` returns true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(Row<'_>) -> bool) {
        let columns = std::mem::take(&mut self.columns);
        let view = Table { columns, rows: Vec::new() };
        self.rows.retain(|values| keep(Row { table: &view, values }));
        self.columns = view.columns;
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row { table: self, values })
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    pub(crate) fn raw_rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Borrowed view of a single table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    values: &'a [String],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.column_index(column)?;
        self.values.get(idx).map(String::as_str)
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// A parsed STAR document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarDoc {
    blocks: IndexMap<String, Block>,
}

impl StarDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, StarError> {
        parse::parse(text)
    }

    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(name)
    }

    pub fn record(&self, name: &str) -> Option<&Record> {
        self.block(name).and_then(Block::as_record)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.block(name).and_then(Block::as_table)
    }

    /// Insert or replace a block, keeping its position if it already existed.
    pub fn insert(&mut self, name: impl Into<String>, block: Block) {
        self.blocks.insert(name.into(), block);
    }

    pub fn blocks(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl std::fmt::Display for StarDoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write::write_doc(self, f)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
