// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! STAR writer producing the layout RELION itself writes.

use std::fmt::{self, Write};

use super::{Block, Record, StarDoc, Table};

/// Version comment RELION puts in front of every block.
pub const VERSION_COMMENT: &str = "# version 50001";

pub(super) fn write_doc(doc: &StarDoc, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (name, block) in doc.blocks() {
        writeln!(f)?;
        writeln!(f, "{VERSION_COMMENT}")?;
        writeln!(f)?;
        writeln!(f, "data_{name}")?;
        writeln!(f)?;
        match block {
            Block::Record(record) => write_record(record, f)?,
            Block::Loop(table) => write_table(table, f)?,
        }
        writeln!(f)?;
    }
    Ok(())
}

fn write_record(record: &Record, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let width = record.keys().map(String::len).max().unwrap_or(0) + 1;
    for (key, value) in record {
        writeln!(f, "_{key:<width$} {}", quote(value))?;
    }
    Ok(())
}

fn write_table(table: &Table, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "loop_ ")?;
    for (i, column) in table.columns().iter().enumerate() {
        writeln!(f, "_{column} #{}", i + 1)?;
    }
    for row in table.raw_rows() {
        let mut line = String::new();
        for value in row {
            write!(line, "{} ", quote(value))?;
        }
        writeln!(f, "{}", line.trim_end())?;
    }
    Ok(())
}

/// True if the quote `q` would end a quoted token early inside `value`.
fn closes_early(value: &str, q: char) -> bool {
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == q && chars.peek().map_or(true, |n| n.is_whitespace()) {
            return true;
        }
    }
    false
}

fn delimiter(value: &str) -> Option<char> {
    ['"', '\''].into_iter().find(|&q| !closes_early(value, q))
}

/// True if `value` reads back unchanged once written. Values holding both a
/// `"` and a `'` that end a word cannot be quoted either way.
pub fn is_writable(value: &str) -> bool {
    delimiter(value).is_some()
}

/// Quote a value if it would not survive tokenization bare.
///
/// Callers check [`is_writable`] first; an unwritable value is emitted
/// double-quoted and fails to read back.
pub(crate) fn quote(value: &str) -> std::borrow::Cow<'_, str> {
    let needs_quotes = value.is_empty()
        || value.chars().any(char::is_whitespace)
        || value.starts_with(['_', '#', '"', '\''])
        || value.starts_with("data_")
        || value == "loop_";
    if !needs_quotes {
        return value.into();
    }
    let q = delimiter(value).unwrap_or('"');
    format!("{q}{value}{q}").into()
}
