// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented STAR reader.

use indexmap::IndexMap;

use super::{Block, Record, StarDoc, StarError, Table};

/// What the reader is currently filling.
enum Section {
    /// Just after `data_`, nothing seen yet.
    Empty,
    Record(Record),
    /// Inside `loop_`, still reading `_column` declarations.
    LoopHeader(Table),
    /// Inside `loop_`, reading value rows.
    LoopRows(Table),
}

impl Section {
    fn into_block(self) -> Block {
        match self {
            Section::Empty => Block::Record(IndexMap::new()),
            Section::Record(r) => Block::Record(r),
            Section::LoopHeader(t) | Section::LoopRows(t) => Block::Loop(t),
        }
    }
}

pub(super) fn parse(text: &str) -> Result<StarDoc, StarError> {
    let mut doc = StarDoc::new();
    let mut current: Option<(String, Section)> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let tokens = tokenize(line, line_no)?;
        let Some(head) = tokens.first() else {
            continue;
        };
        // Keywords and keys are only recognized unquoted
        let first = head.text.as_str();
        let bare = !head.quoted;

        if let Some(name) = first.strip_prefix("data_").filter(|_| bare) {
            if let Some((prev, section)) = current.take() {
                doc.insert(prev, section.into_block());
            }
            current = Some((name.to_string(), Section::Empty));
            continue;
        }

        let Some((_, section)) = current.as_mut() else {
            return Err(StarError::syntax(line_no, "content before the first data_ block"));
        };

        if bare && first == "loop_" {
            match section {
                Section::Empty => *section = Section::LoopHeader(Table::default()),
                _ => {
                    return Err(StarError::syntax(line_no, "loop_ must start its own data block"))
                }
            }
            continue;
        }

        if let Some(key) = first.strip_prefix('_').filter(|_| bare) {
            match section {
                Section::LoopHeader(table) => table.columns.push(key.to_string()),
                Section::LoopRows(_) => {
                    return Err(StarError::syntax(
                        line_no,
                        format!("column _{key} declared after loop rows"),
                    ))
                }
                Section::Empty | Section::Record(_) => {
                    let Some(value) = tokens.get(1) else {
                        return Err(StarError::syntax(line_no, format!("_{key} has no value")));
                    };
                    if matches!(section, Section::Empty) {
                        *section = Section::Record(IndexMap::new());
                    }
                    if let Section::Record(record) = section {
                        record.insert(key.to_string(), value.text.clone());
                    }
                }
            }
            continue;
        }

        match std::mem::replace(section, Section::Empty) {
            Section::LoopHeader(mut table) | Section::LoopRows(mut table) => {
                if tokens.len() != table.columns.len() {
                    return Err(StarError::syntax(
                        line_no,
                        format!(
                            "row has {} values but the loop declares {} columns",
                            tokens.len(),
                            table.columns.len()
                        ),
                    ));
                }
                table.rows.push(tokens.into_iter().map(|t| t.text).collect());
                *section = Section::LoopRows(table);
            }
            Section::Empty | Section::Record(_) => {
                return Err(StarError::syntax(line_no, format!("unexpected value '{first}'")));
            }
        }
    }

    if let Some((name, section)) = current {
        doc.insert(name, section.into_block());
    }
    Ok(doc)
}

/// A whitespace-delimited word, remembering whether it was quoted.
struct Token {
    text: String,
    quoted: bool,
}

/// Split one line into whitespace-separated tokens, honouring single and
/// double quotes. An unquoted `#` starts a comment.
fn tokenize(line: &str, line_no: usize) -> Result<Vec<Token>, StarError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '#' {
            break;
        }
        if ch == '"' || ch == '\'' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                // A quote only closes the value when followed by whitespace or EOL
                if c == ch && chars.peek().map_or(true, |n| n.is_whitespace()) {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                return Err(StarError::syntax(line_no, "unterminated quoted value"));
            }
            tokens.push(Token { text: value, quoted: true });
            continue;
        }
        let mut value = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            value.push(c);
            chars.next();
        }
        tokens.push(Token { text: value, quoted: false });
    }
    Ok(tokens)
}
