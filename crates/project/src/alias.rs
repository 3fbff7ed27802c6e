// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alias naming rules and the `"<Group>/<alias>/"` pipeline label.

use thiserror::Error;

use rln_core::id::JOB_DIR_PREFIX;

/// Characters that may not appear in an alias.
pub const FORBIDDEN_CHARS: &str = "*?()/\"\\|#<>&%{}$";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AliasError {
    #[error("alias must not be empty")]
    Empty,
    #[error("alias '{0}' is reserved")]
    Reserved(String),
    #[error("alias '{0}' must not start with 'job'")]
    JobPrefix(String),
    #[error("alias '{alias}' must not contain '{ch}'")]
    ForbiddenChar { alias: String, ch: char },
    #[error("alias '{0}' already exists in this group")]
    Exists(String),
}

impl AliasError {
    /// Short name of the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            AliasError::Empty => "empty",
            AliasError::Reserved(_) => "reserved name",
            AliasError::JobPrefix(_) => "starts with job",
            AliasError::ForbiddenChar { .. } => "invalid characters",
            AliasError::Exists(_) => "already exists",
        }
    }
}

/// Check `alias` against the naming rules. Existence is checked by the caller.
pub fn validate_alias(alias: &str) -> Result<(), AliasError> {
    if alias.is_empty() {
        return Err(AliasError::Empty);
    }
    if alias == "." || alias == ".." {
        return Err(AliasError::Reserved(alias.to_string()));
    }
    if alias.starts_with(JOB_DIR_PREFIX) {
        return Err(AliasError::JobPrefix(alias.to_string()));
    }
    if let Some(ch) = alias.chars().find(|c| FORBIDDEN_CHARS.contains(*c)) {
        return Err(AliasError::ForbiddenChar { alias: alias.to_string(), ch });
    }
    Ok(())
}

/// Value stored in the pipeline's alias column.
pub fn alias_label(group: &str, alias: &str) -> String {
    format!("{group}/{alias}/")
}

/// Bare alias name from a pipeline alias label.
pub fn alias_name(label: &str) -> &str {
    let trimmed = label.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
#[path = "alias_tests.rs"]
mod tests;
