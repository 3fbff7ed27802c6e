// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed parameter values and their `job.star` string encoding.
//!
//! On disk every option is a string. Booleans are `Yes`/`No`, paths are
//! their string form, other scalars use their canonical textual form and
//! `None` is the empty string.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Keyword arguments of a job class, in declaration order.
pub type Kwargs = IndexMap<String, ParamValue>;

/// Scalar type of a parameter or of the elements of a tuple parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Str,
    Path,
}

crate::simple_display! {
    ParamType {
        Bool => "Yes/No",
        Int => "integer",
        Float => "number",
        Str => "string",
        Path => "path",
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid value '{value}' for {name}: expected {expected}")]
    InvalidValue { name: String, value: String, expected: ParamType },
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("{name} takes {expected} values, got {got}")]
    Arity { name: String, expected: usize, got: usize },
    #[error("value of {name} mixes quote characters and cannot be written: {value}")]
    Unwritable { name: String, value: String },
}

/// A typed job parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    Tuple(Vec<ParamValue>),
    Composite(IndexMap<String, ParamValue>),
}

impl ParamValue {
    /// String form written to `job.star`.
    pub fn encode(&self) -> String {
        match self {
            ParamValue::None => String::new(),
            ParamValue::Bool(true) => "Yes".to_string(),
            ParamValue::Bool(false) => "No".to_string(),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Float(v) => v.to_string(),
            ParamValue::Str(s) => s.clone(),
            ParamValue::Path(p) => p.display().to_string(),
            ParamValue::Tuple(items) => {
                items.iter().map(ParamValue::encode).collect::<Vec<_>>().join(",")
            }
            ParamValue::Composite(fields) => {
                fields.values().map(ParamValue::encode).collect::<Vec<_>>().join(",")
            }
        }
    }

    /// Parse the on-disk string of parameter `name` as `ty`.
    ///
    /// An empty string decodes to `None` except for strings, which stay
    /// empty strings.
    pub fn decode(name: &str, raw: &str, ty: ParamType) -> Result<Self, ParamError> {
        let raw = raw.trim();
        let invalid = || ParamError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            expected: ty,
        };
        if raw.is_empty() {
            return Ok(match ty {
                ParamType::Str => ParamValue::Str(String::new()),
                _ => ParamValue::None,
            });
        }
        match ty {
            ParamType::Bool => match raw.to_ascii_lowercase().as_str() {
                "yes" | "true" | "1" => Ok(ParamValue::Bool(true)),
                "no" | "false" | "0" => Ok(ParamValue::Bool(false)),
                _ => Err(invalid()),
            },
            ParamType::Int => match raw.parse::<i64>() {
                Ok(v) => Ok(ParamValue::Int(v)),
                // RELION sometimes writes integral options as "5.0"
                Err(_) => raw
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| ParamValue::Int(f as i64))
                    .ok_or_else(invalid),
            },
            ParamType::Float => raw.parse::<f64>().map(ParamValue::Float).map_err(|_| invalid()),
            ParamType::Str => Ok(ParamValue::Str(raw.to_string())),
            ParamType::Path => Ok(ParamValue::Path(PathBuf::from(raw))),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ParamValue::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::Path(p) => p.to_str(),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&IndexMap<String, ParamValue>> {
        match self {
            ParamValue::Composite(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<PathBuf> for ParamValue {
    fn from(v: PathBuf) -> Self {
        ParamValue::Path(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::None, Into::into)
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
