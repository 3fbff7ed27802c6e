// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameter schemas: how one logical parameter maps onto `job.star`
//! variables.
//!
//! A scalar occupies the variable of the same name. A tuple is split over
//! several variables, one per element. A composite is an aggregate of named
//! fields, each stored under its own variable.

use indexmap::IndexMap;
use rln_core::params::{ParamError, ParamType, ParamValue};
use rln_core::Options;
use serde::Serialize;

/// Const-constructible default of a scalar slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
}

impl DefaultValue {
    pub fn to_value(self, ty: ParamType) -> ParamValue {
        match self {
            DefaultValue::None => ParamValue::None,
            DefaultValue::Bool(b) => ParamValue::Bool(b),
            DefaultValue::Int(v) => ParamValue::Int(v),
            DefaultValue::Float(v) => ParamValue::Float(v),
            DefaultValue::Str(s) if ty == ParamType::Path => ParamValue::Path(s.into()),
            DefaultValue::Str(s) => ParamValue::Str(s.to_string()),
        }
    }
}

/// One field of a composite parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Field {
    pub field: &'static str,
    pub var: &'static str,
    pub ty: ParamType,
    pub default: DefaultValue,
}

/// A tuple element: target variable and default.
pub type Slot = (&'static str, DefaultValue);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Scalar(ParamType, DefaultValue),
    Tuple(ParamType, &'static [Slot]),
    Composite(&'static [Field]),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

pub const fn yes_no(name: &'static str, default: bool) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Scalar(ParamType::Bool, DefaultValue::Bool(default)) }
}

pub const fn int(name: &'static str, default: i64) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Scalar(ParamType::Int, DefaultValue::Int(default)) }
}

pub const fn float(name: &'static str, default: f64) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Scalar(ParamType::Float, DefaultValue::Float(default)) }
}

pub const fn text(name: &'static str, default: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Scalar(ParamType::Str, DefaultValue::Str(default)) }
}

/// A path parameter, empty by default.
pub const fn path(name: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Scalar(ParamType::Path, DefaultValue::None) }
}

pub const fn tuple(name: &'static str, ty: ParamType, slots: &'static [Slot]) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Tuple(ty, slots) }
}

pub const fn composite(name: &'static str, fields: &'static [Field]) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Composite(fields) }
}

/// GPU device ids in RELION's `0:1` form. Empty means CPU only.
pub const fn gpu_ids() -> ParamSpec {
    text("gpu_ids", "")
}

impl ParamSpec {
    /// Variables this parameter occupies in `job.star`.
    pub fn vars(&self) -> Vec<&'static str> {
        match self.kind {
            ParamKind::Scalar(..) => vec![self.name],
            ParamKind::Tuple(_, slots) => slots.iter().map(|(var, _)| *var).collect(),
            ParamKind::Composite(fields) => fields.iter().map(|f| f.var).collect(),
        }
    }

    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Scalar(ty, default) => default.to_value(ty),
            ParamKind::Tuple(ty, slots) => {
                ParamValue::Tuple(slots.iter().map(|(_, d)| d.to_value(ty)).collect())
            }
            ParamKind::Composite(fields) => ParamValue::Composite(
                fields.iter().map(|f| (f.field.to_string(), f.default.to_value(f.ty))).collect(),
            ),
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        match self.kind {
            ParamKind::Composite(fields) => fields.iter().find(|f| f.field == name),
            _ => None,
        }
    }

    /// Write `value` into `out` under this parameter's variables.
    pub fn encode(&self, value: &ParamValue, out: &mut Options) -> Result<(), ParamError> {
        match (self.kind, value) {
            (ParamKind::Scalar(..), ParamValue::Tuple(_) | ParamValue::Composite(_)) => {
                Err(self.invalid(value))
            }
            (ParamKind::Scalar(..), value) => {
                out.insert(self.name.to_string(), value.encode());
                Ok(())
            }
            (ParamKind::Tuple(_, slots), ParamValue::Tuple(items)) => {
                if items.len() != slots.len() {
                    return Err(ParamError::Arity {
                        name: self.name.to_string(),
                        expected: slots.len(),
                        got: items.len(),
                    });
                }
                for ((var, _), item) in slots.iter().zip(items) {
                    out.insert(var.to_string(), item.encode());
                }
                Ok(())
            }
            (ParamKind::Composite(fields), ParamValue::Composite(given)) => {
                if let Some(unknown) = given.keys().find(|k| self.field(k).is_none()) {
                    return Err(ParamError::UnknownParameter(format!("{}.{unknown}", self.name)));
                }
                for f in fields {
                    let value = given.get(f.field).cloned().unwrap_or_else(|| f.default.to_value(f.ty));
                    out.insert(f.var.to_string(), value.encode());
                }
                Ok(())
            }
            _ => Err(self.invalid(value)),
        }
    }

    /// Read this parameter back from `options`. Missing variables take
    /// their defaults.
    pub fn decode(&self, options: &Options) -> Result<ParamValue, ParamError> {
        let read = |var: &str, ty: ParamType, default: DefaultValue| match options.get(var) {
            Some(raw) => ParamValue::decode(var, raw, ty),
            None => Ok(default.to_value(ty)),
        };
        match self.kind {
            ParamKind::Scalar(ty, default) => read(self.name, ty, default),
            ParamKind::Tuple(ty, slots) => slots
                .iter()
                .map(|&(var, default)| read(var, ty, default))
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Tuple),
            ParamKind::Composite(fields) => fields
                .iter()
                .map(|f| read(f.var, f.ty, f.default).map(|v| (f.field.to_string(), v)))
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(ParamValue::Composite),
        }
    }

    /// Parse a command-line value: tuples are comma separated, composite
    /// fields are addressed as `name.field`.
    pub fn parse(&self, field: Option<&str>, raw: &str) -> Result<ParamValue, ParamError> {
        match (self.kind, field) {
            (ParamKind::Scalar(ty, _), None) => ParamValue::decode(self.name, raw, ty),
            (ParamKind::Tuple(ty, slots), None) => {
                let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
                if parts.len() != slots.len() {
                    return Err(ParamError::Arity {
                        name: self.name.to_string(),
                        expected: slots.len(),
                        got: parts.len(),
                    });
                }
                parts
                    .iter()
                    .map(|p| ParamValue::decode(self.name, p, ty))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ParamValue::Tuple)
            }
            (ParamKind::Composite(_), Some(name)) => {
                let f = self
                    .field(name)
                    .ok_or_else(|| ParamError::UnknownParameter(format!("{}.{name}", self.name)))?;
                ParamValue::decode(f.var, raw, f.ty)
            }
            (_, Some(name)) => Err(ParamError::UnknownParameter(format!("{}.{name}", self.name))),
            (ParamKind::Composite(_), None) => Err(ParamError::InvalidValue {
                name: self.name.to_string(),
                value: raw.to_string(),
                expected: ParamType::Str,
            }),
        }
    }

    fn invalid(&self, value: &ParamValue) -> ParamError {
        let expected = match self.kind {
            ParamKind::Scalar(ty, _) | ParamKind::Tuple(ty, _) => ty,
            ParamKind::Composite(_) => ParamType::Str,
        };
        ParamError::InvalidValue { name: self.name.to_string(), value: value.encode(), expected }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
