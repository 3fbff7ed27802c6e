// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job classes as static method tables.
//!
//! A [`JobClass`] describes one RELION job type: its label, its parameter
//! schema and the hooks that translate between typed keyword arguments and
//! the strings of `job.star`. A [`ClassRef`] pairs a class with the
//! continue flag.

use rln_core::params::{Kwargs, ParamError, ParamValue};
use rln_core::{JobStar, Options};

use crate::environment::{EnvKey, Environment};
use crate::schema::ParamSpec;

/// Extra dispatch predicate over the raw options.
pub type ParamMatcher = fn(&Options) -> bool;

/// Rewrite applied to the encoded options, e.g. derived flags.
pub type NormalizeHook = fn(&mut Options);

/// Inverse rewrite applied to decoded kwargs.
pub type InverseHook = fn(&Options, &mut Kwargs);

#[derive(Debug)]
pub struct JobClass {
    pub type_label: &'static str,
    pub is_tomo: bool,
    pub command_id: &'static str,
    pub title: &'static str,
    pub model_type: &'static str,
    pub params: &'static [ParamSpec],
    /// Derived variables written by `normalize` and dropped by the inverse.
    pub discarded: &'static [&'static str],
    pub env_keys: &'static [EnvKey],
    pub param_matches: ParamMatcher,
    pub normalize: Option<NormalizeHook>,
    pub normalize_inv: Option<InverseHook>,
    pub continuable: bool,
}

/// Matches every option set.
pub fn any_options(_: &Options) -> bool {
    true
}

impl JobClass {
    /// Base for struct-update syntax in class definitions.
    pub const BASE: JobClass = JobClass {
        type_label: "",
        is_tomo: false,
        command_id: "",
        title: "",
        model_type: "",
        params: &[],
        discarded: &[],
        env_keys: &[],
        param_matches: any_options,
        normalize: None,
        normalize_inv: None,
        continuable: false,
    };

    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// A class together with its continue flag.
#[derive(Debug, Clone, Copy)]
pub struct ClassRef {
    pub class: &'static JobClass,
    pub is_continue: bool,
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.class.command_id == other.class.command_id && self.is_continue == other.is_continue
    }
}

impl Eq for ClassRef {}

/// Suffix of the command id of a continue variant.
pub const CONTINUE_SUFFIX: &str = ".continue";

impl ClassRef {
    pub const fn new(class: &'static JobClass) -> Self {
        Self { class, is_continue: false }
    }

    pub const fn continued(class: &'static JobClass) -> Self {
        Self { class, is_continue: true }
    }

    pub fn type_label(&self) -> &'static str {
        self.class.type_label
    }

    pub fn job_is_tomo(&self) -> bool {
        self.class.is_tomo
    }

    pub fn param_matches(&self, options: &Options) -> bool {
        (self.class.param_matches)(options)
    }

    pub fn command_id(&self) -> String {
        if self.is_continue {
            format!("{}{CONTINUE_SUFFIX}", self.class.command_id)
        } else {
            self.class.command_id.to_string()
        }
    }

    pub fn title(&self) -> String {
        if self.is_continue {
            format!("{} (continue)", self.class.title)
        } else {
            self.class.title.to_string()
        }
    }

    pub fn model_type(&self) -> &'static str {
        self.class.model_type
    }

    pub fn parameters(&self) -> &'static [ParamSpec] {
        self.class.params
    }

    /// Keys stripped by [`ClassRef::normalize_kwargs_inv`].
    pub fn discarded_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.class.discarded.to_vec();
        keys.extend(self.class.env_keys.iter().flat_map(EnvKey::vars));
        keys
    }

    pub fn default_kwargs(&self) -> Kwargs {
        self.class.params.iter().map(|p| (p.name.to_string(), p.default_value())).collect()
    }

    /// True if `var` is written by a schema parameter or is a discarded key.
    fn owns_var(&self, var: &str) -> bool {
        self.class.params.iter().any(|p| p.name == var || p.vars().iter().any(|v| *v == var))
            || self.discarded_keys().iter().any(|k| *k == var)
    }

    /// Typed kwargs to `job.star` options. Absent kwargs take their schema
    /// defaults.
    ///
    /// Kwargs outside the schema are options RELION writes that no parameter
    /// models. Scalars are written back verbatim; anything else, or a name
    /// clashing with a schema variable, is rejected.
    pub fn normalize_kwargs(&self, kwargs: &Kwargs, env: &Environment) -> Result<Options, ParamError> {
        let mut options = Options::new();
        for spec in self.class.params {
            match kwargs.get(spec.name) {
                Some(value) => spec.encode(value, &mut options)?,
                None => spec.encode(&spec.default_value(), &mut options)?,
            }
        }
        for (name, value) in kwargs.iter().filter(|(k, _)| self.class.param(k).is_none()) {
            if self.owns_var(name) || matches!(value, ParamValue::Tuple(_) | ParamValue::Composite(_)) {
                return Err(ParamError::UnknownParameter(name.clone()));
            }
            options.insert(name.clone(), value.encode());
        }
        if let Some(hook) = self.class.normalize {
            hook(&mut options);
        }
        env.inject(self.class.env_keys, &mut options);
        if let Some((name, value)) = options.iter().find(|(_, v)| !rln_core::star::is_writable(v)) {
            return Err(ParamError::Unwritable { name: name.clone(), value: value.clone() });
        }
        Ok(options)
    }

    /// `job.star` options back to typed kwargs, one entry per schema
    /// parameter plus one string entry per option outside the schema.
    /// Discarded keys are dropped.
    pub fn normalize_kwargs_inv(&self, options: &Options) -> Result<Kwargs, ParamError> {
        let mut kwargs = Kwargs::new();
        for spec in self.class.params {
            kwargs.insert(spec.name.to_string(), spec.decode(options)?);
        }
        if let Some(hook) = self.class.normalize_inv {
            hook(options, &mut kwargs);
        }
        for (name, raw) in options.iter().filter(|(k, _)| !self.owns_var(k)) {
            kwargs.insert(name.clone(), ParamValue::Str(raw.clone()));
        }
        Ok(kwargs)
    }

    pub fn prep_job_star(&self, kwargs: &Kwargs, env: &Environment) -> Result<JobStar, ParamError> {
        Ok(JobStar {
            type_label: self.class.type_label.to_string(),
            is_continue: self.is_continue,
            is_tomo: self.class.is_tomo,
            options: self.normalize_kwargs(kwargs, env)?,
        })
    }

    /// Parse `name=value` pairs from the command line. Composite fields are
    /// addressed as `name.field` and merge into one kwarg.
    pub fn parse_kwargs<'a>(
        &self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Kwargs, ParamError> {
        let mut kwargs = Kwargs::new();
        for (key, raw) in pairs {
            let (name, field) = match key.split_once('.') {
                Some((name, field)) => (name, Some(field)),
                None => (key, None),
            };
            let spec =
                self.class.param(name).ok_or_else(|| ParamError::UnknownParameter(key.to_string()))?;
            let value = spec.parse(field, raw)?;
            match field {
                Some(field) => {
                    let entry = kwargs
                        .entry(name.to_string())
                        .or_insert_with(|| ParamValue::Composite(Default::default()));
                    if let ParamValue::Composite(fields) = entry {
                        fields.insert(field.to_string(), value);
                    }
                }
                None => {
                    kwargs.insert(name.to_string(), value);
                }
            }
        }
        Ok(kwargs)
    }
}

/// Sets `use_gpu` from whether `gpu_ids` is non-empty.
pub fn derive_use_gpu(options: &mut Options) {
    let use_gpu = options.get("gpu_ids").is_some_and(|ids| !ids.trim().is_empty());
    options.insert("use_gpu".into(), if use_gpu { "Yes" } else { "No" }.into());
}

/// Clears `gpu_ids` when the job was written with `use_gpu: No`.
pub fn gpu_ids_from_use_gpu(options: &Options, kwargs: &mut Kwargs) {
    if options.get("use_gpu").is_some_and(|v| v.eq_ignore_ascii_case("no")) {
        kwargs.insert("gpu_ids".into(), ParamValue::Str(String::new()));
    }
}

#[cfg(test)]
#[path = "class_tests.rs"]
mod tests;
