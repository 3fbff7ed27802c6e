// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builtin RELION job classes and the connections between them.

pub mod spa;
pub mod tomo;

use std::path::Path;

use rln_core::params::{ParamType, ParamValue};
use rln_core::{JobStar, Options, JOB_STAR};

use crate::class::{ClassRef, JobClass};
use crate::connection::{latest_class_map, latest_iteration, latest_optimiser, Connection, NodeSource};
use crate::environment::{EnvKey, Executable};
use crate::schema::{tuple, DefaultValue, ParamSpec};

pub const CTFFIND_EXE: Executable =
    Executable { var: "fn_ctffind_exe", env: "RELION_CTFFIND_EXECUTABLE", default: "ctffind" };

pub const IMOD_EXE: Executable =
    Executable { var: "fn_batchtomo_exe", env: "RELION_IMOD_BATCHTOMO_EXECUTABLE", default: "batchruntomo" };

pub const QUEUE: &[EnvKey] = &[EnvKey::Queue];

pub const OFFSET_RANGE_STEP: ParamSpec = tuple(
    "offset_range_step",
    ParamType::Float,
    &[("offset_range", DefaultValue::Float(5.0)), ("offset_step", DefaultValue::Float(1.0))],
);

pub const DEFOCUS_RANGE: ParamSpec = tuple(
    "defocus_range",
    ParamType::Float,
    &[
        ("dfmin", DefaultValue::Float(5000.0)),
        ("dfmax", DefaultValue::Float(50000.0)),
        ("dfstep", DefaultValue::Float(500.0)),
    ],
);

/// Every builtin class, in dispatch order.
pub static ALL: &[&JobClass] = &[
    &spa::IMPORT_MOVIES,
    &spa::MOTIONCORR,
    &spa::CTFFIND,
    &spa::AUTOPICK_LOG,
    &spa::EXTRACT,
    &spa::CLASS2D,
    &spa::INITIAL_MODEL,
    &spa::CLASS3D,
    &spa::REFINE3D,
    &spa::MASK_CREATE,
    &spa::POSTPROCESS,
    &tomo::IMPORT_TOMO,
    &tomo::CTFFIND_TOMO,
    &tomo::ALIGN_FIDUCIALS,
    &tomo::ALIGN_PATCH,
    &tomo::RECONSTRUCT,
    &tomo::EXTRACT_SUBTOMOS,
];

pub static CONNECTIONS: &[Connection] = &[
    Connection {
        pre: &spa::IMPORT_MOVIES,
        post: ClassRef::new(&spa::MOTIONCORR),
        nodes: &[(NodeSource::File("movies.star"), "input_star_mics")],
        values: &[],
    },
    Connection {
        pre: &spa::MOTIONCORR,
        post: ClassRef::new(&spa::CTFFIND),
        nodes: &[(NodeSource::File("corrected_micrographs.star"), "input_star_mics")],
        values: &[],
    },
    Connection {
        pre: &spa::CTFFIND,
        post: ClassRef::new(&spa::AUTOPICK_LOG),
        nodes: &[(NodeSource::File("micrographs_ctf.star"), "fn_input_autopick")],
        values: &[],
    },
    Connection {
        pre: &spa::AUTOPICK_LOG,
        post: ClassRef::new(&spa::EXTRACT),
        nodes: &[(NodeSource::File("autopick.star"), "coords_suffix")],
        values: &[],
    },
    Connection {
        pre: &spa::EXTRACT,
        post: ClassRef::new(&spa::CLASS2D),
        nodes: &[(NodeSource::File("particles.star"), "fn_img")],
        values: &[],
    },
    Connection {
        pre: &spa::EXTRACT,
        post: ClassRef::new(&spa::INITIAL_MODEL),
        nodes: &[(NodeSource::File("particles.star"), "fn_img")],
        values: &[],
    },
    Connection {
        pre: &spa::INITIAL_MODEL,
        post: ClassRef::new(&spa::CLASS3D),
        nodes: &[
            (NodeSource::File("initial_model.mrc"), "fn_ref"),
            (NodeSource::Func(latest_data), "fn_img"),
        ],
        values: &[(symmetry, "sym_name"), (particle_diameter, "particle_diameter")],
    },
    Connection {
        pre: &spa::CLASS3D,
        post: ClassRef::continued(&spa::CLASS3D),
        nodes: &[(NodeSource::Func(latest_optimiser), "fn_cont")],
        values: &[],
    },
    Connection {
        pre: &spa::CLASS3D,
        post: ClassRef::new(&spa::REFINE3D),
        nodes: &[
            (NodeSource::Func(latest_class_map), "fn_ref"),
            (NodeSource::Func(latest_data), "fn_img"),
        ],
        values: &[(symmetry, "sym_name"), (particle_diameter, "particle_diameter")],
    },
    Connection {
        pre: &spa::REFINE3D,
        post: ClassRef::continued(&spa::REFINE3D),
        nodes: &[(NodeSource::Func(latest_optimiser), "fn_cont")],
        values: &[],
    },
    Connection {
        pre: &spa::REFINE3D,
        post: ClassRef::new(&spa::MASK_CREATE),
        nodes: &[(NodeSource::File("run_class001.mrc"), "fn_in")],
        values: &[],
    },
    Connection {
        pre: &spa::REFINE3D,
        post: ClassRef::new(&spa::POSTPROCESS),
        nodes: &[(NodeSource::File("run_half1_class001_unfil.mrc"), "fn_in")],
        values: &[],
    },
    Connection {
        pre: &spa::MASK_CREATE,
        post: ClassRef::new(&spa::POSTPROCESS),
        nodes: &[(NodeSource::File("mask.mrc"), "fn_mask")],
        values: &[],
    },
    Connection {
        pre: &tomo::IMPORT_TOMO,
        post: ClassRef::new(&tomo::CTFFIND_TOMO),
        nodes: &[(NodeSource::File("tilt_series.star"), "input_star_mics")],
        values: &[],
    },
    Connection {
        pre: &tomo::CTFFIND_TOMO,
        post: ClassRef::new(&tomo::ALIGN_FIDUCIALS),
        nodes: &[(NodeSource::File("tilt_series_ctf.star"), "in_tiltseries")],
        values: &[],
    },
    Connection {
        pre: &tomo::CTFFIND_TOMO,
        post: ClassRef::new(&tomo::ALIGN_PATCH),
        nodes: &[(NodeSource::File("tilt_series_ctf.star"), "in_tiltseries")],
        values: &[],
    },
    Connection {
        pre: &tomo::ALIGN_FIDUCIALS,
        post: ClassRef::new(&tomo::RECONSTRUCT),
        nodes: &[(NodeSource::File("aligned_tilt_series.star"), "in_tiltseries")],
        values: &[],
    },
    Connection {
        pre: &tomo::ALIGN_PATCH,
        post: ClassRef::new(&tomo::RECONSTRUCT),
        nodes: &[(NodeSource::File("aligned_tilt_series.star"), "in_tiltseries")],
        values: &[],
    },
    Connection {
        pre: &tomo::RECONSTRUCT,
        post: ClassRef::new(&tomo::EXTRACT_SUBTOMOS),
        nodes: &[(NodeSource::File("tomograms.star"), "optimisation_set.tomograms")],
        values: &[],
    },
];

/// Latest `run_itNNN_data.star`.
pub fn latest_data(dir: &Path) -> Option<String> {
    latest_iteration(dir, "data.star")
}

/// One option of the `job.star` in `dir`.
pub fn job_option(dir: &Path, var: &str) -> Option<String> {
    let job_star = JobStar::read(&dir.join(JOB_STAR)).ok()?;
    job_star.options.get(var).cloned()
}

fn symmetry(dir: &Path) -> Option<ParamValue> {
    job_option(dir, "sym_name").filter(|s| !s.is_empty()).map(ParamValue::Str)
}

fn particle_diameter(dir: &Path) -> Option<ParamValue> {
    ParamValue::decode("particle_diameter", &job_option(dir, "particle_diameter")?, ParamType::Float)
        .ok()
        .filter(|v| !v.is_none())
}

fn is_yes(options: &Options, var: &str) -> bool {
    options.get(var).is_some_and(|v| {
        let v = v.trim();
        v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("true") || v == "1"
    })
}

fn set_flags(options: &mut Options, flags: &[(&str, bool)]) {
    for (var, on) in flags {
        options.insert((*var).to_string(), if *on { "Yes" } else { "No" }.to_string());
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
