// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tomography jobs.

use rln_core::params::ParamType;
use rln_core::Options;

use super::{is_yes, set_flags, CTFFIND_EXE, DEFOCUS_RANGE, IMOD_EXE, QUEUE};
use crate::class::JobClass;
use crate::environment::EnvKey;
use crate::schema::{composite, float, int, path, text, tuple, yes_no, DefaultValue, Field};

pub static IMPORT_TOMO: JobClass = JobClass {
    type_label: "relion.importtomo",
    is_tomo: true,
    command_id: "rln.importtomo",
    title: "Import tilt series",
    model_type: "relion-job.importtomo",
    params: &[
        text("movie_files", "frames/*.mrc"),
        text("mdoc_files", "mdoc/*.mdoc"),
        text("prefix", ""),
        float("angpix", 0.675),
        int("kV", 300),
        float("Cs", 2.7),
        float("Q0", 0.1),
        float("dose_rate", 3.0),
        yes_no("dose_is_per_movie_frame", false),
        float("tilt_axis_angle", 85.0),
        path("mtf_file"),
        yes_no("flip_tiltseries_hand", true),
    ],
    env_keys: QUEUE,
    ..JobClass::BASE
};

/// Shares its label with single-particle CTFFIND; dispatch tells them apart
/// by the tomo flag.
pub static CTFFIND_TOMO: JobClass = JobClass {
    type_label: "relion.ctffind.ctffind4",
    is_tomo: true,
    command_id: "rln.ctffind.tomo",
    title: "CTF estimation (tomo)",
    model_type: "relion-job.ctffind.tomo",
    params: &[
        path("input_star_mics"),
        yes_no("use_noDW", false),
        float("dast", 100.0),
        int("box", 512),
        float("resmin", 30.0),
        float("resmax", 5.0),
        DEFOCUS_RANGE,
        float("localsearch_nominal_defocus", 10000.0),
        float("exp_factor_dose", 100.0),
        int("nr_mpi", 1),
    ],
    env_keys: &[EnvKey::Executable(CTFFIND_EXE), EnvKey::Queue],
    ..JobClass::BASE
};

const ALIGN_METHODS: [&str; 3] = ["do_imod_fiducials", "do_imod_patchtrack", "do_aretomo2"];

fn only_method(options: &Options, method: &str) -> bool {
    ALIGN_METHODS.iter().all(|var| is_yes(options, var) == (*var == method))
}

fn select_method(options: &mut Options, method: &str) {
    for var in ALIGN_METHODS {
        set_flags(options, &[(var, var == method)]);
    }
}

fn uses_fiducials(options: &Options) -> bool {
    only_method(options, "do_imod_fiducials")
}

fn fiducial_flags(options: &mut Options) {
    select_method(options, "do_imod_fiducials");
}

fn uses_patch_tracking(options: &Options) -> bool {
    only_method(options, "do_imod_patchtrack")
}

fn patch_flags(options: &mut Options) {
    select_method(options, "do_imod_patchtrack");
}

pub static ALIGN_FIDUCIALS: JobClass = JobClass {
    type_label: "relion.aligntiltseries",
    is_tomo: true,
    command_id: "rln.aligntiltseries.fiducials",
    title: "Align tilt series (fiducials)",
    model_type: "relion-job.aligntiltseries",
    params: &[
        path("in_tiltseries"),
        float("fiducial_diameter", 10.0),
        float("tomogram_thickness", 300.0),
        int("nr_mpi", 1),
    ],
    discarded: &ALIGN_METHODS,
    env_keys: &[EnvKey::Executable(IMOD_EXE), EnvKey::Queue],
    param_matches: uses_fiducials,
    normalize: Some(fiducial_flags),
    ..JobClass::BASE
};

pub static ALIGN_PATCH: JobClass = JobClass {
    type_label: "relion.aligntiltseries",
    is_tomo: true,
    command_id: "rln.aligntiltseries.patch",
    title: "Align tilt series (patch tracking)",
    model_type: "relion-job.aligntiltseries",
    params: &[
        path("in_tiltseries"),
        float("patch_size", 100.0),
        float("patch_overlap", 50.0),
        float("tomogram_thickness", 300.0),
        int("nr_mpi", 1),
    ],
    discarded: &ALIGN_METHODS,
    env_keys: &[EnvKey::Executable(IMOD_EXE), EnvKey::Queue],
    param_matches: uses_patch_tracking,
    normalize: Some(patch_flags),
    ..JobClass::BASE
};

pub static RECONSTRUCT: JobClass = JobClass {
    type_label: "relion.reconstructtomograms",
    is_tomo: true,
    command_id: "rln.reconstructtomograms",
    title: "Reconstruct tomograms",
    model_type: "relion-job.reconstructtomograms",
    params: &[
        path("in_tiltseries"),
        tuple(
            "tomogram_size",
            ParamType::Int,
            &[
                ("xdim", DefaultValue::Int(4000)),
                ("ydim", DefaultValue::Int(4000)),
                ("zdim", DefaultValue::Int(2000)),
            ],
        ),
        float("binned_angpix", 10.0),
        float("tiltangle_offset", 0.0),
        yes_no("do_proj", false),
        float("centre_proj", 0.0),
        float("thickness_proj", 10.0),
        int("nr_threads", 1),
        int("nr_mpi", 1),
    ],
    env_keys: QUEUE,
    ..JobClass::BASE
};

const OPTIMISATION_SET: &[Field] = &[
    Field { field: "optimisation_set", var: "in_optimisation", ty: ParamType::Path, default: DefaultValue::None },
    Field { field: "particles", var: "in_particles", ty: ParamType::Path, default: DefaultValue::None },
    Field { field: "tomograms", var: "in_tomograms", ty: ParamType::Path, default: DefaultValue::None },
    Field { field: "trajectories", var: "in_trajectories", ty: ParamType::Path, default: DefaultValue::None },
];

pub static EXTRACT_SUBTOMOS: JobClass = JobClass {
    type_label: "relion.pseudosubtomo",
    is_tomo: true,
    command_id: "rln.pseudosubtomo",
    title: "Extract subtomograms",
    model_type: "relion-job.pseudosubtomo",
    params: &[
        composite("optimisation_set", OPTIMISATION_SET),
        float("binning", 1.0),
        int("box_size", 128),
        int("crop_size", -1),
        yes_no("do_float16", true),
        yes_no("do_stack2d", true),
        float("max_dose", -1.0),
        int("min_frames", 1),
        int("nr_threads", 1),
        int("nr_mpi", 1),
    ],
    env_keys: QUEUE,
    ..JobClass::BASE
};

#[cfg(test)]
#[path = "tomo_tests.rs"]
mod tests;
