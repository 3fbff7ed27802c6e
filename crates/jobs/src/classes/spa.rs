// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-particle analysis jobs.

use rln_core::params::ParamType;
use rln_core::Options;

use super::{is_yes, set_flags, CTFFIND_EXE, DEFOCUS_RANGE, OFFSET_RANGE_STEP, QUEUE};
use crate::class::{derive_use_gpu, gpu_ids_from_use_gpu, JobClass};
use crate::environment::EnvKey;
use crate::schema::{composite, float, gpu_ids, int, path, text, tuple, yes_no, DefaultValue, Field, ParamSpec};

const GPU_DISCARDED: &[&str] = &["use_gpu"];

fn imports_movies(options: &Options) -> bool {
    !is_yes(options, "do_other")
}

fn import_movie_flags(options: &mut Options) {
    set_flags(options, &[("do_raw", true), ("do_other", false)]);
}

pub static IMPORT_MOVIES: JobClass = JobClass {
    type_label: "relion.import",
    command_id: "rln.import.movies",
    title: "Import movies",
    model_type: "relion-job.import",
    params: &[
        text("fn_in_raw", "Movies/*.tif"),
        yes_no("is_multiframe", true),
        text("optics_group_name", "opticsGroup1"),
        path("fn_mtf"),
        float("angpix", 1.4),
        int("kV", 300),
        float("Cs", 2.7),
        float("Q0", 0.1),
        tuple(
            "beamtilt",
            ParamType::Float,
            &[("beamtilt_x", DefaultValue::Float(0.0)), ("beamtilt_y", DefaultValue::Float(0.0))],
        ),
    ],
    discarded: &["do_raw", "do_other"],
    env_keys: QUEUE,
    param_matches: imports_movies,
    normalize: Some(import_movie_flags),
    ..JobClass::BASE
};

fn own_motioncor(options: &mut Options) {
    set_flags(options, &[("do_own_motioncor", true)]);
}

pub static MOTIONCORR: JobClass = JobClass {
    type_label: "relion.motioncorr.own",
    command_id: "rln.motioncorr",
    title: "Motion correction",
    model_type: "relion-job.motioncorr",
    params: &[
        path("input_star_mics"),
        int("first_frame_sum", 1),
        int("last_frame_sum", -1),
        float("dose_per_frame", 1.0),
        float("pre_exposure", 0.0),
        int("eer_grouping", 32),
        yes_no("do_float16", true),
        yes_no("do_dose_weighting", true),
        yes_no("do_save_noDW", false),
        yes_no("do_save_ps", true),
        int("group_for_ps", 4),
        float("bfactor", 150.0),
        tuple("patches", ParamType::Int, &[("patch_x", DefaultValue::Int(5)), ("patch_y", DefaultValue::Int(5))]),
        int("group_frames", 1),
        float("bin_factor", 1.0),
        path("fn_gain_ref"),
        text("gain_rot", "No rotation (0)"),
        text("gain_flip", "No flipping (0)"),
        path("fn_defect"),
        int("nr_threads", 4),
        int("nr_mpi", 1),
    ],
    discarded: &["do_own_motioncor"],
    env_keys: QUEUE,
    normalize: Some(own_motioncor),
    ..JobClass::BASE
};

pub static CTFFIND: JobClass = JobClass {
    type_label: "relion.ctffind.ctffind4",
    command_id: "rln.ctffind",
    title: "CTF estimation",
    model_type: "relion-job.ctffind",
    params: &[
        path("input_star_mics"),
        yes_no("use_noDW", false),
        yes_no("do_phaseshift", false),
        tuple(
            "phase_range",
            ParamType::Float,
            &[
                ("phase_min", DefaultValue::Float(0.0)),
                ("phase_max", DefaultValue::Float(180.0)),
                ("phase_step", DefaultValue::Float(10.0)),
            ],
        ),
        float("dast", 100.0),
        int("box", 512),
        float("resmin", 30.0),
        float("resmax", 5.0),
        DEFOCUS_RANGE,
        yes_no("use_given_ps", true),
        yes_no("slow_search", false),
        int("ctf_win", -1),
        int("nr_mpi", 1),
    ],
    env_keys: &[EnvKey::Executable(CTFFIND_EXE), EnvKey::Queue],
    ..JobClass::BASE
};

fn log_picker(options: &mut Options) {
    set_flags(options, &[("do_log", true), ("do_refs", false), ("do_topaz", false)]);
}

pub static AUTOPICK_LOG: JobClass = JobClass {
    type_label: "relion.autopick.log",
    command_id: "rln.autopick.log",
    title: "Autopick (LoG)",
    model_type: "relion-job.autopick",
    params: &[
        path("fn_input_autopick"),
        float("angpix", -1.0),
        tuple(
            "log_diam_range",
            ParamType::Float,
            &[("log_diam_min", DefaultValue::Float(200.0)), ("log_diam_max", DefaultValue::Float(250.0))],
        ),
        yes_no("log_invert", false),
        float("log_maxres", 20.0),
        float("log_adjust_thr", 0.0),
        float("log_upper_thr", 999.0),
        float("shrink", 0.0),
        int("nr_mpi", 1),
    ],
    discarded: &["do_log", "do_refs", "do_topaz"],
    env_keys: QUEUE,
    normalize: Some(log_picker),
    ..JobClass::BASE
};

pub static EXTRACT: JobClass = JobClass {
    type_label: "relion.extract",
    command_id: "rln.extract",
    title: "Particle extraction",
    model_type: "relion-job.extract",
    params: &[
        path("star_mics"),
        path("coords_suffix"),
        yes_no("do_reextract", false),
        int("extract_size", 128),
        yes_no("do_rescale", false),
        int("rescale", 128),
        yes_no("do_invert", true),
        yes_no("do_norm", true),
        float("bg_diameter", -1.0),
        float("white_dust", -1.0),
        float("black_dust", -1.0),
        yes_no("do_float16", true),
        int("nr_mpi", 1),
    ],
    env_keys: QUEUE,
    ..JobClass::BASE
};

pub static CLASS2D: JobClass = JobClass {
    type_label: "relion.class2d",
    command_id: "rln.class2d",
    title: "2D classification",
    model_type: "relion-job.class2d",
    params: &[
        path("fn_img"),
        int("nr_classes", 50),
        float("tau_fudge", 2.0),
        yes_no("do_em", false),
        int("nr_iter_em", 25),
        yes_no("do_grad", true),
        int("nr_iter_grad", 200),
        float("particle_diameter", 200.0),
        yes_no("do_zero_mask", true),
        float("highres_limit", -1.0),
        yes_no("dont_skip_align", true),
        float("psi_sampling", 6.0),
        OFFSET_RANGE_STEP,
        yes_no("do_ctf_correction", true),
        yes_no("ctf_intact_first_peak", false),
        yes_no("do_center", true),
        int("nr_pool", 3),
        yes_no("do_preread_images", false),
        text("scratch_dir", ""),
        int("nr_threads", 1),
        int("nr_mpi", 1),
        gpu_ids(),
    ],
    discarded: GPU_DISCARDED,
    env_keys: QUEUE,
    normalize: Some(derive_use_gpu),
    normalize_inv: Some(gpu_ids_from_use_gpu),
    ..JobClass::BASE
};

pub static INITIAL_MODEL: JobClass = JobClass {
    type_label: "relion.initialmodel",
    command_id: "rln.initialmodel",
    title: "3D initial model",
    model_type: "relion-job.initialmodel",
    params: &[
        path("fn_img"),
        int("nr_iter", 200),
        int("nr_classes", 1),
        float("tau_fudge", 4.0),
        float("particle_diameter", 200.0),
        yes_no("do_solvent", true),
        text("sym_name", "C1"),
        yes_no("do_run_C1", true),
        yes_no("do_ctf_correction", true),
        int("nr_pool", 3),
        int("nr_threads", 1),
        int("nr_mpi", 1),
        gpu_ids(),
    ],
    discarded: GPU_DISCARDED,
    env_keys: QUEUE,
    normalize: Some(derive_use_gpu),
    normalize_inv: Some(gpu_ids_from_use_gpu),
    ..JobClass::BASE
};

pub static CLASS3D: JobClass = JobClass {
    type_label: "relion.class3d",
    command_id: "rln.class3d",
    title: "3D classification",
    model_type: "relion-job.class3d",
    params: &[
        path("fn_img"),
        path("fn_cont"),
        path("fn_ref"),
        path("fn_mask"),
        yes_no("ref_correct_greyscale", false),
        float("ini_high", 60.0),
        text("sym_name", "C1"),
        yes_no("do_ctf_correction", true),
        yes_no("ctf_intact_first_peak", false),
        int("nr_classes", 1),
        float("tau_fudge", 4.0),
        int("nr_iter", 25),
        float("particle_diameter", 200.0),
        yes_no("do_zero_mask", true),
        float("highres_limit", -1.0),
        yes_no("dont_skip_align", true),
        text("sampling", "7.5 degrees"),
        OFFSET_RANGE_STEP,
        yes_no("do_local_ang_searches", false),
        float("sigma_angles", 5.0),
        text("relax_sym", ""),
        yes_no("do_helix", false),
        tuple(
            "helical_twist_range",
            ParamType::Float,
            &[
                ("helical_twist_min", DefaultValue::Float(0.0)),
                ("helical_twist_max", DefaultValue::Float(0.0)),
                ("helical_twist_inistep", DefaultValue::Float(0.0)),
            ],
        ),
        int("nr_pool", 3),
        yes_no("do_preread_images", false),
        text("scratch_dir", ""),
        int("nr_threads", 1),
        int("nr_mpi", 1),
        gpu_ids(),
    ],
    discarded: GPU_DISCARDED,
    env_keys: QUEUE,
    normalize: Some(derive_use_gpu),
    normalize_inv: Some(gpu_ids_from_use_gpu),
    continuable: true,
    ..JobClass::BASE
};

pub static REFINE3D: JobClass = JobClass {
    type_label: "relion.refine3d",
    command_id: "rln.refine3d",
    title: "3D auto-refine",
    model_type: "relion-job.refine3d",
    params: &[
        path("fn_img"),
        path("fn_cont"),
        path("fn_ref"),
        path("fn_mask"),
        yes_no("ref_correct_greyscale", false),
        float("ini_high", 60.0),
        text("sym_name", "C1"),
        yes_no("do_ctf_correction", true),
        yes_no("ctf_intact_first_peak", false),
        float("particle_diameter", 200.0),
        yes_no("do_zero_mask", true),
        yes_no("do_solvent_fsc", false),
        text("sampling", "7.5 degrees"),
        OFFSET_RANGE_STEP,
        text("auto_local_sampling", "1.8 degrees"),
        text("relax_sym", ""),
        yes_no("auto_faster", false),
        yes_no("do_helix", false),
        int("nr_pool", 3),
        yes_no("do_preread_images", false),
        text("scratch_dir", ""),
        int("nr_threads", 1),
        int("nr_mpi", 3),
        gpu_ids(),
    ],
    discarded: GPU_DISCARDED,
    env_keys: QUEUE,
    normalize: Some(derive_use_gpu),
    normalize_inv: Some(gpu_ids_from_use_gpu),
    continuable: true,
    ..JobClass::BASE
};

pub static MASK_CREATE: JobClass = JobClass {
    type_label: "relion.maskcreate",
    command_id: "rln.maskcreate",
    title: "Mask creation",
    model_type: "relion-job.maskcreate",
    params: &[
        path("fn_in"),
        float("lowpass_filter", 15.0),
        float("angpix", -1.0),
        float("inimask_threshold", 0.02),
        int("extend_inimask", 3),
        int("width_mask_edge", 6),
        yes_no("do_helix", false),
        float("helical_z_percentage", 30.0),
        int("nr_threads", 1),
    ],
    env_keys: QUEUE,
    ..JobClass::BASE
};

const BFACTOR: &[Field] = &[
    Field { field: "auto", var: "do_auto_bfac", ty: ParamType::Bool, default: DefaultValue::Bool(true) },
    Field { field: "lowres", var: "autob_lowres", ty: ParamType::Float, default: DefaultValue::Float(10.0) },
    Field { field: "adhoc", var: "do_adhoc_bfac", ty: ParamType::Bool, default: DefaultValue::Bool(false) },
    Field { field: "value", var: "adhoc_bfac", ty: ParamType::Float, default: DefaultValue::Float(-1000.0) },
];

const POSTPROCESS_PARAMS: &[ParamSpec] = &[
    path("fn_in"),
    path("fn_mask"),
    float("angpix", -1.0),
    composite("bfactor", BFACTOR),
    path("fn_mtf"),
    float("mtf_angpix", 1.0),
    yes_no("do_skip_fsc_weighting", false),
    float("low_pass", 5.0),
];

pub static POSTPROCESS: JobClass = JobClass {
    type_label: "relion.postprocess",
    command_id: "rln.postprocess",
    title: "Post-processing",
    model_type: "relion-job.postprocess",
    params: POSTPROCESS_PARAMS,
    env_keys: QUEUE,
    ..JobClass::BASE
};

#[cfg(test)]
#[path = "spa_tests.rs"]
mod tests;
