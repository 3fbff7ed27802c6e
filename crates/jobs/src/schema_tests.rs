// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const TWIST: ParamSpec = tuple(
    "helical_twist_range",
    ParamType::Float,
    &[
        ("helical_twist_min", DefaultValue::Float(0.0)),
        ("helical_twist_max", DefaultValue::Float(0.0)),
        ("helical_twist_inistep", DefaultValue::Float(0.0)),
    ],
);

const OPT_SET: ParamSpec = composite(
    "optimisation_set",
    &[
        Field { field: "optimisation_set", var: "in_optimisation", ty: ParamType::Path, default: DefaultValue::None },
        Field { field: "particles", var: "in_particles", ty: ParamType::Path, default: DefaultValue::None },
        Field { field: "tomograms", var: "in_tomograms", ty: ParamType::Path, default: DefaultValue::None },
        Field { field: "trajectories", var: "in_trajectories", ty: ParamType::Path, default: DefaultValue::None },
    ],
);

#[test]
fn scalar_uses_own_name() {
    let spec = int("nr_iter", 25);
    let mut out = Options::new();
    spec.encode(&ParamValue::Int(30), &mut out).unwrap();
    assert_eq!(out["nr_iter"], "30");
    assert_eq!(spec.decode(&out).unwrap(), ParamValue::Int(30));
    assert_eq!(spec.decode(&Options::new()).unwrap(), ParamValue::Int(25));
}

#[test]
fn tuple_splits_and_rejoins() {
    let value = ParamValue::Tuple(vec![ParamValue::Float(-15.0), ParamValue::Float(15.0), ParamValue::Float(1.0)]);
    let mut out = Options::new();
    TWIST.encode(&value, &mut out).unwrap();
    let pairs: Vec<_> = out.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(pairs, [("helical_twist_min", "-15"), ("helical_twist_max", "15"), ("helical_twist_inistep", "1")]);
    assert_eq!(TWIST.decode(&out).unwrap(), value);
}

#[test]
fn tuple_arity_is_checked() {
    let value = ParamValue::Tuple(vec![ParamValue::Float(0.0)]);
    let err = TWIST.encode(&value, &mut Options::new()).unwrap_err();
    assert_eq!(err, ParamError::Arity { name: "helical_twist_range".into(), expected: 3, got: 1 });
}

#[test]
fn composite_fills_missing_fields_with_defaults() {
    let mut given = IndexMap::new();
    given.insert("tomograms".to_string(), ParamValue::Path("Tomograms/job005/tomograms.star".into()));
    let mut out = Options::new();
    OPT_SET.encode(&ParamValue::Composite(given), &mut out).unwrap();
    assert_eq!(out["in_tomograms"], "Tomograms/job005/tomograms.star");
    assert_eq!(out["in_particles"], "");
    assert_eq!(OPT_SET.vars(), ["in_optimisation", "in_particles", "in_tomograms", "in_trajectories"]);

    let back = OPT_SET.decode(&out).unwrap();
    let fields = back.as_composite().unwrap();
    assert_eq!(fields["particles"], ParamValue::None);
    assert_eq!(fields["tomograms"], ParamValue::Path("Tomograms/job005/tomograms.star".into()));
}

#[test]
fn composite_rejects_unknown_field() {
    let mut given = IndexMap::new();
    given.insert("coordinates".to_string(), ParamValue::None);
    let err = OPT_SET.encode(&ParamValue::Composite(given), &mut Options::new()).unwrap_err();
    assert_eq!(err, ParamError::UnknownParameter("optimisation_set.coordinates".into()));
}

#[test]
fn scalar_rejects_aggregate() {
    let err = yes_no("do_ctf_correction", true)
        .encode(&ParamValue::Tuple(vec![]), &mut Options::new())
        .unwrap_err();
    assert!(matches!(err, ParamError::InvalidValue { .. }));
}

#[yare::parameterized(
    scalar    = { int("nr_iter", 25), None, "7", ParamValue::Int(7) },
    boolean   = { yes_no("do_helix", false), None, "yes", ParamValue::Bool(true) },
    tuple     = { TWIST, None, "1, 2,3", ParamValue::Tuple(vec![ParamValue::Float(1.0), ParamValue::Float(2.0), ParamValue::Float(3.0)]) },
    field     = { OPT_SET, Some("particles"), "a.star", ParamValue::Path("a.star".into()) },
)]
fn parse_cli_values(spec: ParamSpec, field: Option<&str>, raw: &str, expected: ParamValue) {
    assert_eq!(spec.parse(field, raw).unwrap(), expected);
}

#[test]
fn parse_rejects_field_on_scalar() {
    assert!(int("nr_iter", 25).parse(Some("x"), "1").is_err());
    assert!(OPT_SET.parse(Some("nope"), "1").is_err());
    assert!(TWIST.parse(None, "1,2").is_err());
}

#[test]
fn path_default_is_none() {
    assert_eq!(path("fn_mask").default_value(), ParamValue::None);
    assert_eq!(text("sym_name", "C1").default_value(), ParamValue::Str("C1".into()));
}
