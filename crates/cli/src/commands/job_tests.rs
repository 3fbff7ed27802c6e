// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    simple = { "nr_iter=25", "nr_iter", "25" },
    empty_value = { "fn_mask=", "fn_mask", "" },
    equals_in_value = { "other_args=--j=4", "other_args", "--j=4" },
    dotted = { "bfactor.auto=No", "bfactor.auto", "No" },
)]
fn parse_key_value_splits_on_first_equals(input: &str, key: &str, value: &str) {
    assert_eq!(parse_key_value(input).unwrap(), (key.to_string(), value.to_string()));
}

#[test]
fn parse_key_value_requires_equals() {
    let err = parse_key_value("nr_iter").unwrap_err();
    assert!(err.contains("name=value"), "{err}");
}

#[test]
fn overlay_replaces_scalars() {
    let mut base = Kwargs::new();
    base.insert("nr_iter".into(), ParamValue::Int(25));
    base.insert("nr_classes".into(), ParamValue::Int(4));

    let mut extra = Kwargs::new();
    extra.insert("nr_iter".into(), ParamValue::Int(40));
    overlay(&mut base, extra);

    assert_eq!(base["nr_iter"], ParamValue::Int(40));
    assert_eq!(base["nr_classes"], ParamValue::Int(4));
}

#[test]
fn overlay_merges_composite_fields() {
    let mut bfactor = ParamValue::Composite(Default::default());
    if let ParamValue::Composite(fields) = &mut bfactor {
        fields.insert("auto".into(), ParamValue::Bool(true));
        fields.insert("lowres".into(), ParamValue::Float(10.0));
    }
    let mut base = Kwargs::new();
    base.insert("bfactor".into(), bfactor);

    let mut patch = ParamValue::Composite(Default::default());
    if let ParamValue::Composite(fields) = &mut patch {
        fields.insert("auto".into(), ParamValue::Bool(false));
    }
    let mut extra = Kwargs::new();
    extra.insert("bfactor".into(), patch);
    overlay(&mut base, extra);

    let fields = base["bfactor"].as_composite().unwrap();
    assert_eq!(fields["auto"], ParamValue::Bool(false));
    assert_eq!(fields["lowres"], ParamValue::Float(10.0));
}
