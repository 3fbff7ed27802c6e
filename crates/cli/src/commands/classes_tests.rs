// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use super::*;
use rln_jobs::classes::spa;
use rln_jobs::ClassRef;

#[test]
fn display_value_matches_run_syntax() {
    assert_eq!(display_value(&ParamValue::Bool(true)), "Yes");
    assert_eq!(display_value(&ParamValue::Tuple(vec![ParamValue::Int(5), ParamValue::Int(1)])), "5,1");
    assert_eq!(display_value(&ParamValue::None), "");
}

#[test]
fn cli_args_explode_composites() {
    let mut set = ParamValue::Composite(Default::default());
    if let ParamValue::Composite(fields) = &mut set {
        fields.insert("tomograms".into(), ParamValue::Path(PathBuf::from("Tomograms/job004/tomograms.star")));
        fields.insert("particles".into(), ParamValue::None);
    }
    let mut kwargs = Kwargs::new();
    kwargs.insert("optimisation_set".into(), set);
    kwargs.insert("sym".into(), ParamValue::Str("D2".into()));

    assert_eq!(
        cli_args(&kwargs),
        [
            "optimisation_set.tomograms=Tomograms/job004/tomograms.star",
            "optimisation_set.particles=",
            "sym=D2",
        ]
    );
}

#[test]
fn cli_args_quote_whitespace() {
    let mut kwargs = Kwargs::new();
    kwargs.insert("other_args".into(), ParamValue::Str("--dont_combine_weights_via_disc --pool 3".into()));
    assert_eq!(cli_args(&kwargs), ["other_args='--dont_combine_weights_via_disc --pool 3'"]);
}

#[test]
fn cli_args_parse_back() {
    let class = ClassRef::new(&spa::CLASS3D);
    let mut kwargs = Kwargs::new();
    kwargs.insert("nr_iter".into(), ParamValue::Int(25));
    kwargs.insert("sym_name".into(), ParamValue::Str("C1".into()));

    let args = cli_args(&kwargs);
    let pairs: Vec<(&str, &str)> = args.iter().filter_map(|a| a.split_once('=')).collect();
    assert_eq!(class.parse_kwargs(pairs).unwrap(), kwargs);
}
