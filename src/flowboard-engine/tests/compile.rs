// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! End-to-end tests: JSON snapshot in, simulation program out.

use proptest::prelude::*;

use flowboard_engine::{build_program, json, ErrorCode, SyntaxConfig};

fn compile(snapshot: &str) -> flowboard_engine::Result<String> {
    let wire: json::Diagram = serde_json::from_str(snapshot).unwrap();
    build_program(wire.into())
}

const SINGLE_STOCK: &str = r#"{
    "name": "single",
    "components": [
        {"id": "0", "type": "stock", "data": {"name": "S", "initialValue": "100000.0"}},
        {"id": "1", "type": "parameter", "data": {"name": "startTime", "value": "0.0"}},
        {"id": "2", "type": "parameter", "data": {"name": "stopTime", "value": "365.0"}}
    ]
}"#;

const COMPOSED: &str = r#"{
    "name": "composed",
    "components": [
        {"id": "0", "type": "stock", "data": {"name": "S", "initialValue": "100000.0"}},
        {"id": "1", "type": "stock", "data": {"name": "I", "initialValue": "1.0"}},
        {"id": "2", "type": "flow", "data": {"name": "infection", "from": "0", "to": "1", "equation": "0.3"}},
        {"id": "3", "type": "parameter", "data": {"name": "startTime", "value": "0.0"}},
        {"id": "4", "type": "parameter", "data": {"name": "stopTime", "value": "365.0"}}
    ],
    "staticModels": [
        {"name": "recovery_module", "components": [
            {"id": "0", "type": "stock", "data": {"name": "S", "initialValue": "100000.0"}},
            {"id": "1", "type": "stock", "data": {"name": "I", "initialValue": "1.0"}},
            {"id": "2", "type": "flow", "data": {"name": "recovery", "from": "1", "to": "0", "equation": "0.1"}}
        ]}
    ],
    "identifications": [
        {"component": "S", "first": "main", "second": "recovery_module"},
        {"component": "I", "first": "main", "second": "recovery_module"}
    ]
}"#;

#[test]
fn single_stock_yields_one_of_each_statement() {
    let program = compile(SINGLE_STOCK).unwrap();

    assert_eq!(program.matches("StockAndFlowF(").count(), 1);
    assert_eq!(program.matches(" = foot(").count(), 1);
    assert_eq!(program.matches(" = Open(").count(), 1);
    assert!(!program.contains("@relation"));
    assert!(program.contains("ODEProblem("));
    assert!(program.contains("(0.0, 365.0)"));
}

#[test]
fn validation_failures_are_fatal_before_generation() {
    let empty = r#"{"name": "empty", "components": []}"#;
    assert_eq!(compile(empty).unwrap_err().code, ErrorCode::EmptyDiagram);

    let no_stock = r#"{
        "name": "no-stock",
        "components": [
            {"id": "0", "type": "parameter", "data": {"name": "startTime", "value": "0.0"}},
            {"id": "1", "type": "parameter", "data": {"name": "stopTime", "value": "365.0"}}
        ]
    }"#;
    assert_eq!(compile(no_stock).unwrap_err().code, ErrorCode::NoStocks);

    let no_start = r#"{
        "name": "no-start",
        "components": [
            {"id": "0", "type": "stock", "data": {"name": "S", "initialValue": "100000.0"}}
        ]
    }"#;
    assert_eq!(compile(no_start).unwrap_err().code, ErrorCode::BadSimSpecs);
}

#[test]
fn free_rate_expression_passes_through_unchanged() {
    let snapshot = r#"{
        "name": "two-stocks",
        "components": [
            {"id": "0", "type": "stock", "data": {"name": "S", "initialValue": "10.0"}},
            {"id": "1", "type": "stock", "data": {"name": "I", "initialValue": "1.0"}},
            {"id": "2", "type": "flow", "data": {"name": "move", "from": "0", "to": "1", "equation": "0.25"}},
            {"id": "3", "type": "parameter", "data": {"name": "startTime", "value": "0.0"}},
            {"id": "4", "type": "parameter", "data": {"name": "stopTime", "value": "10.0"}}
        ]
    }"#;
    let program = compile(snapshot).unwrap();
    assert!(program.contains(":var_move => (u, uN, p, t) -> 0.25"));
}

#[test]
fn composed_models_share_feet() {
    let program = compile(COMPOSED).unwrap();

    // one foot per distinct stock across both models
    assert_eq!(program.matches(" = foot(").count(), 2);
    assert_eq!(program.matches(" = Open(").count(), 2);
    assert_eq!(program.matches("@relation").count(), 1);
    assert!(program.contains("oapply(relation, [open_main, open_recovery_module])"));
}

#[test]
fn foot_order_agrees_across_relation_open_and_composition() {
    let program = compile(COMPOSED).unwrap();

    // canonical order: S before I, everywhere
    assert!(program.contains("foot_S = foot(:S, (), ())"));
    assert!(program.contains("foot_I = foot(:I, (), ())"));
    assert!(program.contains("relation = @relation (foot_S, foot_I) begin"));
    assert!(program.contains("model_main(foot_S, foot_I)"));
    assert!(program.contains("model_recovery_module(foot_S, foot_I)"));
    assert!(program.contains("open_main = Open(model_main, foot_S, foot_I)"));
    assert!(program.contains(
        "open_recovery_module = Open(model_recovery_module, foot_S, foot_I)"
    ));

    let foot_s = program.find("foot_S = foot(").unwrap();
    let foot_i = program.find("foot_I = foot(").unwrap();
    let relation = program.find("relation = @relation").unwrap();
    let open = program.find("open_main = Open(").unwrap();
    let composed = program.find("composed = oapply(").unwrap();
    let apex = program.find("apex_model = apex(").unwrap();
    assert!(foot_s < foot_i);
    assert!(foot_i < relation);
    assert!(relation < open);
    assert!(open < composed);
    assert!(composed < apex);
}

#[test]
fn shared_initial_conditions_emit_once() {
    let program = compile(COMPOSED).unwrap();
    assert!(program.contains("u0 = LVector(S=100000.0, I=1.0)"));
}

#[test]
fn rerunning_generation_is_byte_identical() {
    assert_eq!(compile(COMPOSED).unwrap(), compile(COMPOSED).unwrap());
    assert_eq!(compile(SINGLE_STOCK).unwrap(), compile(SINGLE_STOCK).unwrap());
}

#[test]
fn bad_identification_is_fatal() {
    let snapshot = r#"{
        "name": "bad",
        "components": [
            {"id": "0", "type": "stock", "data": {"name": "S", "initialValue": "1.0"}},
            {"id": "1", "type": "parameter", "data": {"name": "startTime", "value": "0.0"}},
            {"id": "2", "type": "parameter", "data": {"name": "stopTime", "value": "1.0"}}
        ],
        "staticModels": [
            {"name": "sub", "components": [
                {"id": "0", "type": "stock", "data": {"name": "R", "initialValue": "0.0"}}
            ]}
        ],
        "identifications": [
            {"component": "S", "first": "main", "second": "sub"}
        ]
    }"#;
    let err = compile(snapshot).unwrap_err();
    assert_eq!(err.code, ErrorCode::BadIdentification);
}

#[test]
fn unknown_equation_symbol_is_fatal() {
    let snapshot = r#"{
        "name": "bad-eqn",
        "components": [
            {"id": "0", "type": "stock", "data": {"name": "S", "initialValue": "1.0"}},
            {"id": "1", "type": "stock", "data": {"name": "I", "initialValue": "0.0"}},
            {"id": "2", "type": "flow", "data": {"name": "move", "from": "0", "to": "1", "equation": "S * gamma"}},
            {"id": "3", "type": "parameter", "data": {"name": "startTime", "value": "0.0"}},
            {"id": "4", "type": "parameter", "data": {"name": "stopTime", "value": "1.0"}}
        ]
    }"#;
    let err = compile(snapshot).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownSymbol);
    assert!(err.get_details().unwrap().contains("gamma"));
}

fn numeric_catalog() -> flowboard_engine::Model {
    use flowboard_engine::datamodel::{Component, Stock};
    flowboard_engine::resolve_model(
        "main",
        &[Component::Stock(Stock {
            id: "0".to_owned(),
            name: "S".to_owned(),
            initial_equation: "1.0".to_owned(),
        })],
        &[],
    )
    .unwrap()
}

proptest! {
    // qualification of purely numeric arithmetic is the identity
    #[test]
    fn qualify_numeric_expression_is_identity(
        a in 0u32..10_000,
        b in 0u32..10_000,
        c in proptest::sample::select(vec!["+", "-", "*", "/", "^"]),
        frac in 0u32..100,
    ) {
        let eqn = format!("{a}.{frac} {c} {b}");
        let catalog = numeric_catalog();
        let qualified =
            flowboard_engine::qualify_equation(&eqn, &catalog, &SyntaxConfig::default()).unwrap();
        prop_assert_eq!(qualified, eqn);
    }

    // generation is deterministic for arbitrary parameter values
    #[test]
    fn generation_is_deterministic(value in 0u32..1_000_000) {
        let snapshot = format!(
            r#"{{
                "name": "prop",
                "components": [
                    {{"id": "0", "type": "stock", "data": {{"name": "S", "initialValue": "{value}.0"}}}},
                    {{"id": "1", "type": "parameter", "data": {{"name": "startTime", "value": "0.0"}}}},
                    {{"id": "2", "type": "parameter", "data": {{"name": "stopTime", "value": "{value}.0"}}}}
                ]
            }}"#
        );
        prop_assert_eq!(compile(&snapshot).unwrap(), compile(&snapshot).unwrap());
    }
}
