//! Round-trip properties of the hierarchy normalizer: for any well-formed
//! flat step list `F`, `flatten(nest(F))` equals the canonical form of `F`,
//! and re-nesting the flattened tree is idempotent.

use pretty_assertions::assert_eq;
use serde_json::json;
use weft_dsl::{canonical_steps, flatten_steps, nest_steps, NestMode, Scope, Step};

fn roundtrip(flat: &[Step]) {
    let nested = nest_steps(flat, NestMode::Strict).expect("well-formed input");
    let flattened = flatten_steps(&nested);
    assert_eq!(canonical_steps(flat), canonical_steps(&flattened));

    // Idempotence: nesting the flattened form reproduces the same tree
    let renested = nest_steps(&flattened, NestMode::Strict).unwrap();
    assert_eq!(nested, renested);
}

#[test]
fn roundtrip_plain_sequence() {
    roundtrip(&[
        Step::new("SetVariable").with_param("name", json!("x")),
        Step::new("PrintLog").with_param("message", json!("hi")),
    ]);
}

#[test]
fn roundtrip_single_loop() {
    roundtrip(&[
        Step::new("For").with_param("count", json!(3)),
        Step::new("PrintLog").with_param("message", json!("tick")),
        Step::end_marker(Scope::Loop),
        Step::new("PrintLog").with_param("message", json!("done")),
    ]);
}

#[test]
fn roundtrip_nested_loops() {
    roundtrip(&[
        Step::new("ForEach").with_param("items", json!(["a", "b"])),
        Step::new("While").with_param("cond", json!("x")),
        Step::new("Break"),
        Step::end_marker(Scope::Loop),
        Step::new("Continue"),
        Step::end_marker(Scope::Loop),
    ]);
}

#[test]
fn roundtrip_full_branch_chain() {
    roundtrip(&[
        Step::new("If").with_param("cond", json!("x==1")),
        Step::new("PrintLog").with_param("message", json!("one")),
        Step::new("ElseIf").with_param("cond", json!("x==2")),
        Step::new("PrintLog").with_param("message", json!("two")),
        Step::new("Else"),
        Step::new("PrintLog").with_param("message", json!("other")),
        Step::end_marker(Scope::If),
    ]);
}

#[test]
fn roundtrip_chain_inside_loop_inside_chain() {
    roundtrip(&[
        Step::new("If").with_param("cond", json!("outer")),
        Step::new("While").with_param("cond", json!("spin")),
        Step::new("If").with_param("cond", json!("inner")),
        Step::new("Break"),
        Step::new("Else"),
        Step::new("Continue"),
        Step::end_marker(Scope::If),
        Step::end_marker(Scope::Loop),
        Step::new("Else"),
        Step::new("PrintLog").with_param("message", json!("fallback")),
        Step::end_marker(Scope::If),
        Step::new("PrintLog").with_param("message", json!("after")),
    ]);
}

#[test]
fn roundtrip_adjacent_chains_stay_separate() {
    let flat = vec![
        Step::new("If").with_param("cond", json!("a")),
        Step::new("PrintLog"),
        Step::end_marker(Scope::If),
        Step::new("If").with_param("cond", json!("b")),
        Step::new("PrintLog"),
        Step::end_marker(Scope::If),
    ];
    roundtrip(&flat);

    let nested = nest_steps(&flat, NestMode::Strict).unwrap();
    assert_eq!(nested.len(), 2);
    assert!(nested.iter().all(|s| s.children.is_some()));
}

#[test]
fn roundtrip_disabled_blocks_survive() {
    roundtrip(&[
        Step::new("For").with_param("count", json!(2)).with_disabled(true),
        Step::new("PrintLog").with_disabled(true),
        Step::end_marker(Scope::Loop),
        Step::new("PrintLog"),
    ]);
}

#[test]
fn canonical_form_strips_editor_fields() {
    let mut header = Step::new("For").with_param("count", json!(1));
    header.line = Some(1);
    header.expanded = Some(true);
    let mut body = Step::new("PrintLog");
    body.line = Some(2);

    let flat = vec![header, body, Step::end_marker(Scope::Loop)];
    let nested = nest_steps(&flat, NestMode::Strict).unwrap();
    let flattened = flatten_steps(&nested);

    assert_eq!(canonical_steps(&flat), canonical_steps(&flattened));
    assert!(flattened.iter().all(|s| s.line.is_none() && s.expanded.is_none()));
}

#[test]
fn embedded_params_children_normalize_to_top_level() {
    // Nested content supplied through params["children"] reads the same as
    // the top-level field
    let via_params = vec![Step::new("For")
        .with_param("count", json!(2))
        .with_param("children", json!([{ "tool_name": "PrintLog" }]))];
    let via_field = vec![Step::new("For")
        .with_param("count", json!(2))
        .with_children(vec![Step::new("PrintLog")])];

    let a = nest_steps(&via_params, NestMode::Strict).unwrap();
    let b = nest_steps(&via_field, NestMode::Strict).unwrap();
    assert_eq!(a, b);
}
