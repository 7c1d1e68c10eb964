// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cross-dialect round-trip law: for features common to two dialects,
//! converting a document through the other dialect and back preserves the
//! AST (ignoring `raw` and warning ordering).

use proptest::prelude::*;
use vq_catalog::StepKind;
use vq_dialect::{compile, compile_as, render, Dialect};
use vq_ir::{TestDoc, UnifiedStep};

const LOGIN_COMPACT: &str = r##"
test: Login
nav: https://app.example/login
do:
  - c: "#submit"
  - t: {"#email": "a@b.c"}
  - wait: 2000
  - ch: "Welcome"
"##;

fn roundtrip_through(doc: &TestDoc, dialect: Dialect) -> TestDoc {
    let (text, _warnings) = render(doc, dialect).unwrap();
    let (back, _warnings) = compile_as(&text, dialect).unwrap();
    back
}

#[test]
fn compact_login_through_simplified_and_back() {
    let compiled = compile(LOGIN_COMPACT).unwrap();
    assert_eq!(compiled.dialect, Dialect::Compact);

    let via_simplified = roundtrip_through(&compiled.doc, Dialect::Simplified);
    assert_eq!(via_simplified.without_raw(), compiled.doc.without_raw());

    let via_extended = roundtrip_through(&compiled.doc, Dialect::Extended);
    assert_eq!(via_extended.without_raw(), compiled.doc.without_raw());
}

#[test]
fn compact_login_back_through_compact() {
    let compiled = compile(LOGIN_COMPACT).unwrap();
    let back = roundtrip_through(&compiled.doc, Dialect::Compact);
    assert_eq!(back.without_raw(), compiled.doc.without_raw());
}

#[test]
fn rendered_document_redetects_as_its_dialect() {
    let compiled = compile(LOGIN_COMPACT).unwrap();
    for &dialect in Dialect::all() {
        let (text, _) = render(&compiled.doc, dialect).unwrap();
        let redetected = compile(&text).unwrap();
        assert_eq!(redetected.dialect, dialect, "rendered text:\n{text}");
    }
}

#[test]
fn simplified_to_extended_preserves_all_kinds() {
    let source = r##"
name: Everything
starting_url: https://a.example
steps:
  - scroll: bottom
  - mouse: {move_by: [-10, -5]}
  - pick: {selector: "#c", index: 2}
  - cookie: wipe-all
  - dismiss: {prompt: "yes"}
  - window: {width: 1280, height: 720}
"##;
    let compiled = compile(source).unwrap();
    assert_eq!(compiled.dialect, Dialect::Simplified);
    let via_extended = roundtrip_through(&compiled.doc, Dialect::Extended);
    assert_eq!(via_extended.without_raw(), compiled.doc.without_raw());
}

#[test]
fn compact_conversion_warns_on_lossy_steps() {
    let source = "name: T\nsteps:\n  - scroll: bottom\n  - click: \"#a\"\n";
    let compiled = compile(source).unwrap();
    let (text, warnings) = render(&compiled.doc, Dialect::Compact).unwrap();
    assert!(warnings.iter().any(|w| w.message.contains("scroll-bottom")));
    // The surviving step still round-trips.
    let (back, _) = compile_as(&text, Dialect::Compact).unwrap();
    assert_eq!(back.main.len(), 1);
    assert_eq!(back.main[0].kind, StepKind::Click);
}

#[test]
fn lowering_is_stable_across_dialects() {
    // The same test expressed in all three dialects lowers to identical
    // catalog invocations.
    let compact = compile(LOGIN_COMPACT).unwrap().doc;
    let (simplified_text, _) = render(&compact, Dialect::Simplified).unwrap();
    let (extended_text, _) = render(&compact, Dialect::Extended).unwrap();
    let simplified = compile(&simplified_text).unwrap().doc;
    let extended = compile(&extended_text).unwrap().doc;

    let lower = |doc: &TestDoc| -> Vec<_> {
        doc.steps_in_order()
            .map(|s| s.to_invocation().unwrap())
            .collect()
    };
    assert_eq!(lower(&compact), lower(&simplified));
    assert_eq!(lower(&compact), lower(&extended));
}

// ── Property: common-feature docs survive any dialect pair ──────────────

fn common_step_strategy() -> impl Strategy<Value = UnifiedStep> {
    let selector = "[#][a-z]{1,8}";
    let text = "[a-zA-Z0-9 ]{1,12}";
    prop_oneof![
        selector.prop_map(|s| UnifiedStep::new(StepKind::Click).with_target(s)),
        selector.prop_map(|s| UnifiedStep::new(StepKind::Hover).with_target(s)),
        selector.prop_map(|s| UnifiedStep::new(StepKind::AssertExists).with_target(s)),
        text.prop_map(|t| UnifiedStep::new(StepKind::Write).with_value(t)),
        (selector, text).prop_map(|(s, t)| {
            UnifiedStep::new(StepKind::Write).with_target(s).with_value(t)
        }),
        (1u64..60_000).prop_map(|ms| {
            UnifiedStep::new(StepKind::WaitTime).with_value(ms.to_string())
        }),
        selector.prop_map(|s| UnifiedStep::new(StepKind::WaitElement).with_target(s)),
        text.prop_map(|t| UnifiedStep::new(StepKind::Comment).with_value(t)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn common_docs_roundtrip_between_all_dialect_pairs(
        steps in prop::collection::vec(common_step_strategy(), 1..8)
    ) {
        let mut doc = TestDoc::named("prop");
        doc.starting_url = Some("https://prop.example".into());
        doc.main = steps;

        for &dialect in Dialect::all() {
            let via = roundtrip_through(&doc, dialect);
            prop_assert_eq!(via.without_raw(), doc.without_raw(), "via {}", dialect);
        }
    }
}
