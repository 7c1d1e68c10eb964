// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scenario-level payload checks: exact wire shapes for representative
//! commands, matching what the platform's `/teststeps` endpoint expects.

use serde_json::json;
use vq_catalog::{apply, Options, StepContext};
use vq_core::CheckpointId;

fn args(v: &[&str]) -> Vec<String> {
    v.iter().map(|x| x.to_string()).collect()
}

fn ctx(checkpoint: u32, position: u32) -> StepContext {
    StepContext::new(CheckpointId(checkpoint), position).unwrap()
}

#[test]
fn navigate_step_wire_shape() {
    let payload = apply(
        "navigate",
        &args(&["https://example.com"]),
        &Options::new(),
        ctx(1_680_437, 1),
    )
    .unwrap();
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        v,
        json!({
            "checkpointId": 1_680_437,
            "position": 1,
            "parsedStep": {
                "action": "NAVIGATE",
                "target": {
                    "selectors": [
                        {"type": "GUESS", "value": "{\"clue\":\"https://example.com\"}"}
                    ]
                }
            }
        })
    );
}

#[test]
fn targeted_write_wire_shape() {
    let payload = apply(
        "write",
        &args(&["user@example.com", "#email"]),
        &Options::new(),
        ctx(1_680_437, 5),
    )
    .unwrap();
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(v["position"], 5);
    assert_eq!(v["parsedStep"]["action"], "WRITE");
    assert_eq!(
        v["parsedStep"]["value"],
        "{\"#email\":\"user@example.com\"}"
    );
    assert_eq!(
        v["parsedStep"]["target"]["selectors"][0],
        json!({"type": "CSS", "value": "#email"})
    );
}

#[test]
fn mouse_move_by_negative_delta_wire_shape() {
    let payload = apply(
        "mouse-move-by",
        &args(&["-10", "-5"]),
        &Options::new(),
        ctx(42, 3),
    )
    .unwrap();
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(v["position"], 3);
    assert_eq!(
        v["parsedStep"]["meta"],
        json!({"kind": "MOUSE", "action": "MOVE_BY", "x": -10, "y": -5})
    );
}

#[test]
fn assert_matches_rejects_bad_regex_before_any_call() {
    let err = apply(
        "assert-matches",
        &args(&["#code", "(unclosed"]),
        &Options::new(),
        ctx(1, 1),
    )
    .unwrap_err();
    assert_eq!(err.kind, vq_error::ErrorKind::Validation);
}

#[test]
fn wait_time_human_form_wire_shape() {
    let payload = apply("wait-time", &args(&["2s"]), &Options::new(), ctx(9, 4)).unwrap();
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        v["parsedStep"]["meta"],
        json!({"kind": "WAIT", "type": "TIME", "duration": 2000, "poll": 100})
    );
}

#[test]
fn xpath_selector_is_passed_through() {
    let payload = apply(
        "assert-exists",
        &args(&["//div[@id='done']"]),
        &Options::new(),
        ctx(7, 2),
    )
    .unwrap();
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        v["parsedStep"]["target"]["selectors"][0],
        json!({"type": "XPATH", "value": "//div[@id='done']"})
    );
}
