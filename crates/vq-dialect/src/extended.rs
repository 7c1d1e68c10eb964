// SPDX-License-Identifier: MIT OR Apache-2.0
//! The extended dialect: explicit `{type, command, target, value, options}`
//! step records.
//!
//! ```yaml
//! name: Login
//! steps:
//!   - type: interact
//!     command: click
//!     target: "#submit"
//!   - type: assert
//!     command: assert-equals
//!     target: "#banner"
//!     value: Welcome
//! ```
//!
//! `command` is the catalog primitive name; `type` is its category and is
//! validated against the command (a mismatch warns but does not fail).

use crate::{scalar_to_string, str_key, yaml_to_json};
use serde_yaml::{Mapping, Value};
use vq_catalog::StepKind;
use vq_core::Warning;
use vq_error::PlatformError;
use vq_ir::{StepOptions, TestDoc, UnifiedStep};

const SOURCE: &str = "dialect";

/// The category names used in the `type` field.
pub(crate) fn category(kind: StepKind) -> &'static str {
    use StepKind::*;
    match kind {
        Navigate | ScrollTop | ScrollBottom | ScrollElement | ScrollPosition | ScrollBy => {
            "navigate"
        }
        WaitTime | WaitElement => "wait",
        Click | Hover | DoubleClick | RightClick | MiddleClick | MouseMoveTo | MouseMoveBy
        | Write | Key | Pick | PickIndex | PickLast | WindowResize | SwitchNextTab
        | SwitchPrevTab | SwitchIframe | SwitchParentFrame => "interact",
        AssertExists | AssertNotExists | AssertEquals | AssertNotEquals | AssertChecked
        | AssertSelected | AssertVariable | AssertGt | AssertGte | AssertLt | AssertLte
        | AssertMatches => "assert",
        StoreElementText | StoreLiteral | CookieCreate | CookieDelete | CookieWipeAll => "data",
        Comment | ExecuteScript | UploadUrl | DismissAlert | DismissConfirm | DismissPrompt => {
            "misc"
        }
    }
}

// ── Parse ───────────────────────────────────────────────────────────────

pub(crate) fn parse(value: &Value, warnings: &mut Vec<Warning>) -> Result<TestDoc, PlatformError> {
    let Value::Mapping(map) = value else {
        return Err(PlatformError::validation(
            "extended document must be a mapping",
        ));
    };

    let mut doc = TestDoc::default();
    doc.name = match str_key(map, "name").and_then(scalar_to_string) {
        Some(name) => name,
        None => {
            warnings.push(Warning::from_source(
                SOURCE,
                "document has no \"name\"; using \"untitled\"",
            ));
            "untitled".to_string()
        }
    };
    doc.starting_url = str_key(map, "starting_url").and_then(scalar_to_string);
    doc.infrastructure = str_key(map, "infrastructure").map(yaml_to_json);

    if let Some(Value::Mapping(config)) = str_key(map, "config") {
        if let Some(Value::Mapping(vars)) = str_key(config, "variables") {
            for (k, v) in vars {
                if let (Some(key), Some(val)) = (scalar_to_string(k), scalar_to_string(v)) {
                    doc.variables.insert(key, val);
                }
            }
        }
    }

    if let Some(value) = str_key(map, "steps") {
        let Value::Sequence(items) = value else {
            return Err(PlatformError::validation("\"steps\" must be a list"));
        };
        for item in items {
            if let Some(step) = parse_step(item, warnings)? {
                doc.main.push(step);
            }
        }
    }

    Ok(doc)
}

fn parse_step(
    item: &Value,
    warnings: &mut Vec<Warning>,
) -> Result<Option<UnifiedStep>, PlatformError> {
    let Value::Mapping(m) = item else {
        return Err(PlatformError::validation(
            "extended steps must be mappings with \"type\" and \"command\"",
        ));
    };

    let Some(command) = str_key(m, "command").and_then(scalar_to_string) else {
        return Err(PlatformError::validation(
            "extended step is missing \"command\"",
        ));
    };
    let Some(kind) = StepKind::from_name(&command) else {
        warnings.push(Warning::from_source(
            SOURCE,
            format!("unknown command \"{command}\" skipped"),
        ));
        return Ok(None);
    };

    if let Some(declared) = str_key(m, "type").and_then(scalar_to_string) {
        let expected = category(kind);
        if declared != expected {
            warnings.push(Warning::from_source(
                SOURCE,
                format!(
                    "command \"{command}\" is declared as type \"{declared}\" but belongs to \"{expected}\""
                ),
            ));
        }
    }

    let mut step = UnifiedStep::new(kind);
    if let Some(target) = str_key(m, "target").and_then(scalar_to_string) {
        step = step.with_target(target);
    }
    if let Some(value) = str_key(m, "value").and_then(scalar_to_string) {
        step = step.with_value(value);
    }
    if let Some(Value::Mapping(opts)) = str_key(m, "options") {
        let mut options = StepOptions::new();
        for (k, v) in opts {
            if let Some(key) = scalar_to_string(k) {
                options.insert(key, yaml_to_json(v));
            }
        }
        step.options = options;
    }
    Ok(Some(step.with_raw(yaml_to_json(item))))
}

// ── Render ──────────────────────────────────────────────────────────────

pub(crate) fn render(doc: &TestDoc, warnings: &mut Vec<Warning>) -> Value {
    let mut map = Mapping::new();
    map.insert("name".into(), Value::String(doc.name.clone()));
    if let Some(url) = &doc.starting_url {
        map.insert("starting_url".into(), Value::String(url.clone()));
    }

    if !doc.setup.is_empty() || !doc.teardown.is_empty() {
        warnings.push(Warning::from_source(
            SOURCE,
            "setup/teardown sections have no extended form; steps were merged in order",
        ));
    }
    let steps: Vec<Value> = doc.steps_in_order().map(render_step).collect();
    if !steps.is_empty() {
        map.insert("steps".into(), Value::Sequence(steps));
    }

    if !doc.variables.is_empty() {
        let mut vars = Mapping::new();
        for (k, v) in &doc.variables {
            vars.insert(Value::String(k.clone()), Value::String(v.clone()));
        }
        let mut config = Mapping::new();
        config.insert("variables".into(), Value::Mapping(vars));
        map.insert("config".into(), Value::Mapping(config));
    }
    if let Some(infra) = &doc.infrastructure {
        map.insert(
            "infrastructure".into(),
            serde_yaml::to_value(infra).unwrap_or(Value::Null),
        );
    }

    Value::Mapping(map)
}

fn render_step(step: &UnifiedStep) -> Value {
    let mut m = Mapping::new();
    m.insert("type".into(), Value::String(category(step.kind).into()));
    m.insert("command".into(), Value::String(step.kind.name().into()));
    if let Some(target) = &step.target {
        m.insert("target".into(), Value::String(target.clone()));
    }
    if let Some(value) = &step.value {
        m.insert("value".into(), Value::String(value.clone()));
    }
    if !step.options.is_empty() {
        let mut opts = Mapping::new();
        for (k, v) in &step.options {
            opts.insert(
                Value::String(k.clone()),
                serde_yaml::to_value(v).unwrap_or(Value::Null),
            );
        }
        m.insert("options".into(), Value::Mapping(opts));
    }
    Value::Mapping(m)
}
