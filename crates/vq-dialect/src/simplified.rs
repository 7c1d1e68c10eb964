// SPDX-License-Identifier: MIT OR Apache-2.0
//! The simplified dialect: single-key step maps named after the action.
//!
//! ```yaml
//! name: Login
//! starting_url: https://app.example/login
//! steps:
//!   - click: "#submit"
//!   - write: {selector: "#email", text: a@b.c}
//!   - assert: {selector: "#banner", equals: Welcome}
//! config:
//!   variables:
//!     user: admin
//! ```
//!
//! Every catalog primitive has a simplified spelling, which makes this the
//! canonical dialect for conversions.

use crate::{scalar_to_string, str_key, yaml_to_json};
use serde_yaml::{Mapping, Value};
use vq_catalog::StepKind;
use vq_core::Warning;
use vq_error::PlatformError;
use vq_ir::{StepOptions, TestDoc, UnifiedStep};

const SOURCE: &str = "dialect";

// ── Parse ───────────────────────────────────────────────────────────────

pub(crate) fn parse(value: &Value, warnings: &mut Vec<Warning>) -> Result<TestDoc, PlatformError> {
    let Value::Mapping(map) = value else {
        return Err(PlatformError::validation(
            "simplified document must be a mapping",
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
    let Value::Mapping(map) = item else {
        return Err(PlatformError::validation(format!(
            "simplified steps must be one-key mappings, got: {}",
            yaml_to_json(item)
        )));
    };
    if map.len() != 1 {
        return Err(PlatformError::validation(
            "simplified steps must have exactly one key",
        ));
    }
    let (key, operand) = map.iter().next().expect("len checked");
    let Some(key) = scalar_to_string(key) else {
        return Err(PlatformError::validation("step key must be a string"));
    };

    let raw = yaml_to_json(item);
    let step = match key.as_str() {
        "navigate" => require_scalar(operand, &key)
            .map(|url| UnifiedStep::new(StepKind::Navigate).with_target(url))?,
        "click" => selector_step(StepKind::Click, operand, &key)?,
        "hover" => selector_step(StepKind::Hover, operand, &key)?,
        "double_click" => selector_step(StepKind::DoubleClick, operand, &key)?,
        "right_click" => selector_step(StepKind::RightClick, operand, &key)?,
        "middle_click" => selector_step(StepKind::MiddleClick, operand, &key)?,
        "write" => parse_write(operand)?,
        "key" => parse_key(operand)?,
        "wait" => parse_wait(operand)?,
        "scroll" => parse_scroll(operand)?,
        "mouse" => parse_mouse(operand)?,
        "assert" => parse_assert(operand)?,
        "pick" => parse_pick(operand)?,
        "store" => parse_store(operand)?,
        "cookie" => parse_cookie(operand)?,
        "window" => parse_window(operand)?,
        "switch" => parse_switch(operand)?,
        "dismiss" => parse_dismiss(operand)?,
        "comment" => require_scalar(operand, &key)
            .map(|text| UnifiedStep::new(StepKind::Comment).with_value(text))?,
        "execute" => require_scalar(operand, &key)
            .map(|name| UnifiedStep::new(StepKind::ExecuteScript).with_value(name))?,
        "upload" => parse_upload(operand)?,
        other => {
            warnings.push(Warning::from_source(
                SOURCE,
                format!("unknown simplified step key \"{other}\" skipped"),
            ));
            return Ok(None);
        }
    };
    Ok(Some(step.with_raw(raw)))
}

fn require_scalar(operand: &Value, key: &str) -> Result<String, PlatformError> {
    scalar_to_string(operand)
        .ok_or_else(|| PlatformError::validation(format!("\"{key}\" expects a scalar operand")))
}

fn mapping<'a>(operand: &'a Value, key: &str) -> Result<&'a Mapping, PlatformError> {
    match operand {
        Value::Mapping(m) => Ok(m),
        _ => Err(PlatformError::validation(format!(
            "\"{key}\" expects a mapping operand"
        ))),
    }
}

fn map_str(m: &Mapping, key: &str) -> Option<String> {
    str_key(m, key).and_then(scalar_to_string)
}

/// Scalar target, or `{selector, …options}`.
fn selector_step(kind: StepKind, operand: &Value, key: &str) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::Mapping(m) => {
            let selector = map_str(m, "selector").ok_or_else(|| {
                PlatformError::validation(format!("\"{key}\" mapping needs a \"selector\""))
            })?;
            let mut step = UnifiedStep::new(kind).with_target(selector);
            step.options = collect_options(m, &["selector"]);
            Ok(step)
        }
        other => Ok(UnifiedStep::new(kind).with_target(require_scalar(other, key)?)),
    }
}

/// All entries except `skip` become step options, converted to JSON.
fn collect_options(m: &Mapping, skip: &[&str]) -> StepOptions {
    let mut options = StepOptions::new();
    for (k, v) in m {
        if let Some(key) = scalar_to_string(k) {
            if !skip.contains(&key.as_str()) {
                options.insert(key, yaml_to_json(v));
            }
        }
    }
    options
}

fn parse_write(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::Mapping(m) => {
            let text = map_str(m, "text")
                .ok_or_else(|| PlatformError::validation("\"write\" mapping needs \"text\""))?;
            let mut step = UnifiedStep::new(StepKind::Write).with_value(text);
            if let Some(selector) = map_str(m, "selector") {
                step = step.with_target(selector);
            }
            Ok(step)
        }
        other => Ok(UnifiedStep::new(StepKind::Write).with_value(require_scalar(other, "write")?)),
    }
}

fn parse_key(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::Mapping(m) => {
            let name = map_str(m, "key")
                .ok_or_else(|| PlatformError::validation("\"key\" mapping needs \"key\""))?;
            let mut step = UnifiedStep::new(StepKind::Key).with_value(name);
            if let Some(mods) = str_key(m, "modifiers") {
                step = step.with_option("modifiers", yaml_to_json(mods));
            }
            Ok(step)
        }
        other => Ok(UnifiedStep::new(StepKind::Key).with_value(require_scalar(other, "key")?)),
    }
}

fn parse_wait(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::Number(n) => Ok(UnifiedStep::new(StepKind::WaitTime).with_value(n.to_string())),
        Value::String(s) => Ok(UnifiedStep::new(StepKind::WaitElement).with_target(s.clone())),
        Value::Mapping(m) => {
            let selector = map_str(m, "selector")
                .ok_or_else(|| PlatformError::validation("\"wait\" mapping needs \"selector\""))?;
            let mut step = UnifiedStep::new(StepKind::WaitElement).with_target(selector);
            if let Some(timeout) = str_key(m, "timeout") {
                step = step.with_option("timeout", yaml_to_json(timeout));
            }
            Ok(step)
        }
        _ => Err(PlatformError::validation(
            "\"wait\" expects milliseconds, a selector, or {selector, timeout}",
        )),
    }
}

fn parse_scroll(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::String(s) => match s.as_str() {
            "top" => Ok(UnifiedStep::new(StepKind::ScrollTop)),
            "bottom" => Ok(UnifiedStep::new(StepKind::ScrollBottom)),
            other => Err(PlatformError::validation(format!(
                "\"scroll\" scalar must be top or bottom, got \"{other}\""
            ))),
        },
        Value::Mapping(m) => {
            if let Some(selector) = map_str(m, "selector") {
                return Ok(UnifiedStep::new(StepKind::ScrollElement).with_target(selector));
            }
            if let Some(pair) = str_key(m, "position") {
                let (x, y) = coordinate_pair(pair, "position")?;
                return Ok(UnifiedStep::new(StepKind::ScrollPosition)
                    .with_option("x", x)
                    .with_option("y", y));
            }
            if let Some(pair) = str_key(m, "by") {
                let (x, y) = coordinate_pair(pair, "by")?;
                return Ok(UnifiedStep::new(StepKind::ScrollBy)
                    .with_option("x", x)
                    .with_option("y", y));
            }
            Err(PlatformError::validation(
                "\"scroll\" mapping needs selector, position or by",
            ))
        }
        _ => Err(PlatformError::validation(
            "\"scroll\" expects top/bottom, {selector}, {position} or {by}",
        )),
    }
}

fn parse_mouse(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    let m = mapping(operand, "mouse")?;
    if let Some(pair) = str_key(m, "move_to") {
        let (x, y) = coordinate_pair(pair, "move_to")?;
        return Ok(UnifiedStep::new(StepKind::MouseMoveTo)
            .with_option("x", x)
            .with_option("y", y));
    }
    if let Some(pair) = str_key(m, "move_by") {
        let (x, y) = coordinate_pair(pair, "move_by")?;
        return Ok(UnifiedStep::new(StepKind::MouseMoveBy)
            .with_option("x", x)
            .with_option("y", y));
    }
    Err(PlatformError::validation(
        "\"mouse\" mapping needs move_to or move_by",
    ))
}

fn coordinate_pair(
    value: &Value,
    key: &str,
) -> Result<(serde_json::Value, serde_json::Value), PlatformError> {
    match value {
        Value::Sequence(seq) if seq.len() == 2 => {
            Ok((yaml_to_json(&seq[0]), yaml_to_json(&seq[1])))
        }
        _ => Err(PlatformError::validation(format!(
            "\"{key}\" expects a two-element [x, y] list"
        ))),
    }
}

fn parse_assert(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    let m = match operand {
        Value::Mapping(m) => m,
        other => {
            let target = require_scalar(other, "assert")?;
            return Ok(UnifiedStep::new(StepKind::AssertExists).with_target(target));
        }
    };

    if let Some(variable) = map_str(m, "variable") {
        let expected = map_str(m, "equals")
            .ok_or_else(|| PlatformError::validation("variable asserts need \"equals\""))?;
        return Ok(UnifiedStep::new(StepKind::AssertVariable)
            .with_value(expected)
            .with_option("variable", serde_json::Value::String(variable)));
    }

    let selector = map_str(m, "selector")
        .ok_or_else(|| PlatformError::validation("\"assert\" mapping needs \"selector\""))?;
    let with_value = |kind: StepKind, value: String| {
        Ok(UnifiedStep::new(kind).with_target(selector.clone()).with_value(value))
    };

    if let Some(v) = map_str(m, "equals") {
        return with_value(StepKind::AssertEquals, v);
    }
    if let Some(v) = map_str(m, "not_equals") {
        return with_value(StepKind::AssertNotEquals, v);
    }
    if let Some(v) = map_str(m, "gt") {
        return with_value(StepKind::AssertGt, v);
    }
    if let Some(v) = map_str(m, "gte") {
        return with_value(StepKind::AssertGte, v);
    }
    if let Some(v) = map_str(m, "lt") {
        return with_value(StepKind::AssertLt, v);
    }
    if let Some(v) = map_str(m, "lte") {
        return with_value(StepKind::AssertLte, v);
    }
    if let Some(v) = map_str(m, "matches") {
        return with_value(StepKind::AssertMatches, v);
    }
    if str_key(m, "checked").is_some() {
        return Ok(UnifiedStep::new(StepKind::AssertChecked).with_target(selector));
    }
    if str_key(m, "selected").is_some() {
        return Ok(UnifiedStep::new(StepKind::AssertSelected).with_target(selector));
    }
    if str_key(m, "not_exists").is_some() {
        return Ok(UnifiedStep::new(StepKind::AssertNotExists).with_target(selector));
    }
    Ok(UnifiedStep::new(StepKind::AssertExists).with_target(selector))
}

fn parse_pick(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    let m = mapping(operand, "pick")?;
    let selector = map_str(m, "selector")
        .ok_or_else(|| PlatformError::validation("\"pick\" mapping needs \"selector\""))?;
    if let Some(value) = map_str(m, "value") {
        return Ok(UnifiedStep::new(StepKind::Pick)
            .with_target(selector)
            .with_value(value));
    }
    if let Some(index) = str_key(m, "index") {
        return Ok(UnifiedStep::new(StepKind::PickIndex)
            .with_target(selector)
            .with_option("index", yaml_to_json(index)));
    }
    if str_key(m, "last").is_some() {
        return Ok(UnifiedStep::new(StepKind::PickLast).with_target(selector));
    }
    Err(PlatformError::validation(
        "\"pick\" mapping needs value, index or last",
    ))
}

fn parse_store(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    let m = mapping(operand, "store")?;
    let variable = map_str(m, "variable")
        .ok_or_else(|| PlatformError::validation("\"store\" mapping needs \"variable\""))?;
    if let Some(selector) = map_str(m, "selector") {
        return Ok(UnifiedStep::new(StepKind::StoreElementText)
            .with_target(selector)
            .with_option("variable", serde_json::Value::String(variable)));
    }
    if let Some(value) = map_str(m, "value") {
        return Ok(UnifiedStep::new(StepKind::StoreLiteral)
            .with_value(value)
            .with_option("variable", serde_json::Value::String(variable)));
    }
    Err(PlatformError::validation(
        "\"store\" mapping needs selector or value",
    ))
}

fn parse_cookie(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::String(s) if s == "wipe-all" => Ok(UnifiedStep::new(StepKind::CookieWipeAll)),
        Value::Mapping(m) => {
            if let Some(name) = map_str(m, "delete") {
                return Ok(UnifiedStep::new(StepKind::CookieDelete)
                    .with_option("name", serde_json::Value::String(name)));
            }
            let name = map_str(m, "name")
                .ok_or_else(|| PlatformError::validation("\"cookie\" mapping needs \"name\""))?;
            let value = map_str(m, "value")
                .ok_or_else(|| PlatformError::validation("\"cookie\" mapping needs \"value\""))?;
            Ok(UnifiedStep::new(StepKind::CookieCreate)
                .with_value(value)
                .with_option("name", serde_json::Value::String(name)))
        }
        _ => Err(PlatformError::validation(
            "\"cookie\" expects {name, value}, {delete: name} or wipe-all",
        )),
    }
}

fn parse_window(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    let m = mapping(operand, "window")?;
    let width = str_key(m, "width")
        .ok_or_else(|| PlatformError::validation("\"window\" mapping needs \"width\""))?;
    let height = str_key(m, "height")
        .ok_or_else(|| PlatformError::validation("\"window\" mapping needs \"height\""))?;
    Ok(UnifiedStep::new(StepKind::WindowResize)
        .with_option("width", yaml_to_json(width))
        .with_option("height", yaml_to_json(height)))
}

fn parse_switch(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::String(s) => match s.as_str() {
            "next-tab" => Ok(UnifiedStep::new(StepKind::SwitchNextTab)),
            "prev-tab" => Ok(UnifiedStep::new(StepKind::SwitchPrevTab)),
            "parent-frame" => Ok(UnifiedStep::new(StepKind::SwitchParentFrame)),
            other => Err(PlatformError::validation(format!(
                "\"switch\" scalar must be next-tab, prev-tab or parent-frame, got \"{other}\""
            ))),
        },
        Value::Mapping(m) => {
            let selector = map_str(m, "iframe")
                .ok_or_else(|| PlatformError::validation("\"switch\" mapping needs \"iframe\""))?;
            Ok(UnifiedStep::new(StepKind::SwitchIframe).with_target(selector))
        }
        _ => Err(PlatformError::validation(
            "\"switch\" expects next-tab, prev-tab, parent-frame or {iframe}",
        )),
    }
}

fn parse_dismiss(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::String(s) => match s.as_str() {
            "alert" => Ok(UnifiedStep::new(StepKind::DismissAlert)),
            "confirm" => Ok(UnifiedStep::new(StepKind::DismissConfirm)),
            "prompt" => Ok(UnifiedStep::new(StepKind::DismissPrompt)),
            other => Err(PlatformError::validation(format!(
                "\"dismiss\" scalar must be alert, confirm or prompt, got \"{other}\""
            ))),
        },
        Value::Mapping(m) => {
            let text = map_str(m, "prompt")
                .ok_or_else(|| PlatformError::validation("\"dismiss\" mapping needs \"prompt\""))?;
            Ok(UnifiedStep::new(StepKind::DismissPrompt).with_value(text))
        }
        _ => Err(PlatformError::validation(
            "\"dismiss\" expects alert, confirm, prompt or {prompt: text}",
        )),
    }
}

fn parse_upload(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    let m = mapping(operand, "upload")?;
    let url = map_str(m, "url")
        .ok_or_else(|| PlatformError::validation("\"upload\" mapping needs \"url\""))?;
    let selector = map_str(m, "selector")
        .ok_or_else(|| PlatformError::validation("\"upload\" mapping needs \"selector\""))?;
    Ok(UnifiedStep::new(StepKind::UploadUrl)
        .with_value(url)
        .with_target(selector))
}

// ── Render ──────────────────────────────────────────────────────────────

pub(crate) fn render(doc: &TestDoc, warnings: &mut Vec<Warning>) -> Value {
    let mut map = Mapping::new();
    map.insert("name".into(), Value::String(doc.name.clone()));
    if let Some(url) = &doc.starting_url {
        map.insert("starting_url".into(), Value::String(url.clone()));
    }

    let mut steps: Vec<Value> = Vec::new();
    if !doc.setup.is_empty() || !doc.teardown.is_empty() {
        warnings.push(Warning::from_source(
            SOURCE,
            "setup/teardown sections have no simplified form; steps were merged in order",
        ));
    }
    for step in doc.steps_in_order() {
        steps.push(render_step(step));
    }
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
        map.insert("infrastructure".into(), json_to_yaml(infra));
    }

    Value::Mapping(map)
}

fn json_to_yaml(value: &serde_json::Value) -> Value {
    serde_yaml::to_value(value).unwrap_or(Value::Null)
}

fn entry(key: &str, operand: Value) -> Value {
    let mut m = Mapping::new();
    m.insert(key.into(), operand);
    Value::Mapping(m)
}

fn selector_operand(step: &UnifiedStep) -> Value {
    let target = step.target.clone().unwrap_or_default();
    if step.options.is_empty() {
        Value::String(target)
    } else {
        let mut m = Mapping::new();
        m.insert("selector".into(), Value::String(target));
        for (k, v) in &step.options {
            m.insert(Value::String(k.clone()), json_to_yaml(v));
        }
        Value::Mapping(m)
    }
}

fn render_step(step: &UnifiedStep) -> Value {
    use StepKind::*;
    let target = || Value::String(step.target.clone().unwrap_or_default());
    let value = || Value::String(step.value.clone().unwrap_or_default());
    let option = |key: &str| step.options.get(key).map(json_to_yaml).unwrap_or(Value::Null);

    match step.kind {
        Navigate => entry(
            "navigate",
            Value::String(
                step.target
                    .clone()
                    .or_else(|| step.value.clone())
                    .unwrap_or_default(),
            ),
        ),
        Click => entry("click", selector_operand(step)),
        Hover => entry("hover", selector_operand(step)),
        DoubleClick => entry("double_click", selector_operand(step)),
        RightClick => entry("right_click", selector_operand(step)),
        MiddleClick => entry("middle_click", selector_operand(step)),
        Write => match &step.target {
            Some(selector) => {
                let mut m = Mapping::new();
                m.insert("selector".into(), Value::String(selector.clone()));
                m.insert("text".into(), value());
                entry("write", Value::Mapping(m))
            }
            None => entry("write", value()),
        },
        Key => {
            if step.options.contains_key("modifiers") {
                let mut m = Mapping::new();
                m.insert("key".into(), value());
                m.insert("modifiers".into(), option("modifiers"));
                entry("key", Value::Mapping(m))
            } else {
                entry("key", value())
            }
        }
        WaitTime => {
            let ms: u64 = step.value.as_deref().unwrap_or("0").parse().unwrap_or(0);
            entry("wait", Value::Number(ms.into()))
        }
        WaitElement => {
            let mut m = Mapping::new();
            m.insert("selector".into(), target());
            if step.options.contains_key("timeout") {
                m.insert("timeout".into(), option("timeout"));
            }
            entry("wait", Value::Mapping(m))
        }
        ScrollTop => entry("scroll", Value::String("top".into())),
        ScrollBottom => entry("scroll", Value::String("bottom".into())),
        ScrollElement => {
            let mut m = Mapping::new();
            m.insert("selector".into(), target());
            entry("scroll", Value::Mapping(m))
        }
        ScrollPosition => entry("scroll", pair_mapping("position", step)),
        ScrollBy => entry("scroll", pair_mapping("by", step)),
        MouseMoveTo => entry("mouse", pair_mapping("move_to", step)),
        MouseMoveBy => entry("mouse", pair_mapping("move_by", step)),
        AssertExists => entry("assert", target()),
        AssertNotExists => entry("assert", assert_mapping(step, "not_exists", Value::Bool(true))),
        AssertChecked => entry("assert", assert_mapping(step, "checked", Value::Bool(true))),
        AssertSelected => entry("assert", assert_mapping(step, "selected", Value::Bool(true))),
        AssertEquals => entry("assert", assert_mapping(step, "equals", value())),
        AssertNotEquals => entry("assert", assert_mapping(step, "not_equals", value())),
        AssertGt => entry("assert", assert_mapping(step, "gt", value())),
        AssertGte => entry("assert", assert_mapping(step, "gte", value())),
        AssertLt => entry("assert", assert_mapping(step, "lt", value())),
        AssertLte => entry("assert", assert_mapping(step, "lte", value())),
        AssertMatches => entry("assert", assert_mapping(step, "matches", value())),
        AssertVariable => {
            let mut m = Mapping::new();
            m.insert("variable".into(), option("variable"));
            m.insert("equals".into(), value());
            entry("assert", Value::Mapping(m))
        }
        Pick => {
            let mut m = Mapping::new();
            m.insert("selector".into(), target());
            m.insert("value".into(), value());
            entry("pick", Value::Mapping(m))
        }
        PickIndex => {
            let mut m = Mapping::new();
            m.insert("selector".into(), target());
            m.insert("index".into(), option("index"));
            entry("pick", Value::Mapping(m))
        }
        PickLast => {
            let mut m = Mapping::new();
            m.insert("selector".into(), target());
            m.insert("last".into(), Value::Bool(true));
            entry("pick", Value::Mapping(m))
        }
        StoreElementText => {
            let mut m = Mapping::new();
            m.insert("selector".into(), target());
            m.insert("variable".into(), option("variable"));
            entry("store", Value::Mapping(m))
        }
        StoreLiteral => {
            let mut m = Mapping::new();
            m.insert("value".into(), value());
            m.insert("variable".into(), option("variable"));
            entry("store", Value::Mapping(m))
        }
        CookieCreate => {
            let mut m = Mapping::new();
            m.insert("name".into(), option("name"));
            m.insert("value".into(), value());
            entry("cookie", Value::Mapping(m))
        }
        CookieDelete => {
            let mut m = Mapping::new();
            m.insert(
                "delete".into(),
                step.options
                    .get("name")
                    .map(json_to_yaml)
                    .or_else(|| step.value.clone().map(Value::String))
                    .unwrap_or(Value::Null),
            );
            entry("cookie", Value::Mapping(m))
        }
        CookieWipeAll => entry("cookie", Value::String("wipe-all".into())),
        WindowResize => {
            let mut m = Mapping::new();
            m.insert("width".into(), option("width"));
            m.insert("height".into(), option("height"));
            entry("window", Value::Mapping(m))
        }
        SwitchNextTab => entry("switch", Value::String("next-tab".into())),
        SwitchPrevTab => entry("switch", Value::String("prev-tab".into())),
        SwitchParentFrame => entry("switch", Value::String("parent-frame".into())),
        SwitchIframe => {
            let mut m = Mapping::new();
            m.insert("iframe".into(), target());
            entry("switch", Value::Mapping(m))
        }
        DismissAlert => entry("dismiss", Value::String("alert".into())),
        DismissConfirm => entry("dismiss", Value::String("confirm".into())),
        DismissPrompt => match &step.value {
            Some(text) => {
                let mut m = Mapping::new();
                m.insert("prompt".into(), Value::String(text.clone()));
                entry("dismiss", Value::Mapping(m))
            }
            None => entry("dismiss", Value::String("prompt".into())),
        },
        Comment => entry("comment", value()),
        ExecuteScript => entry("execute", value()),
        UploadUrl => {
            let mut m = Mapping::new();
            m.insert("url".into(), value());
            m.insert("selector".into(), target());
            entry("upload", Value::Mapping(m))
        }
    }
}

fn pair_mapping(key: &str, step: &UnifiedStep) -> Value {
    let mut m = Mapping::new();
    let x = step.options.get("x").map(json_to_yaml).unwrap_or(Value::Null);
    let y = step.options.get("y").map(json_to_yaml).unwrap_or(Value::Null);
    m.insert(key.into(), Value::Sequence(vec![x, y]));
    Value::Mapping(m)
}

fn assert_mapping(step: &UnifiedStep, key: &str, operand: Value) -> Value {
    let mut m = Mapping::new();
    m.insert(
        "selector".into(),
        Value::String(step.target.clone().unwrap_or_default()),
    );
    m.insert(key.into(), operand);
    Value::Mapping(m)
}
