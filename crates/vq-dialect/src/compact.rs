// SPDX-License-Identifier: MIT OR Apache-2.0
//! The compact dialect: terse one-key steps under `do:`/`setup:`/`teardown:`.
//!
//! ```yaml
//! test: Login
//! nav: https://app.example/login
//! do:
//!   - c: "#submit"
//!   - t: {"#email": "a@b.c"}
//!   - wait: 2000
//!   - ch: "Welcome"
//! ```
//!
//! Only a core subset of primitives has a compact spelling; rendering a
//! document that uses anything else emits a warning per dropped step.

use crate::{scalar_to_string, str_key, yaml_to_json};
use serde_yaml::{Mapping, Value};
use vq_catalog::StepKind;
use vq_core::Warning;
use vq_error::PlatformError;
use vq_ir::{TestDoc, UnifiedStep};

const SOURCE: &str = "dialect";

// ── Parse ───────────────────────────────────────────────────────────────

pub(crate) fn parse(value: &Value, warnings: &mut Vec<Warning>) -> Result<TestDoc, PlatformError> {
    let Value::Mapping(map) = value else {
        return Err(PlatformError::validation(
            "compact document must be a mapping",
        ));
    };

    let mut doc = TestDoc::default();
    doc.name = match str_key(map, "test").and_then(scalar_to_string) {
        Some(name) => name,
        None => {
            warnings.push(Warning::from_source(
                SOURCE,
                "compact document has no \"test\" name; using \"untitled\"",
            ));
            "untitled".to_string()
        }
    };
    doc.starting_url = str_key(map, "nav").and_then(scalar_to_string);

    if let Some(Value::Mapping(data)) = str_key(map, "data") {
        for (k, v) in data {
            if let (Some(key), Some(val)) = (scalar_to_string(k), scalar_to_string(v)) {
                doc.variables.insert(key, val);
            }
        }
    }

    doc.setup = parse_section(str_key(map, "setup"), warnings)?;
    doc.main = parse_section(str_key(map, "do"), warnings)?;
    doc.teardown = parse_section(str_key(map, "teardown"), warnings)?;

    for (k, _) in map {
        if let Some(key) = scalar_to_string(k) {
            if !matches!(
                key.as_str(),
                "test" | "nav" | "data" | "setup" | "do" | "teardown"
            ) {
                warnings.push(Warning::from_source(
                    SOURCE,
                    format!("unknown compact key \"{key}\" ignored"),
                ));
            }
        }
    }

    Ok(doc)
}

fn parse_section(
    value: Option<&Value>,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<UnifiedStep>, PlatformError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let Value::Sequence(items) = value else {
        return Err(PlatformError::validation(
            "compact step sections must be lists",
        ));
    };
    let mut steps = Vec::new();
    for item in items {
        if let Some(step) = parse_step(item, warnings)? {
            steps.push(step);
        }
    }
    Ok(steps)
}

fn parse_step(
    item: &Value,
    warnings: &mut Vec<Warning>,
) -> Result<Option<UnifiedStep>, PlatformError> {
    let Value::Mapping(map) = item else {
        return Err(PlatformError::validation(format!(
            "compact steps must be one-key mappings, got: {}",
            yaml_to_json(item)
        )));
    };
    if map.len() != 1 {
        return Err(PlatformError::validation(
            "compact steps must have exactly one key",
        ));
    }
    let (key, operand) = map.iter().next().expect("len checked");
    let Some(key) = scalar_to_string(key) else {
        return Err(PlatformError::validation("compact step key must be a string"));
    };

    let raw = yaml_to_json(item);
    let step = match key.as_str() {
        "c" => scalar_target(StepKind::Click, operand, &key)?,
        "h" => scalar_target(StepKind::Hover, operand, &key)?,
        "ch" => scalar_target(StepKind::AssertExists, operand, &key)?,
        "nav" => scalar_target(StepKind::Navigate, operand, &key)?,
        "k" => scalar_value(StepKind::Key, operand, &key)?,
        "note" => scalar_value(StepKind::Comment, operand, &key)?,
        "t" => parse_write(operand)?,
        "wait" => parse_wait(operand)?,
        "store" => pair_map(operand, |variable, value| {
            UnifiedStep::new(StepKind::StoreLiteral)
                .with_value(value)
                .with_option("variable", serde_json::Value::String(variable))
        })?,
        "select" => pair_map(operand, |selector, value| {
            UnifiedStep::new(StepKind::Pick)
                .with_target(selector)
                .with_value(value)
        })?,
        other => {
            warnings.push(Warning::from_source(
                SOURCE,
                format!("unknown compact step key \"{other}\" skipped"),
            ));
            return Ok(None);
        }
    };
    Ok(Some(step.with_raw(raw)))
}

fn scalar_target(kind: StepKind, operand: &Value, key: &str) -> Result<UnifiedStep, PlatformError> {
    let target = scalar_to_string(operand)
        .ok_or_else(|| PlatformError::validation(format!("\"{key}\" expects a scalar operand")))?;
    Ok(UnifiedStep::new(kind).with_target(target))
}

fn scalar_value(kind: StepKind, operand: &Value, key: &str) -> Result<UnifiedStep, PlatformError> {
    let value = scalar_to_string(operand)
        .ok_or_else(|| PlatformError::validation(format!("\"{key}\" expects a scalar operand")))?;
    Ok(UnifiedStep::new(kind).with_value(value))
}

fn parse_write(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::Mapping(m) => {
            let mut entries = m.iter();
            let (selector, text) = entries.next().ok_or_else(|| {
                PlatformError::validation("\"t\" mapping must contain a selector and text")
            })?;
            if entries.next().is_some() {
                return Err(PlatformError::validation(
                    "\"t\" mapping must contain exactly one selector",
                ));
            }
            let selector = scalar_to_string(selector)
                .ok_or_else(|| PlatformError::validation("\"t\" selector must be a string"))?;
            let text = scalar_to_string(text)
                .ok_or_else(|| PlatformError::validation("\"t\" text must be a scalar"))?;
            Ok(UnifiedStep::new(StepKind::Write)
                .with_target(selector)
                .with_value(text))
        }
        other => {
            let text = scalar_to_string(other)
                .ok_or_else(|| PlatformError::validation("\"t\" expects text or {selector: text}"))?;
            Ok(UnifiedStep::new(StepKind::Write).with_value(text))
        }
    }
}

fn parse_wait(operand: &Value) -> Result<UnifiedStep, PlatformError> {
    match operand {
        Value::Number(n) => Ok(UnifiedStep::new(StepKind::WaitTime).with_value(n.to_string())),
        Value::String(s) => Ok(UnifiedStep::new(StepKind::WaitElement).with_target(s.clone())),
        _ => Err(PlatformError::validation(
            "\"wait\" expects milliseconds or a selector",
        )),
    }
}

fn pair_map(
    operand: &Value,
    build: impl FnOnce(String, String) -> UnifiedStep,
) -> Result<UnifiedStep, PlatformError> {
    let Value::Mapping(m) = operand else {
        return Err(PlatformError::validation(
            "expected a one-entry {key: value} mapping",
        ));
    };
    if m.len() != 1 {
        return Err(PlatformError::validation(
            "expected exactly one {key: value} entry",
        ));
    }
    let (k, v) = m.iter().next().expect("len checked");
    let k = scalar_to_string(k)
        .ok_or_else(|| PlatformError::validation("mapping key must be a string"))?;
    let v = scalar_to_string(v)
        .ok_or_else(|| PlatformError::validation("mapping value must be a scalar"))?;
    Ok(build(k, v))
}

// ── Render ──────────────────────────────────────────────────────────────

pub(crate) fn render(doc: &TestDoc, warnings: &mut Vec<Warning>) -> Value {
    let mut map = Mapping::new();
    map.insert("test".into(), Value::String(doc.name.clone()));
    if let Some(url) = &doc.starting_url {
        map.insert("nav".into(), Value::String(url.clone()));
    }
    if !doc.variables.is_empty() {
        let mut data = Mapping::new();
        for (k, v) in &doc.variables {
            data.insert(Value::String(k.clone()), Value::String(v.clone()));
        }
        map.insert("data".into(), Value::Mapping(data));
    }
    if doc.infrastructure.is_some() {
        warnings.push(Warning::from_source(
            SOURCE,
            "infrastructure block has no compact form and was dropped",
        ));
    }

    for (section, steps) in [
        ("setup", &doc.setup),
        ("do", &doc.main),
        ("teardown", &doc.teardown),
    ] {
        if steps.is_empty() {
            continue;
        }
        let rendered: Vec<Value> = steps
            .iter()
            .filter_map(|s| render_step(s, warnings))
            .collect();
        if !rendered.is_empty() {
            map.insert(section.into(), Value::Sequence(rendered));
        }
    }

    Value::Mapping(map)
}

fn render_step(step: &UnifiedStep, warnings: &mut Vec<Warning>) -> Option<Value> {
    let entry = |key: &str, operand: Value| {
        let mut m = Mapping::new();
        m.insert(key.into(), operand);
        Some(Value::Mapping(m))
    };
    let target = step.target.clone().unwrap_or_default();
    let value = step.value.clone().unwrap_or_default();

    match step.kind {
        StepKind::Click => entry("c", Value::String(target)),
        StepKind::Hover => entry("h", Value::String(target)),
        StepKind::AssertExists => entry("ch", Value::String(target)),
        StepKind::Navigate => entry(
            "nav",
            Value::String(step.target.clone().or_else(|| step.value.clone())?),
        ),
        StepKind::Comment => entry("note", Value::String(value)),
        StepKind::Key => {
            if step.options.contains_key("modifiers") {
                warnings.push(Warning::from_source(
                    SOURCE,
                    "key modifiers have no compact form and were dropped",
                ));
            }
            entry("k", Value::String(value))
        }
        StepKind::Write => match &step.target {
            Some(selector) => {
                let mut m = Mapping::new();
                m.insert(Value::String(selector.clone()), Value::String(value));
                entry("t", Value::Mapping(m))
            }
            None => entry("t", Value::String(value)),
        },
        StepKind::WaitTime => {
            let ms: u64 = value.parse().unwrap_or(0);
            entry("wait", Value::Number(ms.into()))
        }
        StepKind::WaitElement => {
            if step.options.contains_key("timeout") || step.value.is_some() {
                warnings.push(Warning::from_source(
                    SOURCE,
                    "wait-element timeout has no compact form and was dropped",
                ));
            }
            entry("wait", Value::String(target))
        }
        StepKind::StoreLiteral => {
            let variable = step
                .options
                .get("variable")
                .and_then(serde_json::Value::as_str)?;
            let mut m = Mapping::new();
            m.insert(Value::String(variable.to_string()), Value::String(value));
            entry("store", Value::Mapping(m))
        }
        StepKind::Pick => {
            let mut m = Mapping::new();
            m.insert(Value::String(target), Value::String(value));
            entry("select", Value::Mapping(m))
        }
        other => {
            warnings.push(Warning::from_source(
                SOURCE,
                format!(
                    "step \"{}\" has no compact form and was dropped",
                    other.name()
                ),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(source: &str) -> (TestDoc, Vec<Warning>) {
        let value: Value = serde_yaml::from_str(source).unwrap();
        let mut warnings = Vec::new();
        let doc = parse(&value, &mut warnings).unwrap();
        (doc, warnings)
    }

    #[test]
    fn parses_the_login_scenario() {
        let (doc, warnings) = parse_str(
            r##"
test: Login
nav: https://app.example/login
do:
  - c: "#submit"
  - t: {"#email": "a@b.c"}
  - wait: 2000
  - ch: "Welcome"
"##,
        );
        assert!(warnings.is_empty());
        assert_eq!(doc.name, "Login");
        assert_eq!(doc.starting_url.as_deref(), Some("https://app.example/login"));
        assert_eq!(doc.main.len(), 4);
        assert_eq!(doc.main[0].kind, StepKind::Click);
        assert_eq!(doc.main[1].kind, StepKind::Write);
        assert_eq!(doc.main[1].target.as_deref(), Some("#email"));
        assert_eq!(doc.main[1].value.as_deref(), Some("a@b.c"));
        assert_eq!(doc.main[2].kind, StepKind::WaitTime);
        assert_eq!(doc.main[2].value.as_deref(), Some("2000"));
        assert_eq!(doc.main[3].kind, StepKind::AssertExists);
        assert_eq!(doc.main[3].target.as_deref(), Some("Welcome"));
    }

    #[test]
    fn raw_preserves_source_fragment() {
        let (doc, _) = parse_str("test: T\ndo:\n  - c: \"#a\"\n");
        assert_eq!(
            doc.main[0].raw,
            Some(serde_json::json!({"c": "#a"}))
        );
    }

    #[test]
    fn wait_string_is_element_wait() {
        let (doc, _) = parse_str("test: T\ndo:\n  - wait: \"#spinner\"\n");
        assert_eq!(doc.main[0].kind, StepKind::WaitElement);
    }

    #[test]
    fn store_and_select_parse_pairs() {
        let (doc, _) = parse_str(
            "test: T\ndo:\n  - store: {greeting: hello}\n  - select: {\"#country\": Canada}\n",
        );
        assert_eq!(doc.main[0].kind, StepKind::StoreLiteral);
        assert_eq!(
            doc.main[0].options.get("variable"),
            Some(&serde_json::json!("greeting"))
        );
        assert_eq!(doc.main[1].kind, StepKind::Pick);
        assert_eq!(doc.main[1].value.as_deref(), Some("Canada"));
    }

    #[test]
    fn unknown_step_key_warns_and_skips() {
        let (doc, warnings) = parse_str("test: T\ndo:\n  - zz: 1\n  - c: \"#a\"\n");
        assert_eq!(doc.main.len(), 1);
        assert!(warnings[0].message.contains("zz"));
    }

    #[test]
    fn missing_name_warns() {
        let (doc, warnings) = parse_str("do:\n  - c: \"#a\"\n");
        assert_eq!(doc.name, "untitled");
        assert!(!warnings.is_empty());
    }

    #[test]
    fn render_then_parse_is_identity_for_compact_features() {
        let (doc, _) = parse_str(
            r##"
test: Roundtrip
nav: https://a.example
data:
  user: admin
setup:
  - nav: https://a.example/reset
do:
  - c: "#go"
  - t: hello
  - t: {"#f": v}
  - wait: 500
  - wait: "#el"
  - ch: Done
  - note: checked
  - k: Enter
  - h: "#menu"
  - store: {x: "1"}
  - select: {"#c": CA}
teardown:
  - note: bye
"##,
        );
        let mut warnings = Vec::new();
        let rendered = render(&doc, &mut warnings);
        assert!(warnings.is_empty(), "{warnings:?}");
        let text = serde_yaml::to_string(&rendered).unwrap();
        let (back, warnings2) = parse_str(&text);
        assert!(warnings2.is_empty());
        assert_eq!(back.without_raw(), doc.without_raw());
    }

    #[test]
    fn render_warns_on_inexpressible_steps() {
        let mut doc = TestDoc::named("T");
        doc.main
            .push(vq_ir::UnifiedStep::new(StepKind::ScrollBottom));
        let mut warnings = Vec::new();
        let value = render(&doc, &mut warnings);
        assert!(warnings[0].message.contains("scroll-bottom"));
        // The un-renderable step is dropped entirely.
        let text = serde_yaml::to_string(&value).unwrap();
        assert!(!text.contains("scroll"));
    }
}
