// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for text input, key presses, and dropdown picks.

use crate::args::{parse_modifier, parse_u32};
use vq_core::{ActionCode, ParsedStep, PickStrategy, Selector, StepMeta};
use vq_error::PlatformError;

/// `write(text, selector?)`.
///
/// With a selector the value becomes the `{"<selector>":"<text>"}` JSON
/// encoding and the target carries the inferred selector; without one the
/// value is the plain text and the target is absent.
pub(crate) fn write(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let text = &args[0];
    match args.get(1) {
        Some(selector) => {
            let mut pair = serde_json::Map::new();
            pair.insert(selector.clone(), serde_json::Value::String(text.clone()));
            let value = serde_json::Value::Object(pair).to_string();
            Ok(ParsedStep::bare(ActionCode::Write)
                .with_target(Selector::infer(selector).into())
                .with_value(value))
        }
        None => Ok(ParsedStep::bare(ActionCode::Write).with_value(text.clone())),
    }
}

/// `key(name, modifiers…)`. Meta is emitted only when modifiers are held.
pub(crate) fn key(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let name = &args[0];
    if name.trim().is_empty() {
        return Err(PlatformError::validation("key name must not be empty"));
    }
    let mut step = ParsedStep::bare(ActionCode::Key).with_value(name.clone());
    if args.len() > 1 {
        let modifiers = args[1..]
            .iter()
            .map(|m| parse_modifier(m))
            .collect::<Result<Vec<_>, _>>()?;
        step = step.with_meta(StepMeta::Key { modifiers });
    }
    Ok(step)
}

/// `pick(value, selector)`.
pub(crate) fn pick(args: &[String]) -> Result<ParsedStep, PlatformError> {
    Ok(ParsedStep::bare(ActionCode::Pick)
        .with_target(Selector::infer(&args[1]).into())
        .with_value(args[0].clone())
        .with_meta(StepMeta::Pick {
            strategy: PickStrategy::Value,
            index: None,
        }))
}

/// `pick-index(n, selector)`.
pub(crate) fn pick_index(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let index = parse_u32("index", &args[0])?;
    Ok(ParsedStep::bare(ActionCode::Pick)
        .with_target(Selector::infer(&args[1]).into())
        .with_meta(StepMeta::Pick {
            strategy: PickStrategy::Index,
            index: Some(index),
        }))
}

/// `pick-last(selector)`.
pub(crate) fn pick_last(args: &[String]) -> Result<ParsedStep, PlatformError> {
    Ok(ParsedStep::bare(ActionCode::Pick)
        .with_target(Selector::infer(&args[0]).into())
        .with_meta(StepMeta::Pick {
            strategy: PickStrategy::Last,
            index: None,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn write_with_selector_encodes_pair() {
        let step = write(&s(&["user@example.com", "#email"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "WRITE");
        assert_eq!(v["value"], r##"{"#email":"user@example.com"}"##);
        assert_eq!(v["target"]["selectors"][0]["type"], "CSS");
        assert_eq!(v["target"]["selectors"][0]["value"], "#email");
    }

    #[test]
    fn write_without_selector_is_plain() {
        let step = write(&s(&["hello world"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["value"], "hello world");
        assert!(v.get("target").is_none());
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn key_without_modifiers_has_no_meta() {
        let step = key(&s(&["Enter"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "KEY");
        assert_eq!(v["value"], "Enter");
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn key_with_modifiers_carries_meta() {
        let step = key(&s(&["a", "ctrl", "shift"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(
            v["meta"],
            json!({"kind": "KEY", "modifiers": ["CTRL", "SHIFT"]})
        );
    }

    #[test]
    fn key_rejects_empty_name() {
        assert!(key(&s(&[" "])).is_err());
    }

    #[test]
    fn pick_variants_discriminate() {
        let by_value = serde_json::to_value(pick(&s(&["Canada", "#country"])).unwrap()).unwrap();
        assert_eq!(by_value["meta"], json!({"kind": "PICK", "type": "VALUE"}));
        assert_eq!(by_value["value"], "Canada");

        let by_index =
            serde_json::to_value(pick_index(&s(&["2", "#country"])).unwrap()).unwrap();
        assert_eq!(
            by_index["meta"],
            json!({"kind": "PICK", "type": "INDEX", "index": 2})
        );

        let last = serde_json::to_value(pick_last(&s(&["#country"])).unwrap()).unwrap();
        assert_eq!(last["meta"], json!({"kind": "PICK", "type": "LAST"}));
    }

    #[test]
    fn pick_index_requires_integer() {
        assert!(pick_index(&s(&["two", "#country"])).is_err());
    }
}
