// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for variable stores and cookie operations.

use vq_core::{ActionCode, CookieOp, ParsedStep, Selector, StepMeta, StoreSource};
use vq_error::PlatformError;

pub(crate) fn store_element_text(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let variable = valid_variable(&args[1])?;
    Ok(ParsedStep::bare(ActionCode::Store)
        .with_target(Selector::infer(&args[0]).into())
        .with_meta(StepMeta::Store {
            source: StoreSource::ElementText,
            variable,
        }))
}

pub(crate) fn store_literal(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let variable = valid_variable(&args[1])?;
    Ok(ParsedStep::bare(ActionCode::Store)
        .with_value(args[0].clone())
        .with_meta(StepMeta::Store {
            source: StoreSource::Literal,
            variable,
        }))
}

pub(crate) fn cookie_create(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let name = valid_cookie_name(&args[0])?;
    Ok(ParsedStep::bare(ActionCode::Cookie)
        .with_value(args[1].clone())
        .with_meta(StepMeta::Cookie {
            op: CookieOp::Create,
            name: Some(name),
        }))
}

pub(crate) fn cookie_delete(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let name = valid_cookie_name(&args[0])?;
    Ok(ParsedStep::bare(ActionCode::Cookie).with_meta(StepMeta::Cookie {
        op: CookieOp::Delete,
        name: Some(name),
    }))
}

pub(crate) fn cookie_wipe_all() -> ParsedStep {
    ParsedStep::bare(ActionCode::Cookie).with_meta(StepMeta::Cookie {
        op: CookieOp::WipeAll,
        name: None,
    })
}

fn valid_variable(raw: &str) -> Result<String, PlatformError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlatformError::validation("variable name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn valid_cookie_name(raw: &str) -> Result<String, PlatformError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains([';', '=', ' ']) {
        return Err(PlatformError::validation(format!(
            "invalid cookie name '{raw}'"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn store_element_text_meta() {
        let step = store_element_text(&s(&["#username", "user"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "STORE");
        assert_eq!(
            v["meta"],
            json!({"kind": "STORE", "type": "ELEMENT_TEXT", "variable": "user"})
        );
        assert!(v.get("value").is_none());
    }

    #[test]
    fn store_literal_carries_value() {
        let step = store_literal(&s(&["hello", "greeting"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["value"], "hello");
        assert_eq!(v["meta"]["type"], "LITERAL");
        assert!(v.get("target").is_none());
    }

    #[test]
    fn cookie_create_shape() {
        let step = cookie_create(&s(&["session", "abc123"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "COOKIE");
        assert_eq!(
            v["meta"],
            json!({"kind": "COOKIE", "type": "CREATE", "name": "session"})
        );
        assert_eq!(v["value"], "abc123");
    }

    #[test]
    fn cookie_delete_has_no_value() {
        let step = cookie_delete(&s(&["session"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["meta"]["type"], "DELETE");
        assert!(v.get("value").is_none());
    }

    #[test]
    fn cookie_wipe_all_shape() {
        let v = serde_json::to_value(cookie_wipe_all()).unwrap();
        assert_eq!(v["meta"], json!({"kind": "COOKIE", "type": "WIPE_ALL"}));
    }

    #[test]
    fn cookie_name_is_validated() {
        assert!(cookie_create(&s(&["bad name", "v"])).is_err());
        assert!(cookie_delete(&s(&["a=b"])).is_err());
        assert!(cookie_delete(&s(&[""])).is_err());
    }

    #[test]
    fn variable_name_is_validated() {
        assert!(store_literal(&s(&["v", "  "])).is_err());
    }
}
