// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for navigation, wait, and scroll primitives.

use crate::args::{parse_absolute_url, parse_duration_ms, parse_i64};
use vq_core::{
    ActionCode, ParsedStep, ScrollDirection, ScrollTarget, Selector, StepMeta, WaitKind,
};
use vq_error::PlatformError;

/// Default poll interval for timed waits, in milliseconds.
const WAIT_POLL_MS: u32 = 100;
/// Default timeout for element waits, in milliseconds.
const WAIT_ELEMENT_TIMEOUT_MS: u64 = 20_000;

pub(crate) fn navigate(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let url = parse_absolute_url("url", &args[0])?;
    Ok(ParsedStep::bare(ActionCode::Navigate).with_target(Selector::guess(&url).into()))
}

pub(crate) fn wait_time(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let duration = parse_duration_ms("duration", &args[0])?;
    Ok(ParsedStep::bare(ActionCode::Wait).with_meta(StepMeta::Wait {
        wait: WaitKind::Time,
        duration: Some(duration),
        poll: Some(WAIT_POLL_MS),
        timeout: None,
    }))
}

pub(crate) fn wait_element(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let timeout = match args.get(1) {
        Some(raw) => parse_duration_ms("timeout", raw)?,
        None => WAIT_ELEMENT_TIMEOUT_MS,
    };
    Ok(ParsedStep::bare(ActionCode::Wait)
        .with_target(Selector::infer(&args[0]).into())
        .with_meta(StepMeta::Wait {
            wait: WaitKind::Element,
            duration: None,
            poll: None,
            timeout: Some(timeout),
        }))
}

pub(crate) fn scroll_edge(direction: ScrollDirection) -> ParsedStep {
    ParsedStep::bare(ActionCode::Scroll).with_meta(StepMeta::Scroll {
        direction: Some(direction),
        target: None,
        x: None,
        y: None,
    })
}

pub(crate) fn scroll_element(args: &[String]) -> ParsedStep {
    ParsedStep::bare(ActionCode::Scroll)
        .with_target(Selector::infer(&args[0]).into())
        .with_meta(StepMeta::Scroll {
            direction: None,
            target: Some(ScrollTarget::Element),
            x: None,
            y: None,
        })
}

pub(crate) fn scroll_position(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let x = parse_i64("x", &args[0])?;
    let y = parse_i64("y", &args[1])?;
    Ok(ParsedStep::bare(ActionCode::Scroll).with_meta(StepMeta::Scroll {
        direction: None,
        target: Some(ScrollTarget::Position),
        x: Some(x),
        y: Some(y),
    }))
}

pub(crate) fn scroll_by(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let dx = parse_i64("dx", &args[0])?;
    let dy = parse_i64("dy", &args[1])?;
    Ok(ParsedStep::bare(ActionCode::Scroll).with_meta(StepMeta::Scroll {
        direction: None,
        target: Some(ScrollTarget::By),
        x: Some(dx),
        y: Some(dy),
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
    fn navigate_targets_guess_clue() {
        let step = navigate(&s(&["https://example.com"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "NAVIGATE");
        assert_eq!(v["target"]["selectors"][0]["type"], "GUESS");
        assert_eq!(
            v["target"]["selectors"][0]["value"],
            r#"{"clue":"https://example.com"}"#
        );
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn navigate_rejects_relative_url() {
        assert!(navigate(&s(&["/login"])).is_err());
    }

    #[test]
    fn wait_time_meta_includes_poll() {
        let step = wait_time(&s(&["2000"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(
            v["meta"],
            json!({"kind": "WAIT", "type": "TIME", "duration": 2000, "poll": 100})
        );
    }

    #[test]
    fn wait_time_accepts_seconds_form() {
        let step = wait_time(&s(&["3s"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["meta"]["duration"], 3000);
    }

    #[test]
    fn wait_element_defaults_timeout() {
        let step = wait_element(&s(&["#spinner"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(
            v["meta"],
            json!({"kind": "WAIT", "type": "ELEMENT", "timeout": 20000})
        );
        assert_eq!(v["target"]["selectors"][0]["type"], "CSS");
    }

    #[test]
    fn scroll_variants_discriminate() {
        let top = serde_json::to_value(scroll_edge(ScrollDirection::Top)).unwrap();
        assert_eq!(top["meta"]["direction"], "TOP");

        let el = serde_json::to_value(scroll_element(&s(&["#footer"]))).unwrap();
        assert_eq!(el["meta"]["type"], "ELEMENT");

        let pos = serde_json::to_value(scroll_position(&s(&["0", "400"])).unwrap()).unwrap();
        assert_eq!(pos["meta"]["type"], "POSITION");
        assert_eq!(pos["meta"]["y"], 400);

        let by = serde_json::to_value(scroll_by(&s(&["-5", "-120"])).unwrap()).unwrap();
        assert_eq!(by["meta"]["type"], "BY");
        assert_eq!(by["meta"]["x"], -5);
    }
}
