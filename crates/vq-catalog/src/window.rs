// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for window sizing, tab/frame switching, and dialog dismissal.

use crate::args::parse_u32;
use vq_core::{ActionCode, DismissKind, ParsedStep, Selector, StepMeta, SwitchTarget};
use vq_error::PlatformError;

pub(crate) fn window_resize(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let width = parse_u32("width", &args[0])?;
    let height = parse_u32("height", &args[1])?;
    if width == 0 || height == 0 {
        return Err(PlatformError::validation(
            "window dimensions must be greater than zero",
        ));
    }
    Ok(ParsedStep::bare(ActionCode::Window).with_meta(StepMeta::Window { width, height }))
}

pub(crate) fn switch(target: SwitchTarget) -> ParsedStep {
    ParsedStep::bare(ActionCode::Switch).with_meta(StepMeta::Switch { target })
}

pub(crate) fn switch_iframe(args: &[String]) -> ParsedStep {
    ParsedStep::bare(ActionCode::Switch)
        .with_target(Selector::infer(&args[0]).into())
        .with_meta(StepMeta::Switch {
            target: SwitchTarget::Iframe,
        })
}

pub(crate) fn dismiss(dialog: DismissKind, text: Option<&str>) -> ParsedStep {
    ParsedStep::bare(ActionCode::Dismiss).with_meta(StepMeta::Dismiss {
        dialog,
        text: text.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn resize_shape() {
        let step = window_resize(&s(&["1280", "720"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "WINDOW");
        assert_eq!(
            v["meta"],
            json!({"kind": "WINDOW", "width": 1280, "height": 720})
        );
    }

    #[test]
    fn resize_rejects_zero() {
        assert!(window_resize(&s(&["0", "720"])).is_err());
    }

    #[test]
    fn tab_switches() {
        let next = serde_json::to_value(switch(SwitchTarget::NextTab)).unwrap();
        assert_eq!(next["meta"], json!({"kind": "SWITCH", "type": "NEXT_TAB"}));
        let prev = serde_json::to_value(switch(SwitchTarget::PrevTab)).unwrap();
        assert_eq!(prev["meta"]["type"], "PREV_TAB");
    }

    #[test]
    fn iframe_switch_has_target() {
        let v = serde_json::to_value(switch_iframe(&s(&["#payment-frame"]))).unwrap();
        assert_eq!(v["meta"]["type"], "IFRAME");
        assert_eq!(v["target"]["selectors"][0]["value"], "#payment-frame");
    }

    #[test]
    fn parent_frame_has_no_target() {
        let v = serde_json::to_value(switch(SwitchTarget::ParentFrame)).unwrap();
        assert_eq!(v["meta"]["type"], "PARENT_FRAME");
        assert!(v.get("target").is_none());
    }

    #[test]
    fn dismiss_variants() {
        let alert = serde_json::to_value(dismiss(DismissKind::Alert, None)).unwrap();
        assert_eq!(alert["meta"], json!({"kind": "DISMISS", "type": "ALERT"}));

        let prompt = serde_json::to_value(dismiss(DismissKind::Prompt, Some("ok"))).unwrap();
        assert_eq!(
            prompt["meta"],
            json!({"kind": "DISMISS", "type": "PROMPT", "text": "ok"})
        );
    }
}
