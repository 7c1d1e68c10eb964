// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lowering from [`UnifiedStep`] to catalog invocations.
//!
//! Each primitive declares its positional order in the catalog; this
//! module maps the AST's named fields (target, value, options) into that
//! order and validates that required operands are present. Options with a
//! positional slot are consumed; the rest pass through to the builder.

use crate::{Invocation, StepOptions, UnifiedStep};
use vq_catalog::StepKind;
use vq_error::PlatformError;

impl UnifiedStep {
    /// Lower this step to the positional form `vq_catalog::apply` expects.
    pub fn to_invocation(&self) -> Result<Invocation, PlatformError> {
        use StepKind::*;
        let kind = self.kind;
        let mut options = self.options.clone();

        let args = match kind {
            Navigate => vec![self.target_or_value(kind)?],

            WaitTime => vec![self.require_value(kind)?],
            WaitElement => {
                let mut args = vec![self.require_target(kind)?];
                if let Some(timeout) = take_scalar(&mut options, "timeout")
                    .or_else(|| self.value.clone())
                {
                    args.push(timeout);
                }
                args
            }

            ScrollTop | ScrollBottom | CookieWipeAll | SwitchNextTab | SwitchPrevTab
            | SwitchParentFrame | DismissAlert | DismissConfirm => vec![],

            ScrollElement | SwitchIframe | PickLast | AssertExists | AssertNotExists
            | AssertChecked | AssertSelected | Click | Hover | DoubleClick | RightClick
            | MiddleClick => {
                vec![self.require_target(kind)?]
            }

            ScrollPosition | ScrollBy | MouseMoveTo | MouseMoveBy => {
                let x = take_required(&mut options, "x", kind)?;
                let y = take_required(&mut options, "y", kind)?;
                vec![x, y]
            }

            Write => {
                let mut args = vec![self.require_value(kind)?];
                if let Some(target) = &self.target {
                    args.push(target.clone());
                }
                args
            }

            Key => {
                let mut args = vec![self.require_value(kind)?];
                if let Some(mods) = options.remove("modifiers") {
                    let list = mods.as_array().cloned().unwrap_or_default();
                    for m in list {
                        match m.as_str() {
                            Some(name) => args.push(name.to_string()),
                            None => {
                                return Err(missing(kind, "modifiers must be a list of strings"))
                            }
                        }
                    }
                }
                args
            }

            Pick => vec![self.require_value(kind)?, self.require_target(kind)?],
            PickIndex => {
                let index = take_scalar(&mut options, "index")
                    .or_else(|| self.value.clone())
                    .ok_or_else(|| missing(kind, "an 'index' option is required"))?;
                vec![index, self.require_target(kind)?]
            }

            AssertEquals | AssertNotEquals | AssertGt | AssertGte | AssertLt | AssertLte
            | AssertMatches => {
                vec![self.require_target(kind)?, self.require_value(kind)?]
            }
            AssertVariable => {
                let variable = take_required(&mut options, "variable", kind)?;
                vec![variable, self.require_value(kind)?]
            }

            StoreElementText => {
                let variable = take_required(&mut options, "variable", kind)?;
                vec![self.require_target(kind)?, variable]
            }
            StoreLiteral => {
                let variable = take_required(&mut options, "variable", kind)?;
                vec![self.require_value(kind)?, variable]
            }

            CookieCreate => {
                let name = take_required(&mut options, "name", kind)?;
                vec![name, self.require_value(kind)?]
            }
            CookieDelete => {
                let name = take_scalar(&mut options, "name")
                    .or_else(|| self.value.clone())
                    .ok_or_else(|| missing(kind, "a cookie name is required"))?;
                vec![name]
            }

            WindowResize => {
                let width = take_required(&mut options, "width", kind)?;
                let height = take_required(&mut options, "height", kind)?;
                vec![width, height]
            }

            DismissPrompt => match &self.value {
                Some(text) => vec![text.clone()],
                None => vec![],
            },

            Comment | ExecuteScript => vec![self.require_value(kind)?],

            UploadUrl => vec![self.require_value(kind)?, self.require_target(kind)?],
        };

        Ok(Invocation {
            kind,
            args,
            options,
        })
    }

    fn require_target(&self, kind: StepKind) -> Result<String, PlatformError> {
        self.target
            .clone()
            .ok_or_else(|| missing(kind, "a target selector is required"))
    }

    fn require_value(&self, kind: StepKind) -> Result<String, PlatformError> {
        self.value
            .clone()
            .ok_or_else(|| missing(kind, "a value is required"))
    }

    fn target_or_value(&self, kind: StepKind) -> Result<String, PlatformError> {
        self.target
            .clone()
            .or_else(|| self.value.clone())
            .ok_or_else(|| missing(kind, "a URL is required"))
    }
}

fn missing(kind: StepKind, what: &str) -> PlatformError {
    PlatformError::validation(format!("step '{}': {what}", kind.name()))
}

/// Remove `key` from the options and render it as a positional string.
fn take_scalar(options: &mut StepOptions, key: &str) -> Option<String> {
    options.remove(key).map(|v| match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn take_required(
    options: &mut StepOptions,
    key: &str,
    kind: StepKind,
) -> Result<String, PlatformError> {
    take_scalar(options, key)
        .ok_or_else(|| missing(kind, &format!("a '{key}' option is required")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn navigate_prefers_target() {
        let inv = UnifiedStep::new(StepKind::Navigate)
            .with_target("https://example.com")
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["https://example.com"]);
    }

    #[test]
    fn write_orders_value_then_target() {
        let inv = UnifiedStep::new(StepKind::Write)
            .with_target("#email")
            .with_value("a@b.c")
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["a@b.c", "#email"]);
    }

    #[test]
    fn coordinates_come_from_options() {
        let inv = UnifiedStep::new(StepKind::MouseMoveBy)
            .with_option("x", json!(-10))
            .with_option("y", json!(-5))
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["-10", "-5"]);
        assert!(inv.options.is_empty(), "consumed options must not leak");
    }

    #[test]
    fn missing_coordinate_is_validation() {
        let err = UnifiedStep::new(StepKind::ScrollBy)
            .with_option("x", json!(1))
            .to_invocation()
            .unwrap_err();
        assert_eq!(err.kind, vq_error::ErrorKind::Validation);
        assert!(err.message.contains("'y'"));
    }

    #[test]
    fn key_appends_modifiers() {
        let inv = UnifiedStep::new(StepKind::Key)
            .with_value("a")
            .with_option("modifiers", json!(["ctrl", "shift"]))
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["a", "ctrl", "shift"]);
    }

    #[test]
    fn click_passes_pointer_options_through() {
        let inv = UnifiedStep::new(StepKind::Click)
            .with_target("#b")
            .with_option("modifiers", json!(["ctrl"]))
            .with_option("force", json!(true))
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["#b"]);
        assert_eq!(inv.options.get("force"), Some(&json!(true)));
        assert_eq!(inv.options.get("modifiers"), Some(&json!(["ctrl"])));
    }

    #[test]
    fn stores_take_variable_option() {
        let inv = UnifiedStep::new(StepKind::StoreElementText)
            .with_target("#user")
            .with_option("variable", json!("username"))
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["#user", "username"]);

        let inv = UnifiedStep::new(StepKind::StoreLiteral)
            .with_value("42")
            .with_option("variable", json!("answer"))
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["42", "answer"]);
    }

    #[test]
    fn cookie_create_orders_name_then_value() {
        let inv = UnifiedStep::new(StepKind::CookieCreate)
            .with_value("abc")
            .with_option("name", json!("session"))
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["session", "abc"]);
    }

    #[test]
    fn assert_variable_uses_variable_option() {
        let inv = UnifiedStep::new(StepKind::AssertVariable)
            .with_value("admin")
            .with_option("variable", json!("role"))
            .to_invocation()
            .unwrap();
        assert_eq!(inv.args, vec!["role", "admin"]);
    }

    #[test]
    fn lowered_steps_apply_cleanly() {
        // The lowering and the catalog agree on arity for a sample of
        // every family.
        let steps = vec![
            UnifiedStep::new(StepKind::Navigate).with_target("https://example.com"),
            UnifiedStep::new(StepKind::WaitTime).with_value("500"),
            UnifiedStep::new(StepKind::Click).with_target("#a"),
            UnifiedStep::new(StepKind::Write).with_value("x").with_target("#f"),
            UnifiedStep::new(StepKind::AssertEquals)
                .with_target("#t")
                .with_value("42"),
            UnifiedStep::new(StepKind::WindowResize)
                .with_option("width", json!(800))
                .with_option("height", json!(600)),
            UnifiedStep::new(StepKind::DismissPrompt).with_value("ok"),
            UnifiedStep::new(StepKind::ScrollBottom),
        ];
        for step in steps {
            let inv = step.to_invocation().unwrap();
            let built = vq_catalog::build(inv.kind, &inv.args, &inv.options);
            assert!(built.is_ok(), "{}: {:?}", inv.kind.name(), built.err());
        }
    }
}
