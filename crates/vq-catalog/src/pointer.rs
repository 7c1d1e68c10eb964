// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for pointer primitives: clicks, hovers, and raw moves.
//!
//! Every pointer step lowers to action `MOUSE`; the meta block's `action`
//! field selects the gesture. Click-family steps accept optional
//! `modifiers`, `offset`, `count` and `force` options (surfaced by the
//! extended YAML dialect).

use crate::args::{parse_i32, parse_modifier};
use crate::Options;
use vq_core::{ActionCode, KeyModifier, MouseAction, Offset, ParsedStep, Selector, StepMeta};
use vq_error::PlatformError;

pub(crate) fn click_family(
    action: MouseAction,
    args: &[String],
    options: &Options,
) -> Result<ParsedStep, PlatformError> {
    let (modifiers, offset, count, force) = pointer_options(options)?;
    Ok(ParsedStep::bare(ActionCode::Mouse)
        .with_target(Selector::infer(&args[0]).into())
        .with_meta(StepMeta::Mouse {
            action,
            x: None,
            y: None,
            modifiers,
            offset,
            count,
            force,
        }))
}

pub(crate) fn mouse_move(
    action: MouseAction,
    args: &[String],
) -> Result<ParsedStep, PlatformError> {
    let x = parse_i32("x", &args[0])?;
    let y = parse_i32("y", &args[1])?;
    Ok(ParsedStep::bare(ActionCode::Mouse).with_meta(StepMeta::Mouse {
        action,
        x: Some(x),
        y: Some(y),
        modifiers: Vec::new(),
        offset: None,
        count: None,
        force: None,
    }))
}

type PointerOptions = (Vec<KeyModifier>, Option<Offset>, Option<u32>, Option<bool>);

fn pointer_options(options: &Options) -> Result<PointerOptions, PlatformError> {
    let mut modifiers = Vec::new();
    if let Some(raw) = options.get("modifiers") {
        let list = raw.as_array().ok_or_else(|| {
            PlatformError::validation("modifiers option must be a list of key names")
        })?;
        for item in list {
            let name = item.as_str().ok_or_else(|| {
                PlatformError::validation("modifiers entries must be strings")
            })?;
            modifiers.push(parse_modifier(name)?);
        }
    }

    let offset = match options.get("offset") {
        Some(raw) => {
            let x = raw.get("x").and_then(serde_json::Value::as_i64);
            let y = raw.get("y").and_then(serde_json::Value::as_i64);
            match (x, y) {
                (Some(x), Some(y)) => Some(Offset {
                    x: x as i32,
                    y: y as i32,
                }),
                _ => {
                    return Err(PlatformError::validation(
                        "offset option must be an object with integer x and y",
                    ))
                }
            }
        }
        None => None,
    };

    let count = match options.get("count") {
        Some(raw) => Some(raw.as_u64().map(|c| c as u32).ok_or_else(|| {
            PlatformError::validation("count option must be a positive integer")
        })?),
        None => None,
    };

    let force = match options.get("force") {
        Some(raw) => Some(raw.as_bool().ok_or_else(|| {
            PlatformError::validation("force option must be a boolean")
        })?),
        None => None,
    };

    Ok((modifiers, offset, count, force))
}
