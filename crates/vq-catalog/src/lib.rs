// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-catalog
//!
//! The step primitive catalog: a closed table mapping each logical step
//! (click, write, assert-equals, mouse-move-by, cookie-create, …) to the
//! platform's canonical step payload — action code, selector shape, value
//! formatting, and meta block.
//!
//! Two entry points mirror the catalog contract:
//!
//! - [`describe`] returns a primitive's declared arity and argument
//!   validators.
//! - [`apply`] validates positional arguments and produces the full
//!   [`StepPayload`] for a checkpoint/position pair.
//!
//! Every builder is a pure function; the catalog holds no state.

mod args;
mod assertions;
mod data;
mod input;
mod kinds;
mod misc;
mod navigation;
mod pointer;
mod window;

pub use kinds::{ArgKind, ArgSpec, StepKind, StepSpec};

use std::collections::BTreeMap;
use vq_core::{
    ActionCode, CheckpointId, DismissKind, MouseAction, ParsedStep, ScrollDirection, StepPayload,
    SwitchTarget,
};
use vq_error::PlatformError;

/// Keyword options accepted by some primitives (pointer modifiers,
/// offsets, …), typically supplied by the extended YAML dialect.
pub type Options = BTreeMap<String, serde_json::Value>;

/// Where a built step lands: the checkpoint and 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepContext {
    /// Checkpoint the step is appended to.
    pub checkpoint_id: CheckpointId,
    /// 1-based dense position within the checkpoint.
    pub position: u32,
}

impl StepContext {
    /// Validated context; positions below 1 are rejected.
    pub fn new(checkpoint_id: CheckpointId, position: u32) -> Result<Self, PlatformError> {
        if position < 1 {
            return Err(PlatformError::validation(format!(
                "step position must be >= 1, got {position}"
            )));
        }
        Ok(Self {
            checkpoint_id,
            position,
        })
    }
}

/// Look up a primitive's declared arity and argument specs.
///
/// Unknown names fail with a Validation error naming the closest thing we
/// can offer: the full catalog via `list-steps`.
pub fn describe(name: &str) -> Result<StepSpec, PlatformError> {
    StepKind::from_name(name)
        .map(StepKind::spec)
        .ok_or_else(|| unknown_step(name))
}

/// Validate `args` against the primitive named `name` and produce the
/// complete payload for `ctx`.
pub fn apply(
    name: &str,
    args: &[String],
    options: &Options,
    ctx: StepContext,
) -> Result<StepPayload, PlatformError> {
    let kind = StepKind::from_name(name).ok_or_else(|| unknown_step(name))?;
    let parsed_step = build(kind, args, options)?;
    Ok(StepPayload {
        checkpoint_id: ctx.checkpoint_id,
        position: ctx.position,
        parsed_step,
    })
}

/// Build just the `parsedStep` body for a primitive.
///
/// This is the seam the YAML lowering uses: the orchestrator assigns
/// checkpoint and position later.
pub fn build(
    kind: StepKind,
    args: &[String],
    options: &Options,
) -> Result<ParsedStep, PlatformError> {
    args::check_arity(&kind.spec(), args)?;
    match kind {
        // Navigation & waits
        StepKind::Navigate => navigation::navigate(args),
        StepKind::WaitTime => navigation::wait_time(args),
        StepKind::WaitElement => navigation::wait_element(args),
        StepKind::ScrollTop => Ok(navigation::scroll_edge(ScrollDirection::Top)),
        StepKind::ScrollBottom => Ok(navigation::scroll_edge(ScrollDirection::Bottom)),
        StepKind::ScrollElement => Ok(navigation::scroll_element(args)),
        StepKind::ScrollPosition => navigation::scroll_position(args),
        StepKind::ScrollBy => navigation::scroll_by(args),

        // Pointer
        StepKind::Click => pointer::click_family(MouseAction::Click, args, options),
        StepKind::Hover => pointer::click_family(MouseAction::Over, args, options),
        StepKind::DoubleClick => pointer::click_family(MouseAction::DoubleClick, args, options),
        StepKind::RightClick => pointer::click_family(MouseAction::RightClick, args, options),
        StepKind::MiddleClick => pointer::click_family(MouseAction::MiddleClick, args, options),
        StepKind::MouseMoveTo => pointer::mouse_move(MouseAction::MoveTo, args),
        StepKind::MouseMoveBy => pointer::mouse_move(MouseAction::MoveBy, args),

        // Input
        StepKind::Write => input::write(args),
        StepKind::Key => input::key(args),
        StepKind::Pick => input::pick(args),
        StepKind::PickIndex => input::pick_index(args),
        StepKind::PickLast => input::pick_last(args),

        // Assertions
        StepKind::AssertExists => Ok(assertions::presence(ActionCode::AssertExists, args)),
        StepKind::AssertNotExists => Ok(assertions::presence(ActionCode::AssertNotExists, args)),
        StepKind::AssertChecked => Ok(assertions::presence(ActionCode::AssertChecked, args)),
        StepKind::AssertSelected => Ok(assertions::presence(ActionCode::AssertSelected, args)),
        StepKind::AssertEquals => Ok(assertions::text_comparison(ActionCode::AssertEquals, args)),
        StepKind::AssertNotEquals => {
            Ok(assertions::text_comparison(ActionCode::AssertNotEquals, args))
        }
        StepKind::AssertGt => assertions::numeric_comparison(ActionCode::AssertGt, args),
        StepKind::AssertGte => assertions::numeric_comparison(ActionCode::AssertGte, args),
        StepKind::AssertLt => assertions::numeric_comparison(ActionCode::AssertLt, args),
        StepKind::AssertLte => assertions::numeric_comparison(ActionCode::AssertLte, args),
        StepKind::AssertMatches => assertions::matches(args),
        StepKind::AssertVariable => assertions::variable(args),

        // Data & environment
        StepKind::StoreElementText => data::store_element_text(args),
        StepKind::StoreLiteral => data::store_literal(args),
        StepKind::CookieCreate => data::cookie_create(args),
        StepKind::CookieDelete => data::cookie_delete(args),
        StepKind::CookieWipeAll => Ok(data::cookie_wipe_all()),

        // Window, frames, dialogs
        StepKind::WindowResize => window::window_resize(args),
        StepKind::SwitchNextTab => Ok(window::switch(SwitchTarget::NextTab)),
        StepKind::SwitchPrevTab => Ok(window::switch(SwitchTarget::PrevTab)),
        StepKind::SwitchIframe => Ok(window::switch_iframe(args)),
        StepKind::SwitchParentFrame => Ok(window::switch(SwitchTarget::ParentFrame)),
        StepKind::DismissAlert => Ok(window::dismiss(DismissKind::Alert, None)),
        StepKind::DismissConfirm => Ok(window::dismiss(DismissKind::Confirm, None)),
        StepKind::DismissPrompt => Ok(window::dismiss(
            DismissKind::Prompt,
            args.first().map(String::as_str),
        )),

        // Misc
        StepKind::Comment => Ok(misc::comment(args)),
        StepKind::ExecuteScript => misc::execute_script(args),
        StepKind::UploadUrl => misc::upload_url(args),
    }
}

fn unknown_step(name: &str) -> PlatformError {
    PlatformError::validation(format!("unknown step primitive '{name}'"))
        .with_hint("run `api-cli list-steps` to see the catalog")
}
