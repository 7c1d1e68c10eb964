// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step payload wire shapes.
//!
//! A step sent to the platform's `/teststeps` endpoint is an envelope
//! `{checkpointId, position, parsedStep}` where `parsedStep` carries an
//! upper-snake action code, an optional element target, an optional string
//! value, and — for composite actions — a `meta` block discriminated by
//! `kind`. The types here serialise to exactly that shape and round-trip
//! losslessly through JSON.

use crate::selector::Target;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Action codes ────────────────────────────────────────────────────────

/// Upper-snake action enumeration of the platform's step grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCode {
    /// Load a URL.
    Navigate,
    /// Pointer interaction (clicks, hovers, raw moves).
    Mouse,
    /// Type text, optionally into a targeted field.
    Write,
    /// Press a named key.
    Key,
    /// Select an option from a dropdown.
    Pick,
    /// Wait for time or for an element.
    Wait,
    /// Scroll the page or an element.
    Scroll,
    /// Store a value into a named variable.
    Store,
    /// Cookie manipulation.
    Cookie,
    /// Element exists.
    AssertExists,
    /// Element does not exist.
    AssertNotExists,
    /// Element text equals the expected value.
    AssertEquals,
    /// Element text differs from the expected value.
    AssertNotEquals,
    /// Checkbox is checked.
    AssertChecked,
    /// Option is selected.
    AssertSelected,
    /// Stored variable equals the expected value.
    AssertVariable,
    /// Numeric comparison: greater than.
    AssertGt,
    /// Numeric comparison: greater or equal.
    AssertGte,
    /// Numeric comparison: less than.
    AssertLt,
    /// Numeric comparison: less or equal.
    AssertLte,
    /// Element text matches a regular expression.
    AssertMatches,
    /// Window sizing.
    Window,
    /// Tab / frame switching.
    Switch,
    /// Dialog dismissal.
    Dismiss,
    /// Non-executing annotations (comments).
    Misc,
    /// Run a named extension script.
    Execute,
    /// Upload a file fetched from a URL.
    Upload,
}

impl ActionCode {
    /// Wire string for this action (e.g. `"ASSERT_EXISTS"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Navigate => "NAVIGATE",
            Self::Mouse => "MOUSE",
            Self::Write => "WRITE",
            Self::Key => "KEY",
            Self::Pick => "PICK",
            Self::Wait => "WAIT",
            Self::Scroll => "SCROLL",
            Self::Store => "STORE",
            Self::Cookie => "COOKIE",
            Self::AssertExists => "ASSERT_EXISTS",
            Self::AssertNotExists => "ASSERT_NOT_EXISTS",
            Self::AssertEquals => "ASSERT_EQUALS",
            Self::AssertNotEquals => "ASSERT_NOT_EQUALS",
            Self::AssertChecked => "ASSERT_CHECKED",
            Self::AssertSelected => "ASSERT_SELECTED",
            Self::AssertVariable => "ASSERT_VARIABLE",
            Self::AssertGt => "ASSERT_GT",
            Self::AssertGte => "ASSERT_GTE",
            Self::AssertLt => "ASSERT_LT",
            Self::AssertLte => "ASSERT_LTE",
            Self::AssertMatches => "ASSERT_MATCHES",
            Self::Window => "WINDOW",
            Self::Switch => "SWITCH",
            Self::Dismiss => "DISMISS",
            Self::Misc => "MISC",
            Self::Execute => "EXECUTE",
            Self::Upload => "UPLOAD",
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Meta discriminators ─────────────────────────────────────────────────

/// Pointer action inside a `MOUSE` meta block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MouseAction {
    /// Single left click.
    Click,
    /// Hover (mouse over).
    Over,
    /// Double click.
    DoubleClick,
    /// Right (context) click.
    RightClick,
    /// Middle click.
    MiddleClick,
    /// Move pointer to absolute coordinates.
    MoveTo,
    /// Move pointer by a delta; negative values allowed.
    MoveBy,
}

/// `WAIT` meta discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitKind {
    /// Fixed-duration wait.
    Time,
    /// Wait until an element appears.
    Element,
}

/// Page-edge scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrollDirection {
    /// Scroll to the top of the page.
    Top,
    /// Scroll to the bottom of the page.
    Bottom,
}

/// Non-directional scroll discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrollTarget {
    /// Scroll an element into view.
    Element,
    /// Scroll to an absolute position.
    Position,
    /// Scroll by a pixel delta.
    By,
}

/// `PICK` selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickStrategy {
    /// Pick by visible value.
    Value,
    /// Pick by zero-based index.
    Index,
    /// Pick the last option.
    Last,
}

/// `STORE` source discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreSource {
    /// Store the text of a targeted element.
    ElementText,
    /// Store a literal value.
    Literal,
}

/// `COOKIE` operation discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CookieOp {
    /// Create or overwrite a cookie.
    Create,
    /// Delete a cookie by name.
    Delete,
    /// Remove every cookie.
    WipeAll,
}

/// `SWITCH` destination discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchTarget {
    /// Next browser tab.
    NextTab,
    /// Previous browser tab.
    PrevTab,
    /// Enter an iframe (the step target selects it).
    Iframe,
    /// Return to the parent frame.
    ParentFrame,
}

/// Dialog family for `DISMISS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DismissKind {
    /// `alert()` dialog.
    Alert,
    /// `confirm()` dialog.
    Confirm,
    /// `prompt()` dialog, optionally answered with text.
    Prompt,
}

/// Keyboard modifier held during a key press or click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyModifier {
    /// Control.
    Ctrl,
    /// Alt / Option.
    Alt,
    /// Shift.
    Shift,
    /// Meta / Command.
    Meta,
}

/// Pixel offset applied to a pointer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

// ── Meta block ──────────────────────────────────────────────────────────

/// The `meta` block of a composite step, discriminated by `kind`.
///
/// Simple actions (navigate, write without modifiers, assertions) carry no
/// meta at all; the payload builder leaves the field absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepMeta {
    /// Pointer interactions.
    Mouse {
        /// Which pointer action.
        action: MouseAction,
        /// Absolute or delta X for move actions.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<i32>,
        /// Absolute or delta Y for move actions.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<i32>,
        /// Modifier keys held during the action.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        modifiers: Vec<KeyModifier>,
        /// Offset from the element's centre.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<Offset>,
        /// Click repetition count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
        /// Bypass actionability checks.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        force: Option<bool>,
    },
    /// Timed or element waits.
    Wait {
        /// TIME or ELEMENT.
        #[serde(rename = "type")]
        wait: WaitKind,
        /// Duration in milliseconds (TIME).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
        /// Poll interval in milliseconds (TIME).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        poll: Option<u32>,
        /// Timeout in milliseconds (ELEMENT).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
    /// Scrolling. Page-edge scrolls carry `direction`; element, position
    /// and delta scrolls carry `type` (plus coordinates where relevant).
    Scroll {
        /// TOP or BOTTOM for page-edge scrolls.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<ScrollDirection>,
        /// ELEMENT, POSITION or BY for the other variants.
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        target: Option<ScrollTarget>,
        /// X coordinate or delta.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<i64>,
        /// Y coordinate or delta.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<i64>,
    },
    /// Dropdown selection.
    Pick {
        /// VALUE, INDEX or LAST.
        #[serde(rename = "type")]
        strategy: PickStrategy,
        /// Zero-based index for INDEX picks.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<u32>,
    },
    /// Key press with modifiers. Emitted only when modifiers are present.
    Key {
        /// Modifier keys held during the press.
        modifiers: Vec<KeyModifier>,
    },
    /// Variable stores.
    Store {
        /// ELEMENT_TEXT or LITERAL.
        #[serde(rename = "type")]
        source: StoreSource,
        /// Variable name to store into.
        variable: String,
    },
    /// Cookie operations.
    Cookie {
        /// CREATE, DELETE or WIPE_ALL.
        #[serde(rename = "type")]
        op: CookieOp,
        /// Cookie name for CREATE / DELETE.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Window sizing.
    Window {
        /// Viewport width in pixels.
        width: u32,
        /// Viewport height in pixels.
        height: u32,
    },
    /// Tab and frame switching.
    Switch {
        /// Destination.
        #[serde(rename = "type")]
        target: SwitchTarget,
    },
    /// Dialog dismissal.
    Dismiss {
        /// ALERT, CONFIRM or PROMPT.
        #[serde(rename = "type")]
        dialog: DismissKind,
        /// Reply text for PROMPT dialogs.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Non-executing comment.
    Comment,
}

// ── Payload envelope ────────────────────────────────────────────────────

/// The `parsedStep` body of a step payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStep {
    /// Upper-snake action code.
    pub action: ActionCode,
    /// Element target, present only for element-scoped steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    /// Step value. For element-targeted writes this is the
    /// `{"<selector>":"<text>"}` JSON encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Composite-action meta block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<StepMeta>,
}

impl ParsedStep {
    /// A step with only an action code.
    #[must_use]
    pub fn bare(action: ActionCode) -> Self {
        Self {
            action,
            target: None,
            value: None,
            meta: None,
        }
    }

    /// Attach a target.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach a value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach a meta block.
    #[must_use]
    pub fn with_meta(mut self, meta: StepMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Request envelope for `POST /teststeps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    /// Checkpoint the step is appended to.
    pub checkpoint_id: crate::ids::CheckpointId,
    /// 1-based dense position within the checkpoint.
    pub position: u32,
    /// The step body.
    pub parsed_step: ParsedStep,
}
