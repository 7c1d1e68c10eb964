// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed set of step primitives and their argument arities.

use std::fmt;

/// One logical step primitive.
///
/// Each variant maps to exactly one `(action, meta.kind)` pair in the
/// platform's step grammar; the builders in this crate produce the wire
/// payload for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    // Navigation & waits
    /// Load an absolute URL.
    Navigate,
    /// Fixed-duration wait.
    WaitTime,
    /// Wait for an element to appear.
    WaitElement,
    /// Scroll to the top of the page.
    ScrollTop,
    /// Scroll to the bottom of the page.
    ScrollBottom,
    /// Scroll an element into view.
    ScrollElement,
    /// Scroll to an absolute position.
    ScrollPosition,
    /// Scroll by a pixel delta.
    ScrollBy,

    // Pointer
    /// Left click.
    Click,
    /// Hover.
    Hover,
    /// Double click.
    DoubleClick,
    /// Right click.
    RightClick,
    /// Middle click.
    MiddleClick,
    /// Move pointer to absolute coordinates.
    MouseMoveTo,
    /// Move pointer by a delta (negative allowed).
    MouseMoveBy,

    // Input
    /// Type text, optionally into a targeted field.
    Write,
    /// Press a named key.
    Key,
    /// Pick a dropdown option by value.
    Pick,
    /// Pick a dropdown option by index.
    PickIndex,
    /// Pick the last dropdown option.
    PickLast,

    // Assertions
    /// Element exists.
    AssertExists,
    /// Element does not exist.
    AssertNotExists,
    /// Element text equals.
    AssertEquals,
    /// Element text does not equal.
    AssertNotEquals,
    /// Checkbox is checked.
    AssertChecked,
    /// Option is selected.
    AssertSelected,
    /// Stored variable equals.
    AssertVariable,
    /// Greater than.
    AssertGt,
    /// Greater or equal.
    AssertGte,
    /// Less than.
    AssertLt,
    /// Less or equal.
    AssertLte,
    /// Matches a regular expression.
    AssertMatches,

    // Data & environment
    /// Store an element's text into a variable.
    StoreElementText,
    /// Store a literal into a variable.
    StoreLiteral,
    /// Create a cookie.
    CookieCreate,
    /// Delete a cookie.
    CookieDelete,
    /// Remove all cookies.
    CookieWipeAll,

    // Window, frames, dialogs
    /// Resize the window.
    WindowResize,
    /// Switch to the next tab.
    SwitchNextTab,
    /// Switch to the previous tab.
    SwitchPrevTab,
    /// Switch into an iframe.
    SwitchIframe,
    /// Switch back to the parent frame.
    SwitchParentFrame,
    /// Dismiss an alert dialog.
    DismissAlert,
    /// Dismiss a confirm dialog.
    DismissConfirm,
    /// Dismiss a prompt dialog, optionally answering it.
    DismissPrompt,

    // Misc
    /// Non-executing comment.
    Comment,
    /// Run a named extension script.
    ExecuteScript,
    /// Upload a file fetched from a URL into a file input.
    UploadUrl,
}

/// Expected shape of a single positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Unsigned integer.
    Integer,
    /// Signed integer (coordinates, deltas).
    Coordinate,
    /// Absolute URL.
    Url,
    /// Element selector or natural-text clue.
    Selector,
    /// Regular expression.
    Regex,
    /// Duration: integer milliseconds or `"<n>s"`.
    Duration,
    /// Free text.
    Text,
    /// One of a fixed set of words (e.g. key modifiers).
    Enum,
}

/// Declared positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    /// Argument name, as shown in `describe` output.
    pub name: &'static str,
    /// Validation applied to the argument.
    pub kind: ArgKind,
}

/// Describe-output for one primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSpec {
    /// Primitive name (kebab-case).
    pub name: &'static str,
    /// Required positional arguments, in order.
    pub required: &'static [ArgSpec],
    /// Optional positional arguments, in order after the required ones.
    pub optional: &'static [ArgSpec],
}

impl StepSpec {
    /// Minimum number of positional arguments.
    #[must_use]
    pub fn min_arity(&self) -> usize {
        self.required.len()
    }

    /// Maximum number of positional arguments.
    #[must_use]
    pub fn max_arity(&self) -> usize {
        self.required.len() + self.optional.len()
    }
}

const fn arg(name: &'static str, kind: ArgKind) -> ArgSpec {
    ArgSpec { name, kind }
}

impl StepKind {
    /// Every primitive, in catalog order.
    #[must_use]
    pub fn all() -> &'static [StepKind] {
        use StepKind::*;
        &[
            Navigate, WaitTime, WaitElement, ScrollTop, ScrollBottom, ScrollElement,
            ScrollPosition, ScrollBy, Click, Hover, DoubleClick, RightClick, MiddleClick,
            MouseMoveTo, MouseMoveBy, Write, Key, Pick, PickIndex, PickLast, AssertExists,
            AssertNotExists, AssertEquals, AssertNotEquals, AssertChecked, AssertSelected,
            AssertVariable, AssertGt, AssertGte, AssertLt, AssertLte, AssertMatches,
            StoreElementText, StoreLiteral, CookieCreate, CookieDelete, CookieWipeAll,
            WindowResize, SwitchNextTab, SwitchPrevTab, SwitchIframe, SwitchParentFrame,
            DismissAlert, DismissConfirm, DismissPrompt, Comment, ExecuteScript, UploadUrl,
        ]
    }

    /// Look up a primitive by its kebab-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<StepKind> {
        StepKind::all()
            .iter()
            .copied()
            .find(|k| k.spec().name == name)
    }

    /// Primitive name (kebab-case).
    #[must_use]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Declared arity and argument validators.
    #[must_use]
    pub fn spec(self) -> StepSpec {
        use ArgKind::*;
        use StepKind::*;
        match self {
            Navigate => StepSpec {
                name: "navigate",
                required: &const { [arg("url", Url)] },
                optional: &[],
            },
            WaitTime => StepSpec {
                name: "wait-time",
                required: &const { [arg("duration", Duration)] },
                optional: &[],
            },
            WaitElement => StepSpec {
                name: "wait-element",
                required: &const { [arg("selector", Selector)] },
                optional: &const { [arg("timeout", Duration)] },
            },
            ScrollTop => StepSpec {
                name: "scroll-top",
                required: &[],
                optional: &[],
            },
            ScrollBottom => StepSpec {
                name: "scroll-bottom",
                required: &[],
                optional: &[],
            },
            ScrollElement => StepSpec {
                name: "scroll-element",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            ScrollPosition => StepSpec {
                name: "scroll-position",
                required: &const { [arg("x", Coordinate), arg("y", Coordinate)] },
                optional: &[],
            },
            ScrollBy => StepSpec {
                name: "scroll-by",
                required: &const { [arg("dx", Coordinate), arg("dy", Coordinate)] },
                optional: &[],
            },
            Click => StepSpec {
                name: "click",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            Hover => StepSpec {
                name: "hover",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            DoubleClick => StepSpec {
                name: "double-click",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            RightClick => StepSpec {
                name: "right-click",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            MiddleClick => StepSpec {
                name: "middle-click",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            MouseMoveTo => StepSpec {
                name: "mouse-move-to",
                required: &const { [arg("x", Coordinate), arg("y", Coordinate)] },
                optional: &[],
            },
            MouseMoveBy => StepSpec {
                name: "mouse-move-by",
                required: &const { [arg("dx", Coordinate), arg("dy", Coordinate)] },
                optional: &[],
            },
            Write => StepSpec {
                name: "write",
                required: &const { [arg("text", Text)] },
                optional: &const { [arg("selector", Selector)] },
            },
            Key => StepSpec {
                name: "key",
                required: &const { [arg("key", Text)] },
                optional: &const { [
                    arg("modifier", Enum),
                    arg("modifier", Enum),
                    arg("modifier", Enum),
                ] },
            },
            Pick => StepSpec {
                name: "pick",
                required: &const { [arg("value", Text), arg("selector", Selector)] },
                optional: &[],
            },
            PickIndex => StepSpec {
                name: "pick-index",
                required: &const { [arg("index", Integer), arg("selector", Selector)] },
                optional: &[],
            },
            PickLast => StepSpec {
                name: "pick-last",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            AssertExists => StepSpec {
                name: "assert-exists",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            AssertNotExists => StepSpec {
                name: "assert-not-exists",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            AssertEquals => StepSpec {
                name: "assert-equals",
                required: &const { [arg("selector", Selector), arg("expected", Text)] },
                optional: &[],
            },
            AssertNotEquals => StepSpec {
                name: "assert-not-equals",
                required: &const { [arg("selector", Selector), arg("expected", Text)] },
                optional: &[],
            },
            AssertChecked => StepSpec {
                name: "assert-checked",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            AssertSelected => StepSpec {
                name: "assert-selected",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            AssertVariable => StepSpec {
                name: "assert-variable",
                required: &const { [arg("variable", Text), arg("expected", Text)] },
                optional: &[],
            },
            AssertGt => StepSpec {
                name: "assert-gt",
                required: &const { [arg("selector", Selector), arg("expected", Integer)] },
                optional: &[],
            },
            AssertGte => StepSpec {
                name: "assert-gte",
                required: &const { [arg("selector", Selector), arg("expected", Integer)] },
                optional: &[],
            },
            AssertLt => StepSpec {
                name: "assert-lt",
                required: &const { [arg("selector", Selector), arg("expected", Integer)] },
                optional: &[],
            },
            AssertLte => StepSpec {
                name: "assert-lte",
                required: &const { [arg("selector", Selector), arg("expected", Integer)] },
                optional: &[],
            },
            AssertMatches => StepSpec {
                name: "assert-matches",
                required: &const { [arg("selector", Selector), arg("pattern", Regex)] },
                optional: &[],
            },
            StoreElementText => StepSpec {
                name: "store-element-text",
                required: &const { [arg("selector", Selector), arg("variable", Text)] },
                optional: &[],
            },
            StoreLiteral => StepSpec {
                name: "store-literal",
                required: &const { [arg("value", Text), arg("variable", Text)] },
                optional: &[],
            },
            CookieCreate => StepSpec {
                name: "cookie-create",
                required: &const { [arg("name", Text), arg("value", Text)] },
                optional: &[],
            },
            CookieDelete => StepSpec {
                name: "cookie-delete",
                required: &const { [arg("name", Text)] },
                optional: &[],
            },
            CookieWipeAll => StepSpec {
                name: "cookie-wipe-all",
                required: &[],
                optional: &[],
            },
            WindowResize => StepSpec {
                name: "window-resize",
                required: &const { [arg("width", Integer), arg("height", Integer)] },
                optional: &[],
            },
            SwitchNextTab => StepSpec {
                name: "switch-next-tab",
                required: &[],
                optional: &[],
            },
            SwitchPrevTab => StepSpec {
                name: "switch-prev-tab",
                required: &[],
                optional: &[],
            },
            SwitchIframe => StepSpec {
                name: "switch-iframe",
                required: &const { [arg("selector", Selector)] },
                optional: &[],
            },
            SwitchParentFrame => StepSpec {
                name: "switch-parent-frame",
                required: &[],
                optional: &[],
            },
            DismissAlert => StepSpec {
                name: "dismiss-alert",
                required: &[],
                optional: &[],
            },
            DismissConfirm => StepSpec {
                name: "dismiss-confirm",
                required: &[],
                optional: &[],
            },
            DismissPrompt => StepSpec {
                name: "dismiss-prompt",
                required: &[],
                optional: &const { [arg("text", Text)] },
            },
            Comment => StepSpec {
                name: "comment",
                required: &const { [arg("text", Text)] },
                optional: &[],
            },
            ExecuteScript => StepSpec {
                name: "execute-script",
                required: &const { [arg("name", Text)] },
                optional: &[],
            },
            UploadUrl => StepSpec {
                name: "upload-url",
                required: &const { [arg("url", Url), arg("selector", Selector)] },
                optional: &[],
            },
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in StepKind::all() {
            assert!(seen.insert(kind.name()), "duplicate name {}", kind.name());
        }
    }

    #[test]
    fn from_name_roundtrips() {
        for kind in StepKind::all() {
            assert_eq!(StepKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(StepKind::from_name("teleport"), None);
        assert_eq!(StepKind::from_name(""), None);
    }

    #[test]
    fn catalog_size_is_stable() {
        assert_eq!(StepKind::all().len(), 48);
    }

    #[test]
    fn arity_bounds() {
        assert_eq!(StepKind::Navigate.spec().min_arity(), 1);
        assert_eq!(StepKind::WaitElement.spec().max_arity(), 2);
        assert_eq!(StepKind::ScrollTop.spec().min_arity(), 0);
        assert_eq!(StepKind::Write.spec().min_arity(), 1);
        assert_eq!(StepKind::Write.spec().max_arity(), 2);
        assert_eq!(StepKind::Key.spec().max_arity(), 4);
    }
}
