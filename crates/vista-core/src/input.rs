// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Raw input events as delivered by drivers and forwarded to scenes.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of an [`Input`]; the unit of capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Text input.
    Codepoint,
    /// Physical key transitions.
    Key,
    /// Pointer movement.
    CursorPos,
    /// Pointer button transitions.
    CursorButton,
    /// Scroll wheel / trackpad.
    CursorScroll,
    /// Pointer entered the viewport.
    ViewportEnter,
    /// Pointer left the viewport.
    ViewportExit,
    /// Viewport was resized.
    ViewportReshape,
}

impl InputType {
    /// Every input type.
    pub const ALL: [Self; 8] = [
        Self::Codepoint,
        Self::Key,
        Self::CursorPos,
        Self::CursorButton,
        Self::CursorScroll,
        Self::ViewportEnter,
        Self::ViewportExit,
        Self::ViewportReshape,
    ];

    /// True for input types routed by hit-testing.
    pub fn is_positional(self) -> bool {
        matches!(
            self,
            Self::CursorPos | Self::CursorButton | Self::CursorScroll
        )
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Codepoint => "codepoint",
            Self::Key => "key",
            Self::CursorPos => "cursor_pos",
            Self::CursorButton => "cursor_button",
            Self::CursorScroll => "cursor_scroll",
            Self::ViewportEnter => "viewport_enter",
            Self::ViewportExit => "viewport_exit",
            Self::ViewportReshape => "viewport_reshape",
        };
        f.write_str(name)
    }
}

/// Press/release state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Went down.
    Press,
    /// Went up.
    Release,
    /// Held and auto-repeating.
    Repeat,
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Any other button, by device index.
    Other(u16),
}

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt/Option held.
    pub alt: bool,
    /// Super/Command held.
    pub meta: bool,
}

/// A single input event.
///
/// Positions are in the space of whoever holds the event: driver space when
/// sent to the viewport, the receiving scene's local space when delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Text input.
    Codepoint {
        /// Character produced.
        codepoint: char,
        /// Modifiers held.
        mods: Modifiers,
    },
    /// Key transition.
    Key {
        /// Driver-specific key name.
        key: String,
        /// Transition.
        action: Action,
        /// Modifiers held.
        mods: Modifiers,
    },
    /// Pointer moved.
    CursorPos(Vec2),
    /// Pointer button transition.
    CursorButton {
        /// Which button.
        button: MouseButton,
        /// Transition.
        action: Action,
        /// Modifiers held.
        mods: Modifiers,
        /// Pointer position.
        pos: Vec2,
    },
    /// Scroll.
    CursorScroll {
        /// Scroll delta.
        offset: Vec2,
        /// Pointer position.
        pos: Vec2,
    },
    /// Pointer entered the viewport.
    ViewportEnter,
    /// Pointer left the viewport.
    ViewportExit,
    /// Viewport resized.
    ViewportReshape {
        /// New width in device pixels.
        width: u32,
        /// New height in device pixels.
        height: u32,
    },
}

impl Input {
    /// Discriminant used for capture lookups.
    pub fn input_type(&self) -> InputType {
        match self {
            Self::Codepoint { .. } => InputType::Codepoint,
            Self::Key { .. } => InputType::Key,
            Self::CursorPos(_) => InputType::CursorPos,
            Self::CursorButton { .. } => InputType::CursorButton,
            Self::CursorScroll { .. } => InputType::CursorScroll,
            Self::ViewportEnter => InputType::ViewportEnter,
            Self::ViewportExit => InputType::ViewportExit,
            Self::ViewportReshape { .. } => InputType::ViewportReshape,
        }
    }

    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Self::CursorPos(pos)
            | Self::CursorButton { pos, .. }
            | Self::CursorScroll { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    /// Re-project the position (if any) through `f`.
    #[must_use]
    pub fn map_position(self, f: impl FnOnce(Vec2) -> Vec2) -> Self {
        match self {
            Self::CursorPos(pos) => Self::CursorPos(f(pos)),
            Self::CursorButton {
                button,
                action,
                mods,
                pos,
            } => Self::CursorButton {
                button,
                action,
                mods,
                pos: f(pos),
            },
            Self::CursorScroll { offset, pos } => Self::CursorScroll {
                offset,
                pos: f(pos),
            },
            other => other,
        }
    }
}
