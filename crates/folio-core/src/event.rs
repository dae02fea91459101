#![forbid(unsafe_code)]

//! Canonical input types for the drag controller.
//!
//! The host translates DOM `PointerEvent`/`KeyboardEvent` values into these
//! before dispatching. Only the keys and buttons the controller reacts to are
//! modeled explicitly.

use bitflags::bitflags;

use crate::geometry::Point;

/// Pointer button as reported by `PointerEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button, pen contact, or touch.
    Primary,
    /// Wheel / middle button.
    Auxiliary,
    /// Right mouse button.
    Secondary,
    Back,
    Forward,
    /// Anything else, including `-1` (no button change).
    Other(i16),
}

impl PointerButton {
    /// Map the DOM `button` code.
    #[must_use]
    pub const fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            3 => Self::Back,
            4 => Self::Forward,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// Build from the four DOM modifier booleans.
    #[must_use]
    pub fn from_flags(shift: bool, alt: bool, ctrl: bool, meta: bool) -> Self {
        let mut mods = Self::NONE;
        mods.set(Self::SHIFT, shift);
        mods.set(Self::ALT, alt);
        mods.set(Self::CTRL, ctrl);
        mods.set(Self::META, meta);
        mods
    }
}

/// Keys the drag controller handles while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
}

impl DragKey {
    /// Parse a `KeyboardEvent.key` value; unrelated keys yield `None`.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "Escape" | "Esc" => Some(Self::Escape),
            _ => None,
        }
    }

    /// Unit direction `(dx, dy)` for arrow keys.
    #[must_use]
    pub const fn direction(self) -> Option<(f64, f64)> {
        match self {
            Self::ArrowUp => Some((0.0, -1.0)),
            Self::ArrowDown => Some((0.0, 1.0)),
            Self::ArrowLeft => Some((-1.0, 0.0)),
            Self::ArrowRight => Some((1.0, 0.0)),
            Self::Escape => None,
        }
    }
}

/// One pointer notification normalized for the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// `PointerEvent.pointerId`.
    pub pointer_id: i32,
    pub button: PointerButton,
    /// `clientX`/`clientY`.
    pub position: Point,
}

impl PointerSample {
    #[must_use]
    pub const fn new(pointer_id: i32, button: PointerButton, position: Point) -> Self {
        Self {
            pointer_id,
            button,
            position,
        }
    }
}
