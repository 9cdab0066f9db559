#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Hosts translate their native mouse/pen input into [`PointerEvent`]s and
//! feed them to the panel. Every event carries the pointer position in two
//! coordinate spaces: local to the element under interaction, and local to
//! the panel that owns it.
//!
//! # Design Notes
//!
//! - A single pointer is modelled; there is no pointer id.
//! - `Move` events carry the set of held buttons so the drag layer can tell
//!   a drag-with-button from a hover.
//! - `PointerButtons` use bitflags for easy combination.

use bitflags::bitflags;

use crate::geometry::Point;

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    /// Left (primary) button.
    #[default]
    Left,

    /// Right (secondary) button.
    Right,

    /// Middle button (wheel click).
    Middle,

    /// First extended button (usually "back").
    X1,

    /// Second extended button (usually "forward").
    X2,
}

impl PointerButton {
    /// The single-button flag corresponding to this button.
    #[must_use]
    pub const fn flag(self) -> PointerButtons {
        match self {
            Self::Left => PointerButtons::LEFT,
            Self::Right => PointerButtons::RIGHT,
            Self::Middle => PointerButtons::MIDDLE,
            Self::X1 => PointerButtons::X1,
            Self::X2 => PointerButtons::X2,
        }
    }
}

bitflags! {
    /// Buttons held while the pointer moves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointerButtons: u8 {
        /// No buttons.
        const NONE   = 0b0_0000;
        /// Left button.
        const LEFT   = 0b0_0001;
        /// Right button.
        const RIGHT  = 0b0_0010;
        /// Middle button.
        const MIDDLE = 0b0_0100;
        /// First extended button.
        const X1     = 0b0_1000;
        /// Second extended button.
        const X2     = 0b1_0000;
    }
}

impl PointerButtons {
    /// Whether `button` is held.
    #[inline]
    #[must_use]
    pub const fn is_pressed(self, button: PointerButton) -> bool {
        self.contains(button.flag())
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Pointer moved, with or without held buttons.
    Move,

    /// Button released.
    Up(PointerButton),

    /// Pointer left the element.
    Leave,
}

/// A pointer event addressed to one element of the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,

    /// Position relative to the element's top-left corner.
    pub local: Point,

    /// Position relative to the panel's top-left corner.
    pub panel: Point,

    /// Buttons held when the event was generated.
    pub buttons: PointerButtons,
}

impl PointerEvent {
    /// Create a new pointer event with no held buttons.
    #[must_use]
    pub const fn new(kind: PointerEventKind, local: Point, panel: Point) -> Self {
        Self {
            kind,
            local,
            panel,
            buttons: PointerButtons::NONE,
        }
    }

    /// Create a button-down event; the pressed button is also marked held.
    #[must_use]
    pub const fn down(button: PointerButton, local: Point, panel: Point) -> Self {
        Self {
            kind: PointerEventKind::Down(button),
            local,
            panel,
            buttons: button.flag(),
        }
    }

    /// Create a move event with the given held buttons.
    #[must_use]
    pub const fn moved(local: Point, panel: Point, buttons: PointerButtons) -> Self {
        Self {
            kind: PointerEventKind::Move,
            local,
            panel,
            buttons,
        }
    }

    /// Create a button-up event.
    #[must_use]
    pub const fn up(button: PointerButton, local: Point, panel: Point) -> Self {
        Self::new(PointerEventKind::Up(button), local, panel)
    }

    /// Create a leave event.
    #[must_use]
    pub const fn leave(local: Point, panel: Point) -> Self {
        Self::new(PointerEventKind::Leave, local, panel)
    }
}
