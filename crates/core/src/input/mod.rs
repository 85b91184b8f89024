//! Host-neutral input events routed through the surface to the active
//! manipulator.

use glam::Vec2;

/// Keys the visualisation reacts to; everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Q,
    E,
    Digit1,
    Digit2,
    Digit3,
    Escape,
    Control,
    Shift,
    Space,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Buttons held during a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub primary: bool,
    pub secondary: bool,
}

impl Buttons {
    pub const NONE: Buttons = Buttons {
        primary: false,
        secondary: false,
    };
    pub const PRIMARY: Buttons = Buttons {
        primary: true,
        secondary: false,
    };
}

/// Pointer positions are in logical pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPress { button: PointerButton, position: Vec2 },
    PointerRelease { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2, buttons: Buttons },
    /// Positive values scroll away from the user.
    Wheel { delta: f32 },
    KeyPress { key: KeyCode, modifiers: Modifiers },
    KeyRelease { key: KeyCode },
}

impl InputEvent {
    pub fn key_press(key: KeyCode) -> Self {
        InputEvent::KeyPress {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn drag_to(x: f32, y: f32) -> Self {
        InputEvent::PointerMove {
            position: Vec2::new(x, y),
            buttons: Buttons::PRIMARY,
        }
    }

    /// A pointer move with the primary button held.
    pub fn is_primary_drag(&self) -> bool {
        matches!(self, InputEvent::PointerMove { buttons, .. } if buttons.primary)
    }
}
