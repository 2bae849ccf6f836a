//! Per-frame input snapshot supplied by the host.
//!
//! Keyboard input arrives as an explicit list of events pressed this
//! frame; the widget never probes key state, so no keystroke is missed
//! between frames.

use super::draw::Pos2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// Logical keys the widget reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Delete,
    Backspace,
    Enter,
    Escape,
    Home,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers { ctrl: true, ..Modifiers::NONE })
    }
}

/// Pointer state for one frame, in screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub pos: Pos2,
    /// Left button held this frame.
    pub primary_down: bool,
    /// Left button transitioned down this frame.
    pub primary_clicked: bool,
    /// Left button transitioned up this frame.
    pub primary_released: bool,
    pub double_clicked: bool,
    /// Wheel notches, positive away from the user.
    pub wheel: f32,
    pub modifiers: Modifiers,
}

/// Everything the widget consumes in one frame.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    pub pointer: PointerState,
    pub keys: Vec<KeyEvent>,
}

impl InputState {
    pub fn idle() -> Self {
        Self::default()
    }
}
