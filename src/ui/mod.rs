//! Host-facing interface types (input, draw list, theme, keymap) and
//! the generic widgets the roll composes.

pub mod draw;
pub mod input;
pub mod keybindings;
pub mod keymap;
pub mod theme;
pub mod widgets;

pub use draw::{Color, DrawCmd, DrawList, Layer, Pos2, Rect, Vec2};
pub use input::{InputState, KeyCode, KeyEvent, Modifiers, PointerState};
pub use keybindings::{default_keymap, load_keymap};
pub use keymap::{KeyBinding, KeyPattern, Keymap};
pub use theme::Theme;
