//! Interaction state machines for the note grid.

pub mod keyboard;
pub mod pointer;

pub use keyboard::KeyboardController;
pub use pointer::{HoverState, PointerAction, PointerController};
