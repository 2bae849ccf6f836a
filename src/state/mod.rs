//! Pure clip model: notes, selection, undo history, control lanes, and
//! the text codec. Nothing in here knows about pixels.

pub mod clipboard;
pub mod codec;
pub mod lane;
pub mod note;
pub mod store;

pub use clipboard::Clipboard;
pub use lane::{ControlLane, ControlPoint};
pub use note::{Note, NoteId, Tick, MAX_CHANNEL, MAX_MIDI_KEY, MAX_VELOCITY};
pub use store::{NoteStore, DEFAULT_UNDO_LEVELS};
