//! Piano-roll editing core.
//!
//! The crate maintains the note model, view transforms, and interaction
//! state for a MIDI note editor with a continuous-controller lane, and
//! issues primitive draw commands to an immediate-mode host. It owns no
//! window, no audio clock, and no MIDI I/O; the host feeds it a canvas
//! rect plus pointer/keyboard state once per frame and drains the
//! resulting draw list.

pub mod controller;
pub mod roll;
pub mod state;
pub mod ui;
pub mod view;

pub use roll::PianoRoll;
pub use state::{ControlLane, ControlPoint, Note, NoteId, NoteStore, Tick};
pub use ui::draw::{Color, DrawCmd, DrawList, Layer, Pos2, Rect, Vec2};
pub use ui::input::{InputState, KeyCode, KeyEvent, Modifiers, PointerState};
pub use view::{CoordinateSystem, GridSnap, SnapMode, Viewport};
