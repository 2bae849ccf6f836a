pub mod draggable;
pub mod loop_marker;
pub mod scrollbar;

pub use draggable::{DragState, DraggableRect};
pub use loop_marker::LoopMarker;
pub use scrollbar::{CustomScrollbar, ScrollbarEvent};
