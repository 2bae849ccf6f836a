use crate::ui::draw::{Pos2, Rect, Vec2};

/// Hover and gesture state of a [`DraggableRect`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    HoveringBody,
    HoveringLeftEdge,
    HoveringRightEdge,
    Dragging,
    ResizingLeft,
    ResizingRight,
}

/// Generic drag/resize state machine over a rectangle.
///
/// The coordinate space is whatever the owner works in: the scrollbar
/// feeds screen coordinates, the loop marker world-X mixed with
/// ruler-local-Y. Horizontal snapping is applied through the snap hook
/// passed by the owner when `snap_enabled` is set.
#[derive(Clone, Debug)]
pub struct DraggableRect {
    bounds: Rect,
    preview_bounds: Option<Rect>,
    state: DragState,
    grab_offset: Vec2,
    pub edge_threshold: f32,
    pub min_width: f32,
    pub show_drag_preview: bool,
    pub snap_enabled: bool,
}

impl DraggableRect {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            preview_bounds: None,
            state: DragState::Idle,
            grab_offset: Vec2::default(),
            edge_threshold: 5.0,
            min_width: 1.0,
            show_drag_preview: false,
            snap_enabled: true,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn preview_bounds(&self) -> Option<Rect> {
        self.preview_bounds
    }

    /// Preview bounds while a gesture with preview is active, otherwise
    /// the committed bounds.
    pub fn current_bounds(&self) -> Rect {
        self.preview_bounds.unwrap_or(self.bounds)
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            DragState::Dragging | DragState::ResizingLeft | DragState::ResizingRight
        )
    }

    pub fn is_hovering(&self) -> bool {
        matches!(
            self.state,
            DragState::HoveringBody | DragState::HoveringLeftEdge | DragState::HoveringRightEdge
        )
    }

    /// Classify the pointer against the current bounds. Edges win over
    /// the body within `edge_threshold` pixels.
    fn classify(&self, pos: Pos2) -> DragState {
        let r = self.bounds;
        let within_y = pos.y >= r.top() && pos.y < r.bottom();
        if !within_y {
            return DragState::Idle;
        }
        if (pos.x - r.left()).abs() <= self.edge_threshold {
            DragState::HoveringLeftEdge
        } else if (pos.x - r.right()).abs() <= self.edge_threshold {
            DragState::HoveringRightEdge
        } else if pos.x > r.left() && pos.x < r.right() {
            DragState::HoveringBody
        } else {
            DragState::Idle
        }
    }

    /// Update hover, or the active gesture's bounds. `snap` maps an X
    /// coordinate onto the owner's grid; it is only consulted when
    /// `snap_enabled` is set.
    pub fn on_mouse_move(&mut self, pos: Pos2, snap: Option<&dyn Fn(f32) -> f32>) {
        let snap_enabled = self.snap_enabled;
        let snap_x = move |x: f32| -> f32 {
            match snap {
                Some(f) if snap_enabled => f(x),
                _ => x,
            }
        };
        match self.state {
            DragState::Idle
            | DragState::HoveringBody
            | DragState::HoveringLeftEdge
            | DragState::HoveringRightEdge => {
                self.state = self.classify(pos);
            }
            DragState::Dragging => {
                let x = snap_x(pos.x - self.grab_offset.x);
                let y = pos.y - self.grab_offset.y;
                let target = Rect { x, y, ..self.bounds };
                self.apply(target);
            }
            DragState::ResizingLeft => {
                let right = self.bounds.right();
                let left = snap_x(pos.x).min(right - self.min_width);
                let target = Rect { x: left, width: right - left, ..self.bounds };
                self.apply(target);
            }
            DragState::ResizingRight => {
                let left = self.bounds.left();
                let right = snap_x(pos.x).max(left + self.min_width);
                let target = Rect { width: right - left, ..self.bounds };
                self.apply(target);
            }
        }
    }

    fn apply(&mut self, target: Rect) {
        if self.show_drag_preview {
            self.preview_bounds = Some(target);
        } else {
            self.bounds = target;
        }
    }

    /// Engage the gesture matching the current hover state. Returns
    /// true when the press was consumed.
    pub fn on_mouse_down(&mut self, pos: Pos2) -> bool {
        match self.classify(pos) {
            DragState::HoveringBody => {
                self.grab_offset = pos - self.bounds.min();
                self.state = DragState::Dragging;
                true
            }
            DragState::HoveringLeftEdge => {
                self.state = DragState::ResizingLeft;
                true
            }
            DragState::HoveringRightEdge => {
                self.state = DragState::ResizingRight;
                true
            }
            _ => false,
        }
    }

    /// Commit preview bounds and return to idle. Returns true when a
    /// gesture actually finished; the owner runs its finalize hook then.
    pub fn on_mouse_up(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Some(preview) = self.preview_bounds.take() {
            self.bounds = preview;
        }
        self.state = DragState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::draw::pos2;

    fn rect() -> DraggableRect {
        let mut r = DraggableRect::new(Rect::new(100.0, 0.0, 50.0, 10.0));
        r.edge_threshold = 4.0;
        r.min_width = 8.0;
        r
    }

    #[test]
    fn hover_classification_prefers_edges() {
        let mut r = rect();
        r.on_mouse_move(pos2(101.0, 5.0), None);
        assert_eq!(r.state(), DragState::HoveringLeftEdge);
        r.on_mouse_move(pos2(152.0, 5.0), None);
        assert_eq!(r.state(), DragState::HoveringRightEdge);
        r.on_mouse_move(pos2(125.0, 5.0), None);
        assert_eq!(r.state(), DragState::HoveringBody);
        r.on_mouse_move(pos2(125.0, 50.0), None);
        assert_eq!(r.state(), DragState::Idle);
    }

    #[test]
    fn drag_moves_bounds_by_grab_offset() {
        let mut r = rect();
        r.snap_enabled = false;
        assert!(r.on_mouse_down(pos2(110.0, 5.0)));
        r.on_mouse_move(pos2(130.0, 7.0), None);
        assert_eq!(r.bounds().x, 120.0);
        assert!(r.on_mouse_up());
        assert_eq!(r.state(), DragState::Idle);
    }

    #[test]
    fn resize_enforces_min_width() {
        let mut r = rect();
        r.snap_enabled = false;
        assert!(r.on_mouse_down(pos2(149.0, 5.0)));
        assert_eq!(r.state(), DragState::ResizingRight);
        r.on_mouse_move(pos2(90.0, 5.0), None);
        assert_eq!(r.bounds().width, 8.0);
    }

    #[test]
    fn preview_commits_on_release() {
        let mut r = rect();
        r.show_drag_preview = true;
        r.snap_enabled = false;
        r.on_mouse_down(pos2(110.0, 5.0));
        r.on_mouse_move(pos2(140.0, 5.0), None);
        assert_eq!(r.bounds().x, 100.0);
        assert_eq!(r.preview_bounds().unwrap().x, 130.0);
        r.on_mouse_up();
        assert_eq!(r.bounds().x, 130.0);
        assert!(r.preview_bounds().is_none());
    }

    #[test]
    fn snap_hook_applies_while_enabled() {
        let mut r = rect();
        r.snap_enabled = true;
        let snap = |x: f32| (x / 10.0).round() * 10.0;
        r.on_mouse_down(pos2(125.0, 5.0));
        r.on_mouse_move(pos2(138.0, 5.0), Some(&snap));
        // Grab offset 25: raw target 113, snapped to 110.
        assert_eq!(r.bounds().x, 110.0);
    }
}
