use crate::ui::draw::{Pos2, Rect};
use crate::ui::input::PointerState;

/// What the owner should do in response to scrollbar input this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollbarEvent {
    None,
    /// Apply this world-X scroll position to the viewport, unclamped.
    Scrolled(f32),
    /// An edge is being dragged: the thumb now spans `thumb_ratio` of
    /// the track, with its left edge at `thumb_left_ratio`. The owner
    /// interprets the new ratio as a zoom, anchored at the opposite
    /// edge.
    EdgeResized { thumb_ratio: f32, thumb_left_ratio: f32, dragging_left: bool },
    /// Thumb double-clicked: fit the view to the clip.
    FitRequested,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum ScrollbarState {
    #[default]
    Idle,
    /// Pressed on the thumb body; becomes a drag once movement exceeds
    /// the threshold, so plain clicks don't scroll.
    PendingDrag { start_x: f32, grab_offset: f32 },
    DraggingThumb { grab_offset: f32 },
    ResizingLeft { fixed_right: f32 },
    ResizingRight { fixed_left: f32 },
}

/// Horizontal scrollbar over the explored world range.
///
/// The track is a fixed screen-space strip. Thumb geometry derives from
/// the explored span, the viewport width, and the scroll position; all
/// three are pushed in by the owner each frame before input handling.
#[derive(Clone, Debug)]
pub struct CustomScrollbar {
    track: Rect,
    explored_min: f32,
    explored_max: f32,
    viewport_width: f32,
    scroll_pos: f32,
    state: ScrollbarState,
    pub drag_threshold: f32,
    pub edge_threshold: f32,
    pub min_thumb_width: f32,
}

impl Default for CustomScrollbar {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomScrollbar {
    pub fn new() -> Self {
        Self {
            track: Rect::default(),
            explored_min: 0.0,
            explored_max: 1.0,
            viewport_width: 1.0,
            scroll_pos: 0.0,
            state: ScrollbarState::Idle,
            drag_threshold: 3.0,
            edge_threshold: 5.0,
            min_thumb_width: 12.0,
        }
    }

    /// Geometry push, once per frame before `handle_pointer`.
    pub fn set_geometry(
        &mut self,
        track: Rect,
        explored_min: f32,
        explored_max: f32,
        viewport_width: f32,
        scroll_pos: f32,
    ) {
        self.track = track;
        self.explored_min = explored_min;
        self.explored_max = explored_max.max(explored_min + 1.0);
        self.viewport_width = viewport_width.max(1.0);
        self.scroll_pos = scroll_pos;
    }

    pub fn track(&self) -> Rect {
        self.track
    }

    pub fn explored_span(&self) -> f32 {
        self.explored_max - self.explored_min
    }

    pub fn thumb_rect(&self) -> Rect {
        let span = self.explored_span();
        let width = (self.track.width * self.viewport_width / span)
            .clamp(self.min_thumb_width.min(self.track.width), self.track.width);
        let scrollable = (span - self.viewport_width).max(0.0);
        let frac = if scrollable > 0.0 {
            ((self.scroll_pos - self.explored_min) / scrollable).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Rect {
            x: self.track.x + frac * (self.track.width - width),
            y: self.track.y,
            width,
            height: self.track.height,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != ScrollbarState::Idle
    }

    pub fn is_resizing(&self) -> bool {
        matches!(
            self.state,
            ScrollbarState::ResizingLeft { .. } | ScrollbarState::ResizingRight { .. }
        )
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.track.contains(pos)
    }

    pub fn handle_pointer(&mut self, pointer: &PointerState) -> ScrollbarEvent {
        let pos = pointer.pos;
        let thumb = self.thumb_rect();

        if pointer.double_clicked && thumb.contains(pos) {
            self.state = ScrollbarState::Idle;
            return ScrollbarEvent::FitRequested;
        }

        if pointer.primary_clicked && self.track.contains(pos) {
            return self.on_press(pos, thumb);
        }

        if pointer.primary_down {
            return self.on_drag(pos, thumb);
        }

        if pointer.primary_released {
            self.state = ScrollbarState::Idle;
        }
        ScrollbarEvent::None
    }

    fn on_press(&mut self, pos: Pos2, thumb: Rect) -> ScrollbarEvent {
        if (pos.x - thumb.left()).abs() <= self.edge_threshold {
            self.state = ScrollbarState::ResizingLeft { fixed_right: thumb.right() };
            ScrollbarEvent::None
        } else if (pos.x - thumb.right()).abs() <= self.edge_threshold {
            self.state = ScrollbarState::ResizingRight { fixed_left: thumb.left() };
            ScrollbarEvent::None
        } else if thumb.contains(pos) {
            self.state = ScrollbarState::PendingDrag {
                start_x: pos.x,
                grab_offset: pos.x - thumb.left(),
            };
            ScrollbarEvent::None
        } else {
            // Track click outside the thumb: page scroll.
            let page = 0.9 * self.viewport_width;
            let delta = if pos.x < thumb.left() { -page } else { page };
            ScrollbarEvent::Scrolled(self.scroll_pos + delta)
        }
    }

    fn on_drag(&mut self, pos: Pos2, thumb: Rect) -> ScrollbarEvent {
        match self.state {
            ScrollbarState::PendingDrag { start_x, grab_offset } => {
                if (pos.x - start_x).abs() > self.drag_threshold {
                    self.state = ScrollbarState::DraggingThumb { grab_offset };
                    self.thumb_drag_event(pos, thumb, grab_offset)
                } else {
                    ScrollbarEvent::None
                }
            }
            ScrollbarState::DraggingThumb { grab_offset } => {
                self.thumb_drag_event(pos, thumb, grab_offset)
            }
            ScrollbarState::ResizingLeft { fixed_right } => {
                let left = pos
                    .x
                    .clamp(self.track.left(), fixed_right - self.min_thumb_width);
                let ratio = ((fixed_right - left) / self.track.width).clamp(0.0, 1.0);
                ScrollbarEvent::EdgeResized {
                    thumb_ratio: ratio,
                    thumb_left_ratio: (left - self.track.x) / self.track.width,
                    dragging_left: true,
                }
            }
            ScrollbarState::ResizingRight { fixed_left } => {
                let right = pos
                    .x
                    .clamp(fixed_left + self.min_thumb_width, self.track.right());
                let ratio = ((right - fixed_left) / self.track.width).clamp(0.0, 1.0);
                ScrollbarEvent::EdgeResized {
                    thumb_ratio: ratio,
                    thumb_left_ratio: (fixed_left - self.track.x) / self.track.width,
                    dragging_left: false,
                }
            }
            ScrollbarState::Idle => ScrollbarEvent::None,
        }
    }

    fn thumb_drag_event(&self, pos: Pos2, thumb: Rect, grab_offset: f32) -> ScrollbarEvent {
        let travel = self.track.width - thumb.width;
        if travel <= 0.0 {
            return ScrollbarEvent::None;
        }
        let thumb_x = (pos.x - grab_offset).clamp(self.track.left(), self.track.left() + travel);
        let frac = (thumb_x - self.track.left()) / travel;
        let scroll =
            self.explored_min + frac * (self.explored_span() - self.viewport_width);
        ScrollbarEvent::Scrolled(scroll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::draw::pos2;

    fn bar() -> CustomScrollbar {
        let mut sb = CustomScrollbar::new();
        // 1000 px track over a 4000 px explored span, 1000 px viewport.
        sb.set_geometry(Rect::new(0.0, 90.0, 1000.0, 10.0), 0.0, 4000.0, 1000.0, 0.0);
        sb
    }

    fn press(x: f32) -> PointerState {
        PointerState {
            pos: pos2(x, 95.0),
            primary_down: true,
            primary_clicked: true,
            ..Default::default()
        }
    }

    fn drag(x: f32) -> PointerState {
        PointerState { pos: pos2(x, 95.0), primary_down: true, ..Default::default() }
    }

    #[test]
    fn thumb_geometry_tracks_explored_span() {
        let sb = bar();
        let thumb = sb.thumb_rect();
        assert_eq!(thumb.width, 250.0); // 1000/4000 of the track
        assert_eq!(thumb.x, 0.0);
    }

    #[test]
    fn click_below_threshold_does_not_scroll() {
        let mut sb = bar();
        assert_eq!(sb.handle_pointer(&press(100.0)), ScrollbarEvent::None);
        assert_eq!(sb.handle_pointer(&drag(102.0)), ScrollbarEvent::None);
        let release = PointerState {
            pos: pos2(102.0, 95.0),
            primary_released: true,
            ..Default::default()
        };
        sb.handle_pointer(&release);
        assert!(!sb.is_active());
    }

    #[test]
    fn thumb_drag_maps_to_scroll_fraction() {
        let mut sb = bar();
        sb.handle_pointer(&press(100.0));
        let event = sb.handle_pointer(&drag(475.0));
        // Thumb moved to x=375 of 750 travel: halfway through the
        // scrollable span of 3000.
        assert_eq!(event, ScrollbarEvent::Scrolled(1500.0));
    }

    #[test]
    fn track_click_page_scrolls_by_ninety_percent() {
        let mut sb = bar();
        assert_eq!(sb.handle_pointer(&press(600.0)), ScrollbarEvent::Scrolled(900.0));
        sb.set_geometry(Rect::new(0.0, 90.0, 1000.0, 10.0), 0.0, 4000.0, 1000.0, 2000.0);
        // Thumb sits at frac 2/3 now; click left of it pages back.
        assert_eq!(sb.handle_pointer(&press(100.0)), ScrollbarEvent::Scrolled(1100.0));
    }

    #[test]
    fn edge_press_resizes_with_opposite_edge_fixed() {
        let mut sb = bar();
        sb.handle_pointer(&press(250.0)); // right edge of the thumb
        let event = sb.handle_pointer(&drag(500.0));
        assert_eq!(
            event,
            ScrollbarEvent::EdgeResized {
                thumb_ratio: 0.5,
                thumb_left_ratio: 0.0,
                dragging_left: false
            }
        );
    }

    #[test]
    fn double_click_on_thumb_requests_fit() {
        let mut sb = bar();
        let dc = PointerState {
            pos: pos2(100.0, 95.0),
            double_clicked: true,
            ..Default::default()
        };
        assert_eq!(sb.handle_pointer(&dc), ScrollbarEvent::FitRequested);
    }
}
