//! Per-frame event routing. Gestures are evaluated in a fixed priority
//! order; the first active one consumes the pointer for the frame.

use crate::controller::PointerAction;
use crate::state::Tick;
use crate::ui::draw::{pos2, Pos2};
use crate::ui::input::{InputState, PointerState};
use crate::ui::widgets::ScrollbarEvent;
use crate::view::coords::{MAX_PIXELS_PER_BEAT, MIN_PIXELS_PER_BEAT};

use super::{
    AxisGestureMode, CcDrag, ColumnGesture, MarkerKind, PianoRoll, RulerGesture, BASE_KEY_HEIGHT,
    MARKER_HIT_PX, WHEEL_SCROLL_SPEED,
};

/// Movement below this commits neither pan nor zoom in the ruler and
/// note-name gestures.
const AXIS_GESTURE_THRESHOLD_PX: f32 = 3.0;
/// Log-zoom factor per pixel of gesture movement.
const AXIS_ZOOM_RATE: f32 = 0.01;
/// Rectangle-selection edge scrolling.
const EDGE_SCROLL_MARGIN_PX: f32 = 60.0;
const EDGE_SCROLL_BASE: f32 = 5.0;
const EDGE_SCROLL_MAX: f32 = 25.0;
/// Pixel reach when grabbing or Ctrl-deleting a control-lane point.
const CC_POINT_HIT_PX: f32 = 6.0;

impl PianoRoll {
    pub(crate) fn handle_input(&mut self, input: &InputState) {
        let pointer = input.pointer;

        if self.marker_drag.is_some() {
            self.update_marker_drag(&pointer);
        } else if self.loop_marker.is_active() {
            self.update_loop_drag(&pointer);
        } else if pointer.primary_clicked && self.in_ruler_band(pointer.pos) {
            self.on_ruler_mouse_down(&pointer);
        } else if pointer.primary_clicked && self.name_column_rect().contains(pointer.pos) {
            self.on_name_column_mouse_down(&pointer);
        } else if self.scrollbar_wants(&pointer) {
            self.route_scrollbar(&pointer);
        } else if self.ruler_gesture.is_some() {
            self.update_ruler_gesture(&pointer);
        } else if self.name_gesture.is_some() {
            self.update_name_gesture(&pointer);
        } else if self.cc_wants(&pointer) {
            self.route_cc(&pointer);
        } else {
            self.route_grid(&pointer);
        }

        // Rectangle selections near the canvas edges drag the viewport
        // along, expanding the explored area.
        if self.pointer.action() == PointerAction::RectangleSelection && pointer.primary_down {
            self.edge_scroll(&pointer);
        }

        // Wheel scrolls vertically only.
        if pointer.wheel != 0.0 && self.canvas.contains(pointer.pos) {
            let vp = self.coords.viewport();
            self.coords.set_scroll(vp.x, vp.y - pointer.wheel * WHEEL_SCROLL_SPEED);
        }

        self.update_piano_key_state(&pointer);

        self.keyboard.process(&mut self.store, &self.grid, &input.keys);
    }

    // ---- ruler band ----

    fn in_ruler_band(&self, pos: Pos2) -> bool {
        self.ruler_rect().contains(pos) && pos.x >= self.canvas.x + self.coords.piano_key_width()
    }

    fn marker_screen_x(&self, tick: Tick) -> f32 {
        self.canvas.x + self.coords.tick_to_screen_x(tick)
    }

    /// Pointer position in the loop marker's mixed space: world-X,
    /// ruler-local-Y.
    fn loop_space(&self, pos: Pos2) -> Pos2 {
        let gs = self.to_grid_space(pos);
        let (wx, _) = self.coords.screen_to_world(gs.x, 0.0);
        pos2(wx, pos.y - self.canvas.y)
    }

    fn on_ruler_mouse_down(&mut self, pointer: &PointerState) {
        let markers = [
            (MarkerKind::PlaybackStart, self.playback_start_tick),
            (MarkerKind::CueLeft, self.cue_left_tick),
            (MarkerKind::CueRight, self.cue_right_tick),
        ];
        for (kind, tick) in markers {
            if (pointer.pos.x - self.marker_screen_x(tick)).abs() <= MARKER_HIT_PX {
                self.marker_drag = Some(kind);
                return;
            }
        }

        let mixed = self.loop_space(pointer.pos);
        if self.loop_marker.hit(mixed) && self.loop_marker.on_mouse_down(mixed) {
            return;
        }

        let gs = self.to_grid_space(pointer.pos);
        let (wx, _) = self.coords.screen_to_world(gs.x, 0.0);
        self.ruler_gesture = Some(RulerGesture {
            start_screen: pointer.pos,
            start_ppb: self.coords.pixels_per_beat(),
            start_viewport_x: self.coords.viewport().x,
            anchor_world_x: wx,
            mode: None,
        });
    }

    fn update_marker_drag(&mut self, pointer: &PointerState) {
        let Some(kind) = self.marker_drag else {
            return;
        };
        if pointer.primary_down {
            let gs = self.to_grid_space(pointer.pos);
            let raw = self.coords.world_to_tick(self.coords.screen_to_world(gs.x, 0.0).0);
            let tick = if pointer.modifiers.shift {
                raw
            } else {
                self.grid.snap_tick(raw, None)
            }
            .max(0);
            match kind {
                MarkerKind::PlaybackStart => self.playback_start_tick = tick,
                MarkerKind::CueLeft => self.cue_left_tick = tick,
                MarkerKind::CueRight => self.cue_right_tick = tick,
            }
        }
        if pointer.primary_released || !pointer.primary_down {
            self.marker_drag = None;
            let (start, left, right) =
                (self.playback_start_tick, self.cue_left_tick, self.cue_right_tick);
            if let Some(f) = self.callbacks.playback_markers_changed.as_mut() {
                f(start, left, right);
            }
        }
    }

    fn update_loop_drag(&mut self, pointer: &PointerState) {
        let mixed = self.loop_space(pointer.pos);
        if pointer.primary_down && !pointer.primary_released {
            self.loop_marker.on_mouse_move(mixed, &self.coords);
        } else {
            self.loop_marker.on_mouse_up(&self.coords);
        }
    }

    fn update_ruler_gesture(&mut self, pointer: &PointerState) {
        let Some(mut g) = self.ruler_gesture else {
            return;
        };
        if pointer.primary_released || !pointer.primary_down {
            if g.mode.is_none() {
                // A true ruler click: place the playhead there.
                let gs = self.to_grid_space(pointer.pos);
                let tick = self.coords.world_to_tick(self.coords.screen_to_world(gs.x, 0.0).0);
                self.playhead_tick = Some(tick);
                if let Some(f) = self.callbacks.playhead_changed.as_mut() {
                    f(tick);
                }
            }
            self.ruler_gesture = None;
            return;
        }

        let delta = pointer.pos - g.start_screen;
        if g.mode.is_none() && delta.length() > AXIS_GESTURE_THRESHOLD_PX {
            g.mode = Some(if delta.x.abs() > 1.5 * delta.y.abs() {
                AxisGestureMode::Pan
            } else {
                AxisGestureMode::Zoom
            });
        }
        match g.mode {
            Some(AxisGestureMode::Pan) => {
                // Drag left moves the view right.
                let y = self.coords.viewport().y;
                self.coords.set_scroll(g.start_viewport_x - delta.x, y);
                self.expand_explored_to_viewport();
            }
            Some(AxisGestureMode::Zoom) => {
                let factor = (delta.y * AXIS_ZOOM_RATE).exp();
                let new_ppb =
                    (g.start_ppb * factor).clamp(MIN_PIXELS_PER_BEAT, MAX_PIXELS_PER_BEAT);
                self.coords.set_pixels_per_beat(new_ppb);
                // The beat under the initial mouse X stays put.
                let scale = new_ppb / g.start_ppb;
                let screen_offset = g.anchor_world_x - g.start_viewport_x;
                let y = self.coords.viewport().y;
                self.coords.set_scroll(g.anchor_world_x * scale - screen_offset, y);
                self.expand_explored_to_viewport();
            }
            None => {}
        }
        self.ruler_gesture = Some(g);
    }

    // ---- note-name column ----

    fn on_name_column_mouse_down(&mut self, pointer: &PointerState) {
        let gs = self.to_grid_space(pointer.pos);
        let (_, wy) = self.coords.screen_to_world(gs.x, gs.y);
        let key = self.coords.world_y_to_key(wy);
        self.pressed_key = Some(key);
        if let Some(f) = self.callbacks.piano_key_pressed.as_mut() {
            f(key);
        }
        self.name_gesture = Some(ColumnGesture {
            start_screen: pointer.pos,
            start_key_height: self.coords.key_height(),
            start_viewport_y: self.coords.viewport().y,
            anchor_world_y: wy,
            mode: None,
        });
    }

    fn update_name_gesture(&mut self, pointer: &PointerState) {
        let Some(mut g) = self.name_gesture else {
            return;
        };
        if pointer.primary_released || !pointer.primary_down {
            self.name_gesture = None;
            return;
        }

        let delta = pointer.pos - g.start_screen;
        if g.mode.is_none() && delta.length() > AXIS_GESTURE_THRESHOLD_PX {
            g.mode = Some(if delta.y.abs() > 1.5 * delta.x.abs() {
                AxisGestureMode::Pan
            } else {
                AxisGestureMode::Zoom
            });
        }
        match g.mode {
            Some(AxisGestureMode::Pan) => {
                // Drag down scrolls the view up.
                let x = self.coords.viewport().x;
                self.coords.set_scroll(x, g.start_viewport_y - delta.y);
            }
            Some(AxisGestureMode::Zoom) => {
                let factor = (delta.x * AXIS_ZOOM_RATE).exp();
                let new_height = (g.start_key_height * factor)
                    .clamp(0.60 * BASE_KEY_HEIGHT, 1.25 * BASE_KEY_HEIGHT);
                self.coords.set_key_height(new_height);
                // The key under the initial mouse Y stays put.
                let scale = new_height / g.start_key_height;
                let screen_offset = g.anchor_world_y - g.start_viewport_y;
                let x = self.coords.viewport().x;
                self.coords.set_scroll(x, g.anchor_world_y * scale - screen_offset);
            }
            None => {}
        }
        self.name_gesture = Some(g);
    }

    fn update_piano_key_state(&mut self, pointer: &PointerState) {
        self.hovered_key = if self.name_column_rect().contains(pointer.pos) {
            let gs = self.to_grid_space(pointer.pos);
            let (_, wy) = self.coords.screen_to_world(gs.x, gs.y);
            Some(self.coords.world_y_to_key(wy))
        } else {
            None
        };
        if pointer.primary_released {
            if let Some(key) = self.pressed_key.take() {
                if let Some(f) = self.callbacks.piano_key_released.as_mut() {
                    f(key);
                }
            }
        }
    }

    // ---- scrollbar ----

    fn scrollbar_wants(&self, pointer: &PointerState) -> bool {
        self.scrollbar.is_active()
            || ((pointer.primary_clicked || pointer.double_clicked)
                && self.scrollbar_rect().contains(pointer.pos))
    }

    fn route_scrollbar(&mut self, pointer: &PointerState) {
        let vp = self.coords.viewport();
        self.scrollbar.set_geometry(
            self.scrollbar_rect(),
            self.explored_min,
            self.explored_max,
            vp.width,
            vp.x,
        );
        let event = self.scrollbar.handle_pointer(pointer);
        self.apply_scrollbar_event(event);
    }

    fn apply_scrollbar_event(&mut self, event: ScrollbarEvent) {
        match event {
            ScrollbarEvent::None => {}
            ScrollbarEvent::Scrolled(x) => {
                let y = self.coords.viewport().y;
                self.coords.set_scroll(x, y);
                self.expand_explored_to_viewport();
            }
            ScrollbarEvent::EdgeResized { thumb_ratio, thumb_left_ratio, dragging_left } => {
                self.apply_edge_resize(thumb_ratio, thumb_left_ratio, dragging_left);
            }
            ScrollbarEvent::FitRequested => self.fit_to_clip(),
        }
    }

    /// Thumb edge drags zoom the view: the new pixels-per-beat makes
    /// the viewport occupy `thumb_ratio` of the explored span, anchored
    /// at the viewport edge opposite the dragged thumb edge. The
    /// explored range then re-expands so the thumb matches what the
    /// user dragged; `viewport.x` itself is never clamped.
    fn apply_edge_resize(&mut self, thumb_ratio: f32, thumb_left_ratio: f32, dragging_left: bool) {
        if thumb_ratio <= 0.0 {
            return;
        }
        let vp = self.coords.viewport();
        let tpb = self.coords.ticks_per_beat() as f32;
        let old_ppb = self.coords.pixels_per_beat();
        let explored_tick_span = (self.explored_max - self.explored_min) / old_ppb * tpb;
        if explored_tick_span <= 0.0 {
            return;
        }
        let new_ppb = (vp.width * tpb / (thumb_ratio * explored_tick_span)).clamp(10.0, 500.0);
        let anchor_world = if dragging_left { vp.x + vp.width } else { vp.x };
        self.coords.zoom_at(new_ppb / old_ppb, anchor_world);

        let vp = self.coords.viewport();
        let span_new = vp.width / thumb_ratio;
        let travel = (1.0 - thumb_ratio).max(1e-3);
        let frac = (thumb_left_ratio / travel).clamp(0.0, 1.0);
        self.explored_min = vp.x - frac * (span_new - vp.width);
        self.explored_max = self.explored_min + span_new;
        self.expand_explored_to_viewport();
    }

    /// Thumb double-click: zoom so the clip fills the viewport and the
    /// explored range collapses to the clip.
    fn fit_to_clip(&mut self) {
        let vp = self.coords.viewport();
        let tpb = self.coords.ticks_per_beat() as f32;
        let clip_beats = (self.clip_length_ticks as f32 / tpb).max(0.001);
        let ppb = (vp.width / clip_beats).clamp(15.0, 480.0);
        self.coords.set_pixels_per_beat(ppb);
        let x = self.coords.tick_to_world(self.clip_start_tick);
        self.coords.set_scroll(x, vp.y);
        self.explored_min = x;
        self.explored_max =
            self.coords.tick_to_world(self.clip_start_tick + self.clip_length_ticks);
        self.expand_explored_to_viewport();
    }

    // ---- control lane ----

    fn cc_wants(&self, pointer: &PointerState) -> bool {
        if self.cc_drag.is_some() {
            return true;
        }
        match self.cc_rect() {
            Some(rect) => {
                rect.contains(pointer.pos) && (pointer.primary_clicked || pointer.primary_down)
            }
            None => false,
        }
    }

    fn route_cc(&mut self, pointer: &PointerState) {
        let Some(rect) = self.cc_rect() else {
            self.cc_drag = None;
            return;
        };
        let gs = self.to_grid_space(pointer.pos);
        let tick = self.coords.world_to_tick(self.coords.screen_to_world(gs.x, 0.0).0);
        let value = ((rect.bottom() - pointer.pos.y) / rect.height * 127.0)
            .round()
            .clamp(0.0, 127.0) as u8;
        let hit_ticks = (CC_POINT_HIT_PX / self.coords.pixels_per_beat()
            * self.coords.ticks_per_beat() as f32) as Tick;

        if pointer.primary_clicked {
            let lane_idx = self.active_lane.min(self.lanes.len().saturating_sub(1));
            let Some(lane) = self.lanes.get_mut(lane_idx) else {
                return;
            };
            match lane.nearest_point(tick, hit_ticks.max(1)) {
                Some(idx) if pointer.modifiers.ctrl => {
                    lane.remove_point(idx);
                }
                Some(idx) => {
                    self.cc_drag = Some(CcDrag { lane: lane_idx, point: idx });
                }
                None => {
                    let idx = lane.add_point(tick, value);
                    self.cc_drag = Some(CcDrag { lane: lane_idx, point: idx });
                }
            }
        } else if pointer.primary_down {
            if let Some(drag) = self.cc_drag {
                if let Some(lane) = self.lanes.get_mut(drag.lane) {
                    if let Some(idx) = lane.set_point(drag.point, tick, value) {
                        self.cc_drag = Some(CcDrag { lane: drag.lane, point: idx });
                    }
                }
            }
        }
        if pointer.primary_released {
            self.cc_drag = None;
        }
    }

    // ---- note grid ----

    fn route_grid(&mut self, pointer: &PointerState) {
        let grid_rect = self.grid_rect();
        let gs = self.to_grid_space(pointer.pos);
        let mods = pointer.modifiers;

        if pointer.double_clicked && grid_rect.contains(pointer.pos) {
            self.pointer.on_double_click(&mut self.store, &self.coords, &self.grid, gs);
            self.record_clicked_cell(gs);
        } else if pointer.primary_clicked && grid_rect.contains(pointer.pos) {
            self.pointer.on_mouse_down(&mut self.store, &self.coords, gs, mods);
            self.record_clicked_cell(gs);
        } else if pointer.primary_down {
            self.pointer.on_mouse_move(&mut self.store, &self.coords, &self.grid, gs, mods);
        } else if pointer.primary_released {
            self.pointer.on_mouse_up(&mut self.store, mods);
        } else if grid_rect.contains(pointer.pos) {
            self.pointer.update_hover(&self.store, &self.coords, gs);
        }
    }

    fn record_clicked_cell(&mut self, grid_space: Pos2) {
        let (wx, wy) = self.coords.screen_to_world(grid_space.x, grid_space.y);
        self.last_clicked_cell =
            Some((self.coords.world_to_tick(wx), self.coords.world_y_to_key(wy)));
    }

    fn edge_scroll(&mut self, pointer: &PointerState) {
        let grid_rect = self.grid_rect();
        let pos = pointer.pos;
        let speed = |depth: f32| (EDGE_SCROLL_BASE + depth / 20.0 * 30.0).min(EDGE_SCROLL_MAX);

        let mut dx = 0.0;
        let mut dy = 0.0;
        let left = (grid_rect.left() + EDGE_SCROLL_MARGIN_PX - pos.x)
            .clamp(0.0, EDGE_SCROLL_MARGIN_PX);
        let right = (pos.x - (grid_rect.right() - EDGE_SCROLL_MARGIN_PX))
            .clamp(0.0, EDGE_SCROLL_MARGIN_PX);
        let top =
            (grid_rect.top() + EDGE_SCROLL_MARGIN_PX - pos.y).clamp(0.0, EDGE_SCROLL_MARGIN_PX);
        let bottom = (pos.y - (grid_rect.bottom() - EDGE_SCROLL_MARGIN_PX))
            .clamp(0.0, EDGE_SCROLL_MARGIN_PX);
        if left > 0.0 {
            dx = -speed(left);
        } else if right > 0.0 {
            dx = speed(right);
        }
        if top > 0.0 {
            dy = -speed(top);
        } else if bottom > 0.0 {
            dy = speed(bottom);
        }
        if dx != 0.0 || dy != 0.0 {
            self.coords.pan(dx, dy);
            self.expand_explored_to_viewport();
        }
    }
}
