mod input;
mod rendering;

use log::debug;

use crate::controller::{KeyboardController, PointerController};
use crate::state::{codec, ControlLane, NoteStore, Tick};
use crate::ui::draw::{pos2, DrawList, Pos2, Rect};
use crate::ui::input::InputState;
use crate::ui::keybindings::load_keymap;
use crate::ui::theme::Theme;
use crate::ui::widgets::{CustomScrollbar, LoopMarker};
use crate::view::{CoordinateSystem, GridSnap};

pub const DEFAULT_RULER_HEIGHT: f32 = 24.0;
pub const DEFAULT_CC_LANE_HEIGHT: f32 = 80.0;
pub const SCROLLBAR_HEIGHT: f32 = 12.0;
/// Base pixels-per-key the vertical zoom gesture scales from.
pub const BASE_KEY_HEIGHT: f32 = 20.0;
/// Wheel notches translate to this many pixels of vertical scroll.
pub const WHEEL_SCROLL_SPEED: f32 = 30.0;
/// Screen-distance tolerance for grabbing a playback or cue marker.
pub const MARKER_HIT_PX: f32 = 8.0;

/// Playback-position markers living in the ruler band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    PlaybackStart,
    CueLeft,
    CueRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AxisGestureMode {
    Pan,
    Zoom,
}

/// Latent pan-or-zoom gesture started in the ruler band.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RulerGesture {
    pub start_screen: Pos2,
    pub start_ppb: f32,
    pub start_viewport_x: f32,
    pub anchor_world_x: f32,
    pub mode: Option<AxisGestureMode>,
}

/// Latent pan-or-zoom gesture started in the note-name column.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ColumnGesture {
    pub start_screen: Pos2,
    pub start_key_height: f32,
    pub start_viewport_y: f32,
    pub anchor_world_y: f32,
    pub mode: Option<AxisGestureMode>,
}

/// A control-lane point being dragged.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CcDrag {
    pub lane: usize,
    pub point: usize,
}

/// Host callbacks, fired synchronously during `draw()`.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) playhead_changed: Option<Box<dyn FnMut(Tick)>>,
    pub(crate) playback_markers_changed: Option<Box<dyn FnMut(Tick, Tick, Tick)>>,
    pub(crate) piano_key_pressed: Option<Box<dyn FnMut(u8)>>,
    pub(crate) piano_key_released: Option<Box<dyn FnMut(u8)>>,
}

/// The piano-roll widget: owns the model, the view transforms, and the
/// interaction state, and emits draw commands once per host frame.
///
/// Single-threaded by construction: everything happens inside `draw()`
/// on the host's UI thread.
pub struct PianoRoll {
    pub(crate) store: NoteStore,
    pub(crate) coords: CoordinateSystem,
    pub(crate) grid: GridSnap,
    pub(crate) pointer: PointerController,
    pub(crate) keyboard: KeyboardController,
    pub(crate) scrollbar: CustomScrollbar,
    pub(crate) loop_marker: LoopMarker,
    pub(crate) lanes: Vec<ControlLane>,
    pub(crate) active_lane: usize,
    pub(crate) show_cc_lane: bool,
    pub(crate) cc_lane_height: f32,
    pub(crate) ruler_height: f32,
    /// Widest horizontal world range the user has visited.
    pub(crate) explored_min: f32,
    pub(crate) explored_max: f32,
    pub(crate) clip_start_tick: Tick,
    pub(crate) clip_length_ticks: Tick,
    pub(crate) playback_start_tick: Tick,
    pub(crate) cue_left_tick: Tick,
    pub(crate) cue_right_tick: Tick,
    pub(crate) playhead_tick: Option<Tick>,
    pub(crate) marker_drag: Option<MarkerKind>,
    pub(crate) ruler_gesture: Option<RulerGesture>,
    pub(crate) name_gesture: Option<ColumnGesture>,
    pub(crate) cc_drag: Option<CcDrag>,
    pub(crate) hovered_key: Option<u8>,
    pub(crate) pressed_key: Option<u8>,
    pub(crate) last_clicked_cell: Option<(Tick, u8)>,
    pub debug_overlay: bool,
    pub(crate) theme: Theme,
    pub(crate) callbacks: Callbacks,
    pub(crate) canvas: Rect,
}

impl Default for PianoRoll {
    fn default() -> Self {
        Self::new()
    }
}

impl PianoRoll {
    pub fn new() -> Self {
        let coords = CoordinateSystem::new();
        let grid = GridSnap::new(coords.ticks_per_beat());
        let tpb = coords.ticks_per_beat();
        // Four 4/4 bars of clip by default.
        let clip_length = tpb * 4 * 4;
        Self {
            store: NoteStore::new(),
            pointer: PointerController::new(tpb),
            keyboard: KeyboardController::new(load_keymap()),
            scrollbar: CustomScrollbar::new(),
            loop_marker: LoopMarker::new(0, clip_length),
            lanes: vec![ControlLane::new(1)],
            active_lane: 0,
            show_cc_lane: true,
            cc_lane_height: DEFAULT_CC_LANE_HEIGHT,
            ruler_height: DEFAULT_RULER_HEIGHT,
            explored_min: 0.0,
            explored_max: 1.0,
            clip_start_tick: 0,
            clip_length_ticks: clip_length,
            playback_start_tick: 0,
            cue_left_tick: 0,
            cue_right_tick: clip_length,
            playhead_tick: None,
            marker_drag: None,
            ruler_gesture: None,
            name_gesture: None,
            cc_drag: None,
            hovered_key: None,
            pressed_key: None,
            last_clicked_cell: None,
            debug_overlay: false,
            theme: Theme::default(),
            callbacks: Callbacks::default(),
            canvas: Rect::default(),
            coords,
            grid,
        }
    }

    /// Per-frame entry point: update layout, route input, emit draw
    /// commands. All state transitions happen synchronously in here.
    pub fn draw(&mut self, canvas: Rect, input: &InputState, out: &mut DrawList) {
        self.canvas = canvas;
        let grid_rect = self.grid_rect();
        self.coords.set_viewport_size(grid_rect.width, grid_rect.height);
        self.grid.refresh(self.coords.pixels_per_beat());
        self.loop_marker.sync_bounds(&self.coords, self.ruler_height);
        self.expand_explored_to_content();

        self.handle_input(input);
        self.render(out);
    }

    // ---- layout ----

    pub(crate) fn ruler_rect(&self) -> Rect {
        Rect {
            x: self.canvas.x,
            y: self.canvas.y,
            width: self.canvas.width,
            height: self.ruler_height,
        }
    }

    pub(crate) fn cc_rect(&self) -> Option<Rect> {
        if !self.show_cc_lane {
            return None;
        }
        Some(Rect {
            x: self.canvas.x + self.coords.piano_key_width(),
            y: self.canvas.bottom() - self.cc_lane_height,
            width: (self.canvas.width - self.coords.piano_key_width()).max(0.0),
            height: self.cc_lane_height,
        })
    }

    pub(crate) fn scrollbar_rect(&self) -> Rect {
        let bottom = self.cc_rect().map(|r| r.top()).unwrap_or(self.canvas.bottom());
        Rect {
            x: self.canvas.x + self.coords.piano_key_width(),
            y: bottom - SCROLLBAR_HEIGHT,
            width: (self.canvas.width - self.coords.piano_key_width()).max(0.0),
            height: SCROLLBAR_HEIGHT,
        }
    }

    pub(crate) fn grid_rect(&self) -> Rect {
        let top = self.canvas.y + self.ruler_height;
        let bottom = self.scrollbar_rect().top();
        Rect {
            x: self.canvas.x + self.coords.piano_key_width(),
            y: top,
            width: (self.canvas.width - self.coords.piano_key_width()).max(0.0),
            height: (bottom - top).max(0.0),
        }
    }

    pub(crate) fn name_column_rect(&self) -> Rect {
        Rect {
            x: self.canvas.x,
            y: self.canvas.y + self.ruler_height,
            width: self.coords.piano_key_width(),
            height: (self.canvas.height - self.ruler_height).max(0.0),
        }
    }

    /// Canvas-absolute pointer position into the grid space the
    /// coordinate system's screen transforms operate in (x from the
    /// canvas left, y from the grid top).
    pub(crate) fn to_grid_space(&self, pos: Pos2) -> Pos2 {
        pos2(pos.x - self.canvas.x, pos.y - self.canvas.y - self.ruler_height)
    }

    pub(crate) fn from_grid_space(&self, pos: Pos2) -> Pos2 {
        pos2(pos.x + self.canvas.x, pos.y + self.canvas.y + self.ruler_height)
    }

    // ---- explored area ----

    /// Frame-start expansion: the explored range always covers the
    /// current viewport and every note in the clip.
    pub(crate) fn expand_explored_to_content(&mut self) {
        let vp = self.coords.viewport();
        self.explored_min = self.explored_min.min(vp.x);
        self.explored_max = self.explored_max.max(vp.x + vp.width);
        if let Some((lo, hi)) = self.store.tick_extent() {
            self.explored_min = self.explored_min.min(self.coords.tick_to_world(lo));
            self.explored_max = self.explored_max.max(self.coords.tick_to_world(hi));
        }
    }

    /// Called after every operation that shifts `viewport.x`.
    pub(crate) fn expand_explored_to_viewport(&mut self) {
        let vp = self.coords.viewport();
        self.explored_min = self.explored_min.min(vp.x);
        self.explored_max = self.explored_max.max(vp.x + vp.width);
    }

    // ---- model access ----

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NoteStore {
        &mut self.store
    }

    pub fn coords(&self) -> &CoordinateSystem {
        &self.coords
    }

    pub fn coords_mut(&mut self) -> &mut CoordinateSystem {
        &mut self.coords
    }

    pub fn grid_snap(&self) -> &GridSnap {
        &self.grid
    }

    pub fn grid_snap_mut(&mut self) -> &mut GridSnap {
        &mut self.grid
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn lanes(&self) -> &[ControlLane] {
        &self.lanes
    }

    pub fn active_lane(&self) -> Option<&ControlLane> {
        self.lanes.get(self.active_lane)
    }

    /// Make `cc_number` the active lane, creating it if missing.
    pub fn select_lane(&mut self, cc_number: u8) {
        if let Some(pos) = self.lanes.iter().position(|l| l.cc_number == cc_number) {
            self.active_lane = pos;
        } else {
            self.lanes.push(ControlLane::new(cc_number));
            self.active_lane = self.lanes.len() - 1;
        }
    }

    pub fn set_show_cc_lane(&mut self, show: bool) {
        self.show_cc_lane = show;
    }

    /// Enable or disable Ctrl-drag duplication. While disabled,
    /// Ctrl-click toggles selection on release instead.
    pub fn set_duplicate_enabled(&mut self, enabled: bool) {
        self.pointer.duplicate_enabled = enabled;
    }

    pub fn hovered_key(&self) -> Option<u8> {
        self.hovered_key
    }

    pub fn pressed_key(&self) -> Option<u8> {
        self.pressed_key
    }

    pub fn playhead(&self) -> Option<Tick> {
        self.playhead_tick
    }

    pub fn set_playhead(&mut self, tick: Option<Tick>) {
        self.playhead_tick = tick.map(|t| t.max(0));
    }

    pub fn playback_markers(&self) -> (Tick, Tick, Tick) {
        (self.playback_start_tick, self.cue_left_tick, self.cue_right_tick)
    }

    pub fn loop_range(&self) -> (Tick, Tick) {
        (self.loop_marker.start_tick(), self.loop_marker.end_tick())
    }

    pub fn set_loop_range(&mut self, start: Tick, end: Tick) {
        self.loop_marker.set_range(start, end);
    }

    /// Clip bounds used for fit-to-clip and the default markers.
    pub fn set_clip(&mut self, start_tick: Tick, length_ticks: Tick) {
        self.clip_start_tick = start_tick.max(0);
        self.clip_length_ticks = length_ticks.max(1);
    }

    // ---- playback ----

    /// Pure playhead advancement: `delta_seconds` of playback at
    /// `tempo_bpm` from `current_tick`. Stores and returns the new
    /// position.
    pub fn update_playback(&mut self, current_tick: Tick, tempo_bpm: f32, delta_seconds: f32) -> Tick {
        let ticks = (delta_seconds as f64 * tempo_bpm as f64 / 60.0
            * self.coords.ticks_per_beat() as f64)
            .round() as Tick;
        let new_tick = (current_tick + ticks).max(0);
        self.playhead_tick = Some(new_tick);
        new_tick
    }

    // ---- callbacks ----

    pub fn on_playhead_changed(&mut self, f: impl FnMut(Tick) + 'static) {
        self.callbacks.playhead_changed = Some(Box::new(f));
    }

    pub fn on_playback_markers_changed(&mut self, f: impl FnMut(Tick, Tick, Tick) + 'static) {
        self.callbacks.playback_markers_changed = Some(Box::new(f));
    }

    pub fn on_piano_key_pressed(&mut self, f: impl FnMut(u8) + 'static) {
        self.callbacks.piano_key_pressed = Some(Box::new(f));
    }

    pub fn on_piano_key_released(&mut self, f: impl FnMut(u8) + 'static) {
        self.callbacks.piano_key_released = Some(Box::new(f));
    }

    // ---- persistence ----

    /// Write the clip through the `PPR1` text codec.
    pub fn save_clip<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        codec::write_clip(w, &self.store, &self.lanes)
    }

    /// Load a clip, replacing notes and lanes. Ids are reassigned.
    pub fn load_clip<R: std::io::Read>(&mut self, r: R) -> std::io::Result<()> {
        codec::read_clip_into(r, &mut self.store, &mut self.lanes)?;
        if self.lanes.is_empty() {
            self.lanes.push(ControlLane::new(1));
        }
        self.active_lane = self.active_lane.min(self.lanes.len() - 1);
        debug!("clip loaded into widget: {} notes", self.store.len());
        Ok(())
    }
}
