use crate::state::Tick;
use crate::ui::draw::{Pos2, Rect};
use crate::ui::widgets::draggable::DraggableRect;
use crate::view::CoordinateSystem;

/// Vertical band of the ruler the loop bar occupies, as fractions of
/// the ruler height.
pub const LOOP_BAND_TOP: f32 = 0.40;
pub const LOOP_BAND_BOTTOM: f32 = 0.65;

/// Loop region in the ruler band: a [`DraggableRect`] whose horizontal
/// axis is world-X and whose vertical axis is local pixels inside the
/// ruler. Snapping is aligned to quarter-beats.
#[derive(Clone, Debug)]
pub struct LoopMarker {
    rect: DraggableRect,
    start_tick: Tick,
    end_tick: Tick,
}

impl LoopMarker {
    pub fn new(start_tick: Tick, end_tick: Tick) -> Self {
        let mut rect = DraggableRect::new(Rect::default());
        rect.edge_threshold = 6.0;
        Self { rect, start_tick, end_tick: end_tick.max(start_tick + 1) }
    }

    pub fn start_tick(&self) -> Tick {
        self.start_tick
    }

    pub fn end_tick(&self) -> Tick {
        self.end_tick
    }

    pub fn set_range(&mut self, start_tick: Tick, end_tick: Tick) {
        self.start_tick = start_tick.max(0);
        self.end_tick = end_tick.max(self.start_tick + 1);
    }

    pub fn is_active(&self) -> bool {
        self.rect.is_active()
    }

    fn quarter(coords: &CoordinateSystem) -> Tick {
        (coords.ticks_per_beat() / 4).max(1)
    }

    /// Refresh bounds from the tick range; called each frame before
    /// input so zoom and scroll changes are reflected.
    pub fn sync_bounds(&mut self, coords: &CoordinateSystem, ruler_height: f32) {
        if self.rect.is_active() {
            return;
        }
        let x0 = coords.tick_to_world(self.start_tick);
        let x1 = coords.tick_to_world(self.end_tick);
        let min_w = coords.tick_to_world(Self::quarter(coords));
        self.rect.min_width = min_w.max(1.0);
        self.rect.set_bounds(Rect {
            x: x0,
            y: ruler_height * LOOP_BAND_TOP,
            width: (x1 - x0).max(min_w),
            height: ruler_height * (LOOP_BAND_BOTTOM - LOOP_BAND_TOP),
        });
    }

    /// The marker rect in mixed coordinates (world-X, ruler-local-Y).
    pub fn bounds(&self) -> Rect {
        self.rect.current_bounds()
    }

    pub fn hit(&self, pos: Pos2) -> bool {
        let b = self.rect.bounds();
        let grown = Rect {
            x: b.x - self.rect.edge_threshold,
            width: b.width + 2.0 * self.rect.edge_threshold,
            ..b
        };
        grown.contains(pos)
    }

    pub fn on_mouse_down(&mut self, pos: Pos2) -> bool {
        self.rect.on_mouse_down(pos)
    }

    pub fn on_mouse_move(&mut self, pos: Pos2, coords: &CoordinateSystem) {
        let quarter_world = coords.tick_to_world(Self::quarter(coords));
        let snap = move |x: f32| (x / quarter_world).round() * quarter_world;
        self.rect.on_mouse_move(pos, Some(&snap));
    }

    /// Commit the gesture: world bounds convert back to ticks, re-snap
    /// to quarter-beat multiples, and keep at least one quarter-beat of
    /// width. Returns true if the range changed.
    pub fn on_mouse_up(&mut self, coords: &CoordinateSystem) -> bool {
        if !self.rect.on_mouse_up() {
            return false;
        }
        let quarter = Self::quarter(coords);
        let bounds = self.rect.bounds();
        let snap = |tick: Tick| -> Tick {
            let rem = tick.rem_euclid(quarter);
            if rem * 2 >= quarter { tick + quarter - rem } else { tick - rem }
        };
        let start = snap(coords.world_to_tick(bounds.left())).max(0);
        let mut end = snap(coords.world_to_tick(bounds.right()));
        if end < start + quarter {
            end = start + quarter;
        }
        let changed = (start, end) != (self.start_tick, self.end_tick);
        self.start_tick = start;
        self.end_tick = end;
        changed
    }
}
