use std::collections::HashSet;

use crate::state::{NoteId, NoteStore, Tick};
use crate::ui::draw::{pos2, Pos2, Rect};
use crate::ui::input::Modifiers;
use crate::view::grid::DEFAULT_MAGNET_RANGE_PX;
use crate::view::{CoordinateSystem, GridSnap};

pub const DRAG_THRESHOLD_PX: f32 = 4.0;
pub const EDGE_THRESHOLD_PX: f32 = 6.0;
/// Shortest note an edge resize can produce.
pub const MIN_NOTE_TICKS: Tick = 10;
pub const DEFAULT_VELOCITY: u8 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerAction {
    #[default]
    None,
    DraggingNote,
    ResizingLeft,
    ResizingRight,
    RectangleSelection,
}

/// Pure hover derivation for overlays: which note, and which part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    None,
    Body(NoteId),
    LeftEdge(NoteId),
    RightEdge(NoteId),
}

/// Main pointer state machine for the note grid: hit-test, selection,
/// group drag, edge resize, rectangle selection with modifier set
/// algebra, Ctrl-duplicate, and double-click create/delete.
pub struct PointerController {
    action: PointerAction,
    anchor_id: Option<NoteId>,
    anchor_start_tick: Tick,
    anchor_start_duration: Tick,
    /// World-X distance from the anchor's left edge to the grab point.
    drag_offset_x: f32,
    rect_start: Pos2,
    rect_end: Pos2,
    initial_selection: Vec<NoteId>,
    is_duplicating: bool,
    /// Suppresses the chosen action until the pointer travels past the
    /// drag threshold, so clicks don't nudge notes.
    pending_click: bool,
    mouse_down_screen: Pos2,
    pending_toggle: Option<NoteId>,
    undo_recorded: bool,
    hover: HoverState,
    pub drag_threshold_px: f32,
    pub edge_threshold_px: f32,
    pub magnet_range_px: f32,
    pub duplicate_enabled: bool,
    /// Duration for double-click creation; follows the last resize.
    pub default_note_duration: Tick,
    pub default_velocity: u8,
    pub default_channel: u8,
}

impl PointerController {
    pub fn new(ticks_per_beat: Tick) -> Self {
        Self {
            action: PointerAction::None,
            anchor_id: None,
            anchor_start_tick: 0,
            anchor_start_duration: 0,
            drag_offset_x: 0.0,
            rect_start: Pos2::default(),
            rect_end: Pos2::default(),
            initial_selection: Vec::new(),
            is_duplicating: false,
            pending_click: false,
            mouse_down_screen: Pos2::default(),
            pending_toggle: None,
            undo_recorded: false,
            hover: HoverState::None,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            edge_threshold_px: EDGE_THRESHOLD_PX,
            magnet_range_px: DEFAULT_MAGNET_RANGE_PX,
            duplicate_enabled: true,
            default_note_duration: ticks_per_beat,
            default_velocity: DEFAULT_VELOCITY,
            default_channel: 0,
        }
    }

    pub fn action(&self) -> PointerAction {
        self.action
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn is_duplicating(&self) -> bool {
        self.is_duplicating
    }

    /// World-space selection rectangle while one is being dragged.
    pub fn selection_rect(&self) -> Option<Rect> {
        if self.action == PointerAction::RectangleSelection && !self.pending_click {
            Some(Rect::from_min_max(self.rect_start, self.rect_end))
        } else {
            None
        }
    }

    pub fn anchor_id(&self) -> Option<NoteId> {
        self.anchor_id
    }

    // ---- mouse down ----

    pub fn on_mouse_down(
        &mut self,
        store: &mut NoteStore,
        coords: &CoordinateSystem,
        screen_pos: Pos2,
        mods: Modifiers,
    ) {
        self.mouse_down_screen = screen_pos;
        self.pending_click = true;
        self.pending_toggle = None;
        self.undo_recorded = false;
        self.is_duplicating = false;

        let (wx, wy) = coords.screen_to_world(screen_pos.x, screen_pos.y);
        let tick = coords.world_to_tick(wx);
        let key = coords.world_y_to_key(wy);

        let Some(hit) = store.note_at(tick, key).copied() else {
            self.action = PointerAction::RectangleSelection;
            self.rect_start = pos2(wx, wy);
            self.rect_end = self.rect_start;
            self.initial_selection = store.selected_ids();
            return;
        };

        // Membership first, so duplication copies the clicked note too.
        if !store.is_selected(hit.id) {
            if !mods.ctrl && !mods.shift {
                store.clear_selection();
            }
            store.select(hit.id, true);
        } else if mods.ctrl && !self.duplicate_enabled {
            // Ctrl-click on a selected note toggles on release, unless a
            // drag turns this press into a group move.
            self.pending_toggle = Some(hit.id);
        }

        let mut anchor = hit;
        if mods.ctrl && self.duplicate_enabled {
            anchor = self.duplicate_selection(store, hit);
        }

        self.anchor_id = Some(anchor.id);
        self.anchor_start_tick = anchor.tick;
        self.anchor_start_duration = anchor.duration;

        let left = coords.tick_to_world(anchor.tick);
        let right = coords.tick_to_world(anchor.end_tick());
        self.action = if (wx - left).abs() <= self.edge_threshold_px {
            PointerAction::ResizingLeft
        } else if (wx - right).abs() <= self.edge_threshold_px {
            PointerAction::ResizingRight
        } else {
            PointerAction::DraggingNote
        };
        self.drag_offset_x = wx - left;
    }

    /// Duplicate every selected note, move the selection to the copies,
    /// and return the copy of the clicked note as the new anchor.
    fn duplicate_selection(&mut self, store: &mut NoteStore, hit: crate::state::Note) -> crate::state::Note {
        self.initial_selection = store.selected_ids();
        store.snapshot_for_undo();
        self.undo_recorded = true;

        let mut anchor = hit;
        let originals = self.initial_selection.clone();
        let mut copies = Vec::with_capacity(originals.len());
        for id in &originals {
            let Some(src) = store.find_by_id(*id).copied() else {
                continue;
            };
            // Copies start stacked on their sources.
            if let Some(copy_id) = store.create_note(
                src.tick,
                src.duration,
                src.key,
                src.velocity,
                src.channel,
                false,
                false,
                true,
            ) {
                copies.push(copy_id);
                if *id == hit.id {
                    if let Some(copy) = store.find_by_id(copy_id) {
                        anchor = *copy;
                    }
                }
            }
        }
        store.clear_selection();
        for id in copies {
            store.select(id, true);
        }
        self.is_duplicating = true;
        anchor
    }

    // ---- mouse move ----

    pub fn on_mouse_move(
        &mut self,
        store: &mut NoteStore,
        coords: &CoordinateSystem,
        grid: &GridSnap,
        screen_pos: Pos2,
        mods: Modifiers,
    ) {
        if self.action == PointerAction::None {
            self.update_hover(store, coords, screen_pos);
            return;
        }
        if self.pending_click {
            if (screen_pos - self.mouse_down_screen).length() <= self.drag_threshold_px {
                self.update_hover(store, coords, screen_pos);
                return;
            }
            self.pending_click = false;
        }

        match self.action {
            PointerAction::DraggingNote => self.move_selection(store, coords, grid, screen_pos, mods),
            PointerAction::ResizingLeft | PointerAction::ResizingRight => {
                self.resize_anchor(store, coords, grid, screen_pos, mods)
            }
            PointerAction::RectangleSelection => {
                let (wx, wy) = coords.screen_to_world(screen_pos.x, screen_pos.y);
                self.rect_end = pos2(wx, wy);
                self.apply_rectangle(store, coords, mods);
            }
            PointerAction::None => {}
        }
    }

    fn snap(&self, grid: &GridSnap, ppb: f32, tick: Tick, shift: bool) -> Tick {
        if shift {
            tick
        } else {
            grid.magnetic_snap(tick, ppb, self.magnet_range_px).0
        }
    }

    fn ensure_snapshot(&mut self, store: &mut NoteStore) {
        if !self.undo_recorded {
            store.snapshot_for_undo();
            self.undo_recorded = true;
        }
    }

    fn move_selection(
        &mut self,
        store: &mut NoteStore,
        coords: &CoordinateSystem,
        grid: &GridSnap,
        screen_pos: Pos2,
        mods: Modifiers,
    ) {
        let Some(anchor_id) = self.anchor_id else {
            return;
        };
        let Some(anchor) = store.find_by_id(anchor_id).copied() else {
            return;
        };
        let (wx, wy) = coords.screen_to_world(screen_pos.x, screen_pos.y);
        let raw_tick = coords.world_to_tick(wx - self.drag_offset_x);
        let new_tick = self.snap(grid, coords.pixels_per_beat(), raw_tick, mods.shift);
        let delta_tick = new_tick - anchor.tick;
        let delta_key = coords.world_y_to_key(wy) as i32 - anchor.key as i32;
        if delta_tick == 0 && delta_key == 0 {
            return;
        }
        self.ensure_snapshot(store);

        // Process in the direction of travel so notes vacate the space
        // their selected neighbors move into. Failed moves skip
        // silently, preserving group shape where possible.
        let mut ids = store.selected_ids();
        ids.sort_by_key(|&id| {
            let note = store.find_by_id(id).copied().unwrap_or(anchor);
            let key_rank = if delta_key > 0 { -(note.key as i64) } else { note.key as i64 };
            let tick_rank = if delta_tick > 0 { -note.tick } else { note.tick };
            (key_rank, tick_rank)
        });
        for id in ids {
            store.move_note(id, delta_tick, delta_key, false, false);
        }
    }

    fn resize_anchor(
        &mut self,
        store: &mut NoteStore,
        coords: &CoordinateSystem,
        grid: &GridSnap,
        screen_pos: Pos2,
        mods: Modifiers,
    ) {
        let Some(anchor_id) = self.anchor_id else {
            return;
        };
        let ppb = coords.pixels_per_beat();
        let (wx, _) = coords.screen_to_world(screen_pos.x, screen_pos.y);
        let pointer_tick = coords.world_to_tick(wx);
        let original_end = self.anchor_start_tick + self.anchor_start_duration;

        let (left, right) = match self.action {
            PointerAction::ResizingLeft => {
                let left = self.snap(grid, ppb, pointer_tick, mods.shift);
                let right = self.snap(grid, ppb, original_end, mods.shift);
                (left.min(right - MIN_NOTE_TICKS), right)
            }
            _ => {
                let left = self.snap(grid, ppb, self.anchor_start_tick, mods.shift);
                let right = self.snap(grid, ppb, pointer_tick, mods.shift);
                (left, right.max(left + MIN_NOTE_TICKS))
            }
        };
        let left = left.max(0);
        let right = right.max(left + MIN_NOTE_TICKS);

        let Some(current) = store.find_by_id(anchor_id).copied() else {
            return;
        };
        if current.tick == left && current.duration == right - left {
            return;
        }
        self.ensure_snapshot(store);
        // Left edge as a move, then the new duration; resize touches the
        // anchor only, never its selected siblings.
        store.move_note(anchor_id, left - current.tick, 0, false, false);
        if let Some(after) = store.find_by_id(anchor_id).copied() {
            let duration = (right - after.tick).max(MIN_NOTE_TICKS);
            store.resize_note(anchor_id, duration, false, false);
        }
    }

    fn apply_rectangle(
        &mut self,
        store: &mut NoteStore,
        coords: &CoordinateSystem,
        mods: Modifiers,
    ) {
        let rect = Rect::from_min_max(self.rect_start, self.rect_end);
        let tick_lo = coords.world_to_tick(rect.left());
        let tick_hi = coords.world_to_tick(rect.right()).max(tick_lo);
        let key_hi = coords.world_y_to_key(rect.top());
        let key_lo = coords.world_y_to_key(rect.bottom());
        let in_rect: HashSet<NoteId> = store
            .notes_in_range(tick_lo, tick_hi, key_lo.min(key_hi), key_lo.max(key_hi))
            .iter()
            .map(|n| n.id)
            .collect();
        let initial: HashSet<NoteId> = self.initial_selection.iter().copied().collect();

        let target: HashSet<NoteId> = if mods.ctrl {
            initial.union(&in_rect).copied().collect()
        } else if mods.shift {
            initial.symmetric_difference(&in_rect).copied().collect()
        } else if mods.alt {
            initial.difference(&in_rect).copied().collect()
        } else {
            in_rect
        };

        store.clear_selection();
        for id in target {
            store.select(id, true);
        }
    }

    // ---- mouse up ----

    pub fn on_mouse_up(&mut self, store: &mut NoteStore, mods: Modifiers) {
        if self.pending_click {
            if let Some(id) = self.pending_toggle {
                if store.is_selected(id) {
                    store.deselect(id);
                } else {
                    store.select(id, true);
                }
            } else if self.action == PointerAction::RectangleSelection && !mods.any() {
                // Empty-space click.
                store.clear_selection();
            }
        } else if matches!(
            self.action,
            PointerAction::ResizingLeft | PointerAction::ResizingRight
        ) {
            if let Some(anchor) = self.anchor_id.and_then(|id| store.find_by_id(id)) {
                self.default_note_duration = anchor.duration;
            }
        }

        self.action = PointerAction::None;
        self.anchor_id = None;
        self.is_duplicating = false;
        self.pending_click = false;
        self.pending_toggle = None;
        self.initial_selection.clear();
        self.undo_recorded = false;
    }

    // ---- double click ----

    /// Remove the note under the cursor, or create one at the snapped
    /// tick with the current default duration.
    pub fn on_double_click(
        &mut self,
        store: &mut NoteStore,
        coords: &CoordinateSystem,
        grid: &GridSnap,
        screen_pos: Pos2,
    ) -> Option<NoteId> {
        let (wx, wy) = coords.screen_to_world(screen_pos.x, screen_pos.y);
        let tick = coords.world_to_tick(wx);
        let key = coords.world_y_to_key(wy);
        if let Some(hit) = store.note_at(tick, key).map(|n| n.id) {
            store.remove_note(hit, true);
            return None;
        }
        let snapped = grid.snap_tick_floor(tick);
        store.create_note(
            snapped,
            self.default_note_duration,
            key,
            self.default_velocity,
            self.default_channel,
            false,
            true,
            false,
        )
    }

    // ---- hover ----

    pub fn update_hover(
        &mut self,
        store: &NoteStore,
        coords: &CoordinateSystem,
        screen_pos: Pos2,
    ) {
        let (wx, wy) = coords.screen_to_world(screen_pos.x, screen_pos.y);
        let tick = coords.world_to_tick(wx);
        let key = coords.world_y_to_key(wy);
        self.hover = match store.note_at(tick, key) {
            None => HoverState::None,
            Some(note) => {
                let left = coords.tick_to_world(note.tick);
                let right = coords.tick_to_world(note.end_tick());
                if (wx - left).abs() <= self.edge_threshold_px {
                    HoverState::LeftEdge(note.id)
                } else if (wx - right).abs() <= self.edge_threshold_px {
                    HoverState::RightEdge(note.id)
                } else {
                    HoverState::Body(note.id)
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SnapMode;

    struct Rig {
        store: NoteStore,
        coords: CoordinateSystem,
        grid: GridSnap,
        pointer: PointerController,
    }

    fn rig() -> Rig {
        let mut coords = CoordinateSystem::new();
        coords.set_scroll(0.0, 0.0);
        let mut grid = GridSnap::new(480);
        grid.set_mode(SnapMode::Off);
        Rig {
            store: NoteStore::new(),
            coords,
            grid,
            pointer: PointerController::new(480),
        }
    }

    /// Screen position over the middle of a note's row at a tick.
    fn at(r: &Rig, tick: Tick, key: u8) -> Pos2 {
        let wx = r.coords.tick_to_world(tick);
        let wy = r.coords.key_to_world_y(key) + r.coords.key_height() / 2.0;
        let (sx, sy) = r.coords.world_to_screen(wx, wy);
        pos2(sx, sy)
    }

    fn add(r: &mut Rig, tick: Tick, duration: Tick, key: u8) -> NoteId {
        r.store
            .create_note(tick, duration, key, 100, 0, false, false, false)
            .unwrap()
    }

    #[test]
    fn click_selects_and_click_elsewhere_clears() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        let down = at(&r, 100, 60);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, Modifiers::NONE);
        r.pointer.on_mouse_up(&mut r.store, Modifiers::NONE);
        assert!(r.store.is_selected(a));

        let empty = at(&r, 5000, 40);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, empty, Modifiers::NONE);
        r.pointer.on_mouse_up(&mut r.store, Modifiers::NONE);
        assert!(!r.store.is_selected(a));
    }

    #[test]
    fn group_drag_preserves_spacing() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        let b = add(&mut r, 480, 240, 60);
        let c = add(&mut r, 960, 240, 62);
        r.store.select(a, false);
        r.store.select(b, true);
        r.store.select(c, true);

        // Grab A's body and move one beat right, one key up.
        let down = at(&r, 120, 60);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, Modifiers::NONE);
        let ppb = r.coords.pixels_per_beat();
        let step = pos2(down.x + ppb, down.y - r.coords.key_height());
        r.pointer
            .on_mouse_move(&mut r.store, &r.coords, &r.grid, step, Modifiers::NONE);
        r.pointer.on_mouse_up(&mut r.store, Modifiers::NONE);

        let get = |id| r.store.find_by_id(id).copied().unwrap();
        assert_eq!((get(a).tick, get(a).key), (480, 61));
        assert_eq!((get(b).tick, get(b).key), (960, 61));
        assert_eq!((get(c).tick, get(c).key), (1440, 63));
    }

    #[test]
    fn movement_below_threshold_does_not_drag() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        let down = at(&r, 100, 60);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, Modifiers::NONE);
        let nudge = pos2(down.x + 2.0, down.y);
        r.pointer
            .on_mouse_move(&mut r.store, &r.coords, &r.grid, nudge, Modifiers::NONE);
        r.pointer.on_mouse_up(&mut r.store, Modifiers::NONE);
        assert_eq!(r.store.find_by_id(a).unwrap().tick, 0);
    }

    #[test]
    fn rectangle_set_algebra() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        let b = add(&mut r, 480, 240, 61);
        let c = add(&mut r, 3840, 240, 80);
        r.store.select(a, false);

        // Shift-rectangle over a and b: symmetric difference toggles a
        // off and b on.
        let start = at(&r, 0, 63);
        let end = at(&r, 800, 59);
        r.pointer.on_mouse_down(
            &mut r.store,
            &r.coords,
            start,
            Modifiers { shift: true, ..Modifiers::NONE },
        );
        r.pointer.on_mouse_move(
            &mut r.store,
            &r.coords,
            &r.grid,
            end,
            Modifiers { shift: true, ..Modifiers::NONE },
        );
        r.pointer
            .on_mouse_up(&mut r.store, Modifiers { shift: true, ..Modifiers::NONE });
        assert_eq!(r.store.selected_ids(), vec![b]);
        assert!(!r.store.is_selected(a));
        assert!(!r.store.is_selected(c));
    }

    #[test]
    fn rectangle_union_and_subtract() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        let b = add(&mut r, 480, 240, 61);
        r.store.select(a, false);

        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        // Ctrl-rectangle over b only: union keeps a.
        let start = at(&r, 470, 62);
        let end = at(&r, 800, 61);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, start, ctrl);
        r.pointer.on_mouse_move(&mut r.store, &r.coords, &r.grid, end, ctrl);
        r.pointer.on_mouse_up(&mut r.store, ctrl);
        assert_eq!(r.store.selected_ids(), vec![a, b]);

        // Alt-rectangle over a: subtraction drops it.
        let alt = Modifiers { alt: true, ..Modifiers::NONE };
        let start = at(&r, 0, 61);
        let end = at(&r, 300, 59);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, start, alt);
        r.pointer.on_mouse_move(&mut r.store, &r.coords, &r.grid, end, alt);
        r.pointer.on_mouse_up(&mut r.store, alt);
        assert_eq!(r.store.selected_ids(), vec![b]);
    }

    #[test]
    fn resize_right_updates_default_duration() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        r.store.select(a, false);
        let down = at(&r, 230, 60); // just inside the right edge
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, Modifiers::NONE);
        assert_eq!(r.pointer.action(), PointerAction::ResizingRight);
        let target = at(&r, 480, 60);
        r.pointer
            .on_mouse_move(&mut r.store, &r.coords, &r.grid, target, Modifiers::NONE);
        r.pointer.on_mouse_up(&mut r.store, Modifiers::NONE);
        assert_eq!(r.store.find_by_id(a).unwrap().duration, 480);
        assert_eq!(r.pointer.default_note_duration, 480);
    }

    #[test]
    fn resize_enforces_min_length() {
        let mut r = rig();
        let a = add(&mut r, 480, 480, 60);
        let down = at(&r, 950, 60);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, Modifiers::NONE);
        let target = at(&r, 200, 60);
        r.pointer
            .on_mouse_move(&mut r.store, &r.coords, &r.grid, target, Modifiers::NONE);
        r.pointer.on_mouse_up(&mut r.store, Modifiers::NONE);
        let note = r.store.find_by_id(a).unwrap();
        assert_eq!(note.duration, MIN_NOTE_TICKS);
        assert_eq!(note.tick, 480);
    }

    #[test]
    fn ctrl_drag_duplicates_selection() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        let b = add(&mut r, 480, 240, 62);
        r.store.select(a, false);
        r.store.select(b, true);

        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        let down = at(&r, 120, 60);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, ctrl);
        assert!(r.pointer.is_duplicating());
        assert_eq!(r.store.len(), 4);
        // Copies, not originals, carry the selection.
        assert!(!r.store.is_selected(a));
        assert!(!r.store.is_selected(b));
        assert_eq!(r.store.selection_len(), 2);

        // Drag the copies an octave down.
        let target = pos2(down.x, down.y + 12.0 * r.coords.key_height());
        r.pointer.on_mouse_move(&mut r.store, &r.coords, &r.grid, target, ctrl);
        r.pointer.on_mouse_up(&mut r.store, ctrl);
        assert_eq!(r.store.find_by_id(a).unwrap().key, 60);
        let copy_keys: Vec<u8> = r
            .store
            .selected_ids()
            .iter()
            .map(|&id| r.store.find_by_id(id).unwrap().key)
            .collect();
        assert_eq!(copy_keys, vec![48, 50]);
    }

    #[test]
    fn ctrl_click_toggles_on_release_when_duplication_disabled() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        r.store.select(a, false);
        r.pointer.duplicate_enabled = false;
        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        let down = at(&r, 120, 60);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, ctrl);
        assert!(r.store.is_selected(a));
        r.pointer.on_mouse_up(&mut r.store, ctrl);
        assert!(!r.store.is_selected(a));
    }

    #[test]
    fn double_click_creates_then_deletes() {
        let mut r = rig();
        r.grid.set_mode(SnapMode::Manual);
        r.grid.set_snap_division(480);
        let pos = at(&r, 700, 64);
        let id = r
            .pointer
            .on_double_click(&mut r.store, &r.coords, &r.grid, pos)
            .unwrap();
        let note = r.store.find_by_id(id).copied().unwrap();
        assert_eq!(note.tick, 480); // floor-snapped
        assert_eq!(note.key, 64);
        assert_eq!(note.duration, 480);

        let on_note = at(&r, 500, 64);
        assert!(r
            .pointer
            .on_double_click(&mut r.store, &r.coords, &r.grid, on_note)
            .is_none());
        assert!(r.store.is_empty());
    }

    #[test]
    fn hover_classifies_edges() {
        let mut r = rig();
        let a = add(&mut r, 0, 480, 60);
        r.pointer.update_hover(&r.store, &r.coords, at(&r, 240, 60));
        assert_eq!(r.pointer.hover(), HoverState::Body(a));
        r.pointer.update_hover(&r.store, &r.coords, at(&r, 0, 60));
        assert_eq!(r.pointer.hover(), HoverState::LeftEdge(a));
        r.pointer.update_hover(&r.store, &r.coords, at(&r, 478, 60));
        assert_eq!(r.pointer.hover(), HoverState::RightEdge(a));
    }

    #[test]
    fn drag_records_one_undo_snapshot() {
        let mut r = rig();
        let a = add(&mut r, 0, 240, 60);
        r.store.select(a, false);
        let down = at(&r, 120, 60);
        r.pointer.on_mouse_down(&mut r.store, &r.coords, down, Modifiers::NONE);
        for i in 1..=5 {
            let step = pos2(down.x + i as f32 * 20.0, down.y);
            r.pointer
                .on_mouse_move(&mut r.store, &r.coords, &r.grid, step, Modifiers::NONE);
        }
        r.pointer.on_mouse_up(&mut r.store, Modifiers::NONE);
        assert_eq!(r.store.undo_depth(), 1);
        assert!(r.store.undo());
        assert_eq!(r.store.find_by_id(a).unwrap().tick, 0);
    }
}
