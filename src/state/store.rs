use std::collections::{HashMap, HashSet};

use log::debug;
use smallvec::SmallVec;

use super::note::{Note, NoteId, Tick, MAX_MIDI_KEY};

pub const DEFAULT_UNDO_LEVELS: usize = 100;

type Snapshot = Vec<Note>;

/// Identifier-keyed note collection with per-pitch overlap index,
/// selection set, and snapshot undo/redo.
///
/// Single-threaded: every operation is called from the widget's UI
/// thread. Ids are unique, monotonically increasing, and never zero.
pub struct NoteStore {
    notes: Vec<Note>,
    id_to_pos: HashMap<NoteId, usize>,
    key_to_pos: HashMap<u8, Vec<usize>>,
    selected: HashSet<NoteId>,
    next_id: u64,
    undo_stack: SmallVec<[Snapshot; 8]>,
    redo_stack: SmallVec<[Snapshot; 8]>,
    max_undo_levels: usize,
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore {
    pub fn new() -> Self {
        Self::with_undo_levels(DEFAULT_UNDO_LEVELS)
    }

    pub fn with_undo_levels(max_undo_levels: usize) -> Self {
        Self {
            notes: Vec::new(),
            id_to_pos: HashMap::new(),
            key_to_pos: HashMap::new(),
            selected: HashSet::new(),
            next_id: 1,
            undo_stack: SmallVec::new(),
            redo_stack: SmallVec::new(),
            max_undo_levels: max_undo_levels.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Notes in storage order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Remove every note and wipe history. Id allocation restarts.
    pub fn clear(&mut self) {
        self.notes.clear();
        self.selected.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.next_id = 1;
        self.rebuild_indices();
    }

    // ---- creation / mutation ----

    /// Create a note. Returns `None` when a field is out of range or,
    /// with `allow_overlap=false`, when a same-key overlap exists; no id
    /// is allocated in that case.
    #[allow(clippy::too_many_arguments)]
    pub fn create_note(
        &mut self,
        tick: Tick,
        duration: Tick,
        key: u8,
        velocity: u8,
        channel: u8,
        selected: bool,
        record_undo: bool,
        allow_overlap: bool,
    ) -> Option<NoteId> {
        // Validate before allocating an id.
        Note::validated(NoteId::new(u64::MAX), tick, duration, key, velocity, channel, selected)?;
        if !allow_overlap && self.has_overlap(key, tick, tick + duration, None) {
            return None;
        }
        if record_undo {
            self.snapshot_for_undo();
        }
        let id = NoteId::new(self.next_id);
        self.next_id += 1;
        let note = Note { id, tick, duration, key, velocity, channel, selected };
        let pos = self.notes.len();
        self.notes.push(note);
        self.id_to_pos.insert(id, pos);
        self.key_to_pos.entry(key).or_default().push(pos);
        if selected {
            self.selected.insert(id);
        }
        Some(id)
    }

    /// Remove a note by id. Returns false when the id is unknown.
    pub fn remove_note(&mut self, id: NoteId, record_undo: bool) -> bool {
        let Some(&pos) = self.id_to_pos.get(&id) else {
            return false;
        };
        if record_undo {
            self.snapshot_for_undo();
        }
        self.notes.remove(pos);
        self.selected.remove(&id);
        self.rebuild_indices();
        true
    }

    /// Move a note by a tick/key delta. The post-move tick is clamped to
    /// >= 0 and the key to 0..=127. On overlap rejection the note is
    /// restored untouched and false is returned.
    pub fn move_note(
        &mut self,
        id: NoteId,
        delta_tick: Tick,
        delta_key: i32,
        record_undo: bool,
        allow_overlap: bool,
    ) -> bool {
        let Some(&pos) = self.id_to_pos.get(&id) else {
            return false;
        };
        let old = self.notes[pos];
        let new_tick = (old.tick + delta_tick).max(0);
        let new_key = (old.key as i32 + delta_key).clamp(0, MAX_MIDI_KEY as i32) as u8;
        if new_tick == old.tick && new_key == old.key {
            return true;
        }
        if !allow_overlap
            && self.has_overlap(new_key, new_tick, new_tick + old.duration, Some(id))
        {
            return false;
        }
        if record_undo {
            self.snapshot_for_undo();
        }
        let note = &mut self.notes[pos];
        note.tick = new_tick;
        note.key = new_key;
        if new_key != old.key {
            self.rebuild_indices();
        }
        true
    }

    /// Change a note's duration. `new_duration` must be positive.
    pub fn resize_note(
        &mut self,
        id: NoteId,
        new_duration: Tick,
        record_undo: bool,
        allow_overlap: bool,
    ) -> bool {
        if new_duration <= 0 {
            return false;
        }
        let Some(&pos) = self.id_to_pos.get(&id) else {
            return false;
        };
        let old = self.notes[pos];
        if old.duration == new_duration {
            return true;
        }
        if !allow_overlap && self.has_overlap(old.key, old.tick, old.tick + new_duration, Some(id))
        {
            return false;
        }
        if record_undo {
            self.snapshot_for_undo();
        }
        self.notes[pos].duration = new_duration;
        true
    }

    /// Remove every selected note. Returns how many were removed.
    pub fn delete_selected(&mut self, record_undo: bool) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        if record_undo {
            self.snapshot_for_undo();
        }
        let doomed = std::mem::take(&mut self.selected);
        let before = self.notes.len();
        self.notes.retain(|n| !doomed.contains(&n.id));
        self.rebuild_indices();
        before - self.notes.len()
    }

    // ---- selection ----

    /// Select a note; with `add=false` the previous selection is
    /// replaced. Returns false for an unknown id.
    pub fn select(&mut self, id: NoteId, add: bool) -> bool {
        if !self.id_to_pos.contains_key(&id) {
            return false;
        }
        if !add {
            self.clear_selection();
        }
        self.selected.insert(id);
        if let Some(&pos) = self.id_to_pos.get(&id) {
            self.notes[pos].selected = true;
        }
        true
    }

    pub fn deselect(&mut self, id: NoteId) -> bool {
        if !self.selected.remove(&id) {
            return false;
        }
        if let Some(&pos) = self.id_to_pos.get(&id) {
            self.notes[pos].selected = false;
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        for note in &mut self.notes {
            note.selected = false;
        }
    }

    pub fn select_all(&mut self) {
        for note in &mut self.notes {
            note.selected = true;
            self.selected.insert(note.id);
        }
    }

    pub fn is_selected(&self, id: NoteId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids, sorted for deterministic iteration.
    pub fn selected_ids(&self) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = self.selected.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Tick/key bounds of the selection: (min_tick, min_key, max_key).
    pub fn selection_bounds(&self) -> Option<(Tick, u8, u8)> {
        let mut bounds: Option<(Tick, u8, u8)> = None;
        for note in self.notes.iter().filter(|n| n.selected) {
            bounds = Some(match bounds {
                None => (note.tick, note.key, note.key),
                Some((t, lo, hi)) => (t.min(note.tick), lo.min(note.key), hi.max(note.key)),
            });
        }
        bounds
    }

    // ---- undo / redo ----

    /// Push the current note sequence onto the undo stack and clear the
    /// redo stack. Group edits call this once, then mutate with
    /// `record_undo=false`.
    pub fn snapshot_for_undo(&mut self) {
        if self.undo_stack.len() >= self.max_undo_levels {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(self.notes.clone());
        self.redo_stack.clear();
        debug!("undo snapshot pushed, depth {}", self.undo_stack.len());
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(std::mem::replace(&mut self.notes, snapshot));
        self.restore_after_history();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(std::mem::replace(&mut self.notes, snapshot));
        self.restore_after_history();
        true
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    fn restore_after_history(&mut self) {
        self.rebuild_indices();
        self.selected = self.notes.iter().filter(|n| n.selected).map(|n| n.id).collect();
        // Ids stay monotonic even across undo of creations.
        let max_id = self.notes.iter().map(|n| n.id.raw()).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
    }

    // ---- queries ----

    pub fn find_by_id(&self, id: NoteId) -> Option<&Note> {
        self.id_to_pos.get(&id).map(|&pos| &self.notes[pos])
    }

    /// A note on `key` whose [tick, end_tick) contains the probe tick.
    pub fn note_at(&self, tick: Tick, key: u8) -> Option<&Note> {
        let positions = self.key_to_pos.get(&key)?;
        positions
            .iter()
            .map(|&pos| &self.notes[pos])
            .find(|n| n.contains_tick(tick))
    }

    /// Notes intersecting the half-open tick range on keys in
    /// `key_lo..=key_hi`.
    pub fn notes_in_range(
        &self,
        tick_lo: Tick,
        tick_hi: Tick,
        key_lo: u8,
        key_hi: u8,
    ) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| {
                n.key >= key_lo && n.key <= key_hi && n.tick < tick_hi && n.end_tick() > tick_lo
            })
            .collect()
    }

    /// World-tick extent of the whole clip content: (min_tick, max_end).
    pub fn tick_extent(&self) -> Option<(Tick, Tick)> {
        let mut extent: Option<(Tick, Tick)> = None;
        for note in &self.notes {
            extent = Some(match extent {
                None => (note.tick, note.end_tick()),
                Some((lo, hi)) => (lo.min(note.tick), hi.max(note.end_tick())),
            });
        }
        extent
    }

    // ---- internals ----

    fn has_overlap(&self, key: u8, start: Tick, end: Tick, exclude: Option<NoteId>) -> bool {
        let Some(positions) = self.key_to_pos.get(&key) else {
            return false;
        };
        positions.iter().map(|&pos| &self.notes[pos]).any(|n| {
            Some(n.id) != exclude && n.tick < end && start < n.end_tick()
        })
    }

    fn rebuild_indices(&mut self) {
        self.id_to_pos.clear();
        self.key_to_pos.clear();
        for (pos, note) in self.notes.iter().enumerate() {
            self.id_to_pos.insert(note.id, pos);
            self.key_to_pos.entry(note.key).or_default().push(pos);
        }
        self.selected.retain(|id| self.id_to_pos.contains_key(id));
    }

    /// Debug-only consistency probe used by tests: indices and selection
    /// set agree with the note sequence.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.id_to_pos.len(), self.notes.len());
        for (pos, note) in self.notes.iter().enumerate() {
            assert_eq!(self.id_to_pos[&note.id], pos);
            assert!(self.key_to_pos[&note.key].contains(&pos));
            assert_eq!(note.selected, self.selected.contains(&note.id));
        }
        let indexed: usize = self.key_to_pos.values().map(|v| v.len()).sum();
        assert_eq!(indexed, self.notes.len());
    }
}
