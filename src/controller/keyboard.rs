use crate::state::{Clipboard, NoteStore, Tick};
use crate::ui::input::KeyEvent;
use crate::ui::keymap::Keymap;
use crate::view::GridSnap;

/// Keymap-driven editing: selection, clipboard, undo/redo, and
/// snap-aware arrow movement.
pub struct KeyboardController {
    keymap: Keymap,
    clipboard: Clipboard,
}

impl KeyboardController {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap, clipboard: Clipboard::default() }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Paste with the earliest clipboard note aligned to `tick`;
    /// exposed for host use (e.g. paste at the playhead).
    pub fn paste_at(&self, store: &mut NoteStore, tick: Tick) {
        self.clipboard.paste_at(store, tick);
    }

    /// Handle every key event of the frame. Returns true if any event
    /// was consumed.
    pub fn process(
        &mut self,
        store: &mut NoteStore,
        grid: &GridSnap,
        events: &[KeyEvent],
    ) -> bool {
        let mut handled = false;
        for event in events {
            handled |= self.process_key(store, grid, event);
        }
        handled
    }

    fn process_key(&mut self, store: &mut NoteStore, grid: &GridSnap, event: &KeyEvent) -> bool {
        let Some(action) = self.keymap.resolve(event) else {
            return false;
        };
        // A 1/128-note step for fine horizontal nudges.
        let fine_step = (4 * grid.ticks_per_beat() / 128).max(1);
        match action {
            "select_all" => store.select_all(),
            "delete_selection" => {
                store.delete_selected(true);
            }
            "copy" => self.clipboard.copy_selection(store),
            "paste" => {
                self.clipboard.paste(store);
            }
            "undo" => {
                store.undo();
            }
            "redo" => {
                store.redo();
            }
            "transpose_up" => transpose_selection(store, 1),
            "transpose_down" => transpose_selection(store, -1),
            "octave_up" => transpose_selection(store, 12),
            "octave_down" => transpose_selection(store, -12),
            "shift_left" => shift_selection(store, -grid.snap_division()),
            "shift_right" => shift_selection(store, grid.snap_division()),
            "fine_shift_left" => shift_selection(store, -fine_step),
            "fine_shift_right" => shift_selection(store, fine_step),
            _ => return false,
        }
        true
    }
}

/// Transpose the whole selection, or nothing: the move only applies
/// when every note stays inside the key range.
fn transpose_selection(store: &mut NoteStore, delta_key: i32) {
    let Some((_, min_key, max_key)) = store.selection_bounds() else {
        return;
    };
    if min_key as i32 + delta_key < 0 || max_key as i32 + delta_key > 127 {
        return;
    }
    store.snapshot_for_undo();
    move_ordered(store, 0, delta_key);
}

/// Shift the whole selection in time; rejected when the earliest note
/// would cross tick 0.
fn shift_selection(store: &mut NoteStore, delta_tick: Tick) {
    let Some((min_tick, _, _)) = store.selection_bounds() else {
        return;
    };
    if min_tick + delta_tick < 0 {
        return;
    }
    store.snapshot_for_undo();
    move_ordered(store, delta_tick, 0);
}

/// Apply the same delta to every selected note, processing in the
/// direction of travel so selected neighbors vacate first.
fn move_ordered(store: &mut NoteStore, delta_tick: Tick, delta_key: i32) {
    let mut ids = store.selected_ids();
    ids.sort_by_key(|&id| {
        let Some(note) = store.find_by_id(id) else {
            return (0, 0);
        };
        let key_rank = if delta_key > 0 { -(note.key as i64) } else { note.key as i64 };
        let tick_rank = if delta_tick > 0 { -note.tick } else { note.tick };
        (key_rank, tick_rank)
    });
    for id in ids {
        store.move_note(id, delta_tick, delta_key, false, false);
    }
}
