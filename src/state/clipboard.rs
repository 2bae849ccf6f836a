use super::note::{Note, NoteId, Tick};
use super::store::NoteStore;

/// Deep-copied notes with absolute ticks, as captured at copy time.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
    notes: Vec<Note>,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Replace the clipboard with copies of the selected notes.
    pub fn copy_selection(&mut self, store: &NoteStore) {
        self.notes = store.notes().iter().filter(|n| n.selected).copied().collect();
    }

    /// Paste every note at its original tick position. The pasted notes
    /// become the new selection. One undo snapshot covers the paste.
    pub fn paste(&self, store: &mut NoteStore) -> Vec<NoteId> {
        self.paste_with_offset(store, 0)
    }

    /// Paste so the earliest clipboard note aligns with `tick`.
    pub fn paste_at(&self, store: &mut NoteStore, tick: Tick) -> Vec<NoteId> {
        let Some(min_tick) = self.notes.iter().map(|n| n.tick).min() else {
            return Vec::new();
        };
        self.paste_with_offset(store, tick - min_tick)
    }

    fn paste_with_offset(&self, store: &mut NoteStore, offset: Tick) -> Vec<NoteId> {
        if self.notes.is_empty() {
            return Vec::new();
        }
        store.snapshot_for_undo();
        store.clear_selection();
        let mut pasted = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            // Pasting lands on the copied positions by design, so overlap
            // with the source notes is permitted.
            if let Some(id) = store.create_note(
                note.tick + offset,
                note.duration,
                note.key,
                note.velocity,
                note.channel,
                true,
                false,
                true,
            ) {
                pasted.push(id);
            }
        }
        pasted
    }
}
