use serde::{Deserialize, Serialize};

/// Musical time in ticks. Signed: the timeline extends left of bar 1,
/// and snap math operates on deltas, but stored notes never start
/// before tick 0.
pub type Tick = i64;

pub const MAX_MIDI_KEY: u8 = 127;
pub const MAX_VELOCITY: u8 = 127;
pub const MAX_CHANNEL: u8 = 15;

/// Opaque note handle assigned by the store. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(u64);

impl NoteId {
    pub(crate) fn new(raw: u64) -> Self {
        debug_assert!(raw != 0, "note ids start at 1");
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single MIDI note in the clip.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub tick: Tick,
    pub duration: Tick,
    pub key: u8,
    pub velocity: u8,
    pub channel: u8,
    #[serde(skip)]
    pub selected: bool,
}

impl Note {
    /// Validates every field range. `tick` must be non-negative,
    /// `duration` strictly positive.
    pub(crate) fn validated(
        id: NoteId,
        tick: Tick,
        duration: Tick,
        key: u8,
        velocity: u8,
        channel: u8,
        selected: bool,
    ) -> Option<Self> {
        if tick < 0 || duration <= 0 {
            return None;
        }
        if key > MAX_MIDI_KEY || velocity > MAX_VELOCITY || channel > MAX_CHANNEL {
            return None;
        }
        Some(Self { id, tick, duration, key, velocity, channel, selected })
    }

    pub fn end_tick(&self) -> Tick {
        self.tick + self.duration
    }

    /// True if the probe tick falls within [tick, end_tick).
    pub fn contains_tick(&self, tick: Tick) -> bool {
        tick >= self.tick && tick < self.end_tick()
    }

    /// Two notes overlap iff they share a key and their tick intervals
    /// [tick, end_tick) intersect.
    pub fn overlaps(&self, other: &Note) -> bool {
        self.key == other.key && self.tick < other.end_tick() && other.tick < self.end_tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(tick: Tick, duration: Tick, key: u8) -> Note {
        Note::validated(NoteId::new(1), tick, duration, key, 100, 0, false).unwrap()
    }

    #[test]
    fn validated_rejects_out_of_range_fields() {
        assert!(Note::validated(NoteId::new(1), -1, 480, 60, 100, 0, false).is_none());
        assert!(Note::validated(NoteId::new(1), 0, 0, 60, 100, 0, false).is_none());
        assert!(Note::validated(NoteId::new(1), 0, 480, 128, 100, 0, false).is_none());
        assert!(Note::validated(NoteId::new(1), 0, 480, 60, 128, 0, false).is_none());
        assert!(Note::validated(NoteId::new(1), 0, 480, 60, 100, 16, false).is_none());
        assert!(Note::validated(NoteId::new(1), 0, 480, 127, 127, 15, false).is_some());
    }

    #[test]
    fn overlap_requires_shared_key() {
        let a = note(0, 240, 60);
        let b = note(120, 240, 60);
        let c = note(120, 240, 61);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = note(0, 240, 60);
        let b = note(240, 240, 60);
        assert!(!a.overlaps(&b));
        assert!(a.contains_tick(239));
        assert!(!a.contains_tick(240));
    }
}
