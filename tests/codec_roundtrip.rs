//! Clip codec round-trips through real files.

use std::fs::File;
use std::io::{BufReader, Write};

use beltane_ui::state::codec::{read_clip, write_clip, FORMAT_TAG};
use beltane_ui::state::{ControlLane, NoteStore};
use beltane_ui::PianoRoll;

fn sample_store() -> NoteStore {
    let mut store = NoteStore::new();
    store.create_note(0, 240, 60, 100, 0, false, false, false).unwrap();
    store.create_note(480, 480, 67, 90, 1, false, false, false).unwrap();
    store
}

fn sample_lane() -> ControlLane {
    let mut lane = ControlLane::new(1);
    lane.add_point(0, 0);
    lane.add_point(240, 64);
    lane.add_point(480, 127);
    lane
}

#[test]
fn file_round_trip_preserves_notes_and_lanes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.ppr");

    let store = sample_store();
    let lanes = vec![sample_lane()];
    {
        let mut file = File::create(&path).unwrap();
        write_clip(&mut file, &store, &lanes).unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(FORMAT_TAG));
    assert!(text.ends_with('\n'));

    let file = File::open(&path).unwrap();
    let (restored, restored_lanes) = read_clip(BufReader::new(file)).unwrap();

    // Ids are reassigned; fields and ordering survive.
    let fields: Vec<_> = restored
        .notes()
        .iter()
        .map(|n| (n.tick, n.duration, n.key, n.velocity, n.channel))
        .collect();
    assert_eq!(fields, vec![(0, 240, 60, 100, 0), (480, 480, 67, 90, 1)]);

    assert_eq!(restored_lanes.len(), 1);
    assert_eq!(restored_lanes[0].cc_number, 1);
    let points: Vec<_> =
        restored_lanes[0].points().iter().map(|p| (p.tick, p.value)).collect();
    assert_eq!(points, vec![(0, 0), (240, 64), (480, 127)]);
}

#[test]
fn widget_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.ppr");

    let mut roll = PianoRoll::new();
    roll.store_mut().create_note(960, 120, 72, 80, 2, false, false, false).unwrap();
    {
        let mut file = File::create(&path).unwrap();
        roll.save_clip(&mut file).unwrap();
    }

    let mut other = PianoRoll::new();
    other.load_clip(File::open(&path).unwrap()).unwrap();
    assert_eq!(other.store().len(), 1);
    let note = other.store().notes()[0];
    assert_eq!((note.tick, note.duration, note.key), (960, 120, 72));
}

#[test]
fn damaged_lines_do_not_abort_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.ppr");
    {
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", FORMAT_TAG).unwrap();
        writeln!(file, "N 0 240 60 100 0").unwrap();
        writeln!(file, "N 480 -7 60 100 0").unwrap(); // bad duration
        writeln!(file, "Z who knows").unwrap();
        writeln!(file, "C 1 0 64").unwrap();
    }
    let (store, lanes) = read_clip(File::open(&path).unwrap()).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(lanes.len(), 1);
}
