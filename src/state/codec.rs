//! Versioned line-based text codec for clips.
//!
//! ```text
//! PPR1
//! N <tick> <duration> <key> <velocity> <channel>
//! C <cc_number> <tick> <value>
//! ```
//!
//! UTF-8, LF-terminated, integers in decimal. Ids are not preserved
//! across a round-trip; the store reassigns them on load.

use std::io::{self, BufRead, BufReader, Read, Write};

use log::debug;

use super::lane::ControlLane;
use super::note::Tick;
use super::store::NoteStore;

pub const FORMAT_TAG: &str = "PPR1";

pub fn write_clip<W: Write>(
    w: &mut W,
    store: &NoteStore,
    lanes: &[ControlLane],
) -> io::Result<()> {
    writeln!(w, "{}", FORMAT_TAG)?;
    for note in store.notes() {
        writeln!(
            w,
            "N {} {} {} {} {}",
            note.tick, note.duration, note.key, note.velocity, note.channel
        )?;
    }
    for lane in lanes {
        for point in lane.points() {
            writeln!(w, "C {} {} {}", lane.cc_number, point.tick, point.value)?;
        }
    }
    Ok(())
}

/// Read a clip into fresh containers.
pub fn read_clip<R: Read>(r: R) -> io::Result<(NoteStore, Vec<ControlLane>)> {
    let mut store = NoteStore::new();
    let mut lanes = Vec::new();
    read_clip_into(r, &mut store, &mut lanes)?;
    Ok((store, lanes))
}

/// Read a clip into existing containers, clearing them first. A missing
/// or unknown version tag is an error; any later malformed line is
/// skipped. Unknown line types are ignored.
pub fn read_clip_into<R: Read>(
    r: R,
    store: &mut NoteStore,
    lanes: &mut Vec<ControlLane>,
) -> io::Result<()> {
    let mut reader = BufReader::new(r);
    let mut first = String::new();
    reader.read_line(&mut first)?;
    if first.trim_end() != FORMAT_TAG {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected {} header", FORMAT_TAG),
        ));
    }

    store.clear();
    lanes.clear();

    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_ascii_whitespace();
        match fields.next() {
            Some("N") => {
                let parsed = parse_note_fields(&mut fields);
                match parsed {
                    Some((tick, duration, key, velocity, channel)) => {
                        // The file is trusted: overlaps load as-is.
                        if store
                            .create_note(tick, duration, key, velocity, channel, false, false, true)
                            .is_none()
                        {
                            skipped += 1;
                        }
                    }
                    None => skipped += 1,
                }
            }
            Some("C") => match parse_cc_fields(&mut fields) {
                Some((cc, tick, value)) => {
                    lane_for(lanes, cc).add_point(tick, value);
                }
                None => skipped += 1,
            },
            // Unknown line types are ignored.
            _ => {}
        }
    }
    debug!(
        "clip loaded: {} notes, {} lanes, {} lines skipped",
        store.len(),
        lanes.len(),
        skipped
    );
    Ok(())
}

/// Lane for `cc`, created at the back in encounter order.
fn lane_for(lanes: &mut Vec<ControlLane>, cc: u8) -> &mut ControlLane {
    let pos = match lanes.iter().position(|l| l.cc_number == cc) {
        Some(pos) => pos,
        None => {
            lanes.push(ControlLane::new(cc));
            lanes.len() - 1
        }
    };
    &mut lanes[pos]
}

fn parse_note_fields<'a, I>(fields: &mut I) -> Option<(Tick, Tick, u8, u8, u8)>
where
    I: Iterator<Item = &'a str>,
{
    let tick = fields.next()?.parse().ok()?;
    let duration = fields.next()?.parse().ok()?;
    let key = fields.next()?.parse().ok()?;
    let velocity = fields.next()?.parse().ok()?;
    let channel = fields.next()?.parse().ok()?;
    Some((tick, duration, key, velocity, channel))
}

fn parse_cc_fields<'a, I>(fields: &mut I) -> Option<(u8, Tick, u8)>
where
    I: Iterator<Item = &'a str>,
{
    let cc = fields.next()?.parse().ok()?;
    let tick = fields.next()?.parse().ok()?;
    let value = fields.next()?.parse().ok()?;
    Some((cc, tick, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_notes_and_lanes() {
        let mut store = NoteStore::new();
        store.create_note(0, 240, 60, 100, 0, false, false, false).unwrap();
        store.create_note(480, 480, 67, 90, 1, false, false, false).unwrap();
        let mut lane = ControlLane::new(1);
        lane.add_point(0, 0);
        lane.add_point(240, 64);
        lane.add_point(480, 127);
        let lanes = vec![lane];

        let mut buf = Vec::new();
        write_clip(&mut buf, &store, &lanes).unwrap();
        let (restored, restored_lanes) = read_clip(&buf[..]).unwrap();

        assert_eq!(restored.len(), 2);
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
    fn malformed_lines_are_skipped() {
        let text = "PPR1\nN 0 240 60 100 0\nN bogus\nX mystery line\nC 1 0 64\nC 1 oops 3\n";
        let (store, lanes) = read_clip(text.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].len(), 1);
    }

    #[test]
    fn wrong_header_is_an_error() {
        assert!(read_clip("PPR9\nN 0 240 60 100 0\n".as_bytes()).is_err());
        assert!(read_clip("".as_bytes()).is_err());
    }

    #[test]
    fn deserialize_clears_existing_containers() {
        let mut store = NoteStore::new();
        store.create_note(0, 240, 60, 100, 0, false, false, false).unwrap();
        let mut lanes = vec![ControlLane::new(7)];
        read_clip_into("PPR1\nN 960 120 72 80 2\n".as_bytes(), &mut store, &mut lanes)
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.notes()[0].tick, 960);
        assert!(lanes.is_empty());
    }

    #[test]
    fn lanes_bucket_in_encounter_order() {
        let text = "PPR1\nC 11 0 1\nC 1 0 2\nC 11 480 3\n";
        let (_, lanes) = read_clip(text.as_bytes()).unwrap();
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].cc_number, 11);
        assert_eq!(lanes[1].cc_number, 1);
        assert_eq!(lanes[0].len(), 2);
    }
}
