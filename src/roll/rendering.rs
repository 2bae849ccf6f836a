//! Draw-command emission. Four z-ordered layers: background (key rows,
//! grid, CC lane backdrop), notes, ruler (band, labels, markers, key
//! column, scrollbar), playhead plus the single overlay pass.

use crate::controller::{HoverState, PointerAction};
use crate::state::{Note, Tick};
use crate::ui::draw::{pos2, DrawList, Layer, Rect};
use crate::view::GridLineKind;

use super::PianoRoll;

const NOTE_CORNER_RADIUS: f32 = 2.0;
const RULER_TEXT_SIZE: f32 = 11.0;
const KEY_LABEL_SIZE: f32 = 10.0;
const CC_POINT_RADIUS: f32 = 3.0;

/// MIDI note name for a key (0-127).
pub(super) fn note_name(key: u8) -> String {
    let names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (key / 12) as i8 - 1;
    format!("{}{}", names[(key % 12) as usize], octave)
}

pub(super) fn is_black_key(key: u8) -> bool {
    matches!(key % 12, 1 | 3 | 6 | 8 | 10)
}

impl PianoRoll {
    pub(crate) fn render(&mut self, out: &mut DrawList) {
        self.render_background(out);
        self.render_notes(out);
        self.render_ruler(out);
        self.render_name_column(out);
        self.render_scrollbar(out);
        self.render_cc_lane(out);
        self.render_playhead(out);
        self.render_overlay(out);
    }

    /// Screen rect of a note, canvas-absolute.
    fn note_screen_rect(&self, note: &Note) -> Rect {
        let wx = self.coords.tick_to_world(note.tick);
        let wy = self.coords.key_to_world_y(note.key);
        let (sx, sy) = self.coords.world_to_screen(wx, wy);
        let local = pos2(sx, sy);
        let abs = self.from_grid_space(local);
        Rect {
            x: abs.x,
            y: abs.y + 1.0,
            width: self.coords.tick_to_world(note.duration).max(2.0),
            height: (self.coords.key_height() - 2.0).max(1.0),
        }
    }

    fn tick_screen_x(&self, tick: Tick) -> f32 {
        self.canvas.x + self.coords.tick_to_screen_x(tick)
    }

    fn render_background(&self, out: &mut DrawList) {
        let theme = &self.theme;
        out.rect_filled(Layer::Background, self.canvas, 0.0, theme.background);

        let grid_rect = self.grid_rect();
        out.push_clip(Layer::Background, grid_rect);

        // Key rows, stacked bottom-up.
        let (key_lo, key_hi) = self.coords.visible_key_range();
        for key in key_lo..=key_hi {
            let wy = self.coords.key_to_world_y(key);
            let (_, sy) = self.coords.world_to_screen(0.0, wy);
            let y = self.from_grid_space(pos2(0.0, sy)).y;
            let row = Rect { x: grid_rect.x, y, width: grid_rect.width, height: self.coords.key_height() };
            let color = if is_black_key(key) { theme.row_black } else { theme.row_white };
            out.rect_filled(Layer::Background, row, 0.0, color);
        }

        // Vertical grid lines at the adaptive division.
        let (tick_lo, tick_hi) = self.coords.visible_tick_range();
        for line in self.grid.grid_lines(tick_lo, tick_hi, self.coords.pixels_per_beat()) {
            let x = self.tick_screen_x(line.tick);
            let (color, width) = match line.kind {
                GridLineKind::Measure => (theme.grid_measure, 1.5),
                GridLineKind::Beat => (theme.grid_beat, 1.0),
                GridLineKind::Subdivision => (theme.grid_subdivision, 1.0),
            };
            out.line(
                Layer::Background,
                pos2(x, grid_rect.top()),
                pos2(x, grid_rect.bottom()),
                width,
                color,
            );
        }

        out.pop_clip(Layer::Background);
    }

    fn render_notes(&self, out: &mut DrawList) {
        let grid_rect = self.grid_rect();
        out.push_clip(Layer::Notes, grid_rect);
        let (tick_lo, tick_hi) = self.coords.visible_tick_range();
        let (key_lo, key_hi) = self.coords.visible_key_range();
        for note in self.store.notes_in_range(tick_lo, tick_hi, key_lo, key_hi) {
            let rect = self.note_screen_rect(note);
            out.rect_filled(
                Layer::Notes,
                rect,
                NOTE_CORNER_RADIUS,
                self.theme.note_body(note.velocity, note.selected),
            );
            let outline = if note.selected {
                self.theme.note_selected_outline
            } else {
                self.theme.note_outline
            };
            out.rect_outline(Layer::Notes, rect, 1.0, outline);
        }
        out.pop_clip(Layer::Notes);
    }

    fn render_ruler(&self, out: &mut DrawList) {
        let theme = &self.theme;
        let ruler = self.ruler_rect();
        out.rect_filled(Layer::Ruler, ruler, 0.0, theme.ruler_background);

        let band = Rect {
            x: self.canvas.x + self.coords.piano_key_width(),
            width: (ruler.width - self.coords.piano_key_width()).max(0.0),
            ..ruler
        };
        out.push_clip(Layer::Ruler, band);

        let (tick_lo, tick_hi) = self.coords.visible_tick_range();
        let ppb = self.coords.pixels_per_beat();
        for label in self.grid.ruler_labels(tick_lo, tick_hi, ppb) {
            out.text(
                Layer::Ruler,
                pos2(self.tick_screen_x(label.tick) + 3.0, ruler.y + 3.0),
                label.text,
                theme.ruler_text,
                RULER_TEXT_SIZE,
            );
        }

        // Loop region: world-X bounds inside the ruler band.
        let lb = self.loop_marker.bounds();
        let (x0, _) = self.coords.world_to_screen(lb.left(), 0.0);
        let (x1, _) = self.coords.world_to_screen(lb.right(), 0.0);
        let loop_rect = Rect {
            x: self.canvas.x + x0,
            y: self.canvas.y + lb.top(),
            width: (x1 - x0).max(1.0),
            height: lb.height,
        };
        out.rect_filled(Layer::Ruler, loop_rect, 2.0, theme.loop_region);

        // Playback and cue markers: triangles hanging from the band.
        let bottom = ruler.bottom();
        let markers = [
            (self.playback_start_tick, theme.playback_marker, 6.0),
            (self.cue_left_tick, theme.cue_marker, 4.0),
            (self.cue_right_tick, theme.cue_marker, 4.0),
        ];
        for (tick, color, size) in markers {
            let x = self.tick_screen_x(tick);
            out.triangle(
                Layer::Ruler,
                pos2(x - size, bottom - size),
                pos2(x + size, bottom - size),
                pos2(x, bottom),
                color,
            );
        }
        out.pop_clip(Layer::Ruler);
    }

    fn render_name_column(&self, out: &mut DrawList) {
        let theme = &self.theme;
        let column = self.name_column_rect();
        out.push_clip(Layer::Ruler, column);
        out.rect_filled(Layer::Ruler, column, 0.0, theme.ruler_background);

        let (key_lo, key_hi) = self.coords.visible_key_range();
        for key in key_lo..=key_hi {
            let wy = self.coords.key_to_world_y(key);
            let (_, sy) = self.coords.world_to_screen(0.0, wy);
            let y = self.from_grid_space(pos2(0.0, sy)).y;
            let height = self.coords.key_height();
            let base = if is_black_key(key) { theme.key_black } else { theme.key_white };
            let fill = if self.pressed_key == Some(key) {
                theme.key_pressed
            } else if self.hovered_key == Some(key) {
                base.scaled(0.85)
            } else {
                base
            };
            let key_rect = Rect {
                x: column.x,
                y: y + 0.5,
                width: column.width - 1.0,
                height: (height - 1.0).max(1.0),
            };
            out.rect_filled(Layer::Ruler, key_rect, 0.0, fill);

            // Octave labels on the C keys.
            if key % 12 == 0 {
                out.text(
                    Layer::Ruler,
                    pos2(column.right() - 30.0, y + height / 2.0 - KEY_LABEL_SIZE / 2.0),
                    note_name(key),
                    theme.key_label,
                    KEY_LABEL_SIZE,
                );
            }
        }
        out.pop_clip(Layer::Ruler);
    }

    fn render_scrollbar(&mut self, out: &mut DrawList) {
        let vp = self.coords.viewport();
        self.scrollbar.set_geometry(
            self.scrollbar_rect(),
            self.explored_min,
            self.explored_max,
            vp.width,
            vp.x,
        );
        out.rect_filled(Layer::Ruler, self.scrollbar.track(), 2.0, self.theme.scrollbar_track);
        out.rect_filled(Layer::Ruler, self.scrollbar.thumb_rect(), 2.0, self.theme.scrollbar_thumb);
    }

    fn render_cc_lane(&self, out: &mut DrawList) {
        let Some(rect) = self.cc_rect() else {
            return;
        };
        let theme = &self.theme;
        out.rect_filled(Layer::Background, rect, 0.0, theme.cc_background);
        let Some(lane) = self.lanes.get(self.active_lane) else {
            return;
        };

        out.push_clip(Layer::Notes, rect);
        let value_y =
            |value: u8| rect.bottom() - (value as f32 / 127.0) * rect.height;
        let points = lane.points();
        for pair in points.windows(2) {
            let x0 = self.tick_screen_x(pair[0].tick);
            let x1 = self.tick_screen_x(pair[1].tick);
            let y0 = value_y(pair[0].value);
            let y1 = value_y(pair[1].value);
            // Step interpolation: hold, then jump.
            out.line(Layer::Notes, pos2(x0, y0), pos2(x1, y0), 1.0, theme.cc_line);
            out.line(Layer::Notes, pos2(x1, y0), pos2(x1, y1), 1.0, theme.cc_line);
        }
        for point in points {
            out.circle(
                Layer::Notes,
                pos2(self.tick_screen_x(point.tick), value_y(point.value)),
                CC_POINT_RADIUS,
                theme.cc_point,
            );
        }
        out.pop_clip(Layer::Notes);
    }

    fn render_playhead(&self, out: &mut DrawList) {
        let Some(tick) = self.playhead_tick else {
            return;
        };
        let grid_rect = self.grid_rect();
        let x = self.tick_screen_x(tick);
        if x < grid_rect.left() || x > grid_rect.right() {
            return;
        }
        out.line(
            Layer::Playhead,
            pos2(x, grid_rect.top()),
            pos2(x, grid_rect.bottom()),
            1.5,
            self.theme.playhead,
        );
        let ruler_bottom = self.ruler_rect().bottom();
        out.triangle(
            Layer::Playhead,
            pos2(x - 5.0, ruler_bottom - 6.0),
            pos2(x + 5.0, ruler_bottom - 6.0),
            pos2(x, ruler_bottom),
            self.theme.playhead,
        );
    }

    /// The one overlay pass: selection rectangle, then hover edge
    /// highlight, then drag/duplicate ghost.
    fn render_overlay(&self, out: &mut DrawList) {
        let theme = &self.theme;
        let grid_rect = self.grid_rect();
        out.push_clip(Layer::Playhead, grid_rect);

        if let Some(world_rect) = self.pointer.selection_rect() {
            let (x0, y0) = self.coords.world_to_screen(world_rect.left(), world_rect.top());
            let min = self.from_grid_space(pos2(x0, y0));
            let screen = Rect { x: min.x, y: min.y, width: world_rect.width, height: world_rect.height };
            out.rect_filled(Layer::Playhead, screen, 0.0, theme.selection_rect_fill);
            out.rect_outline(Layer::Playhead, screen, 1.0, theme.selection_rect_outline);
        }

        match self.pointer.hover() {
            HoverState::LeftEdge(id) => {
                if let Some(note) = self.store.find_by_id(id) {
                    let r = self.note_screen_rect(note);
                    out.line(Layer::Playhead, r.min(), pos2(r.left(), r.bottom()), 2.0, theme.hover_edge);
                }
            }
            HoverState::RightEdge(id) => {
                if let Some(note) = self.store.find_by_id(id) {
                    let r = self.note_screen_rect(note);
                    out.line(
                        Layer::Playhead,
                        pos2(r.right(), r.top()),
                        pos2(r.right(), r.bottom()),
                        2.0,
                        theme.hover_edge,
                    );
                }
            }
            _ => {}
        }

        if self.pointer.action() == PointerAction::DraggingNote || self.pointer.is_duplicating() {
            for note in self.store.notes().iter().filter(|n| n.selected) {
                let r = self.note_screen_rect(note);
                out.rect_outline(Layer::Playhead, r, 1.0, theme.note_ghost);
            }
        }

        out.pop_clip(Layer::Playhead);

        if self.debug_overlay {
            if let Some((tick, key)) = self.last_clicked_cell {
                out.text(
                    Layer::Playhead,
                    pos2(grid_rect.left() + 4.0, grid_rect.bottom() - 14.0),
                    format!("cell {} @ {}", tick, note_name(key)),
                    theme.debug_overlay,
                    RULER_TEXT_SIZE,
                );
            }
        }
    }
}
