use crate::state::Tick;

/// Snap behavior for pointer and keyboard edits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapMode {
    Off,
    #[default]
    Adaptive,
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridLineKind {
    Measure,
    Beat,
    Subdivision,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLine {
    pub tick: Tick,
    pub kind: GridLineKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulerLabel {
    pub tick: Tick,
    pub text: String,
}

/// Base division table at 480 ticks per beat: 1/64 note up to 4 bars.
/// Scales proportionally with the actual ticks-per-beat.
const BASE_DIVISIONS: [Tick; 9] = [30, 60, 120, 240, 480, 960, 1920, 3840, 7680];
const BASE_TICKS_PER_BEAT: Tick = 480;

/// Minimum pixel spacing for an adaptive snap division.
const MIN_SNAP_SPACING_PX: f32 = 10.0;
/// Preferred and maximum pixel spacing for rendered grid lines.
const PREFERRED_GRID_SPACING_PX: f32 = 30.0;
const MAX_GRID_SPACING_PX: f32 = 100.0;

pub const DEFAULT_MAGNET_RANGE_PX: f32 = 8.0;

/// Adaptive grid/snap engine: picks divisions from the table by zoom,
/// rounds ticks to them, and generates ruler labels.
#[derive(Clone, Debug)]
pub struct GridSnap {
    ticks_per_beat: Tick,
    beats_per_measure: Tick,
    mode: SnapMode,
    snap_division: Tick,
    grid_division: Tick,
}

impl Default for GridSnap {
    fn default() -> Self {
        Self::new(BASE_TICKS_PER_BEAT)
    }
}

impl GridSnap {
    pub fn new(ticks_per_beat: Tick) -> Self {
        let tpb = ticks_per_beat.max(1);
        Self {
            ticks_per_beat: tpb,
            beats_per_measure: 4,
            mode: SnapMode::Adaptive,
            snap_division: tpb,
            grid_division: tpb,
        }
    }

    pub fn mode(&self) -> SnapMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SnapMode) {
        self.mode = mode;
    }

    pub fn snap_division(&self) -> Tick {
        self.snap_division
    }

    pub fn set_snap_division(&mut self, division: Tick) {
        self.snap_division = division.max(1);
    }

    pub fn grid_division(&self) -> Tick {
        self.grid_division
    }

    pub fn set_grid_division(&mut self, division: Tick) {
        self.grid_division = division.max(1);
    }

    pub fn ticks_per_beat(&self) -> Tick {
        self.ticks_per_beat
    }

    pub fn beats_per_measure(&self) -> Tick {
        self.beats_per_measure
    }

    pub fn set_beats_per_measure(&mut self, beats: Tick) {
        self.beats_per_measure = beats.max(1);
    }

    pub fn ticks_per_measure(&self) -> Tick {
        self.ticks_per_beat * self.beats_per_measure
    }

    /// The division table scaled to the current ticks-per-beat.
    pub fn division_table(&self) -> [Tick; 9] {
        BASE_DIVISIONS.map(|d| (d * self.ticks_per_beat / BASE_TICKS_PER_BEAT).max(1))
    }

    /// In adaptive mode, refresh the stored snap and grid divisions for
    /// the current zoom. Called once per frame by the widget.
    pub fn refresh(&mut self, pixels_per_beat: f32) {
        if self.mode == SnapMode::Adaptive {
            self.snap_division = self.adaptive_snap_division(pixels_per_beat);
            self.grid_division = self.adaptive_grid_division(pixels_per_beat);
        }
    }

    fn division_px(&self, division: Tick, pixels_per_beat: f32) -> f32 {
        division as f32 / self.ticks_per_beat as f32 * pixels_per_beat
    }

    /// Finest division whose pixel spacing clears the snap threshold.
    pub fn adaptive_snap_division(&self, pixels_per_beat: f32) -> Tick {
        let table = self.division_table();
        table
            .iter()
            .copied()
            .find(|&d| self.division_px(d, pixels_per_beat) >= MIN_SNAP_SPACING_PX)
            .unwrap_or(table[table.len() - 1])
    }

    /// Division for grid rendering: spacing nearest 30 px, never above
    /// 100 px. Falls back to the finest entry at extreme zoom-in.
    pub fn adaptive_grid_division(&self, pixels_per_beat: f32) -> Tick {
        let table = self.division_table();
        table
            .iter()
            .copied()
            .filter(|&d| self.division_px(d, pixels_per_beat) <= MAX_GRID_SPACING_PX)
            .min_by(|&a, &b| {
                let da = (self.division_px(a, pixels_per_beat) - PREFERRED_GRID_SPACING_PX).abs();
                let db = (self.division_px(b, pixels_per_beat) - PREFERRED_GRID_SPACING_PX).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(table[0])
    }

    // ---- snapping ----

    /// Round to the nearest multiple of the snap division. `Off` is
    /// identity. Negative inputs snap to the nearest multiple; they are
    /// not clamped to zero.
    pub fn snap_tick(&self, tick: Tick, mode_override: Option<SnapMode>) -> Tick {
        let mode = mode_override.unwrap_or(self.mode);
        if mode == SnapMode::Off {
            return tick;
        }
        round_to_multiple(tick, self.snap_division)
    }

    /// Snap downward; negative results clamp to 0.
    pub fn snap_tick_floor(&self, tick: Tick) -> Tick {
        if self.mode == SnapMode::Off {
            return tick.max(0);
        }
        (tick.div_euclid(self.snap_division) * self.snap_division).max(0)
    }

    /// Snap upward; negative results clamp to 0.
    pub fn snap_tick_ceil(&self, tick: Tick) -> Tick {
        if self.mode == SnapMode::Off {
            return tick.max(0);
        }
        let d = self.snap_division;
        ((tick + d - 1).div_euclid(d) * d).max(0)
    }

    /// Snap only when the nearest grid point is within `range_px` at the
    /// given zoom. Returns the (possibly unchanged) tick and whether it
    /// snapped. Adaptive mode picks the finest valid division.
    pub fn magnetic_snap(
        &self,
        tick: Tick,
        pixels_per_beat: f32,
        range_px: f32,
    ) -> (Tick, bool) {
        let division = match self.mode {
            SnapMode::Off => return (tick, false),
            SnapMode::Manual => self.snap_division,
            SnapMode::Adaptive => self.adaptive_snap_division(pixels_per_beat),
        };
        let nearest = round_to_multiple(tick, division);
        let distance_px =
            (tick - nearest).abs() as f32 / self.ticks_per_beat as f32 * pixels_per_beat;
        if distance_px <= range_px {
            (nearest, true)
        } else {
            (tick, false)
        }
    }

    // ---- grid and ruler generation ----

    /// Grid lines over the half-open tick range, classified by
    /// divisibility: measure, beat, else subdivision.
    pub fn grid_lines(&self, tick_lo: Tick, tick_hi: Tick, pixels_per_beat: f32) -> Vec<GridLine> {
        let division = match self.mode {
            SnapMode::Adaptive => self.adaptive_grid_division(pixels_per_beat),
            _ => self.grid_division,
        };
        let measure = self.ticks_per_measure();
        let beat = self.ticks_per_beat;
        let mut lines = Vec::new();
        let mut tick = tick_lo.div_euclid(division) * division;
        if tick < tick_lo {
            tick += division;
        }
        while tick < tick_hi {
            let kind = if tick.rem_euclid(measure) == 0 {
                GridLineKind::Measure
            } else if tick.rem_euclid(beat) == 0 {
                GridLineKind::Beat
            } else {
                GridLineKind::Subdivision
            };
            lines.push(GridLine { tick, kind });
            tick += division;
        }
        lines
    }

    /// Ruler labels over the tick range. Density follows the zoom:
    /// sixteenths above 460 px/beat, beats above 67, bars above 40, and
    /// every other bar below that. Bars and beats are 1-indexed.
    pub fn ruler_labels(
        &self,
        tick_lo: Tick,
        tick_hi: Tick,
        pixels_per_beat: f32,
    ) -> Vec<RulerLabel> {
        let beat = self.ticks_per_beat;
        let measure = self.ticks_per_measure();
        let sixteenth = (beat / 4).max(1);
        let step = if pixels_per_beat >= 460.0 {
            sixteenth
        } else if pixels_per_beat >= 67.0 {
            beat
        } else if pixels_per_beat >= 40.0 {
            measure
        } else {
            measure * 2
        };

        let mut labels = Vec::new();
        let mut tick = tick_lo.max(0).div_euclid(step) * step;
        if tick < tick_lo.max(0) {
            tick += step;
        }
        while tick < tick_hi {
            let bar = tick / measure + 1;
            let beat_in_bar = tick % measure / beat + 1;
            let six_in_beat = tick % beat / sixteenth + 1;
            let text = if step < beat {
                if beat_in_bar == 1 && six_in_beat == 1 {
                    format!("{}", bar)
                } else if six_in_beat == 1 {
                    format!("{}.{}", bar, beat_in_bar)
                } else {
                    format!("{}.{}.{}", bar, beat_in_bar, six_in_beat)
                }
            } else if step == beat {
                format!("{}.{}", bar, beat_in_bar)
            } else {
                format!("{}", bar)
            };
            labels.push(RulerLabel { tick, text });
            tick += step;
        }
        labels
    }
}

/// Nearest multiple of `step`, halfway cases rounding up. Works for
/// negative values.
fn round_to_multiple(value: Tick, step: Tick) -> Tick {
    let step = step.max(1);
    let rem = value.rem_euclid(step);
    if rem * 2 >= step {
        value + (step - rem)
    } else {
        value - rem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_table_scales_with_tpb() {
        let grid = GridSnap::new(960);
        assert_eq!(grid.division_table()[0], 60);
        assert_eq!(grid.division_table()[8], 15_360);
    }

    #[test]
    fn snap_tick_rounds_to_nearest_and_off_is_identity() {
        let mut grid = GridSnap::new(480);
        grid.set_mode(SnapMode::Manual);
        grid.set_snap_division(480);
        assert_eq!(grid.snap_tick(460, None), 480);
        assert_eq!(grid.snap_tick(239, None), 0);
        assert_eq!(grid.snap_tick(240, None), 480);
        assert_eq!(grid.snap_tick(460, Some(SnapMode::Off)), 460);
    }

    #[test]
    fn snap_tick_handles_negatives_without_clamping() {
        let mut grid = GridSnap::new(480);
        grid.set_mode(SnapMode::Manual);
        grid.set_snap_division(480);
        assert_eq!(grid.snap_tick(-460, None), -480);
        assert_eq!(grid.snap_tick(-100, None), 0);
        assert_eq!(grid.snap_tick_floor(-100), 0);
        assert_eq!(grid.snap_tick_ceil(-900), 0);
        assert_eq!(grid.snap_tick_floor(700), 480);
        assert_eq!(grid.snap_tick_ceil(700), 960);
    }

    #[test]
    fn magnetic_snap_respects_pixel_range() {
        let mut grid = GridSnap::new(480);
        grid.set_mode(SnapMode::Manual);
        grid.set_snap_division(480);
        // 20 ticks at 60 px/beat is 2.5 px: snaps.
        assert_eq!(grid.magnetic_snap(460, 60.0, 8.0), (480, true));
        // 80 ticks is 10 px: out of range, input unchanged.
        assert_eq!(grid.magnetic_snap(400, 60.0, 8.0), (400, false));
    }

    #[test]
    fn magnetic_snap_off_never_snaps() {
        let mut grid = GridSnap::new(480);
        grid.set_mode(SnapMode::Off);
        assert_eq!(grid.magnetic_snap(479, 60.0, 8.0), (479, false));
    }

    #[test]
    fn adaptive_snap_picks_finest_above_threshold() {
        let grid = GridSnap::new(480);
        // At 60 px/beat: 1/64 (30 ticks) is 3.75 px, 1/16 (120) is 15 px.
        assert_eq!(grid.adaptive_snap_division(60.0), 120);
        // Zoomed far in, the finest division clears the bar.
        assert_eq!(grid.adaptive_snap_division(2000.0), 30);
        // Zoomed far out, even bars are thin; coarsest wins.
        assert_eq!(grid.adaptive_snap_division(0.5), 7680);
    }

    #[test]
    fn adaptive_grid_prefers_thirty_px_spacing() {
        let grid = GridSnap::new(480);
        // At 15 px/beat, two beats = 30 px exactly.
        assert_eq!(grid.adaptive_grid_division(15.0), 960);
        // At extreme zoom-in everything exceeds 100 px; finest fallback.
        assert_eq!(grid.adaptive_grid_division(4000.0), 30);
    }

    #[test]
    fn grid_lines_classify_measure_beat_subdivision() {
        let mut grid = GridSnap::new(480);
        grid.set_mode(SnapMode::Manual);
        grid.set_grid_division(240);
        let lines = grid.grid_lines(0, 1921, 60.0);
        assert_eq!(lines.first().unwrap().kind, GridLineKind::Measure);
        let beat_line = lines.iter().find(|l| l.tick == 480).unwrap();
        assert_eq!(beat_line.kind, GridLineKind::Beat);
        let sub = lines.iter().find(|l| l.tick == 240).unwrap();
        assert_eq!(sub.kind, GridLineKind::Subdivision);
        let measure = lines.iter().find(|l| l.tick == 1920).unwrap();
        assert_eq!(measure.kind, GridLineKind::Measure);
    }

    #[test]
    fn ruler_label_density_follows_zoom() {
        let grid = GridSnap::new(480);
        // Beat labels at 100 px/beat.
        let labels = grid.ruler_labels(0, 1920, 100.0);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1.1", "1.2", "1.3", "1.4"]);
        // Bars only at 50 px/beat.
        let labels = grid.ruler_labels(0, 3841, 50.0);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
        // Every other bar below 40 px/beat.
        let labels = grid.ruler_labels(0, 7680, 20.0);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "3"]);
        // Sixteenths when zoomed right in.
        let labels = grid.ruler_labels(0, 481, 500.0);
        assert_eq!(labels[0].text, "1");
        assert_eq!(labels[1].text, "1.1.2");
        assert_eq!(labels[4].text, "1.2");
    }

    #[test]
    fn refresh_updates_divisions_in_adaptive_mode_only() {
        let mut grid = GridSnap::new(480);
        grid.refresh(60.0);
        assert_eq!(grid.snap_division(), 120);
        grid.set_mode(SnapMode::Manual);
        grid.set_snap_division(960);
        grid.refresh(2000.0);
        assert_eq!(grid.snap_division(), 960);
    }
}
