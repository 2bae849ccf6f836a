//! Color palette for the roll. Deserializable so a host can load an
//! alternate palette from TOML; the default is the built-in dark theme.

use serde::Deserialize;

use super::draw::Color;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    pub row_white: Color,
    pub row_black: Color,
    pub grid_measure: Color,
    pub grid_beat: Color,
    pub grid_subdivision: Color,
    pub note_fill: Color,
    pub note_outline: Color,
    pub note_selected_fill: Color,
    pub note_selected_outline: Color,
    pub note_ghost: Color,
    pub hover_edge: Color,
    pub selection_rect_fill: Color,
    pub selection_rect_outline: Color,
    pub ruler_background: Color,
    pub ruler_text: Color,
    pub key_white: Color,
    pub key_black: Color,
    pub key_pressed: Color,
    pub key_label: Color,
    pub loop_region: Color,
    pub playback_marker: Color,
    pub cue_marker: Color,
    pub playhead: Color,
    pub scrollbar_track: Color,
    pub scrollbar_thumb: Color,
    pub cc_background: Color,
    pub cc_point: Color,
    pub cc_line: Color,
    pub debug_overlay: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::new(24, 22, 28),
            row_white: Color::new(32, 30, 38),
            row_black: Color::new(26, 24, 31),
            grid_measure: Color::new(90, 85, 100),
            grid_beat: Color::new(58, 54, 66),
            grid_subdivision: Color::new(40, 38, 46),
            note_fill: Color::new(80, 120, 200),
            note_outline: Color::new(20, 30, 50),
            note_selected_fill: Color::new(100, 150, 255),
            note_selected_outline: Color::new(220, 230, 255),
            note_ghost: Color::new(100, 150, 255).with_alpha(110),
            hover_edge: Color::new(240, 240, 255),
            selection_rect_fill: Color::new(100, 150, 255).with_alpha(40),
            selection_rect_outline: Color::new(100, 150, 255),
            ruler_background: Color::new(18, 17, 22),
            ruler_text: Color::new(180, 178, 190),
            key_white: Color::new(235, 233, 240),
            key_black: Color::new(30, 30, 34),
            key_pressed: Color::new(255, 120, 180),
            key_label: Color::new(90, 88, 100),
            loop_region: Color::new(255, 190, 80).with_alpha(90),
            playback_marker: Color::new(120, 220, 140),
            cue_marker: Color::new(230, 200, 90),
            playhead: Color::new(120, 220, 140),
            scrollbar_track: Color::new(16, 15, 20),
            scrollbar_thumb: Color::new(70, 66, 80),
            cc_background: Color::new(20, 19, 24),
            cc_point: Color::new(90, 200, 230),
            cc_line: Color::new(60, 130, 150),
            debug_overlay: Color::new(255, 80, 80),
        }
    }
}

impl Theme {
    /// Note body color: velocity scales brightness, selection swaps the
    /// base color.
    pub fn note_body(&self, velocity: u8, selected: bool) -> Color {
        let base = if selected { self.note_selected_fill } else { self.note_fill };
        // Keep quiet notes visible: map velocity into [0.45, 1.0].
        let factor = 0.45 + 0.55 * (velocity as f32 / 127.0);
        base.scaled(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_tint_darkens_quiet_notes() {
        let theme = Theme::default();
        let quiet = theme.note_body(1, false);
        let loud = theme.note_body(127, false);
        assert!(quiet.r < loud.r);
        assert_eq!(loud.r, theme.note_fill.r);
    }

    #[test]
    fn theme_deserializes_with_partial_override() {
        let toml = r#"
            background = { r = 0, g = 0, b = 0, a = 255 }
        "#;
        let theme: Theme = toml::from_str(toml).unwrap();
        assert_eq!(theme.background, Color::new(0, 0, 0));
        assert_eq!(theme.note_fill, Theme::default().note_fill);
    }
}
