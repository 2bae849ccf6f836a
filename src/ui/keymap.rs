use super::input::{KeyCode, KeyEvent};

/// Matchable key notation, parsed from the keybindings config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPattern {
    Char(char),
    Ctrl(char),
    Alt(char),
    Key(KeyCode),
    CtrlKey(KeyCode),
    ShiftKey(KeyCode),
}

impl KeyPattern {
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let m = event.modifiers;
        match *self {
            KeyPattern::Char(c) => event.key == KeyCode::Char(c) && !m.ctrl && !m.alt,
            KeyPattern::Ctrl(c) => event.key == KeyCode::Char(c) && m.ctrl && !m.alt,
            KeyPattern::Alt(c) => event.key == KeyCode::Char(c) && m.alt && !m.ctrl,
            KeyPattern::Key(k) => event.key == k && !m.any(),
            KeyPattern::CtrlKey(k) => event.key == k && m.ctrl && !m.alt && !m.shift,
            KeyPattern::ShiftKey(k) => event.key == k && m.shift && !m.ctrl && !m.alt,
        }
    }
}

#[derive(Clone, Debug)]
pub struct KeyBinding {
    pub pattern: KeyPattern,
    pub action: &'static str,
    pub description: &'static str,
}

/// Ordered binding table; first match wins.
#[derive(Clone, Debug, Default)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    pub fn from_bindings(bindings: Vec<KeyBinding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    pub fn resolve(&self, event: &KeyEvent) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|b| b.pattern.matches(event))
            .map(|b| b.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::input::Modifiers;

    fn keymap() -> Keymap {
        Keymap::from_bindings(vec![
            KeyBinding { pattern: KeyPattern::Ctrl('z'), action: "undo", description: "" },
            KeyBinding { pattern: KeyPattern::Key(KeyCode::Up), action: "transpose_up", description: "" },
            KeyBinding { pattern: KeyPattern::ShiftKey(KeyCode::Up), action: "octave_up", description: "" },
        ])
    }

    #[test]
    fn resolve_distinguishes_modifiers() {
        let map = keymap();
        assert_eq!(map.resolve(&KeyEvent::ctrl('z')), Some("undo"));
        assert_eq!(map.resolve(&KeyEvent::plain(KeyCode::Char('z'))), None);
        assert_eq!(map.resolve(&KeyEvent::plain(KeyCode::Up)), Some("transpose_up"));
        let shift_up = KeyEvent::new(
            KeyCode::Up,
            Modifiers { shift: true, ..Modifiers::NONE },
        );
        assert_eq!(map.resolve(&shift_up), Some("octave_up"));
        let ctrl_up = KeyEvent::new(KeyCode::Up, Modifiers { ctrl: true, ..Modifiers::NONE });
        assert_eq!(map.resolve(&ctrl_up), None);
    }
}
