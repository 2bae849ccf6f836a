use std::path::PathBuf;

use log::debug;
use serde::Deserialize;

use super::input::KeyCode;
use super::keymap::{KeyBinding, KeyPattern, Keymap};

/// Raw TOML structure of the keybindings config file.
#[derive(Deserialize)]
struct KeybindingConfig {
    #[allow(dead_code)]
    version: u32,
    bindings: Vec<RawBinding>,
}

#[derive(Deserialize)]
struct RawBinding {
    key: String,
    action: String,
    description: String,
}

/// Intern a String into a &'static str.
/// Bindings are loaded once at startup and never freed.
fn intern(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// Parse a key notation string into a KeyPattern.
///
/// Supported formats:
/// - `"a"` → Char('a')
/// - `"Up"` → Key(KeyCode::Up)
/// - `"Ctrl+z"` → Ctrl('z')
/// - `"Alt+x"` → Alt('x')
/// - `"Ctrl+Left"` → CtrlKey(KeyCode::Left)
/// - `"Shift+Right"` → ShiftKey(KeyCode::Right)
///
/// Unknown notation yields `None` and the binding is skipped.
fn parse_key(s: &str) -> Option<KeyPattern> {
    if let Some(rest) = s.strip_prefix("Ctrl+") {
        if rest.chars().count() == 1 {
            Some(KeyPattern::Ctrl(rest.chars().next()?))
        } else {
            parse_named_key(rest).map(KeyPattern::CtrlKey)
        }
    } else if let Some(rest) = s.strip_prefix("Alt+") {
        Some(KeyPattern::Alt(rest.chars().next()?))
    } else if let Some(rest) = s.strip_prefix("Shift+") {
        parse_named_key(rest).map(KeyPattern::ShiftKey)
    } else if s.chars().count() == 1 {
        Some(KeyPattern::Char(s.chars().next()?))
    } else {
        parse_named_key(s).map(KeyPattern::Key)
    }
}

fn parse_named_key(s: &str) -> Option<KeyCode> {
    match s {
        "Up" => Some(KeyCode::Up),
        "Down" => Some(KeyCode::Down),
        "Left" => Some(KeyCode::Left),
        "Right" => Some(KeyCode::Right),
        "Delete" => Some(KeyCode::Delete),
        "Backspace" => Some(KeyCode::Backspace),
        "Enter" => Some(KeyCode::Enter),
        "Escape" => Some(KeyCode::Escape),
        "Home" => Some(KeyCode::Home),
        "End" => Some(KeyCode::End),
        _ => None,
    }
}

/// Embedded default keybindings TOML.
const DEFAULT_KEYBINDINGS: &str = include_str!("../../keybindings.toml");

/// Load keybindings: embedded default, optionally merged with a user
/// override from the platform config directory. User entries replace
/// default entries with the same key notation.
pub fn load_keymap() -> Keymap {
    let mut config: KeybindingConfig =
        toml::from_str(DEFAULT_KEYBINDINGS).expect("embedded keybindings.toml parses");

    if let Some(path) = user_keybindings_path() {
        if path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                if let Ok(user_config) = toml::from_str::<KeybindingConfig>(&contents) {
                    debug!("merging user keybindings from {}", path.display());
                    merge_config(&mut config, user_config);
                }
            }
        }
    }

    build_keymap(&config)
}

/// The embedded defaults only, for hosts that manage their own config.
pub fn default_keymap() -> Keymap {
    let config: KeybindingConfig =
        toml::from_str(DEFAULT_KEYBINDINGS).expect("embedded keybindings.toml parses");
    build_keymap(&config)
}

fn user_keybindings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beltane").join("keybindings.toml"))
}

fn merge_config(base: &mut KeybindingConfig, user: KeybindingConfig) {
    for binding in user.bindings {
        if let Some(existing) = base.bindings.iter_mut().find(|b| b.key == binding.key) {
            *existing = binding;
        } else {
            base.bindings.push(binding);
        }
    }
}

fn build_keymap(config: &KeybindingConfig) -> Keymap {
    let bindings = config
        .bindings
        .iter()
        .filter_map(|b| {
            let pattern = parse_key(&b.key)?;
            Some(KeyBinding {
                pattern,
                action: intern(b.action.clone()),
                description: intern(b.description.clone()),
            })
        })
        .collect();
    Keymap::from_bindings(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::input::{KeyEvent, Modifiers};

    #[test]
    fn parse_key_handles_chars_named_keys_and_modifiers() {
        assert_eq!(parse_key("a"), Some(KeyPattern::Char('a')));
        assert_eq!(parse_key("Up"), Some(KeyPattern::Key(KeyCode::Up)));
        assert_eq!(parse_key("Ctrl+z"), Some(KeyPattern::Ctrl('z')));
        assert_eq!(parse_key("Alt+x"), Some(KeyPattern::Alt('x')));
        assert_eq!(parse_key("Ctrl+Left"), Some(KeyPattern::CtrlKey(KeyCode::Left)));
        assert_eq!(parse_key("Shift+Right"), Some(KeyPattern::ShiftKey(KeyCode::Right)));
        assert_eq!(parse_key("Hyper+q"), None);
    }

    #[test]
    fn default_keymap_covers_editing_actions() {
        let map = default_keymap();
        assert_eq!(map.resolve(&KeyEvent::ctrl('a')), Some("select_all"));
        assert_eq!(map.resolve(&KeyEvent::ctrl('z')), Some("undo"));
        assert_eq!(map.resolve(&KeyEvent::plain(KeyCode::Delete)), Some("delete_selection"));
        assert_eq!(map.resolve(&KeyEvent::plain(KeyCode::Backspace)), Some("delete_selection"));
        let shift_left =
            KeyEvent::new(KeyCode::Left, Modifiers { shift: true, ..Modifiers::NONE });
        assert_eq!(map.resolve(&shift_left), Some("fine_shift_left"));
    }
}
