//! Command system for user actions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Reader commands
    pub const READER_NEXT: &'static str = "reader.next";
    pub const READER_PREV: &'static str = "reader.prev";
    pub const READER_BACK: &'static str = "reader.back";
    pub const READER_TOGGLE_INDEX: &'static str = "reader.toggle_index";

    // View commands
    pub const VIEW_TOGGLE_FULLSCREEN: &'static str = "view.toggle_fullscreen";

    // Library commands
    pub const LIBRARY_RELOAD: &'static str = "library.reload";

    // App commands
    pub const APP_OPEN_SETTINGS: &'static str = "app.open_settings";
}

/// A resolved user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ReaderNext,
    ReaderPrev,
    ReaderBack,
    ReaderToggleIndex,
    ToggleFullscreen,
    ReloadLibrary,
    OpenSettings,
}

impl Command {
    pub fn from_id(id: &str) -> Option<Self> {
        Some(match id {
            CommandId::READER_NEXT => Command::ReaderNext,
            CommandId::READER_PREV => Command::ReaderPrev,
            CommandId::READER_BACK => Command::ReaderBack,
            CommandId::READER_TOGGLE_INDEX => Command::ReaderToggleIndex,
            CommandId::VIEW_TOGGLE_FULLSCREEN => Command::ToggleFullscreen,
            CommandId::LIBRARY_RELOAD => Command::ReloadLibrary,
            CommandId::APP_OPEN_SETTINGS => Command::OpenSettings,
            _ => return None,
        })
    }

    pub fn id(self) -> CommandId {
        CommandId::new(match self {
            Command::ReaderNext => CommandId::READER_NEXT,
            Command::ReaderPrev => CommandId::READER_PREV,
            Command::ReaderBack => CommandId::READER_BACK,
            Command::ReaderToggleIndex => CommandId::READER_TOGGLE_INDEX,
            Command::ToggleFullscreen => CommandId::VIEW_TOGGLE_FULLSCREEN,
            Command::ReloadLibrary => CommandId::LIBRARY_RELOAD,
            Command::OpenSettings => CommandId::APP_OPEN_SETTINGS,
        })
    }
}

/// Key chord → command lookup built from the `keybindings` config table.
///
/// Chords are written `Ctrl+Shift+Key`; modifier order does not matter and
/// key names compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: HashMap<String, Command>,
}

impl KeyMap {
    pub fn from_config(keybindings: &HashMap<String, Vec<String>>) -> Self {
        let mut bindings = HashMap::new();

        for (id, keys) in keybindings {
            let Some(command) = Command::from_id(id) else {
                tracing::warn!("Unknown command in keybindings: {}", id);
                continue;
            };
            for key in keys {
                bindings.insert(normalize_chord(key), command);
            }
        }

        Self { bindings }
    }

    pub fn lookup(&self, chord: &str) -> Option<Command> {
        self.bindings.get(&normalize_chord(chord)).copied()
    }
}

fn normalize_chord(chord: &str) -> String {
    let mut parts: Vec<String> = chord.split('+').map(|p| p.trim().to_lowercase()).collect();
    let key = parts.pop().unwrap_or_default();
    parts.sort();
    parts.dedup();
    parts.push(key);
    parts.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_id_round_trip() {
        for cmd in [Command::ReaderNext, Command::ToggleFullscreen, Command::OpenSettings] {
            assert_eq!(Command::from_id(cmd.id().as_str()), Some(cmd));
        }
        assert_eq!(Command::from_id("nav.nowhere"), None);
    }

    #[test]
    fn test_keymap_lookup() {
        let map = KeyMap::from_config(&crate::AppConfig::default().keybindings);
        assert_eq!(map.lookup("Right"), Some(Command::ReaderNext));
        assert_eq!(map.lookup("space"), Some(Command::ReaderNext));
        assert_eq!(map.lookup("F11"), Some(Command::ToggleFullscreen));
        assert_eq!(map.lookup("ctrl+comma"), Some(Command::OpenSettings));
        assert_eq!(map.lookup("Up"), None);
    }

    #[test]
    fn test_modifier_order_is_irrelevant() {
        let mut kb = HashMap::new();
        kb.insert("library.reload".to_string(), vec!["Shift+Ctrl+R".to_string()]);
        let map = KeyMap::from_config(&kb);
        assert_eq!(map.lookup("Ctrl+Shift+r"), Some(Command::ReloadLibrary));
    }
}
