//! Keyboard chord building and keybinding resolution

use app_core::{Command, KeyMap};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Input handler that maps key presses to commands
pub struct InputHandler {
    keymap: KeyMap,

    /// Current modifier state
    modifiers: ModifiersState,
}

impl InputHandler {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            modifiers: ModifiersState::empty(),
        }
    }

    /// Update modifier state
    pub fn update_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Handle a key event and return the bound command, if any
    pub fn handle_key(&self, event: &KeyEvent) -> Option<Command> {
        if event.state != ElementState::Pressed {
            return None;
        }

        let chord = chord_string(&event.logical_key, self.modifiers)?;
        tracing::trace!("Key pressed: {}", chord);
        self.keymap.lookup(&chord)
    }
}

/// Build a `Ctrl+Alt+Shift+Super+Key` string for a logical key
pub fn chord_string(key: &Key, modifiers: ModifiersState) -> Option<String> {
    let key = key_name(key)?;
    let mut parts = Vec::new();

    if modifiers.control_key() {
        parts.push("Ctrl".to_string());
    }
    if modifiers.alt_key() {
        parts.push("Alt".to_string());
    }
    if modifiers.shift_key() {
        parts.push("Shift".to_string());
    }
    if modifiers.super_key() {
        parts.push("Super".to_string());
    }

    parts.push(key);
    Some(parts.join("+"))
}

fn key_name(key: &Key) -> Option<String> {
    let name = match key {
        Key::Named(named) => match named {
            NamedKey::Space => "Space",
            NamedKey::Enter => "Return",
            NamedKey::Tab => "Tab",
            NamedKey::Escape => "Escape",
            NamedKey::Backspace => "Backspace",
            NamedKey::Delete => "Delete",
            NamedKey::Home => "Home",
            NamedKey::End => "End",
            NamedKey::PageUp => "PageUp",
            NamedKey::PageDown => "PageDown",
            NamedKey::ArrowUp => "Up",
            NamedKey::ArrowDown => "Down",
            NamedKey::ArrowLeft => "Left",
            NamedKey::ArrowRight => "Right",
            NamedKey::F1 => "F1",
            NamedKey::F2 => "F2",
            NamedKey::F3 => "F3",
            NamedKey::F4 => "F4",
            NamedKey::F5 => "F5",
            NamedKey::F6 => "F6",
            NamedKey::F7 => "F7",
            NamedKey::F8 => "F8",
            NamedKey::F9 => "F9",
            NamedKey::F10 => "F10",
            NamedKey::F11 => "F11",
            NamedKey::F12 => "F12",
            // Bare modifier presses never form a chord
            NamedKey::Control | NamedKey::Shift | NamedKey::Alt | NamedKey::Super => return None,
            other => return Some(format!("{:?}", other)),
        },
        // '+' separates chord parts, so punctuation gets a name
        Key::Character(c) => match c.as_str() {
            "," => "Comma",
            "." => "Period",
            "+" => "Plus",
            "-" => "Minus",
            " " => "Space",
            other => return Some(other.to_string()),
        },
        _ => return None,
    };
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn test_chord_strings() {
        assert_eq!(
            chord_string(&Key::Named(NamedKey::ArrowRight), ModifiersState::empty()).as_deref(),
            Some("Right")
        );
        assert_eq!(
            chord_string(&Key::Character(SmolStr::new(",")), ModifiersState::CONTROL).as_deref(),
            Some("Ctrl+Comma")
        );
        assert_eq!(
            chord_string(&Key::Character(SmolStr::new("I")), ModifiersState::SHIFT).as_deref(),
            Some("Shift+I")
        );
        assert_eq!(chord_string(&Key::Named(NamedKey::Shift), ModifiersState::SHIFT), None);
    }

    #[test]
    fn test_default_bindings_resolve() {
        let keymap = KeyMap::from_config(&app_core::AppConfig::default().keybindings);
        let chord = |key: Key| chord_string(&key, ModifiersState::empty()).unwrap();

        assert_eq!(keymap.lookup(&chord(Key::Named(NamedKey::Space))), Some(Command::ReaderNext));
        assert_eq!(keymap.lookup(&chord(Key::Named(NamedKey::Escape))), Some(Command::ReaderBack));
        assert_eq!(keymap.lookup(&chord(Key::Character(SmolStr::new("i")))), Some(Command::ReaderToggleIndex));
        assert_eq!(keymap.lookup(&chord(Key::Named(NamedKey::F5))), Some(Command::ReloadLibrary));
    }
}
