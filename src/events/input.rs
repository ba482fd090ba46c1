//! Input event types and key binding matching.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Simplified key representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Other,
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Other,
        }
    }
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A processed input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self {
            key: Key::from(event.code),
            modifiers: Modifiers::from(event.modifiers),
        }
    }
}

impl InputEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// The character if this is printable input without Ctrl/Alt.
    pub fn text_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.modifiers.ctrl && !self.modifiers.alt => Some(c),
            _ => None,
        }
    }

    /// Check if this matches a key binding string (e.g., "Ctrl+c", "Enter", "?").
    ///
    /// Shift is ignored for character keys: terminals disagree on whether
    /// `?` arrives with the Shift modifier.
    pub fn matches(&self, binding: &str) -> bool {
        let mut expected_ctrl = false;
        let mut expected_alt = false;
        let mut expected_shift = false;
        let mut expected_key = "";

        for part in binding.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" => expected_ctrl = true,
                "alt" => expected_alt = true,
                "shift" => expected_shift = true,
                _ => expected_key = part,
            }
        }
        // A lone "+" binding splits into two empty parts.
        if binding == "+" {
            expected_key = "+";
        }

        let is_char = matches!(self.key, Key::Char(_));
        if self.modifiers.ctrl != expected_ctrl
            || self.modifiers.alt != expected_alt
            || (!is_char && self.modifiers.shift != expected_shift)
        {
            return false;
        }

        match expected_key.to_lowercase().as_str() {
            "enter" => self.key == Key::Enter,
            "esc" | "escape" => self.key == Key::Escape,
            "backspace" => self.key == Key::Backspace,
            "tab" => self.key == Key::Tab,
            "up" => self.key == Key::Up,
            "down" => self.key == Key::Down,
            "left" => self.key == Key::Left,
            "right" => self.key == Key::Right,
            "home" => self.key == Key::Home,
            "end" => self.key == Key::End,
            "pageup" => self.key == Key::PageUp,
            "pagedown" => self.key == Key::PageDown,
            s if s.len() > 1 && s.starts_with('f') => s[1..]
                .parse::<u8>()
                .is_ok_and(|n| self.key == Key::F(n)),
            _ => {
                let mut chars = expected_key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        self.key == Key::Char(c.to_ascii_lowercase())
                            || self.key == Key::Char(c.to_ascii_uppercase())
                    }
                    _ => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> InputEvent {
        InputEvent::from(KeyEvent::new(code, mods))
    }

    #[test]
    fn test_char_bindings_ignore_shift() {
        assert!(key(KeyCode::Char('?'), KeyModifiers::SHIFT).matches("?"));
        assert!(key(KeyCode::Char('R'), KeyModifiers::SHIFT).matches("r"));
        assert!(!key(KeyCode::Char('r'), KeyModifiers::CONTROL).matches("r"));
    }

    #[test]
    fn test_named_and_modified_bindings() {
        assert!(key(KeyCode::Char('c'), KeyModifiers::CONTROL).matches("Ctrl+c"));
        assert!(key(KeyCode::Enter, KeyModifiers::NONE).matches("Enter"));
        assert!(key(KeyCode::F(5), KeyModifiers::NONE).matches("F5"));
        assert!(!key(KeyCode::Enter, KeyModifiers::SHIFT).matches("Enter"));
        assert!(!key(KeyCode::Char('f'), KeyModifiers::NONE).matches("F5"));
    }

    #[test]
    fn test_text_char_excludes_control_combos() {
        assert_eq!(
            key(KeyCode::Char('2'), KeyModifiers::NONE).text_char(),
            Some('2')
        );
        assert_eq!(key(KeyCode::Char('u'), KeyModifiers::CONTROL).text_char(), None);
        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE).text_char(), None);
    }
}
