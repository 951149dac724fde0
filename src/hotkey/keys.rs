//! Key events and the hotkey table
//!
//! `]` or `+` starts clicking, `[` or `-` stops it. Everything else is
//! ignored.

use crate::state::Intent;

/// macOS virtual key codes (ANSI layout) for the hotkeys
pub mod keycodes {
    pub const EQUAL: u16 = 0x18;
    pub const MINUS: u16 = 0x1B;
    pub const RIGHT_BRACKET: u16 = 0x1E;
    pub const LEFT_BRACKET: u16 = 0x21;
    pub const KEYPAD_PLUS: u16 = 0x45;
    pub const KEYPAD_MINUS: u16 = 0x4E;
}

/// A raw key-down event from an input source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Key that produced a character
    Char(char),
    /// Any other key, by virtual key code
    Other(u16),
}

impl KeyEvent {
    /// Translate a virtual key code and the shift state into the typed key
    pub fn from_keycode(code: u16, shift: bool) -> Self {
        use keycodes::*;

        match (code, shift) {
            (RIGHT_BRACKET, false) => KeyEvent::Char(']'),
            (RIGHT_BRACKET, true) => KeyEvent::Char('}'),
            (LEFT_BRACKET, false) => KeyEvent::Char('['),
            (LEFT_BRACKET, true) => KeyEvent::Char('{'),
            (MINUS, false) => KeyEvent::Char('-'),
            (MINUS, true) => KeyEvent::Char('_'),
            (EQUAL, false) => KeyEvent::Char('='),
            (EQUAL, true) => KeyEvent::Char('+'),
            (KEYPAD_PLUS, _) => KeyEvent::Char('+'),
            (KEYPAD_MINUS, _) => KeyEvent::Char('-'),
            (code, _) => KeyEvent::Other(code),
        }
    }
}

/// The intent bound to a key, if any
pub fn intent_for_key(event: &KeyEvent) -> Option<Intent> {
    match event {
        KeyEvent::Char(']' | '+') => Some(Intent::Activate),
        KeyEvent::Char('[' | '-') => Some(Intent::Deactivate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_keys() {
        assert_eq!(intent_for_key(&KeyEvent::Char(']')), Some(Intent::Activate));
        assert_eq!(intent_for_key(&KeyEvent::Char('+')), Some(Intent::Activate));
    }

    #[test]
    fn test_deactivation_keys() {
        assert_eq!(intent_for_key(&KeyEvent::Char('[')), Some(Intent::Deactivate));
        assert_eq!(intent_for_key(&KeyEvent::Char('-')), Some(Intent::Deactivate));
    }

    #[test]
    fn test_other_keys_ignored() {
        for event in [
            KeyEvent::Char('a'),
            KeyEvent::Char('='),
            KeyEvent::Char('{'),
            KeyEvent::Other(0x31),
        ] {
            assert_eq!(intent_for_key(&event), None, "{event:?}");
        }
    }

    #[test]
    fn test_keycode_translation() {
        assert_eq!(KeyEvent::from_keycode(keycodes::RIGHT_BRACKET, false), KeyEvent::Char(']'));
        assert_eq!(KeyEvent::from_keycode(keycodes::LEFT_BRACKET, false), KeyEvent::Char('['));
        assert_eq!(KeyEvent::from_keycode(keycodes::EQUAL, true), KeyEvent::Char('+'));
        assert_eq!(KeyEvent::from_keycode(keycodes::MINUS, false), KeyEvent::Char('-'));
        assert_eq!(KeyEvent::from_keycode(keycodes::KEYPAD_PLUS, false), KeyEvent::Char('+'));
        assert_eq!(KeyEvent::from_keycode(keycodes::KEYPAD_MINUS, true), KeyEvent::Char('-'));
        assert_eq!(KeyEvent::from_keycode(0x00, false), KeyEvent::Other(0x00));
    }

    #[test]
    fn test_shifted_brackets_do_not_trigger() {
        let event = KeyEvent::from_keycode(keycodes::RIGHT_BRACKET, true);
        assert_eq!(intent_for_key(&event), None);
        let event = KeyEvent::from_keycode(keycodes::EQUAL, false);
        assert_eq!(intent_for_key(&event), None);
    }
}
