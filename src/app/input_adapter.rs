//! Winit key event adapter.
//!
//! Translates winit's logical keys into [`Key`] so a windowed host can feed
//! [`Showcase::handle_key`](crate::app::Showcase::handle_key) directly.

use winit::keyboard::{Key as WinitKey, KeyCode, PhysicalKey};

use crate::app::input::Key;

/// Converts a logical key; keys that produce no text become [`Key::Other`].
#[must_use]
pub fn translate_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Character(text) => Key::Character(text.to_string()),
        _ => Key::Other,
    }
}

/// Digit-row fallback for layouts whose logical key is not a digit.
#[must_use]
pub fn translate_physical_key(physical_key: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = physical_key else {
        return Key::Other;
    };
    let digit = match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => "1",
        KeyCode::Digit2 | KeyCode::Numpad2 => "2",
        KeyCode::Digit3 | KeyCode::Numpad3 => "3",
        KeyCode::Digit4 | KeyCode::Numpad4 => "4",
        KeyCode::Digit5 | KeyCode::Numpad5 => "5",
        _ => return Key::Other,
    };
    Key::character(digit)
}

impl From<&WinitKey> for Key {
    fn from(key: &WinitKey) -> Self {
        translate_key(key)
    }
}
