//! Name tables for keyboard keys, mouse buttons and controller inputs.

use crate::hal::{Hat, MouseButton, ProButton};
use crate::lang::unquote;

pub const KEY_LEFT_CTRL: u8 = 0x80;
pub const KEY_LEFT_SHIFT: u8 = 0x81;
pub const KEY_LEFT_ALT: u8 = 0x82;
pub const KEY_LEFT_GUI: u8 = 0x83;
pub const KEY_RETURN: u8 = 0xB0;
pub const KEY_ESC: u8 = 0xB1;
pub const KEY_BACKSPACE: u8 = 0xB2;
pub const KEY_TAB: u8 = 0xB3;
pub const KEY_CAPS_LOCK: u8 = 0xC1;
pub const KEY_F1: u8 = 0xC2;
pub const KEY_INSERT: u8 = 0xD1;
pub const KEY_HOME: u8 = 0xD2;
pub const KEY_PAGE_UP: u8 = 0xD3;
pub const KEY_DELETE: u8 = 0xD4;
pub const KEY_END: u8 = 0xD5;
pub const KEY_PAGE_DOWN: u8 = 0xD6;
pub const KEY_RIGHT_ARROW: u8 = 0xD7;
pub const KEY_LEFT_ARROW: u8 = 0xD8;
pub const KEY_DOWN_ARROW: u8 = 0xD9;
pub const KEY_UP_ARROW: u8 = 0xDA;

const KEY_NAMES: &[(&str, u8)] = &[
    ("ENTER", KEY_RETURN),
    ("RETURN", KEY_RETURN),
    ("ESC", KEY_ESC),
    ("ESCAPE", KEY_ESC),
    ("BACKSPACE", KEY_BACKSPACE),
    ("BKSP", KEY_BACKSPACE),
    ("TAB", KEY_TAB),
    ("SPACE", b' '),
    ("SPACEBAR", b' '),
    ("CAPSLOCK", KEY_CAPS_LOCK),
    ("CAPS", KEY_CAPS_LOCK),
    ("MINUS", b'-'),
    ("EQUAL", b'='),
    ("LEFTBRACE", b'['),
    ("RIGHTBRACE", b']'),
    ("BACKSLASH", b'\\'),
    ("SEMICOLON", b';'),
    ("APOSTROPHE", b'\''),
    ("GRAVE", b'`'),
    ("COMMA", b','),
    ("DOT", b'.'),
    ("PERIOD", b'.'),
    ("SLASH", b'/'),
    ("RIGHT", KEY_RIGHT_ARROW),
    ("ARROWRIGHT", KEY_RIGHT_ARROW),
    ("LEFT", KEY_LEFT_ARROW),
    ("ARROWLEFT", KEY_LEFT_ARROW),
    ("DOWN", KEY_DOWN_ARROW),
    ("ARROWDOWN", KEY_DOWN_ARROW),
    ("UP", KEY_UP_ARROW),
    ("ARROWUP", KEY_UP_ARROW),
    ("CTRL", KEY_LEFT_CTRL),
    ("SHIFT", KEY_LEFT_SHIFT),
    ("ALT", KEY_LEFT_ALT),
    ("GUI", KEY_LEFT_GUI),
    ("WIN", KEY_LEFT_GUI),
    ("INSERT", KEY_INSERT),
    ("DELETE", KEY_DELETE),
    ("HOME", KEY_HOME),
    ("END", KEY_END),
    ("PAGEUP", KEY_PAGE_UP),
    ("PAGEDOWN", KEY_PAGE_DOWN),
];

/// Code of a named key, case-insensitive. `F1` through `F12` included.
pub fn named_key(name: &str) -> Option<u8> {
    if let Some(n) = name
        .strip_prefix('F')
        .or_else(|| name.strip_prefix('f'))
        .and_then(|n| n.parse::<u8>().ok())
    {
        if (1..=12).contains(&n) {
            return Some(KEY_F1 + n - 1);
        }
    }
    KEY_NAMES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Resolves one key token to a code: digits are a raw code, then the name
/// table, then a single ASCII character. Unresolvable tokens give 0.
pub fn key_code(token: &str) -> u8 {
    let token = token.trim();
    if token.is_empty() {
        return 0;
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse::<u64>().map_or(0, |n| (n & 0xFF) as u8);
    }
    if let Some(code) = named_key(token) {
        return code;
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() => ch as u8,
        _ => 0,
    }
}

/// All codes a key argument stands for. A quoted string yields one code per
/// ASCII character. Zero codes are left out.
pub fn key_codes(arg: &str) -> Vec<u8> {
    match unquote(arg) {
        Some(text) => text.chars().filter(char::is_ascii).map(|ch| ch as u8).filter(|c| *c != 0).collect(),
        None => match key_code(arg) {
            0 => vec![],
            code => vec![code],
        },
    }
}

/// First code of a key argument, or 0.
pub fn first_key_code(arg: &str) -> u8 {
    key_codes(arg).first().copied().unwrap_or(0)
}

pub fn mouse_button(name: &str) -> Option<MouseButton> {
    match name.trim().to_ascii_uppercase().as_str() {
        "LEFT" => Some(MouseButton::Left),
        "RIGHT" => Some(MouseButton::Right),
        "MIDDLE" => Some(MouseButton::Middle),
        _ => None,
    }
}

/// A controller input addressed by name: a button, or a D-pad direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProInput {
    Button(ProButton),
    Hat(Hat),
}

pub fn pro_input(name: &str) -> Option<ProInput> {
    use ProButton::*;
    let button = match name.trim().to_ascii_uppercase().as_str() {
        "A" => A,
        "B" => B,
        "X" => X,
        "Y" => Y,
        "L" => L,
        "R" => R,
        "ZL" => ZL,
        "ZR" => ZR,
        "MINUS" => Minus,
        "PLUS" => Plus,
        "HOME" => Home,
        "CAPTURE" => Capture,
        "LCLICK" => LClick,
        "RCLICK" => RClick,
        "UP" => return Some(ProInput::Hat(Hat::Up)),
        "DOWN" => return Some(ProInput::Hat(Hat::Down)),
        "LEFT" => return Some(ProInput::Hat(Hat::Left)),
        "RIGHT" => return Some(ProInput::Hat(Hat::Right)),
        _ => return None,
    };
    Some(ProInput::Button(button))
}

pub fn hat(name: &str) -> Option<Hat> {
    match name.trim().to_ascii_uppercase().as_str() {
        "UP" => Some(Hat::Up),
        "UP_RIGHT" => Some(Hat::UpRight),
        "RIGHT" => Some(Hat::Right),
        "RIGHT_DOWN" => Some(Hat::RightDown),
        "DOWN" => Some(Hat::Down),
        "DOWN_LEFT" => Some(Hat::DownLeft),
        "LEFT" => Some(Hat::Left),
        "LEFT_UP" => Some(Hat::LeftUp),
        "CENTER" => Some(Hat::Center),
        _ => None,
    }
}

/// Maps a stick percentage to a centered 8-bit axis.
pub fn stick_axis(percent: f64) -> u8 {
    let p = percent.max(-100.0).min(100.0) as i32;
    (p * 255 / 200 + 128).max(0).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_code() {
        assert_eq!(key_code("enter"), KEY_RETURN);
        assert_eq!(key_code("Return"), KEY_RETURN);
        assert_eq!(key_code("F1"), 0xC2);
        assert_eq!(key_code("f12"), 0xCD);
        assert_eq!(key_code("F13"), 0);
        assert_eq!(key_code("65"), 65);
        assert_eq!(key_code("a"), b'a');
        assert_eq!(key_code("A"), b'A');
        assert_eq!(key_code("space"), b' ');
        assert_eq!(key_code("arrowup"), KEY_UP_ARROW);
        assert_eq!(key_code("NOPE"), 0);
        assert_eq!(key_code(""), 0);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(key_codes("\"ab\""), vec![b'a', b'b']);
        assert_eq!(key_codes("TAB"), vec![KEY_TAB]);
        assert!(key_codes("bogus").is_empty());
        assert_eq!(first_key_code("\"xyz\""), b'x');
        assert_eq!(first_key_code("\"\""), 0);
    }

    #[test]
    fn test_controller_names() {
        assert_eq!(pro_input("zl"), Some(ProInput::Button(ProButton::ZL)));
        assert_eq!(pro_input("UP"), Some(ProInput::Hat(Hat::Up)));
        assert_eq!(pro_input("START"), None);
        assert_eq!(hat("left_up"), Some(Hat::LeftUp));
        assert_eq!(hat("NORTH"), None);
        assert_eq!(mouse_button("middle"), Some(MouseButton::Middle));
    }

    #[test]
    fn test_stick_axis() {
        assert_eq!(stick_axis(0.0), 128);
        assert_eq!(stick_axis(100.0), 255);
        assert_eq!(stick_axis(-100.0), 1);
        assert_eq!(stick_axis(500.0), 255);
        assert_eq!(stick_axis(50.0), 191);
    }
}
