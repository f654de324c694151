//! Keyboard identifiers mapped onto player controls.

use tilewalk_core::Control;

/// Maps a key identifier onto a control.
///
/// Arrow keys and WASD select directions and `e` interacts. Matching ignores
/// ASCII case and surrounding whitespace.
#[must_use]
pub fn control_from_key(key: &str) -> Option<Control> {
    let key = key.trim().to_ascii_lowercase();
    match key.as_str() {
        "up" | "arrowup" | "w" => Some(Control::Up),
        "down" | "arrowdown" | "s" => Some(Control::Down),
        "left" | "arrowleft" | "a" => Some(Control::Left),
        "right" | "arrowright" | "d" => Some(Control::Right),
        "e" => Some(Control::Interact),
        _ => None,
    }
}
