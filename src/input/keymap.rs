/// A captured key press
///
/// `code` names the physical key and tells keypad keys apart from the main
/// board (`Numpad1`, `NumpadEnd`, `KeyA`). `key` is the logical value the key
/// produced (`a`, `End`, `" "`, `F5`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Physical key identifier
    pub code: String,
    /// Logical key value
    pub key: String,
}

impl KeyPress {
    /// Create a key press from its physical code and logical value
    pub fn new(code: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            key: key.into(),
        }
    }
}

const KEYPAD_PREFIX: &str = "Numpad";

/// Map a key press to the console's key token
///
/// Keypad keys become `kp_<name>`, named keys use the console's short names
/// (`ins`, `pgdn`, `uparrow`, ...) and single letters or digits are lowercased.
/// Returns `None` for anything the console cannot bind from this event.
#[must_use]
pub fn map_key_event(event: &KeyPress) -> Option<String> {
    if let Some(rest) = event.code.strip_prefix(KEYPAD_PREFIX) {
        if !rest.is_empty() {
            return Some(format!("kp_{}", rest.to_lowercase()));
        }
    }

    if let Some(token) = named_key_token(&event.key) {
        return Some(token.to_owned());
    }

    let mut chars = event.key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase().to_string()),
        _ => None,
    }
}

fn named_key_token(key: &str) -> Option<&'static str> {
    let token = match key {
        " " => "space",
        "Escape" => "esc",
        "Insert" => "ins",
        "Delete" => "del",
        "PageUp" => "pgup",
        "PageDown" => "pgdn",
        "Home" => "home",
        "End" => "end",
        "ArrowUp" => "uparrow",
        "ArrowDown" => "downarrow",
        "ArrowLeft" => "leftarrow",
        "ArrowRight" => "rightarrow",
        "Shift" => "shift",
        "Control" => "ctrl",
        "Alt" => "alt",
        "Tab" => "tab",
        "CapsLock" => "capslock",
        "Enter" => "enter",
        "Backspace" => "backspace",
        "Meta" => "win",
        "F1" => "f1",
        "F2" => "f2",
        "F3" => "f3",
        "F4" => "f4",
        "F5" => "f5",
        "F6" => "f6",
        "F7" => "f7",
        "F8" => "f8",
        "F9" => "f9",
        "F10" => "f10",
        "F11" => "f11",
        "F12" => "f12",
        _ => return None,
    };
    Some(token)
}

/// Whether a manually typed key token can be bound
///
/// Any single word without quotes or semicolons is accepted, since the console
/// knows more key names than capture can produce (`mwheelup`, `mouse4`, ...).
#[must_use]
pub fn is_valid_key_token(token: &str) -> bool {
    crate::script::is_identifier_token(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(code: &str, key: &str) -> Option<String> {
        map_key_event(&KeyPress::new(code, key))
    }

    #[test]
    fn test_keypad_keys() {
        assert_eq!(map("NumpadEnd", "End").as_deref(), Some("kp_end"));
        assert_eq!(map("Numpad5", "5").as_deref(), Some("kp_5"));
        assert_eq!(map("NumpadEnter", "Enter").as_deref(), Some("kp_enter"));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(map("Space", " ").as_deref(), Some("space"));
        assert_eq!(map("Escape", "Escape").as_deref(), Some("esc"));
        assert_eq!(map("Insert", "Insert").as_deref(), Some("ins"));
        assert_eq!(map("PageDown", "PageDown").as_deref(), Some("pgdn"));
        assert_eq!(map("ArrowLeft", "ArrowLeft").as_deref(), Some("leftarrow"));
        assert_eq!(map("ControlLeft", "Control").as_deref(), Some("ctrl"));
        assert_eq!(map("MetaLeft", "Meta").as_deref(), Some("win"));
    }

    #[test]
    fn test_function_keys() {
        for n in 1..=12 {
            let name = format!("F{n}");
            assert_eq!(map(&name, &name), Some(format!("f{n}")));
        }
        assert_eq!(map("F13", "F13"), None);
    }

    #[test]
    fn test_alphanumeric_lowercased() {
        assert_eq!(map("KeyA", "A").as_deref(), Some("a"));
        assert_eq!(map("KeyQ", "q").as_deref(), Some("q"));
        assert_eq!(map("Digit7", "7").as_deref(), Some("7"));
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(map("Minus", "-"), None);
        assert_eq!(map("KeyE", "é"), None);
        assert_eq!(map("", "Unidentified"), None);
        assert_eq!(map("", ""), None);
    }

    #[test]
    fn test_deterministic() {
        let press = KeyPress::new("NumpadAdd", "+");
        assert_eq!(map_key_event(&press), map_key_event(&press));
        assert_eq!(map_key_event(&press).as_deref(), Some("kp_add"));
    }

    #[test]
    fn test_manual_tokens() {
        assert!(is_valid_key_token("mwheelup"));
        assert!(is_valid_key_token("kp_end"));
        assert!(!is_valid_key_token(""));
        assert!(!is_valid_key_token("a b"));
        assert!(!is_valid_key_token("x;quit"));
    }
}
