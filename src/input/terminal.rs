use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers,
    KeyboardEnhancementFlags, ModifierKeyCode, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};
use std::io;
use tracing::{debug, warn};

use super::capture::{CaptureError, KeySource};
use super::keymap::KeyPress;

/// Modifier combinations that cannot be bound as a single key
const CHORD_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::META)
    .union(KeyModifiers::HYPER);

/// Reads key presses from the controlling terminal
///
/// Raw mode is on only between `attach` and `detach`, so the captured key is
/// neither echoed nor interpreted by the terminal (Ctrl+C included). Terminals
/// that speak the kitty keyboard protocol also report keypad and bare modifier
/// keys while attached; others fall back to legacy key reporting.
#[derive(Debug, Default)]
pub struct TerminalKeySource {
    raw: bool,
    enhanced: bool,
}

impl TerminalKeySource {
    /// New source, terminal untouched until attached
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: false,
            enhanced: false,
        }
    }
}

impl KeySource for TerminalKeySource {
    fn attach(&mut self) -> Result<(), CaptureError> {
        enable_raw_mode()?;
        self.raw = true;
        debug!("terminal raw mode enabled");

        match supports_keyboard_enhancement() {
            Ok(true) => {
                execute!(
                    io::stdout(),
                    PushKeyboardEnhancementFlags(
                        KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                            | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                    )
                )?;
                self.enhanced = true;
                debug!("keyboard enhancement flags pushed");
            }
            Ok(false) => {
                debug!("no keyboard enhancement, keypad and modifier keys unavailable");
            }
            Err(e) => warn!("failed to query keyboard enhancement support: {}", e),
        }
        Ok(())
    }

    fn next_key(&mut self) -> Result<KeyPress, CaptureError> {
        loop {
            // Mouse, resize, focus and paste events cannot name a key
            if let Event::Key(key_event) = event::read()? {
                if let Some(press) = key_press_from_event(&key_event) {
                    return Ok(press);
                }
            }
        }
    }

    fn detach(&mut self) -> Result<(), CaptureError> {
        let popped = if self.enhanced {
            self.enhanced = false;
            execute!(io::stdout(), PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        };
        if self.raw {
            disable_raw_mode()?;
            self.raw = false;
            debug!("terminal raw mode disabled");
        }
        popped?;
        Ok(())
    }
}

/// Convert a crossterm key event to a physical/logical key pair
///
/// Returns `None` for release and repeat events. Keys crossterm cannot name,
/// and keys held with Ctrl, Alt or Super (chords), come back as `Unidentified`
/// so the mapper rejects them.
#[must_use]
pub fn key_press_from_event(event: &KeyEvent) -> Option<KeyPress> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let is_modifier = matches!(event.code, KeyCode::Modifier(_));
    if !is_modifier && event.modifiers.intersects(CHORD_MODIFIERS) {
        return Some(KeyPress::new(String::new(), "Unidentified"));
    }

    let (code, key) = match event.code {
        KeyCode::Char(' ') => ("Space".to_owned(), " ".to_owned()),
        KeyCode::Char(c) if c.is_ascii_alphabetic() => {
            (format!("Key{}", c.to_ascii_uppercase()), c.to_string())
        }
        KeyCode::Char(c) if c.is_ascii_digit() => (format!("Digit{c}"), c.to_string()),
        KeyCode::Char(c) => (String::new(), c.to_string()),
        KeyCode::F(n) => (format!("F{n}"), format!("F{n}")),
        KeyCode::Esc => named("Escape"),
        KeyCode::Up => named("ArrowUp"),
        KeyCode::Down => named("ArrowDown"),
        KeyCode::Left => named("ArrowLeft"),
        KeyCode::Right => named("ArrowRight"),
        KeyCode::Insert => named("Insert"),
        KeyCode::Delete => named("Delete"),
        KeyCode::PageUp => named("PageUp"),
        KeyCode::PageDown => named("PageDown"),
        KeyCode::Home => named("Home"),
        KeyCode::End => named("End"),
        KeyCode::Tab | KeyCode::BackTab => named("Tab"),
        KeyCode::CapsLock => named("CapsLock"),
        KeyCode::Enter => named("Enter"),
        KeyCode::Backspace => named("Backspace"),
        KeyCode::Modifier(modifier) => named(modifier_key_name(modifier)),
        _ => (String::new(), "Unidentified".to_owned()),
    };

    if event.state.contains(KeyEventState::KEYPAD) {
        let suffix = if key.len() == 1 {
            keypad_symbol_name(&key)
        } else {
            key.clone()
        };
        return Some(KeyPress::new(format!("Numpad{suffix}"), key));
    }

    Some(KeyPress::new(code, key))
}

fn named(name: &str) -> (String, String) {
    (name.to_owned(), name.to_owned())
}

fn modifier_key_name(modifier: ModifierKeyCode) -> &'static str {
    match modifier {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => "Shift",
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => "Control",
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => "Alt",
        ModifierKeyCode::LeftSuper
        | ModifierKeyCode::RightSuper
        | ModifierKeyCode::LeftMeta
        | ModifierKeyCode::RightMeta => "Meta",
        _ => "Unidentified",
    }
}

/// Keypad operator keys use the console's names (`kp_plus`, `kp_slash`, ...)
fn keypad_symbol_name(key: &str) -> String {
    match key {
        "+" => "Plus".to_owned(),
        "-" => "Minus".to_owned(),
        "*" => "Multiply".to_owned(),
        "/" => "Slash".to_owned(),
        "." => "Del".to_owned(),
        other => other.to_owned(),
    }
}
