/// Single key capture window
pub mod capture;
/// Key press to console key token mapping
pub mod keymap;
/// Terminal key source
pub mod terminal;

pub use capture::{CaptureError, CaptureOutcome, CaptureState, KeyCapture, KeySource};
pub use keymap::{is_valid_key_token, map_key_event, KeyPress};
pub use terminal::TerminalKeySource;
