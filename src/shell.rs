use anyhow::Result;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::export::{write_script_file, Clipboard};
use crate::input::capture::{
    CaptureError, CaptureOutcome, KeyCapture, KeySource, UNSUPPORTED_KEY_MESSAGE,
};
use crate::input::keymap::is_valid_key_token;
use crate::script::{generate_script, scan_alias_script, GenerationOptions, LineList, ScriptError};

/// Shown when a typed key cannot be used in a bind statement
pub const INVALID_KEY_MESSAGE: &str = "Key must be one word without quotes or semicolons.";

/// What a paste did to the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasteOutcome {
    /// Byte offset of the cursor after the inserted text
    pub cursor: usize,
    /// The pasted text was a generated script and was replaced by its lines
    pub recognized: bool,
}

/// Form state behind the generator UI
///
/// Holds the editable lines and options; the script is derived from them on
/// every call and never cached.
#[derive(Debug)]
pub struct Shell {
    input: String,
    options: GenerationOptions,
    show_preview: bool,
    key_error: Option<String>,
    copied: Arc<AtomicBool>,
    copied_indicator: Duration,
    capture: KeyCapture,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(GenerationOptions::default(), Duration::from_millis(1200))
    }
}

impl Shell {
    /// Empty form with the given options
    #[must_use]
    pub fn new(options: GenerationOptions, copied_indicator: Duration) -> Self {
        Self {
            input: String::new(),
            options,
            show_preview: false,
            key_error: None,
            copied: Arc::new(AtomicBool::new(false)),
            copied_indicator,
            capture: KeyCapture::new(),
        }
    }

    /// Empty form seeded from config
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.script.options(),
            Duration::from_millis(config.shell.copied_indicator_ms),
        )
    }

    /// Raw editable text
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the editable text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Current generation options
    #[must_use]
    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Set the master alias name
    pub fn set_script_name(&mut self, name: impl Into<String>) {
        self.options.script_name = name.into();
    }

    /// Set the bind key as typed by hand
    ///
    /// The typed text is kept either way; a key that cannot be bound sets
    /// [`Shell::key_error`] and returns `false`.
    pub fn set_key(&mut self, key: impl Into<String>) -> bool {
        self.options.bind_key = key.into();
        if is_valid_key_token(&self.options.bind_key) {
            self.key_error = None;
            true
        } else {
            debug!(key = %self.options.bind_key, "invalid bind key entered");
            self.key_error = Some(INVALID_KEY_MESSAGE.to_owned());
            false
        }
    }

    /// Toggle wrapping from the last line back to the first
    pub fn set_loop(&mut self, loop_chain: bool) {
        self.options.loop_chain = loop_chain;
    }

    /// Toggle `say_team`
    pub fn set_team_chat(&mut self, team_chat: bool) {
        self.options.team_chat = team_chat;
    }

    /// Flip preview visibility, returning the new state
    pub fn toggle_preview(&mut self) -> bool {
        self.show_preview = !self.show_preview;
        self.show_preview
    }

    /// Script text to show, if the preview is open
    ///
    /// # Errors
    /// Returns [`ScriptError`] if the current input cannot be generated
    pub fn preview(&self) -> Result<Option<String>, ScriptError> {
        if self.show_preview {
            self.script().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Message from the last failed key capture
    #[must_use]
    pub fn key_error(&self) -> Option<&str> {
        self.key_error.as_deref()
    }

    /// Paste `text` over `selection` (byte offsets into the input)
    ///
    /// A generated script is replaced by the lines it speaks and turns team chat
    /// on if it used `say_team`. Anything else is inserted unchanged. Offsets
    /// are clamped to the input and moved back to char boundaries.
    pub fn paste(&mut self, text: &str, selection: Range<usize>) -> PasteOutcome {
        let start = floor_char_boundary(&self.input, selection.start);
        let end = floor_char_boundary(&self.input, selection.end.max(start));

        let (inserted, recognized) = match scan_alias_script(text) {
            Some(parsed) => {
                if parsed.team_chat {
                    self.options.team_chat = true;
                }
                info!(
                    lines = parsed.lines.len(),
                    team_chat = parsed.team_chat,
                    "pasted alias script converted to lines"
                );
                (parsed.lines.to_text(), true)
            }
            None => (text.to_owned(), false),
        };

        self.input.replace_range(start..end, &inserted);
        PasteOutcome {
            cursor: start + inserted.len(),
            recognized,
        }
    }

    /// Lines derived from the current input
    #[must_use]
    pub fn lines(&self) -> LineList {
        LineList::from_text(&self.input)
    }

    /// True if there is anything to copy or download
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// The script for the current input and options, empty if there are no lines
    ///
    /// # Errors
    /// Returns [`ScriptError`] if the name, key or a line cannot be quoted
    pub fn script(&self) -> Result<String, ScriptError> {
        let lines = self.lines();
        if lines.is_empty() {
            return Ok(String::new());
        }
        generate_script(&lines, &self.options)
    }

    /// True while the "copied" indicator is shown
    #[must_use]
    pub fn is_copied(&self) -> bool {
        self.copied.load(Ordering::Relaxed)
    }

    /// Copy the script to `clipboard`
    ///
    /// Returns `false` without touching the clipboard when there is nothing to
    /// copy. On success the "copied" indicator turns on and a background task
    /// turns it off again after the configured delay.
    ///
    /// # Errors
    /// Returns error if generation or the clipboard write fails
    pub fn copy(&self, clipboard: &dyn Clipboard) -> Result<bool> {
        if !self.has_content() {
            debug!("nothing to copy");
            return Ok(false);
        }

        let script = self.script()?;
        clipboard.write_text(&script)?;
        self.copied.store(true, Ordering::Relaxed);
        self.schedule_copied_reset();
        Ok(true)
    }

    fn schedule_copied_reset(&self) {
        let copied = Arc::clone(&self.copied);
        let delay = self.copied_indicator;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            // Stale timers only clear a flag, so they are never cancelled
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                copied.store(false, Ordering::Relaxed);
            });
        } else {
            debug!("no async runtime, clearing copied indicator immediately");
            copied.store(false, Ordering::Relaxed);
        }
    }

    /// Write the script to `dir` as `<name>.cfg`
    ///
    /// Returns `None` when there is nothing to write.
    ///
    /// # Errors
    /// Returns error if generation or the file write fails
    pub fn download(&self, dir: &Path) -> Result<Option<PathBuf>> {
        if !self.has_content() {
            debug!("nothing to download");
            return Ok(None);
        }

        let script = self.script()?;
        write_script_file(dir, &self.options.script_name, &script).map(Some)
    }

    /// True while a key capture is waiting for a key press
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capture.is_waiting()
    }

    /// Capture one key press from `source` and use it as the bind key
    ///
    /// An unsupported key keeps the previous key and sets [`Shell::key_error`].
    ///
    /// # Errors
    /// Returns [`CaptureError`] if a capture is already running or the source fails
    pub fn capture_key<S: KeySource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.key_error = None;
        let outcome = self.capture.capture_once(source)?;
        match &outcome {
            CaptureOutcome::Captured(token) => {
                self.options.bind_key.clone_from(token);
            }
            CaptureOutcome::Unsupported => {
                self.key_error = Some(UNSUPPORTED_KEY_MESSAGE.to_owned());
            }
        }
        Ok(outcome)
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
