use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::keymap::{map_key_event, KeyPress};

/// Shown when a captured key has no console token
pub const UNSUPPORTED_KEY_MESSAGE: &str = "Key not supported, please type manually.";

/// Platform source of key presses
///
/// `attach` starts listening and must be balanced by exactly one `detach`;
/// [`CaptureSession`] guarantees that.
#[cfg_attr(test, mockall::automock)]
pub trait KeySource {
    /// Start listening and take over key handling from the host
    ///
    /// # Errors
    /// Returns error if the listener cannot be installed
    fn attach(&mut self) -> Result<(), CaptureError>;

    /// Block until the next key press
    ///
    /// # Errors
    /// Returns error if reading events fails
    fn next_key(&mut self) -> Result<KeyPress, CaptureError>;

    /// Stop listening and hand key handling back
    ///
    /// # Errors
    /// Returns error if the listener cannot be removed cleanly
    fn detach(&mut self) -> Result<(), CaptureError>;
}

/// Key capture errors
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A capture window is already open
    #[error("a key capture is already in progress")]
    AlreadyCapturing,

    /// The key source failed
    #[error("key source failed: {0}")]
    Source(#[from] std::io::Error),
}

/// Capture window state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture in progress, trigger enabled
    Idle,
    /// Waiting for one key press, trigger disabled
    Waiting,
}

/// Result of one capture window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Key mapped to this token
    Captured(String),
    /// Key has no token; the previous key should be kept
    Unsupported,
}

fn lock(state: &Mutex<CaptureState>) -> MutexGuard<'_, CaptureState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of the single key capture window
///
/// Clones share state, so a UI can watch [`KeyCapture::state`] while another
/// handle runs the capture.
#[derive(Debug, Clone)]
pub struct KeyCapture {
    state: Arc<Mutex<CaptureState>>,
}

impl Default for KeyCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyCapture {
    /// New capture owner in the idle state
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CaptureState::Idle)),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CaptureState {
        *lock(&self.state)
    }

    /// True while a capture window is open
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.state() == CaptureState::Waiting
    }

    /// Open a capture window on `source`
    ///
    /// # Errors
    /// Returns [`CaptureError::AlreadyCapturing`] if a window is already open,
    /// or the source error if attaching fails (the state returns to idle).
    pub fn begin<'a, S: KeySource + ?Sized>(
        &self,
        source: &'a mut S,
    ) -> Result<CaptureSession<'a, S>, CaptureError> {
        {
            let mut state = lock(&self.state);
            if *state == CaptureState::Waiting {
                warn!("key capture requested while one is in progress");
                return Err(CaptureError::AlreadyCapturing);
            }
            *state = CaptureState::Waiting;
        }

        if let Err(e) = source.attach() {
            error!("failed to attach key source: {}", e);
            *lock(&self.state) = CaptureState::Idle;
            return Err(e);
        }

        debug!("key capture: Idle → Waiting");
        Ok(CaptureSession {
            source,
            state: Arc::clone(&self.state),
        })
    }

    /// Capture exactly one key press, releasing the source afterwards
    ///
    /// # Errors
    /// See [`KeyCapture::begin`] and [`CaptureSession::capture`].
    pub fn capture_once<S: KeySource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.begin(source)?.capture()
    }
}

/// An open capture window
///
/// Dropping it detaches the source and returns the owner to idle, whether the
/// capture succeeded, hit an unsupported key, or failed.
pub struct CaptureSession<'a, S: KeySource + ?Sized> {
    source: &'a mut S,
    state: Arc<Mutex<CaptureState>>,
}

impl<S: KeySource + ?Sized> CaptureSession<'_, S> {
    /// Read one key press and map it to a key token
    ///
    /// # Errors
    /// Returns error if the source fails to deliver an event
    pub fn capture(self) -> Result<CaptureOutcome, CaptureError> {
        let press = self.source.next_key()?;
        let outcome = match map_key_event(&press) {
            Some(token) => {
                info!(code = %press.code, key = %press.key, token = %token, "key captured");
                CaptureOutcome::Captured(token)
            }
            None => {
                info!(code = %press.code, key = %press.key, "captured key not supported");
                CaptureOutcome::Unsupported
            }
        };
        Ok(outcome)
    }
}

impl<S: KeySource + ?Sized> Drop for CaptureSession<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.source.detach() {
            error!("failed to detach key source: {}", e);
        }
        *lock(&self.state) = CaptureState::Idle;
        debug!("key capture: Waiting → Idle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn attached_source() -> MockKeySource {
        let mut source = MockKeySource::new();
        source.expect_attach().times(1).returning(|| Ok(()));
        source.expect_detach().times(1).returning(|| Ok(()));
        source
    }

    #[test]
    fn test_captures_and_releases() {
        let mut source = attached_source();
        source
            .expect_next_key()
            .times(1)
            .returning(|| Ok(KeyPress::new("F5", "F5")));

        let capture = KeyCapture::new();
        let outcome = capture.capture_once(&mut source).unwrap();

        assert_eq!(outcome, CaptureOutcome::Captured("f5".to_owned()));
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn test_unsupported_key_still_releases() {
        let mut source = attached_source();
        source
            .expect_next_key()
            .times(1)
            .returning(|| Ok(KeyPress::new("Minus", "-")));

        let capture = KeyCapture::new();
        assert_eq!(
            capture.capture_once(&mut source).unwrap(),
            CaptureOutcome::Unsupported
        );
        assert!(!capture.is_waiting());
    }

    #[test]
    fn test_source_error_still_releases() {
        let mut source = attached_source();
        source
            .expect_next_key()
            .times(1)
            .returning(|| Err(io::Error::other("tty closed").into()));

        let capture = KeyCapture::new();
        assert!(matches!(
            capture.capture_once(&mut source),
            Err(CaptureError::Source(_))
        ));
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn test_second_capture_rejected_while_waiting() {
        let mut first = attached_source();
        let mut second = MockKeySource::new();
        second.expect_attach().never();

        let capture = KeyCapture::new();
        let observer = capture.clone();
        let session = capture.begin(&mut first).unwrap();
        assert!(observer.is_waiting());

        assert!(matches!(
            observer.begin(&mut second),
            Err(CaptureError::AlreadyCapturing)
        ));

        drop(session);
        assert!(!observer.is_waiting());
    }

    #[test]
    fn test_attach_failure_resets_state() {
        let mut source = MockKeySource::new();
        source
            .expect_attach()
            .times(1)
            .returning(|| Err(io::Error::other("no tty").into()));
        source.expect_detach().never();

        let capture = KeyCapture::new();
        assert!(capture.begin(&mut source).is_err());
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn test_repeated_captures_do_not_leak_listeners() {
        let mut source = MockKeySource::new();
        source.expect_attach().times(3).returning(|| Ok(()));
        source.expect_detach().times(3).returning(|| Ok(()));
        source
            .expect_next_key()
            .times(3)
            .returning(|| Ok(KeyPress::new("KeyG", "g")));

        let capture = KeyCapture::new();
        for _ in 0..3 {
            assert_eq!(
                capture.capture_once(&mut source).unwrap(),
                CaptureOutcome::Captured("g".to_owned())
            );
        }
    }
}
