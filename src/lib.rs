//! Alias Chain - console alias script generator
//!
//! Turns a list of chat lines into a console alias chain that speaks the next
//! line on each press of a bound key, and recovers the lines from such a script.

/// Configuration management
pub mod config;
/// Clipboard and file export
pub mod export;
/// Key capture and key token mapping
pub mod input;
/// Alias script generation and parsing
pub mod script;
/// Form state behind the generator UI
pub mod shell;
/// Logging setup
pub mod telemetry;
