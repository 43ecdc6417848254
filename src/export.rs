use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::script::export_file_name;

/// Destination for copied script text
#[cfg_attr(test, mockall::automock)]
pub trait Clipboard {
    /// Replace the clipboard contents with `text`
    ///
    /// # Errors
    /// Returns error if the clipboard is unavailable
    fn write_text(&self, text: &str) -> Result<()>;
}

/// System clipboard via `arboard`
///
/// A fresh handle is opened per write; on X11 the contents live only as long
/// as the process that set them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("failed to open clipboard")?;
        clipboard
            .set_text(text.to_owned())
            .context("failed to write clipboard")?;
        info!(text_len = text.len(), "script copied to clipboard");
        Ok(())
    }
}

/// Write `script` to `<dir>/<script_name>.cfg`, creating `dir` if needed
///
/// # Errors
/// Returns error if the directory or file cannot be written
pub fn write_script_file(dir: &Path, script_name: &str, script: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let path = dir.join(export_file_name(script_name));
    fs::write(&path, script)
        .with_context(|| format!("failed to write script to {}", path.display()))?;

    info!(path = %path.display(), bytes = script.len(), "script exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script_file(dir.path(), "trashtalk", "bind ins t;").unwrap();

        assert_eq!(path, dir.path().join("trashtalk.cfg"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "bind ins t;");
    }

    #[test]
    fn test_write_script_file_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script_file(dir.path(), "", "x").unwrap();
        assert_eq!(path.file_name().unwrap(), "script.cfg");
    }

    #[test]
    fn test_write_script_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cfg").join("binds");
        let path = write_script_file(&nested, "t", "x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_overwrites_existing_export() {
        let dir = tempfile::tempdir().unwrap();
        write_script_file(dir.path(), "t", "old").unwrap();
        let path = write_script_file(dir.path(), "t", "new").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }
}
