use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const DEFAULT_FILTER: &str = "alias_chain=info";

/// Initialize logging
///
/// Stdout carries the generated script, so logs go to stderr, or are appended
/// to `log_path` when telemetry is enabled. `RUST_LOG` overrides the level;
/// `verbose` lowers the default to debug.
pub fn init(enabled: bool, log_path: &str, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    if !enabled {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return Ok(());
    }

    let expanded_path = Config::expand_path(log_path)?;
    let file = open_log_file(&expanded_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .init();

    tracing::info!("telemetry initialized: {}", expanded_path.display());

    Ok(())
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "alias_chain=debug"
    } else {
        DEFAULT_FILTER
    }
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("failed to open log file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "alias_chain=info");
        assert_eq!(default_filter(true), "alias_chain=debug");
    }

    #[test]
    fn test_open_log_file_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("alias-chain.log");

        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "first").unwrap();
        drop(file);
        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
