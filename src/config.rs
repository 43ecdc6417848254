use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::script::GenerationOptions;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub script: ScriptConfig,
    pub shell: ShellConfig,
    pub telemetry: TelemetryConfig,
}

/// Defaults for generated scripts
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScriptConfig {
    pub name: String,
    pub key: String,
    pub loop_chain: bool,
    pub team_chat: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        let options = GenerationOptions::default();
        Self {
            name: options.script_name,
            key: options.bind_key,
            loop_chain: options.loop_chain,
            team_chat: options.team_chat,
        }
    }
}

impl ScriptConfig {
    /// Generation options seeded from config
    #[must_use]
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            script_name: self.name.clone(),
            bind_key: self.key.clone(),
            loop_chain: self.loop_chain,
            team_chat: self.team_chat,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ShellConfig {
    /// How long the "copied" indicator stays on
    pub copied_indicator_ms: u64,
    /// Where downloads are written
    pub export_dir: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            copied_indicator_ms: 1200,
            export_dir: ".".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub log_path: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: "~/.alias-chain/alias-chain.log".to_owned(),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"[script]
name = "trashtalk"
key = "ins"
loop_chain = true
team_chat = false

[shell]
copied_indicator_ms = 1200
export_dir = "."

[telemetry]
enabled = false
log_path = "~/.alias-chain/alias-chain.log"
"#;

impl Config {
    /// Load config from ~/.alias-chain.toml, creating it on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default(&config_path).context("failed to create default config")?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        toml::from_str(&contents).context("failed to parse config TOML")
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".alias-chain.toml"))
    }

    fn create_default(path: &Path) -> Result<()> {
        fs::write(path, DEFAULT_CONFIG).context("failed to write default config")?;
        Ok(())
    }

    /// Expand ~ in paths to home directory
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}
