//! alias-chain CLI: generate, parse and bind console alias chains

use alias_chain::config::Config;
use alias_chain::export::SystemClipboard;
use alias_chain::input::capture::{CaptureOutcome, UNSUPPORTED_KEY_MESSAGE};
use alias_chain::input::TerminalKeySource;
use alias_chain::script::parse_alias_script;
use alias_chain::shell::Shell;
use alias_chain::telemetry;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "alias-chain")]
#[command(version)]
#[command(about = "Generate console alias chains that cycle through chat lines", long_about = None)]
struct Cli {
    /// Config file (default: ~/.alias-chain.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture one key press and print its key token
    CaptureKey,

    /// Generate a script from lines (or from a previously generated script)
    Generate {
        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Script name
        #[arg(short, long)]
        name: Option<String>,

        /// Key to bind
        #[arg(short, long)]
        key: Option<String>,

        /// Stop after the last line instead of wrapping
        #[arg(long)]
        no_loop: bool,

        /// Use say_team
        #[arg(long)]
        team: bool,

        /// Also write <name>.cfg into the configured export directory
        #[arg(long)]
        save: bool,

        /// Write <name>.cfg into this directory instead (implies --save)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also copy the script to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Print the lines of a generated script
    Parse {
        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    telemetry::init(
        config.telemetry.enabled,
        &config.telemetry.log_path,
        cli.verbose,
    )?;
    tracing::debug!("alias-chain starting");

    match cli.command {
        Commands::CaptureKey => capture_key(&config).await,
        Commands::Generate {
            input,
            name,
            key,
            no_loop,
            team,
            save,
            out,
            copy,
        } => {
            let mut shell = Shell::from_config(&config);
            let text = read_input(input.as_deref())?;
            shell.paste(&text, 0..0);

            if let Some(name) = name {
                shell.set_script_name(name);
            }
            if let Some(key) = key {
                if !shell.set_key(key) {
                    bail!(shell.key_error().unwrap_or_default().to_owned());
                }
            }
            if no_loop {
                shell.set_loop(false);
            }
            if team {
                shell.set_team_chat(true);
            }

            let export_dir = match out {
                Some(dir) => Some(dir),
                None if save => Some(Config::expand_path(&config.shell.export_dir)?),
                None => None,
            };
            generate(&shell, export_dir.as_deref(), copy)
        }
        Commands::Parse { input } => {
            let text = read_input(input.as_deref())?;
            let Some(lines) = parse_alias_script(&text) else {
                bail!("input is not a generated alias script");
            };
            println!("{}", lines.to_text());
            Ok(())
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => io::read_to_string(io::stdin()).context("failed to read stdin"),
    }
}

fn generate(shell: &Shell, export_dir: Option<&Path>, copy: bool) -> Result<()> {
    let script = shell.script()?;
    if script.is_empty() {
        bail!("no lines to generate a script from");
    }
    println!("{script}");

    if copy {
        shell.copy(&SystemClipboard)?;
        eprintln!("✓ Copied to clipboard");
    }

    if let Some(dir) = export_dir {
        if let Some(path) = shell.download(dir)? {
            eprintln!("✓ Saved {}", path.display());
        }
    }

    Ok(())
}

async fn capture_key(config: &Config) -> Result<()> {
    let mut shell = Shell::from_config(config);
    eprintln!("Press a key...");

    let (shell, outcome) = tokio::task::spawn_blocking(move || {
        let mut source = TerminalKeySource::new();
        let outcome = shell.capture_key(&mut source);
        (shell, outcome)
    })
    .await
    .context("key capture task failed")?;

    match outcome? {
        CaptureOutcome::Captured(token) => {
            println!("{token}");
            tracing::debug!(key = %shell.options().bind_key, "bind key updated");
            Ok(())
        }
        CaptureOutcome::Unsupported => bail!(UNSUPPORTED_KEY_MESSAGE),
    }
}
