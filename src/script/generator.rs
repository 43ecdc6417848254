use std::fmt::{self, Write as _};

use thiserror::Error;
use tracing::debug;

use super::lines::LineList;

/// Characters that would break out of the quoted alias body or end a statement early.
/// Control characters are rejected as well.
const FORBIDDEN_CHARS: [char; 2] = ['"', ';'];

/// Chat command used to speak each line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// All chat
    Say,
    /// Team-only chat
    SayTeam,
}

impl ChatCommand {
    /// Pick the command for the team chat option
    #[must_use]
    pub const fn for_team_chat(team_chat: bool) -> Self {
        if team_chat {
            Self::SayTeam
        } else {
            Self::Say
        }
    }

    /// Console command name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Say => "say",
            Self::SayTeam => "say_team",
        }
    }
}

impl fmt::Display for ChatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling script generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Master alias name, also the prefix of every per-line alias
    pub script_name: String,
    /// Key token the master alias is bound to
    pub bind_key: String,
    /// Wrap from the last line back to the first
    pub loop_chain: bool,
    /// Speak with `say_team` instead of `say`
    pub team_chat: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            script_name: "trashtalk".to_owned(),
            bind_key: "ins".to_owned(),
            loop_chain: true,
            team_chat: false,
        }
    }
}

/// Input rejected before generation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// Nothing to generate
    #[error("no lines to generate a script from")]
    EmptyLines,

    /// Script name unusable as an alias identifier
    #[error("invalid script name {name:?}: must be one word without quotes or semicolons")]
    InvalidScriptName {
        /// Rejected name
        name: String,
    },

    /// Key token unusable in a bind statement
    #[error("invalid key {key:?}: must be one word without quotes or semicolons")]
    InvalidBindKey {
        /// Rejected key
        key: String,
    },

    /// A line contains a character the alias body cannot carry
    #[error("line {} contains unsupported character {character:?}", index + 1)]
    UnsupportedLineCharacter {
        /// Zero-based line index
        index: usize,
        /// Offending character
        character: char,
    },
}

fn is_forbidden(c: char) -> bool {
    c.is_control() || FORBIDDEN_CHARS.contains(&c)
}

/// One word with no whitespace, control characters, quotes or semicolons
pub(crate) fn is_identifier_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(|c| c.is_whitespace() || is_forbidden(c))
}

/// Check lines and options without generating anything
///
/// # Errors
/// Returns the first problem found, see [`ScriptError`].
pub fn validate(lines: &LineList, options: &GenerationOptions) -> Result<(), ScriptError> {
    if lines.is_empty() {
        return Err(ScriptError::EmptyLines);
    }
    if !is_identifier_token(&options.script_name) {
        return Err(ScriptError::InvalidScriptName {
            name: options.script_name.clone(),
        });
    }
    if !is_identifier_token(&options.bind_key) {
        return Err(ScriptError::InvalidBindKey {
            key: options.bind_key.clone(),
        });
    }
    for (index, line) in lines.iter().enumerate() {
        if let Some(character) = line.chars().find(|&c| is_forbidden(c)) {
            return Err(ScriptError::UnsupportedLineCharacter { index, character });
        }
    }
    Ok(())
}

/// Generate an alias chain cycling through `lines` on each press of the bound key
///
/// Each line `i` becomes `alias "<name><i>" "<say> <line>; alias <name> <name><next>;";`.
/// The last line points back to `<name>0` when looping, otherwise it rebinds the
/// master alias to itself so further presses stop advancing. The master alias
/// and the bind statement follow. There is no trailing newline.
///
/// # Errors
/// Returns [`ScriptError`] if the list is empty or the name, key or a line
/// contains characters that would break the quoting.
pub fn generate_script(lines: &LineList, options: &GenerationOptions) -> Result<String, ScriptError> {
    validate(lines, options)?;

    let name = options.script_name.as_str();
    let chat = ChatCommand::for_team_chat(options.team_chat);
    let last = lines.len() - 1;
    let mut script = String::new();

    for (i, line) in lines.iter().enumerate() {
        let next = if i < last {
            format!("{name}{}", i + 1)
        } else if options.loop_chain {
            format!("{name}0")
        } else {
            name.to_owned()
        };
        // Writing to a String cannot fail
        let _ = writeln!(script, "alias \"{name}{i}\" \"{chat} {line}; alias {name} {next};\";");
    }
    let _ = writeln!(script, "alias \"{name}\" \"{name}0\";");
    let _ = write!(script, "bind {} {name};", options.bind_key);

    debug!(
        script_name = name,
        lines = lines.len(),
        loop_chain = options.loop_chain,
        chat = %chat,
        "generated alias script"
    );

    Ok(script)
}

/// File name offered for download, `<name>.cfg` or `script.cfg` for an empty name
#[must_use]
pub fn export_file_name(script_name: &str) -> String {
    let stem = script_name.trim();
    if stem.is_empty() {
        "script.cfg".to_owned()
    } else {
        format!("{stem}.cfg")
    }
}
