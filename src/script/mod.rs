mod generator;
mod lines;
mod parser;

pub use generator::{
    export_file_name, generate_script, validate, ChatCommand, GenerationOptions, ScriptError,
};
pub(crate) use generator::is_identifier_token;
pub use lines::LineList;
pub use parser::{parse_alias_script, scan_alias_script, ParsedScript};
