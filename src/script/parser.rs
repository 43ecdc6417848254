use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::lines::LineList;

/// Matches one per-line alias: quoted name, then a quoted body starting with
/// `say` or `say_team`, a space, and the payload up to the first `;`
#[allow(clippy::unwrap_used)] // Literal pattern, covered by tests
static SAY_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"alias\s+"[^"]+"\s+"say(_team)? ([^;]+);"#).unwrap());

/// Lines recovered from a previously generated script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    /// Spoken lines in declaration order
    pub lines: LineList,
    /// At least one alias used `say_team`
    pub team_chat: bool,
}

/// Recognize a generated alias script and recover its lines and chat scope
///
/// Returns `None` when the text contains no per-line alias, meaning it should be
/// treated as plain lines. Payloads stop at the first `;`, so a line that itself
/// contained a semicolon comes back truncated.
#[must_use]
pub fn scan_alias_script(raw: &str) -> Option<ParsedScript> {
    let mut team_chat = false;
    let payloads: Vec<&str> = SAY_ALIAS
        .captures_iter(raw)
        .filter_map(|caps| {
            let payload = caps.get(2)?.as_str();
            // Only aliases that contribute a line decide the chat scope
            if !payload.trim().is_empty() {
                team_chat |= caps.get(1).is_some();
            }
            Some(payload)
        })
        .collect();

    let lines = LineList::new(payloads);
    if lines.is_empty() {
        debug!(input_len = raw.len(), "no alias lines found");
        return None;
    }

    debug!(lines = lines.len(), team_chat, "parsed alias script");
    Some(ParsedScript { lines, team_chat })
}

/// Recover the spoken lines of a generated alias script
///
/// See [`scan_alias_script`] for the chat scope as well.
#[must_use]
pub fn parse_alias_script(raw: &str) -> Option<LineList> {
    scan_alias_script(raw).map(|parsed| parsed.lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOP_SCRIPT: &str = "alias \"t0\" \"say gg ez; alias t t1;\";\n\
                               alias \"t1\" \"say you lost; alias t t0;\";\n\
                               alias \"t\" \"t0\";\n\
                               bind ins t;";

    #[test]
    fn test_plain_prose_rejected() {
        assert_eq!(parse_alias_script("just some chat"), None);
        assert_eq!(parse_alias_script(""), None);
    }

    #[test]
    fn test_master_alias_alone_rejected() {
        assert_eq!(parse_alias_script("alias \"t\" \"t0\";\nbind ins t;"), None);
    }

    #[test]
    fn test_generated_script_lines() {
        let parsed = scan_alias_script(LOOP_SCRIPT).unwrap();
        assert_eq!(parsed.lines.as_slice(), ["gg ez", "you lost"]);
        assert!(!parsed.team_chat);
    }

    #[test]
    fn test_team_chat_detected() {
        let script = LOOP_SCRIPT.replacen("\"say gg", "\"say_team gg", 1);
        let parsed = scan_alias_script(&script).unwrap();
        assert!(parsed.team_chat);
        assert_eq!(parsed.lines.as_slice(), ["gg ez", "you lost"]);
    }

    #[test]
    fn test_declaration_order_kept() {
        let script = "alias \"x1\" \"say second; alias x x0;\";\nalias \"x0\" \"say first; alias x x1;\";";
        assert_eq!(
            parse_alias_script(script).unwrap().as_slice(),
            ["second", "first"]
        );
    }

    #[test]
    fn test_tolerates_extra_whitespace_and_surrounding_text() {
        let script = "// my binds\nalias   \"a0\"\t\"say   hi there  ; alias a a0;\";\nbind f5 a;";
        assert_eq!(parse_alias_script(script).unwrap().as_slice(), ["hi there"]);
    }

    #[test]
    fn test_other_commands_ignored() {
        let script = "alias \"j\" \"+jump; wait; -jump;\";";
        assert_eq!(parse_alias_script(script), None);
    }

    #[test]
    fn test_blank_team_alias_does_not_set_team_chat() {
        let script = "alias \"t0\" \"say_team    ; alias t t1;\";\n\
                      alias \"t1\" \"say gg; alias t t0;\";";
        let parsed = scan_alias_script(script).unwrap();
        assert_eq!(parsed.lines.as_slice(), ["gg"]);
        assert!(!parsed.team_chat);
    }

    #[test]
    fn test_only_blank_payloads_rejected() {
        assert_eq!(scan_alias_script("alias \"t0\" \"say_team   ; alias t t0;\";"), None);
    }
}
