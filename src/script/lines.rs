const LINE_BREAKS: [char; 2] = ['\n', '\r'];

/// Ordered, non-empty, trimmed lines of chat text
///
/// The order is the cycle order of the generated alias chain. Every entry is
/// trimmed and no entry is empty, which holds for all constructors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineList(Vec<String>);

impl LineList {
    /// Builds a list from lines, trimming each and dropping blanks
    ///
    /// Entries that still contain `\n` or `\r` are split further, so no line
    /// can carry a line break into a script.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            lines
                .into_iter()
                .flat_map(|entry| {
                    entry
                        .as_ref()
                        .split(LINE_BREAKS)
                        .map(|line| line.trim().to_owned())
                        .collect::<Vec<_>>()
                })
                .filter(|line| !line.is_empty())
                .collect(),
        )
    }

    /// Splits raw multi-line input on LF, CRLF or bare CR line endings
    #[must_use]
    pub fn from_text(raw: &str) -> Self {
        Self::new([raw])
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there is nothing to generate
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate lines in cycle order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Borrow the lines as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Lines joined back into editable text
    #[must_use]
    pub fn to_text(&self) -> String {
        self.0.join("\n")
    }
}

impl<'a> IntoIterator for &'a LineList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
