use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reference to a document inside a wiki, written `Space.Page`.
///
/// Serializes as its string form so persisted sheet bindings stay readable.
/// Dots and backslashes in the page name are escaped with `\`, so
/// `Sheet.v2` in space `XWiki` is written `XWiki.Sheet\.v2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalReference {
    /// Space (first segment) holding the page.
    pub space: String,
    /// Page name within the space.
    pub page: String,
}

impl LocalReference {
    /// Builds a reference from its two segments.
    #[must_use]
    pub fn new(space: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            page: page.into(),
        }
    }
}

impl fmt::Display for LocalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.", self.space)?;
        for c in self.page.chars() {
            if matches!(c, '.' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(c)?;
        }
        Ok(())
    }
}

/// Error returned when a string is not a `Space.Page` reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid document reference {input:?}: expected `Space.Page`")]
pub struct ParseReferenceError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for LocalReference {
    type Err = ParseReferenceError;

    /// Splits on the last unescaped `.` so dotted spaces (`Main.Sub.Page`)
    /// keep their nesting.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = None;
        let mut escaped = false;
        for (i, c) in s.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '.' => split = Some(i),
                _ => {}
            }
        }
        match split {
            Some(i) if i > 0 && i + 1 < s.len() => Ok(Self::new(&s[..i], unescape(&s[i + 1..]))),
            _ => Err(ParseReferenceError {
                input: s.to_string(),
            }),
        }
    }
}

fn unescape(page: &str) -> String {
    let mut out = String::with_capacity(page.len());
    let mut chars = page.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

impl TryFrom<String> for LocalReference {
    type Error = ParseReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LocalReference> for String {
    fn from(reference: LocalReference) -> Self {
        reference.to_string()
    }
}

/// Fully qualified reference: a [`LocalReference`] scoped to one wiki.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentReference {
    /// Identifier of the wiki holding the document.
    pub wiki: String,
    /// Location of the document inside the wiki.
    pub local: LocalReference,
}

impl DocumentReference {
    #[must_use]
    pub fn new(wiki: impl Into<String>, local: LocalReference) -> Self {
        Self {
            wiki: wiki.into(),
            local,
        }
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.wiki, self.local)
    }
}
