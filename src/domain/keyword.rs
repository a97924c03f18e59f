//! Service keywords
//!
//! A keyword names one deployable service (`user`, `fabric`, ...). Every
//! comparison against file names, paths and source lines is a
//! case-insensitive substring test, so the keyword keeps a lowercased copy
//! next to the text the user typed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum KeywordError {
    #[error("Keyword must not be empty")]
    Empty,

    #[error("Invalid keyword '{0}': must not contain path separators")]
    PathSeparator(String),

    #[error("Invalid keyword '{0}': must not start with '.'")]
    Hidden(String),
}

/// A service keyword used to select files and routes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword {
    raw: String,
    folded: String,
}

impl Keyword {
    /// Returns the keyword as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if `text` contains the keyword, ignoring case
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.folded)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Keyword {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeywordError::Empty);
        }
        // The keyword doubles as the BuildTarget directory name
        if s.contains('/') || s.contains('\\') {
            return Err(KeywordError::PathSeparator(s.to_string()));
        }
        // Dot names are reserved for the build root's own files (the lock file)
        if s.starts_with('.') {
            return Err(KeywordError::Hidden(s.to_string()));
        }

        Ok(Self {
            raw: s.to_string(),
            folded: s.to_lowercase(),
        })
    }
}

impl TryFrom<String> for Keyword {
    type Error = KeywordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.raw
    }
}
