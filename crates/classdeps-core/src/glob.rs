//! Class-name globs
//!
//! A deliberately small dialect over binary class names:
//!
//! - `*` matches one or more characters other than `.`
//! - `**` matches any sequence, dots included
//! - every other character, `.` and `$` included, matches itself
//!
//! The whole name must match. `com.foo.*` selects the classes of package
//! `com.foo` but not its sub-packages; `com.foo*.*$Event` selects every nested
//! `Event` class of a class in a package starting with `com.foo`.

use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlobError {
    #[error("empty class pattern")]
    Empty,
    #[error("invalid class pattern `{pattern}`: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled class-name pattern.
#[derive(Debug, Clone)]
pub struct ClassGlob {
    pattern: String,
    regex: Regex,
}

impl ClassGlob {
    pub fn compile(pattern: &str) -> Result<Self, GlobError> {
        if pattern.is_empty() {
            return Err(GlobError::Empty);
        }
        let regex = Regex::new(&translate(pattern)).map_err(|source| GlobError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// True when the pattern has no wildcard and therefore names exactly one class.
    pub fn is_literal(&self) -> bool {
        !self.pattern.contains('*')
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for ClassGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Translates a glob into an anchored regular expression. Each run of stars
/// is consumed pairwise first, so `***` becomes `**` followed by `*`.
fn translate(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2 + 8);
    regex.push_str("^(?:");

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            continue;
        }
        let mut stars = 1;
        while chars.next_if_eq(&'*').is_some() {
            stars += 1;
        }
        for _ in 0..stars / 2 {
            regex.push_str(".*");
        }
        if stars % 2 == 1 {
            regex.push_str("[^.]+");
        }
    }

    regex.push_str(")$");
    regex
}
