//! In-memory model of sectioned key/value configuration.
//!
//! A [`Document`] is an ordered map of section names to [`Section`]s, and each
//! section is an ordered map of keys to string values. Order is the order of
//! first insertion; updating an existing key changes its value but never its
//! position.

mod parser;

use crate::error::ParseError;
use indexmap::IndexMap;
use std::fmt;

/// Indentation written before continuation lines of multi-line values.
const CONTINUATION_INDENT: &str = "    ";

/// An ordered set of `key = value` entries under one `[section]` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: IndexMap<String, String>,
}

impl Section {
    /// Create an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a key, returning the previous value if there was one.
    ///
    /// A new key is appended at the end; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Whether the section defines `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the section has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn value_mut(&mut self, key: &str) -> Option<&mut String> {
        self.entries.get_mut(key)
    }
}

impl<K, V> FromIterator<(K, V)> for Section
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut section = Section::new();
        for (key, value) in iter {
            section.insert(key, value);
        }
        section
    }
}

/// A parsed configuration source or a merge result.
///
/// # Examples
///
/// ```rust
/// use update_conf::document::Document;
///
/// let doc = Document::parse("[server]\nport = 8080\nhost: localhost\n").unwrap();
/// assert_eq!(doc.get("server", "port"), Some("8080"));
/// assert_eq!(doc.to_string(), "[server]\nport = 8080\nhost = localhost\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: IndexMap<String, Section>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text.
    ///
    /// Accepts `[section]` headers, `key = value` and `key: value` entries,
    /// `#`/`;` comment lines, blank lines, and indented continuation lines.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for an entry outside any section, a malformed
    /// header or entry, or a key defined twice in the same section.
    pub fn parse(text: &str) -> std::result::Result<Self, ParseError> {
        parser::parse(text)
    }

    /// Render in canonical form: one `key = value` per line, a blank line
    /// between sections, and a trailing newline.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Get a section for modification, appending an empty one if absent.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_string()).or_default()
    }

    /// Look up a single value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    /// Set a single value, creating the section if needed.
    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.section_mut(section).insert(key, value);
    }

    /// Iterate over sections in order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, s)| (name.as_str(), s))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, section)) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", name)?;
            for (key, value) in section.iter() {
                let mut lines = value.split('\n');
                match lines.next() {
                    Some(first) if !first.is_empty() => writeln!(f, "{} = {}", key, first)?,
                    _ => writeln!(f, "{} =", key)?,
                }
                for line in lines {
                    writeln!(f, "{}{}", CONTINUATION_INDENT, line)?;
                }
            }
        }
        Ok(())
    }
}
