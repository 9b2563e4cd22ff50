//! Line-oriented parser for sectioned key/value text.

use super::Document;
use crate::error::ParseError;

/// Key most recently defined, for attaching continuation lines.
struct OpenEntry {
    section: String,
    key: String,
}

pub(super) fn parse(text: &str) -> Result<Document, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut doc = Document::new();
    let mut current: Option<String> = None;
    let mut open: Option<OpenEntry> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            open = None;
            continue;
        }
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if raw.starts_with(char::is_whitespace) {
            if let Some(entry) = &open {
                if let Some(value) = doc.section_mut(&entry.section).value_mut(&entry.key) {
                    value.push('\n');
                    value.push_str(line);
                }
                continue;
            }
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| ParseError::new(line_no, format!("malformed section header '{}'", line)))?;
            // A repeated header reopens the same section.
            doc.section_mut(name);
            current = Some(name.to_string());
            open = None;
            continue;
        }

        let section = current.as_deref().ok_or_else(|| {
            ParseError::new(line_no, "key/value pair outside of any section")
        })?;
        let (key, value) = split_entry(line)
            .ok_or_else(|| ParseError::new(line_no, format!("expected 'key = value', found '{}'", line)))?;
        if key.is_empty() {
            return Err(ParseError::new(line_no, "empty key"));
        }

        let entries = doc.section_mut(section);
        if entries.contains_key(key) {
            return Err(ParseError::new(
                line_no,
                format!("duplicate key '{}' in section [{}]", key, section),
            ));
        }
        entries.insert(key, value);
        open = Some(OpenEntry {
            section: section.to_string(),
            key: key.to_string(),
        });
    }

    Ok(doc)
}

/// Split at the first `=` or `:`, whichever comes first.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let at = line.find(['=', ':'])?;
    Some((line[..at].trim(), line[at + 1..].trim()))
}
