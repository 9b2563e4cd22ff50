//! Snippet directory discovery.

use crate::error::{Result, UpdateError};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::PathBuf;

/// File suffix recognised as a configuration snippet by default.
pub const DEFAULT_SNIPPET_SUFFIX: &str = ".conf";

/// A directory of override snippets.
///
/// Only regular files ending with the configured suffix are picked up.
/// Hidden files and editor backups (`name~`) are skipped. The result is
/// sorted by raw filename bytes, which is the precedence order.
///
/// # Examples
///
/// ```rust,no_run
/// use update_conf::sources::SnippetDir;
///
/// let snippets = SnippetDir::new("/etc/app.conf.d").discover()?;
/// # Ok::<(), update_conf::error::UpdateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SnippetDir {
    path: PathBuf,
    suffix: String,
    excluded: Vec<PathBuf>,
}

impl SnippetDir {
    /// Snippet directory using the default `.conf` suffix.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            suffix: DEFAULT_SNIPPET_SUFFIX.to_string(),
            excluded: Vec::new(),
        }
    }

    /// Use a different snippet suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Never pick up `path`, even if it matches.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    /// List matching snippet files in precedence order.
    ///
    /// A missing directory yields no snippets.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::SourceUnreadable`] if the directory exists but
    /// cannot be listed.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.path.display(), "snippet directory absent");
                return Ok(Vec::new());
            }
            Err(e) => return Err(UpdateError::unreadable(&self.path, e)),
        };

        let mut found: Vec<(OsString, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| UpdateError::unreadable(&self.path, e))?;
            let name = entry.file_name();
            let path = entry.path();

            if !self.matches_name(&name) || self.excluded.contains(&path) {
                tracing::debug!(file = %path.display(), "ignoring non-snippet file");
                continue;
            }
            // Follows symlinks so a linked snippet counts as a regular file.
            let metadata = fs::metadata(&path).map_err(|e| UpdateError::unreadable(&path, e))?;
            if !metadata.is_file() {
                tracing::debug!(file = %path.display(), "ignoring non-regular file");
                continue;
            }
            found.push((name, path));
        }

        found.sort_by(|a, b| a.0.as_encoded_bytes().cmp(b.0.as_encoded_bytes()));
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    fn matches_name(&self, name: &OsStr) -> bool {
        let bytes = name.as_encoded_bytes();
        !bytes.starts_with(b".") && !bytes.ends_with(b"~") && bytes.ends_with(self.suffix.as_bytes())
    }
}
