//! File-based document source.

use super::{DocumentSource, SourceDescriptor};
use crate::document::Document;
use crate::error::{ParseError, Result, UpdateError};
use std::fs;
use std::io;
use std::path::PathBuf;

/// File-based document source.
///
/// Reads a sectioned key/value file and parses it into a [`Document`].
///
/// # Examples
///
/// ```rust,no_run
/// use update_conf::sources::{DocumentSource, FileSource};
///
/// let source = FileSource::new("/etc/app.conf.d/10-local.conf", 1);
/// let doc = source.load()?;
/// # Ok::<(), update_conf::error::UpdateError>(())
/// ```
pub struct FileSource {
    descriptor: SourceDescriptor,
}

impl FileSource {
    /// Create a new file source with the given precedence rank.
    pub fn new(path: impl Into<PathBuf>, rank: usize) -> Self {
        Self {
            descriptor: SourceDescriptor::new(path, rank),
        }
    }

    /// Create the rank-0 source for a base file.
    pub fn base(path: impl Into<PathBuf>) -> Self {
        Self::new(path, 0)
    }

    fn read(&self) -> Result<String> {
        let path = self.descriptor.path();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => UpdateError::SourceMissing {
                path: path.to_path_buf(),
            },
            _ => UpdateError::unreadable(path, e),
        })?;

        String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            ParseError::new(line, "invalid UTF-8").at(path)
        })
    }
}

impl DocumentSource for FileSource {
    fn load(&self) -> Result<Document> {
        let text = self.read()?;
        let doc = Document::parse(&text).map_err(|e| e.at(self.descriptor.path()))?;
        tracing::debug!(
            source = %self.descriptor,
            sections = doc.len(),
            "loaded configuration source"
        );
        Ok(doc)
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }
}
