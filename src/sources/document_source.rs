//! Document source trait and source descriptors.

use crate::document::Document;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a document came from and how strongly it overrides others.
///
/// The base file has rank 0; snippets are ranked 1.. in ascending filename
/// order. Higher rank wins on conflicting keys. Descriptors order by rank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceDescriptor {
    rank: usize,
    path: PathBuf,
}

impl SourceDescriptor {
    /// Describe a source at `path` with the given precedence rank.
    pub fn new(path: impl Into<PathBuf>, rank: usize) -> Self {
        Self {
            rank,
            path: path.into(),
        }
    }

    /// Filesystem path of the source.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Precedence rank; 0 is the base file.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether this describes the base file.
    pub fn is_base(&self) -> bool {
        self.rank == 0
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rank {})", self.path.display(), self.rank)
    }
}

/// Trait for configuration document sources.
///
/// Sources are read-only: loading never writes back to where the document
/// came from.
pub trait DocumentSource {
    /// Load and parse the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing, unreadable, or malformed.
    fn load(&self) -> Result<Document>;

    /// Descriptor identifying this source and its precedence.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String {
        self.descriptor().path().display().to_string()
    }
}
