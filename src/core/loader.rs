//! Source loader that reads the base file and its snippets in precedence order.

use crate::document::Document;
use crate::error::Result;
use crate::sources::{DocumentSource, FileSource, SnippetDir, SourceDescriptor};
use std::path::PathBuf;

/// A parsed source together with its descriptor.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// Where the document came from
    pub descriptor: SourceDescriptor,
    /// The parsed document
    pub document: Document,
}

/// Loads the base file and snippets as an ordered chain of documents.
///
/// The chain is `[base, snippet_1, ..., snippet_n]`, where snippets follow
/// ascending filename order. Later documents override earlier ones.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    base: PathBuf,
    snippets: Option<SnippetDir>,
}

impl SourceLoader {
    /// Create a loader for a base file with no snippets.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            snippets: None,
        }
    }

    /// Add a snippet directory whose files override the base file.
    pub fn with_snippets(mut self, snippets: SnippetDir) -> Self {
        self.snippets = Some(snippets);
        self
    }

    /// Build the ordered list of sources without reading them.
    ///
    /// # Errors
    ///
    /// Returns an error if the snippet directory exists but cannot be listed.
    pub fn sources(&self) -> Result<Vec<FileSource>> {
        let mut sources = vec![FileSource::base(&self.base)];
        sources.extend(self.snippet_sources()?);
        Ok(sources)
    }

    /// Read and parse every source in precedence order.
    ///
    /// Fails on the first source that is missing, unreadable, or malformed;
    /// a partial chain is never returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base file does not exist
    /// - Any source cannot be read
    /// - Any source fails to parse
    pub fn load(&self) -> Result<Vec<LoadedSource>> {
        // Base first: a missing base outranks a broken snippet directory.
        let base = FileSource::base(&self.base);
        let mut loaded = vec![LoadedSource {
            document: base.load()?,
            descriptor: base.descriptor().clone(),
        }];

        for source in self.snippet_sources()? {
            let document = source.load()?;
            loaded.push(LoadedSource {
                descriptor: source.descriptor().clone(),
                document,
            });
        }

        tracing::debug!(
            base = %self.base.display(),
            snippets = loaded.len() - 1,
            "loaded source chain"
        );
        Ok(loaded)
    }

    /// Get the list of source names in precedence order.
    pub fn source_names(&self) -> Result<Vec<String>> {
        Ok(self.sources()?.iter().map(|s| s.name()).collect())
    }

    fn snippet_sources(&self) -> Result<Vec<FileSource>> {
        let Some(snippets) = &self.snippets else {
            return Ok(Vec::new());
        };
        Ok(snippets
            .discover()?
            .into_iter()
            .enumerate()
            .map(|(index, path)| FileSource::new(path, index + 1))
            .collect())
    }
}
