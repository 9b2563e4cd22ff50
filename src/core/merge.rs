//! Merge engine folding an ordered chain of documents into one.
//!
//! Merge semantics:
//! - Sections and keys keep the position where they were first introduced
//! - Values come from the last document that set them
//! - Sections are never removed, even if a later document declares one empty

use crate::core::LoadedSource;
use crate::document::Document;
use crate::sources::SourceDescriptor;
use indexmap::IndexMap;
use serde::Serialize;

/// Which source set the final value of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Section name
    pub section: String,
    /// Key within the section
    pub key: String,
    /// Source that last set the value
    pub source: SourceDescriptor,
}

/// The merged document and, for each key, the source that last set it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeResult {
    document: Document,
    origins: IndexMap<String, IndexMap<String, SourceDescriptor>>,
}

impl MergeResult {
    /// The merged document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take ownership of the merged document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Source that last set `section.key`.
    pub fn origin(&self, section: &str, key: &str) -> Option<&SourceDescriptor> {
        self.origins.get(section).and_then(|keys| keys.get(key))
    }

    /// Provenance for every key, in document order.
    pub fn provenance(&self) -> Vec<Provenance> {
        let mut entries = Vec::new();
        for (section_name, section) in self.document.sections() {
            for key in section.keys() {
                if let Some(source) = self.origin(section_name, key) {
                    entries.push(Provenance {
                        section: section_name.to_string(),
                        key: key.to_string(),
                        source: source.clone(),
                    });
                }
            }
        }
        entries
    }

    fn absorb(&mut self, descriptor: &SourceDescriptor, document: &Document) {
        fold(&mut self.document, document, |section, key| {
            self.origins
                .entry(section.to_string())
                .or_default()
                .insert(key.to_string(), descriptor.clone());
        });
    }
}

/// Stateless merge operations.
pub struct MergeEngine;

impl MergeEngine {
    /// Merge documents in order; later documents win on conflicting keys.
    ///
    /// An empty chain yields an empty document.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use update_conf::core::MergeEngine;
    /// use update_conf::document::Document;
    ///
    /// let base = Document::parse("[sec]\na = 1\nb = 2\n").unwrap();
    /// let local = Document::parse("[sec]\nb = 9\n").unwrap();
    ///
    /// let merged = MergeEngine::merge([&base, &local]);
    /// assert_eq!(merged.render(), "[sec]\na = 1\nb = 9\n");
    /// ```
    pub fn merge<'a, I>(documents: I) -> Document
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut result = Document::new();
        for document in documents {
            fold(&mut result, document, |_, _| {});
        }
        result
    }

    /// Merge loaded sources in order, recording which source set each key.
    pub fn merge_sources(sources: &[LoadedSource]) -> MergeResult {
        let mut result = MergeResult::default();
        for source in sources {
            result.absorb(&source.descriptor, &source.document);
        }
        result
    }
}

/// Apply `layer` on top of `result`, calling `on_set` for each key written.
fn fold(result: &mut Document, layer: &Document, mut on_set: impl FnMut(&str, &str)) {
    for (name, section) in layer.sections() {
        let merged = result.section_mut(name);
        for (key, value) in section.iter() {
            // IndexMap::insert keeps the slot of an existing key.
            merged.insert(key, value);
            on_set(name, key);
        }
    }
}
