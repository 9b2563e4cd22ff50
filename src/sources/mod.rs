//! Configuration source implementations.

mod document_source;
mod file;
mod snippets;

pub use document_source::{DocumentSource, SourceDescriptor};
pub use file::FileSource;
pub use snippets::{DEFAULT_SNIPPET_SUFFIX, SnippetDir};
