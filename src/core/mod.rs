//! Core merge-and-install pipeline.

mod builder;
mod loader;
mod merge;
mod updater;

pub use builder::{UpdaterBuilder, default_snippet_dir};
pub use loader::{LoadedSource, SourceLoader};
pub use merge::{MergeEngine, MergeResult, Provenance};
pub use updater::{RunReport, Updater};
