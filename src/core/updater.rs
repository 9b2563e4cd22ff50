//! The update pipeline: load sources, merge, and install the result.

use crate::core::{MergeEngine, MergeResult, Provenance, SourceLoader};
use crate::error::{Result, UpdateError};
use crate::report::DiffReport;
use crate::sources::SourceDescriptor;
use crate::writer::{SafeWriter, WriteMode, WriteOutcome};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What one run did, or would do in a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Target path
    pub target: PathBuf,
    /// Sources merged, in precedence order
    pub sources: Vec<SourceDescriptor>,
    /// Result of the write step
    pub outcome: WriteOutcome,
    /// Which source set each key of the result
    pub provenance: Vec<Provenance>,
}

impl RunReport {
    /// Unified diff between the current and proposed target, for dry runs
    /// that found a difference.
    pub fn diff(&self) -> Option<DiffReport<'_>> {
        match &self.outcome {
            WriteOutcome::WouldWrite {
                current, rendered, ..
            } => {
                let label = self.target.display().to_string();
                let merged_label = format!("{} (merged)", label);
                Some(DiffReport::new(current, rendered).with_labels(label, merged_label))
            }
            _ => None,
        }
    }
}

/// Merges a base file and its snippets and installs the result at a target.
///
/// One updater manages exactly one target. Runs are synchronous and hold no
/// lock on the target; concurrent runs against the same target race, with
/// the last rename winning.
///
/// # Examples
///
/// ```rust,no_run
/// use update_conf::prelude::*;
///
/// # fn example() -> Result<()> {
/// let updater = Updater::builder()
///     .with_base("/usr/share/app/app.conf")
///     .with_target("/etc/app.conf")
///     .with_mode(WriteMode::DryRun)
///     .build()?;
///
/// let report = updater.run()?;
/// if let Some(diff) = report.diff() {
///     print!("{}", diff);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Updater {
    loader: SourceLoader,
    writer: SafeWriter,
    target: PathBuf,
}

impl Updater {
    pub(crate) fn new(loader: SourceLoader, writer: SafeWriter, target: PathBuf) -> Self {
        Self {
            loader,
            writer,
            target,
        }
    }

    /// The target path.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Where the previous target content is saved before a write.
    pub fn backup_path(&self) -> PathBuf {
        self.writer.backup_path(&self.target)
    }

    /// Apply or dry run.
    pub fn mode(&self) -> WriteMode {
        self.writer.options().mode
    }

    /// Load and merge every source without touching the target.
    ///
    /// # Errors
    ///
    /// Returns an error if any source is missing, unreadable, or malformed,
    /// or if the target is itself one of the sources.
    pub fn merge(&self) -> Result<MergeResult> {
        self.load_and_merge().map(|(_, merged)| merged)
    }

    /// Merge all sources and install the result.
    ///
    /// In dry-run mode the target is only read.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, merging, or writing fails. Nothing is
    /// written when loading or merging fails.
    pub fn run(&self) -> Result<RunReport> {
        let (sources, merged) = self.load_and_merge()?;
        let outcome = self.writer.apply(&self.target, merged.document())?;
        Ok(RunReport {
            target: self.target.clone(),
            sources,
            outcome,
            provenance: merged.provenance(),
        })
    }

    /// Put the backup taken by the last write back in place.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no backup or it cannot be installed.
    pub fn restore(&self) -> Result<()> {
        self.writer.restore(&self.target)
    }

    fn load_and_merge(&self) -> Result<(Vec<SourceDescriptor>, MergeResult)> {
        let sources = self.loader.load()?;
        if let Some(source) = sources
            .iter()
            .find(|s| same_file(s.descriptor.path(), &self.target))
        {
            return Err(UpdateError::Settings(format!(
                "target {} is also a source; sources are never overwritten",
                source.descriptor.path().display()
            )));
        }

        let merged = MergeEngine::merge_sources(&sources);
        let descriptors = sources.into_iter().map(|s| s.descriptor).collect();
        Ok((descriptors, merged))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
