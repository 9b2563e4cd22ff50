//! Builder for constructing Updater instances.

use crate::core::{SourceLoader, Updater};
use crate::error::{Result, UpdateError};
use crate::sources::{DEFAULT_SNIPPET_SUFFIX, SnippetDir};
use crate::writer::{DEFAULT_BACKUP_SUFFIX, SafeWriter, WriteMode, WriteOptions};
use std::path::PathBuf;

/// Builder for constructing an [`Updater`].
///
/// Every path is supplied explicitly; nothing is read from fixed system
/// locations.
///
/// # Examples
///
/// ```rust,no_run
/// use update_conf::prelude::*;
///
/// # fn example() -> Result<()> {
/// let report = Updater::builder()
///     .with_base("/usr/share/app/app.conf")
///     .with_snippet_dir("/etc/app.conf.d")
///     .with_target("/etc/app.conf")
///     .build()?
///     .run()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UpdaterBuilder {
    base: Option<PathBuf>,
    snippet_dir: Option<PathBuf>,
    target: Option<PathBuf>,
    suffix: String,
    backup_suffix: String,
    mode: WriteMode,
}

impl UpdaterBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base: None,
            snippet_dir: None,
            target: None,
            suffix: DEFAULT_SNIPPET_SUFFIX.to_string(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            mode: WriteMode::Apply,
        }
    }

    /// Set the base file, the lowest-precedence source.
    pub fn with_base(mut self, path: impl Into<PathBuf>) -> Self {
        self.base = Some(path.into());
        self
    }

    /// Set the snippet directory.
    ///
    /// Defaults to the target path with `.d` appended.
    pub fn with_snippet_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.snippet_dir = Some(path.into());
        self
    }

    /// Set the live configuration file to maintain.
    pub fn with_target(mut self, path: impl Into<PathBuf>) -> Self {
        self.target = Some(path.into());
        self
    }

    /// Set the filename suffix that marks a snippet (default `.conf`).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the suffix appended to the target name for backups (default `.bak`).
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    /// Choose between applying changes and a dry run.
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the updater.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Settings`] if the base file or target is not
    /// set, or if the backup suffix is empty.
    pub fn build(self) -> Result<Updater> {
        let base = self
            .base
            .ok_or_else(|| UpdateError::Settings("base file not set".to_string()))?;
        let target = self
            .target
            .ok_or_else(|| UpdateError::Settings("target file not set".to_string()))?;
        if self.backup_suffix.is_empty() {
            return Err(UpdateError::Settings(
                "backup suffix must not be empty".to_string(),
            ));
        }

        let snippet_dir = self.snippet_dir.unwrap_or_else(|| default_snippet_dir(&target));
        let writer = SafeWriter::new(WriteOptions {
            mode: self.mode,
            backup_suffix: self.backup_suffix,
        });
        let snippets = SnippetDir::new(snippet_dir)
            .with_suffix(self.suffix)
            .excluding(writer.backup_path(&target))
            .excluding(&target);
        let loader = SourceLoader::new(base).with_snippets(snippets);

        Ok(Updater::new(loader, writer, target))
    }
}

impl Default for UpdaterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Updater {
    /// Create a new builder for constructing an updater.
    pub fn builder() -> UpdaterBuilder {
        UpdaterBuilder::new()
    }
}

/// `<target>.d`, the conventional snippet directory for a target.
pub fn default_snippet_dir(target: &std::path::Path) -> PathBuf {
    let mut dir = target.as_os_str().to_owned();
    dir.push(".d");
    PathBuf::from(dir)
}
