//! Backup-then-atomic-rename installation of the merged document.

use super::attributes::{FileAttributes, new_file_permissions};
use crate::document::Document;
use crate::error::{Result, UpdateError, WriteStage};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Suffix appended to the target filename to form its backup path.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// Whether the writer may touch the filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Back up and replace the target when the content changes.
    #[default]
    Apply,
    /// Only compare; report what would be written.
    DryRun,
}

/// Options controlling the safe writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Apply or dry-run
    pub mode: WriteMode,
    /// Suffix appended to the target filename for the backup copy
    pub backup_suffix: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            mode: WriteMode::Apply,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

/// Result of applying a document to the target path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The target already holds exactly the rendered content.
    NoOp,
    /// The target was replaced.
    Written {
        /// The target did not exist before
        created: bool,
        /// Backup of the previous content, if there was any
        backup: Option<PathBuf>,
    },
    /// Dry run: the target would be replaced.
    WouldWrite {
        /// The target does not exist yet
        created: bool,
        /// Current target content (empty if absent)
        current: String,
        /// Content that would be installed
        rendered: String,
    },
}

impl WriteOutcome {
    /// Whether the target differs (or differed) from the rendered content.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

/// Installs rendered documents at a target path without risking partial state.
///
/// The protocol is: compare, back up the current target, write a temporary
/// file in the target's directory, then rename it over the target. The rename
/// is the only commit point; a failure or interruption before it leaves the
/// target as it was.
///
/// # Examples
///
/// ```rust,no_run
/// use update_conf::document::Document;
/// use update_conf::writer::{SafeWriter, WriteOptions};
///
/// let doc = Document::parse("[server]\nport = 8080\n").unwrap();
/// let outcome = SafeWriter::new(WriteOptions::default()).apply("/etc/app.conf", &doc)?;
/// println!("changed: {}", outcome.is_change());
/// # Ok::<(), update_conf::error::UpdateError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SafeWriter {
    options: WriteOptions,
}

impl SafeWriter {
    /// Create a writer with the given options.
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Backup path for `target`: same directory, suffix appended to the name.
    pub fn backup_path(&self, target: impl AsRef<Path>) -> PathBuf {
        let mut name: OsString = target.as_ref().as_os_str().to_owned();
        name.push(&self.options.backup_suffix);
        PathBuf::from(name)
    }

    /// Render `document` and install it at `target` if it differs.
    ///
    /// In dry-run mode only the current target is read.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Write`] if the target cannot be read, backed up,
    /// staged, or committed. The target is unchanged on error.
    pub fn apply(&self, target: impl AsRef<Path>, document: &Document) -> Result<WriteOutcome> {
        let target = target.as_ref();
        let rendered = document.render();
        let current = read_current(target)?;

        let existing = current.as_deref().unwrap_or_default();
        if existing == rendered.as_bytes() {
            tracing::info!(path = %target.display(), "target is up to date");
            return Ok(WriteOutcome::NoOp);
        }

        let created = current.is_none();
        if self.options.mode == WriteMode::DryRun {
            tracing::info!(path = %target.display(), created, "dry run: target would change");
            return Ok(WriteOutcome::WouldWrite {
                created,
                current: String::from_utf8_lossy(existing).into_owned(),
                rendered,
            });
        }

        let staged = self.stage_rendered(target, &rendered, current.as_deref())?;
        let backup = staged.backup().map(Path::to_path_buf);
        staged.commit()?;

        if created {
            tracing::info!(path = %target.display(), "created target");
        } else {
            tracing::info!(path = %target.display(), "updated target");
        }
        Ok(WriteOutcome::Written { created, backup })
    }

    /// Back up the target and write `document` to a temporary file beside it,
    /// without committing.
    ///
    /// Nothing is visible at `target` until [`StagedWrite::commit`]. Dropping
    /// the returned value discards the temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Write`] if the backup or temporary file cannot
    /// be written.
    pub fn stage(&self, target: impl AsRef<Path>, document: &Document) -> Result<StagedWrite> {
        let target = target.as_ref();
        let current = read_current(target)?;
        self.stage_rendered(target, &document.render(), current.as_deref())
    }

    /// Reinstate the backup over the target.
    ///
    /// The backup file is left in place.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::BackupMissing`] if there is no backup, or
    /// [`UpdateError::Write`] if it cannot be installed.
    pub fn restore(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        let backup = self.backup_path(target);

        let content = match fs::read(&backup) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(UpdateError::BackupMissing { path: backup });
            }
            Err(e) => return Err(UpdateError::write(&backup, WriteStage::Restore, e)),
        };
        let attributes = fs::metadata(&backup)
            .map(|m| FileAttributes::capture(&m))
            .map_err(|e| UpdateError::write(&backup, WriteStage::Restore, e))?;

        let dest = resolve_link(target)?;
        let temp = write_temp(&dest, &content, Some(&attributes))?;
        persist(temp, &dest)?;
        tracing::info!(path = %target.display(), backup = %backup.display(), "restored backup");
        Ok(())
    }

    fn stage_rendered(
        &self,
        target: &Path,
        rendered: &str,
        current: Option<&[u8]>,
    ) -> Result<StagedWrite> {
        let dest = resolve_link(target)?;
        let attributes = match current {
            Some(_) => Some(
                fs::metadata(&dest)
                    .map(|m| FileAttributes::capture(&m))
                    .map_err(|e| UpdateError::write(target, WriteStage::ReadTarget, e))?,
            ),
            None => None,
        };

        // The backup must be in place before anything replaces the target.
        let backup = match (current, &attributes) {
            (Some(content), Some(attributes)) => {
                let backup = self.backup_path(target);
                let temp = write_temp(&backup, content, Some(attributes))
                    .map_err(|e| retag(e, WriteStage::Backup))?;
                temp.persist(&backup)
                    .map_err(|e| UpdateError::write(&backup, WriteStage::Backup, e.error))?;
                tracing::debug!(backup = %backup.display(), "backed up target");
                Some(backup)
            }
            _ => None,
        };

        let temp = write_temp(&dest, rendered.as_bytes(), attributes.as_ref())?;
        Ok(StagedWrite {
            temp,
            target: dest,
            backup,
        })
    }
}

/// A fully written temporary file waiting to be renamed over the target.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
    backup: Option<PathBuf>,
}

impl StagedWrite {
    /// Path of the temporary file.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Backup taken before staging, if the target existed.
    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Atomically rename the temporary file over the target.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Write`] if the rename fails; the target is
    /// unchanged and the temporary file is removed.
    pub fn commit(self) -> Result<()> {
        persist(self.temp, &self.target)
    }
}

/// Current target bytes, or `None` if there is no target yet.
fn read_current(target: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(target) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(UpdateError::write(target, WriteStage::ReadTarget, e)),
    }
}

/// File the target's content lives in.
///
/// A symlinked target is followed, so the rename replaces the linked file and
/// the link itself stays in place. A dangling link resolves to where it points.
fn resolve_link(target: &Path) -> Result<PathBuf> {
    let is_link = fs::symlink_metadata(target)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return Ok(target.to_path_buf());
    }

    let read_target = |e: io::Error| UpdateError::write(target, WriteStage::ReadTarget, e);
    match fs::canonicalize(target) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let link = fs::read_link(target).map_err(read_target)?;
            Ok(match target.parent() {
                Some(parent) => parent.join(link),
                None => link,
            })
        }
        Err(e) => Err(read_target(e)),
    }
}

/// Write `content` to a hidden temporary file in the directory of `dest`.
fn write_temp(
    dest: &Path,
    content: &[u8],
    attributes: Option<&FileAttributes>,
) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut prefix = OsString::from(".");
    if let Some(name) = dest.file_name() {
        prefix.push(name);
    }
    prefix.push(".");

    let stage = |e: io::Error| UpdateError::write(dest, WriteStage::StageTemp, e);
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(stage)?;

    temp.write_all(content).map_err(stage)?;
    temp.as_file().sync_all().map_err(stage)?;
    match (attributes, new_file_permissions()) {
        (Some(attributes), _) => attributes.apply(temp.as_file(), dest)?,
        (None, Some(permissions)) => temp
            .as_file()
            .set_permissions(permissions)
            .map_err(|e| UpdateError::write(dest, WriteStage::Metadata, e))?,
        (None, None) => {}
    }
    Ok(temp)
}

fn persist(temp: NamedTempFile, target: &Path) -> Result<()> {
    temp.persist(target)
        .map(|_| ())
        .map_err(|e| UpdateError::write(target, WriteStage::Commit, e.error))
}

fn retag(err: UpdateError, stage: WriteStage) -> UpdateError {
    match err {
        UpdateError::Write { path, source, .. } => UpdateError::Write {
            path,
            stage,
            source,
        },
        other => other,
    }
}
