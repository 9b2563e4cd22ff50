//! Installation of the commented sample settings file.

use crate::error::{Result, UpdateError, WriteStage};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Contents of the sample settings file.
pub const SAMPLE_SETTINGS: &str = include_str!("../../samples/update-conf.conf");

/// Result of [`install_sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The sample was written.
    Installed,
    /// A file already exists at the destination and was left alone.
    AlreadyPresent,
    /// The destination directory is not writable by this user.
    NotWritable,
}

/// Write the sample settings file to `dest` unless something is already there.
///
/// An existing file is never overwritten. Lacking permission to create the
/// file is reported as [`InstallOutcome::NotWritable`] rather than an error,
/// so unprivileged installs can carry on without system-wide settings.
///
/// # Errors
///
/// Returns [`UpdateError::Write`] for any other I/O failure.
pub fn install_sample(dest: &Path) -> Result<InstallOutcome> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(dest) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %dest.display(), "settings file already present");
            return Ok(InstallOutcome::AlreadyPresent);
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            tracing::warn!(path = %dest.display(), "no permission to install sample settings");
            return Ok(InstallOutcome::NotWritable);
        }
        Err(e) => return Err(UpdateError::write(dest, WriteStage::Install, e)),
    };

    file.write_all(SAMPLE_SETTINGS.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| UpdateError::write(dest, WriteStage::Install, e))?;

    tracing::info!(path = %dest.display(), "installed sample settings");
    Ok(InstallOutcome::Installed)
}
