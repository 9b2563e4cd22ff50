//! Permission and ownership capture for files replaced by the writer.

use crate::error::{Result, UpdateError, WriteStage};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

/// Mode given to a target created from scratch.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Permission bits and ownership of an existing file.
#[derive(Debug, Clone)]
pub(crate) struct FileAttributes {
    permissions: fs::Permissions,
    #[cfg(unix)]
    uid: u32,
    #[cfg(unix)]
    gid: u32,
}

impl FileAttributes {
    pub(crate) fn capture(metadata: &Metadata) -> Self {
        #[cfg(unix)]
        use std::os::unix::fs::MetadataExt;

        Self {
            permissions: metadata.permissions(),
            #[cfg(unix)]
            uid: metadata.uid(),
            #[cfg(unix)]
            gid: metadata.gid(),
        }
    }

    /// Apply ownership, then permission bits, to `file`.
    ///
    /// Ownership is best effort: without privilege to chown, the new file
    /// keeps the process owner and a warning is logged.
    pub(crate) fn apply(&self, file: &File, path: &Path) -> Result<()> {
        #[cfg(unix)]
        if let Err(e) = std::os::unix::fs::fchown(file, Some(self.uid), Some(self.gid)) {
            if e.kind() != io::ErrorKind::PermissionDenied {
                return Err(UpdateError::write(path, WriteStage::Metadata, e));
            }
            tracing::warn!(
                file = %path.display(),
                uid = self.uid,
                gid = self.gid,
                "insufficient privilege to restore ownership"
            );
        }

        file.set_permissions(self.permissions.clone())
            .map_err(|e| UpdateError::write(path, WriteStage::Metadata, e))
    }
}

/// Permissions for a file that did not exist before, where the platform has
/// a notion of mode bits.
pub(crate) fn new_file_permissions() -> Option<fs::Permissions> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(fs::Permissions::from_mode(NEW_FILE_MODE))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_apply_copies_mode() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("original");
        let copy = temp_dir.path().join("copy");
        fs::write(&original, "a").unwrap();
        fs::write(&copy, "b").unwrap();
        fs::set_permissions(&original, fs::Permissions::from_mode(0o640)).unwrap();

        let attributes = FileAttributes::capture(&fs::metadata(&original).unwrap());
        let file = File::open(&copy).unwrap();
        attributes.apply(&file, &copy).unwrap();

        let mode = fs::metadata(&copy).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_new_file_mode() {
        assert_eq!(new_file_permissions().unwrap().mode() & 0o777, 0o644);
    }
}
