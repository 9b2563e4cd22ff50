//! Error types for update-conf.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for update-conf operations.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur while loading, merging, or installing configuration.
///
/// Every variant is fatal. Nothing is retried and nothing is skipped: a
/// partial merge or a half-installed target is never produced.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// The required base file does not exist.
    #[error("Base configuration file not found: {}", .path.display())]
    SourceMissing {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// A source file or the snippet directory could not be read.
    #[error("Failed to read source {}: {source}", .path.display())]
    SourceUnreadable {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// A source file is structurally invalid.
    #[error("Failed to parse {}:{line}: {message}", .path.display())]
    Parse {
        /// File containing the bad line
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// Backing up, staging, or committing the target failed.
    #[error("Failed to {stage} for {}: {source}", .path.display())]
    Write {
        /// Path being written when the failure happened
        path: PathBuf,
        /// Which step of the safe-write protocol failed
        stage: WriteStage,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// No backup exists to restore from.
    #[error("No backup found at {}", .path.display())]
    BackupMissing {
        /// Expected backup path
        path: PathBuf,
    },

    /// The tool's own settings could not be loaded or are incomplete.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// The requested profile is not defined in the settings file.
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

impl UpdateError {
    /// Exit status the command-line front-end should report for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }

    pub(crate) fn write(path: impl Into<PathBuf>, stage: WriteStage, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            stage,
            source,
        }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            source,
        }
    }
}

/// Step of the safe-write protocol at which a [`UpdateError::Write`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Reading the current target content
    ReadTarget,
    /// Copying the current target to its backup path
    Backup,
    /// Writing the temporary file next to the target
    StageTemp,
    /// Renaming the temporary file over the target
    Commit,
    /// Restoring permission bits or ownership
    Metadata,
    /// Reinstating the backup over the target
    Restore,
    /// Copying the sample settings file into place
    Install,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Self::ReadTarget => "read current target",
            Self::Backup => "create backup",
            Self::StageTemp => "write temporary file",
            Self::Commit => "rename temporary file over target",
            Self::Metadata => "restore file permissions",
            Self::Restore => "restore backup",
            Self::Install => "install sample settings",
        };
        f.write_str(action)
    }
}

/// Structural error found while parsing configuration text.
///
/// Carries no path since [`crate::document::Document::parse`] works on text;
/// file-backed sources attach the path when converting into [`UpdateError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    /// What was wrong with the line
    pub message: String,
}

impl ParseError {
    /// Create a parse error for the given line.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Attach the path of the file the text came from.
    pub fn at(self, path: impl Into<PathBuf>) -> UpdateError {
        UpdateError::Parse {
            path: path.into(),
            line: self.line,
            message: self.message,
        }
    }
}

impl From<config::ConfigError> for UpdateError {
    fn from(err: config::ConfigError) -> Self {
        UpdateError::Settings(err.to_string())
    }
}
