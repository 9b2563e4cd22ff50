//! Safe installation of the merged document at the target path.

mod attributes;
mod safe_writer;

pub use safe_writer::{
    DEFAULT_BACKUP_SUFFIX, SafeWriter, StagedWrite, WriteMode, WriteOptions, WriteOutcome,
};
