//! # update-conf
//!
//! Build a live configuration file from a base file plus a directory of
//! override snippets, and install it atomically.
//!
//! ## Overview
//!
//! `update-conf` keeps a system configuration file in sync with its inputs:
//! - A base file shipped with the software (lowest precedence)
//! - Snippet files dropped into `<target>.d/` by packages or admins, applied
//!   in bytewise filename order
//! - A target file that is only ever replaced by an atomic rename, after the
//!   previous content has been backed up
//!
//! Values from later sources override earlier ones, while sections and keys
//! keep the position where they first appeared. Re-running with unchanged
//! inputs leaves the target untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use update_conf::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let report = Updater::builder()
//!     .with_base("/usr/share/php/php.ini-production")
//!     .with_snippet_dir("/etc/php/conf.d")
//!     .with_suffix(".ini")
//!     .with_target("/etc/php/php.ini")
//!     .build()?
//!     .run()?;
//!
//! match report.outcome {
//!     WriteOutcome::NoOp => println!("already up to date"),
//!     WriteOutcome::Written { created, .. } => println!("written (new file: {})", created),
//!     WriteOutcome::WouldWrite { .. } => unreachable!("not a dry run"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Working with documents directly
//!
//! ```rust
//! use update_conf::prelude::*;
//!
//! let base = Document::parse("[db]\nhost = localhost\nport = 5432\n").unwrap();
//! let local = Document::parse("[db]\nport = 6543\n").unwrap();
//!
//! let merged = MergeEngine::merge([&base, &local]);
//! assert_eq!(merged.get("db", "port"), Some("6543"));
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod document;
pub mod error;
pub mod logging;
pub mod report;
pub mod settings;
pub mod sources;
pub mod writer;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{MergeEngine, RunReport, Updater, UpdaterBuilder};
    pub use crate::document::Document;
    pub use crate::error::{Result, UpdateError};
    pub use crate::writer::{WriteMode, WriteOutcome};
}
