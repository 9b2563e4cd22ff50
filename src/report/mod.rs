//! Human-facing reports for dry runs.

mod diff;

pub use diff::{ChangeKind, DiffReport, LineChange, diff_lines};
