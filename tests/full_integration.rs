//! End-to-end tests of merging and installing a target file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use update_conf::error::{UpdateError, WriteStage};
use update_conf::prelude::*;
use update_conf::writer::{SafeWriter, WriteOptions};

struct Fixture {
    _dir: TempDir,
    base: PathBuf,
    snippets: PathBuf,
    target: PathBuf,
}

impl Fixture {
    fn new(base: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let base_path = dir.path().join("app.conf.dist");
        let snippets = dir.path().join("app.conf.d");
        let target = dir.path().join("app.conf");
        fs::write(&base_path, base).unwrap();
        fs::create_dir(&snippets).unwrap();
        Self {
            _dir: dir,
            base: base_path,
            snippets,
            target,
        }
    }

    fn snippet(&self, name: &str, content: &str) {
        fs::write(self.snippets.join(name), content).unwrap();
    }

    fn updater(&self, mode: WriteMode) -> Updater {
        Updater::builder()
            .with_base(&self.base)
            .with_snippet_dir(&self.snippets)
            .with_target(&self.target)
            .with_mode(mode)
            .build()
            .unwrap()
    }

    fn target_content(&self) -> String {
        fs::read_to_string(&self.target).unwrap()
    }

    fn backup(&self) -> PathBuf {
        self.updater(WriteMode::Apply).backup_path()
    }
}

#[test]
fn test_first_run_creates_target() {
    let fx = Fixture::new("[server]\nport = 80\nhost = localhost\n");
    fx.snippet("10-port.conf", "[server]\nport = 8080\n");

    let report = fx.updater(WriteMode::Apply).run().unwrap();

    assert_eq!(
        report.outcome,
        WriteOutcome::Written {
            created: true,
            backup: None
        }
    );
    assert_eq!(fx.target_content(), "[server]\nport = 8080\nhost = localhost\n");
    assert!(!fx.backup().exists());
    assert_eq!(report.sources.len(), 2);
}

#[test]
fn test_second_run_is_noop() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fx.snippet("10-b.conf", "[b]\ny = 2\n");

    fx.updater(WriteMode::Apply).run().unwrap();
    let after_first = fx.target_content();
    let modified = fs::metadata(&fx.target).unwrap().modified().unwrap();

    let report = fx.updater(WriteMode::Apply).run().unwrap();

    assert_eq!(report.outcome, WriteOutcome::NoOp);
    assert_eq!(fx.target_content(), after_first);
    assert_eq!(fs::metadata(&fx.target).unwrap().modified().unwrap(), modified);
    assert!(!fx.backup().exists());
}

#[test]
fn test_update_backs_up_previous_content() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "[a]\nx = hand-edited\n").unwrap();

    let report = fx.updater(WriteMode::Apply).run().unwrap();

    assert_eq!(
        report.outcome,
        WriteOutcome::Written {
            created: false,
            backup: Some(fx.backup())
        }
    );
    assert_eq!(fx.target_content(), "[a]\nx = 1\n");
    assert_eq!(
        fs::read_to_string(fx.backup()).unwrap(),
        "[a]\nx = hand-edited\n"
    );
}

#[test]
fn test_backup_overwritten_by_next_change() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "[a]\nx = 0\n").unwrap();
    fx.updater(WriteMode::Apply).run().unwrap();

    fx.snippet("10-x.conf", "[a]\nx = 2\n");
    fx.updater(WriteMode::Apply).run().unwrap();

    assert_eq!(fs::read_to_string(fx.backup()).unwrap(), "[a]\nx = 1\n");
    assert_eq!(fx.target_content(), "[a]\nx = 2\n");
}

#[test]
fn test_stable_position_and_append() {
    let fx = Fixture::new("[sec]\na = 1\nb = 2\n");
    fx.snippet("10-b.conf", "[sec]\nb = 9\n");
    fx.snippet("20-c.conf", "[sec]\nc = 3\na = 0\n");

    fx.updater(WriteMode::Apply).run().unwrap();

    assert_eq!(fx.target_content(), "[sec]\na = 0\nb = 9\nc = 3\n");
}

#[test]
fn test_sections_never_removed() {
    let fx = Fixture::new("[secA]\nx = 1\n");
    fx.snippet("10-b.conf", "[secB]\ny = 2\n");
    fx.snippet("20-empty.conf", "[secA]\n");

    fx.updater(WriteMode::Apply).run().unwrap();

    assert_eq!(fx.target_content(), "[secA]\nx = 1\n\n[secB]\ny = 2\n");
}

#[test]
fn test_provenance_reported() {
    let fx = Fixture::new("[a]\nx = 1\ny = 1\n");
    fx.snippet("10-y.conf", "[a]\ny = 2\n");

    let report = fx.updater(WriteMode::DryRun).run().unwrap();
    let sources: Vec<_> = report
        .provenance
        .iter()
        .map(|p| (p.key.as_str(), p.source.rank()))
        .collect();
    assert_eq!(sources, vec![("x", 0), ("y", 1)]);
}

#[test]
fn test_dry_run_changes_nothing() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "[a]\nx = 0\n").unwrap();
    fs::write(fx.backup(), "old backup\n").unwrap();
    let past = SystemTime::now() - Duration::from_secs(3600);
    fs::File::options()
        .write(true)
        .open(&fx.target)
        .unwrap()
        .set_modified(past)
        .unwrap();
    let before = fs::metadata(&fx.target).unwrap();

    let report = fx.updater(WriteMode::DryRun).run().unwrap();

    assert!(report.outcome.is_change());
    let after = fs::metadata(&fx.target).unwrap();
    assert_eq!(after.modified().unwrap(), before.modified().unwrap());
    assert_eq!(after.permissions(), before.permissions());
    assert_eq!(fx.target_content(), "[a]\nx = 0\n");
    assert_eq!(fs::read_to_string(fx.backup()).unwrap(), "old backup\n");
    assert_no_temp_files(fx.target.parent().unwrap());

    let diff = report.diff().unwrap().to_string();
    assert!(diff.contains("-x = 0"));
    assert!(diff.contains("+x = 1"));
}

#[test]
fn test_dry_run_without_target() {
    let fx = Fixture::new("[a]\nx = 1\n");

    let report = fx.updater(WriteMode::DryRun).run().unwrap();

    assert!(matches!(
        report.outcome,
        WriteOutcome::WouldWrite { created: true, .. }
    ));
    assert!(!fx.target.exists());
}

#[test]
fn test_dry_run_up_to_date_is_noop() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fx.updater(WriteMode::Apply).run().unwrap();

    let report = fx.updater(WriteMode::DryRun).run().unwrap();
    assert_eq!(report.outcome, WriteOutcome::NoOp);
    assert!(report.diff().is_none());
}

#[test]
fn test_failure_before_rename_keeps_target() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "[a]\nx = original\n").unwrap();

    let merged = fx.updater(WriteMode::Apply).merge().unwrap();
    let writer = SafeWriter::new(WriteOptions::default());
    let staged = writer.stage(&fx.target, merged.document()).unwrap();
    assert!(staged.temp_path().exists());
    assert_eq!(staged.backup(), Some(fx.backup().as_path()));

    // Interrupted between backup and rename.
    drop(staged);

    assert_eq!(fx.target_content(), "[a]\nx = original\n");
    assert_eq!(
        fs::read_to_string(fx.backup()).unwrap(),
        "[a]\nx = original\n"
    );
    assert_no_temp_files(fx.target.parent().unwrap());
}

#[test]
fn test_backup_failure_produces_no_write() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "orig\n").unwrap();
    fs::create_dir(fx.backup()).unwrap();
    fs::write(fx.backup().join("occupied"), "x").unwrap();
    let dir = fx.target.parent().unwrap();
    let before = listing(dir);

    let result = fx.updater(WriteMode::Apply).run();

    assert!(matches!(
        result,
        Err(UpdateError::Write {
            stage: WriteStage::Backup,
            ..
        })
    ));
    assert_eq!(fs::read(&fx.target).unwrap(), b"orig\n");
    assert_eq!(listing(dir), before);
    assert_no_temp_files(dir);
}

#[test]
fn test_parse_error_produces_no_write() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "[a]\nx = 0\n").unwrap();
    fx.snippet("10-bad.conf", "[sec]\nkey = 1\n[sec]\nkey = 2\n");

    let result = fx.updater(WriteMode::Apply).run();

    assert!(matches!(result, Err(UpdateError::Parse { line: 4, .. })));
    assert_eq!(fx.target_content(), "[a]\nx = 0\n");
    assert!(!fx.backup().exists());
}

#[test]
fn test_restore_reinstates_backup() {
    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "[a]\nx = before\n").unwrap();
    let updater = fx.updater(WriteMode::Apply);
    updater.run().unwrap();

    updater.restore().unwrap();

    assert_eq!(fx.target_content(), "[a]\nx = before\n");
}

#[test]
fn test_restore_without_backup() {
    let fx = Fixture::new("[a]\nx = 1\n");
    let result = fx.updater(WriteMode::Apply).restore();
    assert!(matches!(result, Err(UpdateError::BackupMissing { .. })));
}

#[cfg(unix)]
#[test]
fn test_permissions_preserved() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new("[a]\nx = 1\n");
    fs::write(&fx.target, "[a]\nx = 0\n").unwrap();
    fs::set_permissions(&fx.target, fs::Permissions::from_mode(0o640)).unwrap();

    fx.updater(WriteMode::Apply).run().unwrap();

    let mode = fs::metadata(&fx.target).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
    let backup_mode = fs::metadata(fx.backup()).unwrap().permissions().mode() & 0o777;
    assert_eq!(backup_mode, 0o640);
}

#[test]
fn test_report_serializes_to_json() {
    let fx = Fixture::new("[a]\nx = 1\n");
    let report = fx.updater(WriteMode::Apply).run().unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"]["status"], "written");
    assert_eq!(json["outcome"]["created"], true);
    assert_eq!(json["provenance"][0]["key"], "x");
    assert_eq!(json["sources"][0]["rank"], 0);
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn assert_no_temp_files(dir: &Path) {
    let leftovers: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temporary files left: {:?}", leftovers);
}
