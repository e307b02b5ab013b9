//! Generic JSON file load/save.
//!
//! Reads are tolerant: a missing or unparsable file yields the caller's
//! default and a warning. Writes are explicit: they snapshot the previous
//! file, write atomically, and report failure to the caller.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use crate::backup::BackupRotator;
use crate::error::{Result, StoreError};

/// Outcome of a successful write.
#[derive(Debug, Clone)]
pub struct SaveReport {
    /// File that was written
    pub path: PathBuf,
    /// Snapshot taken of the previous contents, if there were any
    pub backup: Option<PathBuf>,
    /// Number of old snapshots deleted
    pub pruned: usize,
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Read a JSON file, falling back to `default` if it is missing or corrupt.
pub fn load_json<T: DeserializeOwned>(path: &Path, default: T) -> T {
    match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            default
        }
    }
}

/// Serialize `value` to `path`, snapshotting any existing file first.
///
/// A failed snapshot is logged and does not block the write.
pub fn write_json<T: Serialize>(
    path: &Path,
    value: &T,
    backups: Option<&BackupRotator>,
) -> Result<SaveReport> {
    let result = write_json_inner(path, value, backups);
    if let Err(ref e) = result {
        error!("Failed to save {}: {}", path.display(), e);
    }
    result
}

fn write_json_inner<T: Serialize>(
    path: &Path,
    value: &T,
    backups: Option<&BackupRotator>,
) -> Result<SaveReport> {
    let mut report = SaveReport {
        path: path.to_path_buf(),
        backup: None,
        pruned: 0,
    };

    if let Some(rotator) = backups {
        if path.exists() {
            match rotator.snapshot(path) {
                Ok(snapshot) => {
                    report.backup = Some(snapshot.path);
                    report.pruned = snapshot.pruned.len();
                }
                Err(e) => warn!("Failed to create backup for {}: {}", path.display(), e),
            }
        }
    }

    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json).map_err(|e| StoreError::io(path, e))?;

    Ok(report)
}

/// Write to a `.tmp` sibling, fsync, then rename over the target.
fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    {
        let mut writer = BufWriter::new(&mut file);
        writer.write_all(contents)?;
        writer.flush()?;
    }
    file.sync_all()?;

    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let value: Value = load_json(&tmp.path().join("missing.json"), json!({"d": 1}));
        assert_eq!(value, json!({"d": 1}));
    }

    #[test]
    fn test_load_corrupt_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let value: Value = load_json(&path, json!([]));
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_write_creates_parent_dirs_and_leaves_no_tmp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("tests").join("structure.json");
        let report = write_json(&path, &json!({"tests": []}), None).unwrap();

        assert_eq!(report.path, path);
        assert!(report.backup.is_none());
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_write_is_pretty_and_keeps_unicode() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("structure.json");
        write_json(&path, &json!({"tests": [{"id": "1", "name": "Экзема"}]}), None).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Экзема"));
        assert!(text.starts_with("{\n  \"tests\": ["));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_write_snapshots_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("structure.json");
        let rotator = BackupRotator::new(tmp.path().join("backups"), 10);

        let first = write_json(&path, &json!({"v": 1}), Some(&rotator)).unwrap();
        assert!(first.backup.is_none());

        let second = write_json(&path, &json!({"v": 2}), Some(&rotator)).unwrap();
        let backup = second.backup.expect("second write should snapshot");
        let saved: Value = read_json(&backup).unwrap();
        assert_eq!(saved, json!({"v": 1}));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        // A plain file in place of the parent directory makes the write fail
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "file, not dir").unwrap();
        let path = blocker.join("structure.json");

        let result = write_json(&path, &json!({}), None);
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
