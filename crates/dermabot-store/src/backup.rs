//! Pre-write snapshots with bounded retention.
//!
//! Before a collection file is overwritten it is copied to
//! `<backup dir>/<basename>_<YYYYMMDD_HHMMSS>`. Snapshots are pooled by
//! basename, and once a pool exceeds the cap the oldest names (which sort
//! first) are deleted. Copy and prune run under one lock so concurrent
//! writers cannot over- or under-prune.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};

/// strftime format of the snapshot suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Result of taking one snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The new snapshot file
    pub path: PathBuf,
    /// Older snapshots deleted to stay within the cap
    pub pruned: Vec<PathBuf>,
}

/// Creates and prunes snapshots inside one directory.
pub struct BackupRotator {
    dir: PathBuf,
    max_backups: usize,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl BackupRotator {
    pub fn new(dir: impl Into<PathBuf>, max_backups: usize) -> Self {
        Self {
            dir: dir.into(),
            max_backups,
            clock: Arc::new(SystemClock),
            lock: Mutex::new(()),
        }
    }

    /// Replace the time source (used by tests to get distinct timestamps).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    /// Copy `path` into the backup directory and prune its pool.
    pub fn snapshot(&self, path: &Path) -> Result<Snapshot> {
        let basename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::Backup {
                path: path.to_path_buf(),
                message: "path has no usable file name".into(),
            })?;

        let _guard = self.lock.lock();

        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let stamp = self.clock.now().format(TIMESTAMP_FORMAT);
        let target = self.dir.join(format!("{}_{}", basename, stamp));
        fs::copy(path, &target).map_err(|e| StoreError::io(path, e))?;
        debug!("Snapshot {} -> {}", path.display(), target.display());

        let pruned = self.prune_locked(basename)?;

        Ok(Snapshot {
            path: target,
            pruned,
        })
    }

    /// Snapshots of one basename, oldest first.
    pub fn list(&self, basename: &str) -> Result<Vec<PathBuf>> {
        let prefix = format!("{}_", basename);
        self.list_matching(|name| {
            name.strip_prefix(&prefix)
                .is_some_and(|stamp| NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok())
        })
    }

    /// Every file in the backup directory, sorted by name.
    pub fn list_all(&self) -> Result<Vec<PathBuf>> {
        self.list_matching(|_| true)
    }

    fn list_matching(&self, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if keep(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        Ok(names.into_iter().map(|n| self.dir.join(n)).collect())
    }

    fn prune_locked(&self, basename: &str) -> Result<Vec<PathBuf>> {
        let existing = self.list(basename)?;
        let excess = existing.len().saturating_sub(self.max_backups);

        let mut pruned = Vec::with_capacity(excess);
        for old in existing.into_iter().take(excess) {
            fs::remove_file(&old).map_err(|e| StoreError::io(&old, e))?;
            info!("Pruned old backup {}", old.display());
            pruned.push(old);
        }
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn rotator(tmp: &TempDir, max: usize) -> BackupRotator {
        let start = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        BackupRotator::new(tmp.path().join("backups"), max)
            .with_clock(Arc::new(ManualClock::new(start, chrono::Duration::seconds(1))))
    }

    #[test]
    fn test_snapshot_name_and_contents() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("structure.json");
        fs::write(&source, "{}").unwrap();

        let snap = rotator(&tmp, 10).snapshot(&source).unwrap();
        assert_eq!(
            snap.path.file_name().unwrap().to_str().unwrap(),
            "structure.json_20240102_030405"
        );
        assert_eq!(fs::read_to_string(&snap.path).unwrap(), "{}");
        assert!(snap.pruned.is_empty());
    }

    #[test]
    fn test_prunes_oldest_beyond_cap() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("structure.json");
        fs::write(&source, "x").unwrap();
        let rot = rotator(&tmp, 3);

        let mut taken = Vec::new();
        for _ in 0..5 {
            taken.push(rot.snapshot(&source).unwrap().path);
        }

        let remaining = rot.list("structure.json").unwrap();
        assert_eq!(remaining, taken[2..].to_vec());
    }

    #[test]
    fn test_pools_are_per_basename() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.json");
        let b = tmp.path().join("b.json");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let rot = rotator(&tmp, 1);

        rot.snapshot(&a).unwrap();
        rot.snapshot(&b).unwrap();
        rot.snapshot(&a).unwrap();

        assert_eq!(rot.list("a.json").unwrap().len(), 1);
        assert_eq!(rot.list("b.json").unwrap().len(), 1);
        assert_eq!(rot.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_foreign_files_are_not_counted() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("structure.json");
        fs::write(&source, "x").unwrap();
        let rot = rotator(&tmp, 1);

        fs::create_dir_all(rot.dir()).unwrap();
        fs::write(rot.dir().join("structure.json_notes"), "keep me").unwrap();
        rot.snapshot(&source).unwrap();
        rot.snapshot(&source).unwrap();

        assert_eq!(rot.list("structure.json").unwrap().len(), 1);
        assert!(rot.dir().join("structure.json_notes").exists());
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let rot = BackupRotator::new(tmp.path().join("nope"), 10);
        assert!(rot.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_of_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let rot = rotator(&tmp, 10);
        assert!(rot.snapshot(&tmp.path().join("absent.json")).is_err());
    }
}
