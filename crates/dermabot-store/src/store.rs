//! Per-section content storage.
//!
//! Each section lives in `<data>/<dir>/structure.json`. Every mutation is a
//! load, modify, save cycle held under that section's lock, so two admins
//! editing the same section cannot lose each other's updates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dermabot_core::config::StorageConfig;
use dermabot_core::{IdStrategy, Item, Section, SectionCollection};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::backup::BackupRotator;
use crate::clock::Clock;
use crate::error::{Result, StoreError};
use crate::json_file::{load_json, read_json, write_json, SaveReport};

/// File name of every section collection.
pub const COLLECTION_FILE: &str = "structure.json";

/// File name of the persisted id counter.
pub const COUNTER_FILE: &str = "counter.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct IdCounter {
    next_id: u64,
}

/// Reads and writes section collections.
pub struct ContentStore {
    data_dir: PathBuf,
    backups: BackupRotator,
    id_strategy: IdStrategy,
    locks: [Mutex<()>; Section::ALL.len()],
}

impl ContentStore {
    pub fn new(data_dir: impl Into<PathBuf>, backups: BackupRotator) -> Self {
        Self {
            data_dir: data_dir.into(),
            backups,
            id_strategy: IdStrategy::default(),
            locks: Default::default(),
        }
    }

    /// Build a store from the `[storage]` configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        let backups = BackupRotator::new(config.backup_path(), config.max_backups);
        Self::new(config.data_path(), backups).with_id_strategy(config.id_strategy)
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Replace the clock used to name backups.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.backups = self.backups.with_clock(clock);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backups(&self) -> &BackupRotator {
        &self.backups
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    /// Path of the collection file for `section`.
    pub fn collection_path(&self, section: Section) -> PathBuf {
        self.data_dir.join(section.dir()).join(COLLECTION_FILE)
    }

    fn counter_path(&self, section: Section) -> PathBuf {
        self.data_dir.join(section.dir()).join(COUNTER_FILE)
    }

    fn lock(&self, section: Section) -> MutexGuard<'_, ()> {
        self.locks[section.index()].lock()
    }

    /// Load a section, yielding an empty collection if the file is missing
    /// or malformed.
    pub fn load(&self, section: Section) -> SectionCollection {
        let path = self.collection_path(section);
        let value = load_json(&path, Value::Null);
        if value.is_null() {
            return SectionCollection::empty(section);
        }
        match SectionCollection::from_json(section, value) {
            Ok(collection) => collection,
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                SectionCollection::empty(section)
            }
        }
    }

    /// Load a section, reporting any read or shape error.
    pub fn try_load(&self, section: Section) -> Result<SectionCollection> {
        let value: Value = read_json(&self.collection_path(section))?;
        SectionCollection::from_json(section, value).map_err(|e| StoreError::Invalid {
            section,
            message: e.to_string(),
        })
    }

    /// Strict load for a mutation: only a missing file reads as empty.
    fn load_for_update(&self, section: Section) -> Result<SectionCollection> {
        match self.try_load(section) {
            Ok(collection) => Ok(collection),
            Err(e) if e.is_missing_file() => Ok(SectionCollection::empty(section)),
            Err(e) => {
                error!("Refusing to overwrite unreadable {}: {}", section, e);
                Err(e)
            }
        }
    }

    /// Persist a whole collection.
    pub fn save(&self, collection: &SectionCollection) -> Result<SaveReport> {
        let _guard = self.lock(collection.section);
        self.save_locked(collection)
    }

    fn save_locked(&self, collection: &SectionCollection) -> Result<SaveReport> {
        let path = self.collection_path(collection.section);
        let report = write_json(&path, &collection.to_json(), Some(&self.backups))?;
        debug!(
            "Saved {} ({} items, backup: {:?})",
            path.display(),
            collection.len(),
            report.backup
        );
        Ok(report)
    }

    /// Run a load, modify, save cycle under the section lock.
    ///
    /// Nothing is written if the file exists but cannot be read, or if `f`
    /// fails.
    pub fn modify<T>(
        &self,
        section: Section,
        f: impl FnOnce(&mut SectionCollection) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.lock(section);
        let mut collection = self.load_for_update(section)?;
        let out = f(&mut collection)?;
        self.save_locked(&collection)?;
        Ok(out)
    }

    /// First item in `section` with this exact name.
    pub fn find_by_name(&self, section: Section, name: &str) -> Option<Item> {
        self.load(section).find_by_name(name).cloned()
    }

    /// Append a new item and return it.
    pub fn add_item(&self, section: Section, name: &str) -> Result<Item> {
        let _guard = self.lock(section);
        let mut collection = self.load_for_update(section)?;
        let id = self.allocate_id(&collection)?;
        let item = Item::new(id, name);
        collection.items.push(item.clone());
        self.save_locked(&collection)?;
        info!("Added item {} '{}' to {}", item.id, item.name, section);
        Ok(item)
    }

    /// Rename the first item equal to `target`.
    pub fn rename_item(&self, section: Section, target: &Item, new_name: &str) -> Result<Item> {
        let renamed = self.modify(section, |collection| {
            let item = collection
                .items
                .iter_mut()
                .find(|item| *item == target)
                .ok_or_else(|| StoreError::ItemNotFound {
                    section,
                    name: target.name.clone(),
                })?;
            item.name = new_name.to_string();
            Ok(item.clone())
        })?;
        info!("Renamed '{}' to '{}' in {}", target.name, renamed.name, section);
        Ok(renamed)
    }

    /// Remove the first item with this exact name.
    pub fn remove_item(&self, section: Section, name: &str) -> Result<Item> {
        let removed = self.modify(section, |collection| {
            let pos = collection
                .items
                .iter()
                .position(|item| item.name == name)
                .ok_or_else(|| StoreError::ItemNotFound {
                    section,
                    name: name.to_string(),
                })?;
            Ok(collection.items.remove(pos))
        })?;
        info!("Removed item {} '{}' from {}", removed.id, removed.name, section);
        Ok(removed)
    }

    /// Pick the id for a new item. Caller holds the section lock.
    fn allocate_id(&self, collection: &SectionCollection) -> Result<String> {
        match self.id_strategy {
            IdStrategy::Length => Ok((collection.len() + 1).to_string()),
            IdStrategy::Counter => {
                let path = self.counter_path(collection.section);
                let seed = seed_counter(collection);
                let current = match read_json::<IdCounter>(&path) {
                    Ok(counter) => counter.next_id.max(seed),
                    Err(_) => seed,
                };
                write_json(
                    &path,
                    &IdCounter {
                        next_id: current + 1,
                    },
                    None,
                )?;
                Ok(current.to_string())
            }
        }
    }
}

/// Smallest counter value that cannot collide with an existing id.
fn seed_counter(collection: &SectionCollection) -> u64 {
    let max_numeric = collection
        .items
        .iter()
        .filter_map(|item| item.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    max_numeric.max(collection.len() as u64) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Local, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ContentStore {
        let rotator = BackupRotator::new(dir.path().join("backups"), 10);
        ContentStore::new(dir.path().join("data"), rotator)
    }

    fn names(collection: &SectionCollection) -> Vec<(&str, &str)> {
        collection
            .items
            .iter()
            .map(|i| (i.id.as_str(), i.name.as_str()))
            .collect()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let coll = SectionCollection::with_items(
            Section::Questions,
            vec![Item::new("1", "Псориаз"), Item::new("2", "Сифилис")],
        );
        store.save(&coll).unwrap();
        assert_eq!(store.load(Section::Questions), coll);
    }

    #[test]
    fn test_topics_stored_under_theory_dir() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_item(Section::Topics, "Дерматиты: Экзема").unwrap();

        let path = dir.path().join("data/theory/structure.json");
        let raw = fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "topics": [ { "id": "1", "name": "Дерматиты: Экзема" } ] })
        );
        assert!(!raw.ends_with('\n'));
    }

    #[test]
    fn test_missing_and_corrupt_files_load_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load(Section::Tasks).is_empty());

        let path = store.collection_path(Section::Tasks);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(store.load(Section::Tasks).is_empty());
        assert!(store.try_load(Section::Tasks).is_err());

        fs::write(&path, r#"{"tests": []}"#).unwrap();
        assert!(store.load(Section::Tasks).is_empty());
        assert!(matches!(
            store.try_load(Section::Tasks),
            Err(StoreError::Invalid { .. })
        ));
    }

    #[test]
    fn test_mutations_never_overwrite_unreadable_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let path = store.collection_path(Section::Tests);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let original = r#"{"tests":[{"id":1,"name":"A"},{"id":2,"name":"B"}]}"#;
        fs::write(&path, original).unwrap();

        assert!(matches!(
            store.add_item(Section::Tests, "New"),
            Err(StoreError::Invalid { .. })
        ));
        assert!(store.remove_item(Section::Tests, "A").is_err());
        let ghost = Item::new("1", "A");
        assert!(store.rename_item(Section::Tests, &ghost, "Z").is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        assert!(store.backups().list_all().unwrap().is_empty());
    }

    #[test]
    fn test_add_to_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let item = store.add_item(Section::Questions, "First").unwrap();
        assert_eq!(item.id, "1");
        assert_eq!(store.load(Section::Questions).len(), 1);
    }

    #[test]
    fn test_fifteen_saves_keep_ten_newest_backups() {
        let dir = TempDir::new().unwrap();
        let start = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start, chrono::Duration::seconds(1)));
        let store = store_in(&dir).with_clock(clock);

        let mut coll = SectionCollection::empty(Section::Tests);
        for i in 0..15 {
            coll.items.push(Item::new((i + 1).to_string(), format!("T{}", i)));
            store.save(&coll).unwrap();
        }

        let backups = store.backups().list(COLLECTION_FILE).unwrap();
        assert_eq!(backups.len(), 10);

        // The first save had nothing to snapshot, so 14 snapshots were taken
        // at start+0s..start+13s and the oldest four were pruned.
        let expected: Vec<String> = (4..14)
            .map(|s| {
                let ts = start + chrono::Duration::seconds(s);
                format!("{}_{}", COLLECTION_FILE, ts.format(crate::backup::TIMESTAMP_FORMAT))
            })
            .collect();
        let actual: Vec<String> = backups
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_length_ids_are_sequential() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for name in ["a", "b", "c", "d", "e"] {
            store.add_item(Section::ImageTests, name).unwrap();
        }
        let ids: Vec<String> = store
            .load(Section::ImageTests)
            .items
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_length_ids_reuse_after_delete() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_item(Section::Tests, "A").unwrap();
        store.add_item(Section::Tests, "B").unwrap();
        store.remove_item(Section::Tests, "A").unwrap();
        store.add_item(Section::Tests, "C").unwrap();

        assert_eq!(
            names(&store.load(Section::Tests)),
            [("2", "B"), ("2", "C")]
        );
    }

    #[test]
    fn test_counter_ids_never_repeat() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).with_id_strategy(IdStrategy::Counter);
        store.add_item(Section::Tests, "A").unwrap();
        store.add_item(Section::Tests, "B").unwrap();
        store.remove_item(Section::Tests, "A").unwrap();
        store.add_item(Section::Tests, "C").unwrap();

        assert_eq!(
            names(&store.load(Section::Tests)),
            [("2", "B"), ("3", "C")]
        );
        let counter: IdCounter =
            read_json(&dir.path().join("data/tests").join(COUNTER_FILE)).unwrap();
        assert_eq!(counter.next_id, 4);
    }

    #[test]
    fn test_counter_seeds_from_existing_ids() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).with_id_strategy(IdStrategy::Counter);
        store
            .save(&SectionCollection::with_items(
                Section::Tasks,
                vec![Item::new("7", "x"), Item::new("legacy", "y")],
            ))
            .unwrap();
        let item = store.add_item(Section::Tasks, "z").unwrap();
        assert_eq!(item.id, "8");
    }

    #[test]
    fn test_rename_matches_whole_item() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_item(Section::Questions, "Old").unwrap();

        let target = Item::new("1", "Old");
        let renamed = store.rename_item(Section::Questions, &target, "New").unwrap();
        assert_eq!(renamed, Item::new("1", "New"));

        // The stale selection no longer matches anything
        let before = fs::read(store.collection_path(Section::Questions)).unwrap();
        let err = store
            .rename_item(Section::Questions, &target, "Newer")
            .unwrap_err();
        assert!(err.is_not_found());
        let after = fs::read(store.collection_path(Section::Questions)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_remove_only_first_duplicate() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&SectionCollection::with_items(
                Section::Tasks,
                vec![Item::new("1", "dup"), Item::new("2", "dup")],
            ))
            .unwrap();
        let removed = store.remove_item(Section::Tasks, "dup").unwrap();
        assert_eq!(removed.id, "1");
        assert_eq!(names(&store.load(Section::Tasks)), [("2", "dup")]);

        assert!(store.remove_item(Section::Tasks, "missing").is_err());
    }

    #[test]
    fn test_concurrent_adds_are_serialized() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..5 {
                        store.add_item(Section::Tests, &format!("{}-{}", t, i)).unwrap();
                    }
                });
            }
        });
        let coll = store.load(Section::Tests);
        assert_eq!(coll.len(), 20);
        let mut ids: Vec<u32> = coll.items.iter().map(|i| i.id.parse().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }
}
