use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use uuid::Uuid;

use crate::document::Document;
use crate::error::StoreError;

/// A typed document collection.
///
/// Records live in a `BTreeMap` keyed by id; with UUIDv7 ids the map iterates
/// in insertion order, which `list`/`first` rely on. When a snapshot path is
/// configured, every mutation re-serializes the whole collection and rewrites
/// the file atomically (temp file + rename) while holding the write lock, so
/// the snapshot never diverges from memory.
#[derive(Debug)]
pub struct Collection<T> {
    inner: RwLock<BTreeMap<Uuid, T>>,
    snapshot: Option<PathBuf>,
}

impl<T: Document> Collection<T> {
    /// Collection without a backing file. Contents are lost on drop.
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
            snapshot: None,
        }
    }

    /// Collection backed by a whole-file JSON snapshot.
    ///
    /// A missing file starts the collection empty and initializes the file.
    /// A malformed file is treated the same way and immediately rewritten
    /// (auto-repair); this is logged but never surfaced to callers.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<T>>(&bytes) {
                Ok(records) => records,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "malformed snapshot, reinitializing as empty");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let map: BTreeMap<Uuid, T> = records.into_iter().map(|r| (r.id(), r)).collect();
        write_snapshot(&path, &map)?;

        Ok(Self {
            inner: RwLock::new(map),
            snapshot: Some(path),
        })
    }

    /// All records, oldest first.
    pub fn list(&self) -> Vec<T> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.inner.read().ok()?.get(&id).cloned()
    }

    /// The oldest record, if any.
    pub fn first(&self) -> Option<T> {
        self.inner.read().ok()?.values().next().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a record under its own id, replacing any record with that id.
    pub fn insert(&self, record: T) -> Result<T, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(record.id(), record.clone());
        self.persist(&map)?;
        Ok(record)
    }

    /// Mutate the record with the given id in place.
    ///
    /// Returns the updated record, or `None` if no record has that id. The
    /// closure must not change the record's id.
    pub fn update(&self, id: Uuid, f: impl FnOnce(&mut T)) -> Result<Option<T>, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let Some(record) = map.get_mut(&id) else {
            return Ok(None);
        };
        f(record);
        let updated = record.clone();
        self.persist(&map)?;
        Ok(Some(updated))
    }

    /// Remove the record with the given id. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let existed = map.remove(&id).is_some();
        if existed {
            self.persist(&map)?;
        }
        Ok(existed)
    }

    fn persist(&self, map: &BTreeMap<Uuid, T>) -> Result<(), StoreError> {
        match &self.snapshot {
            Some(path) => write_snapshot(path, map),
            None => Ok(()),
        }
    }
}

fn write_snapshot<T: Document>(path: &Path, map: &BTreeMap<Uuid, T>) -> Result<(), StoreError> {
    let records: Vec<&T> = map.values().collect();
    let bytes = serde_json::to_vec_pretty(&records)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        body: String,
    }

    impl Note {
        fn new(body: &str) -> Self {
            Self {
                id: Uuid::now_v7(),
                body: body.to_string(),
            }
        }
    }

    impl Document for Note {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[test]
    fn insert_get_update_remove_in_memory() {
        let coll = Collection::in_memory();
        let note = coll.insert(Note::new("a")).unwrap();

        assert_eq!(coll.get(note.id), Some(note.clone()));

        let updated = coll.update(note.id, |n| n.body = "b".to_string()).unwrap().unwrap();
        assert_eq!(updated.body, "b");
        assert_eq!(coll.get(note.id).unwrap().body, "b");

        assert!(coll.remove(note.id).unwrap());
        assert!(!coll.remove(note.id).unwrap());
        assert_eq!(coll.get(note.id), None);
    }

    #[test]
    fn update_of_missing_record_returns_none() {
        let coll: Collection<Note> = Collection::in_memory();
        let result = coll.update(Uuid::now_v7(), |n| n.body.clear()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn list_and_first_follow_insertion_order() {
        let coll = Collection::in_memory();
        let first = coll.insert(Note::new("first")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        coll.insert(Note::new("second")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        coll.insert(Note::new("third")).unwrap();

        let bodies: Vec<String> = coll.list().into_iter().map(|n| n.body).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
        assert_eq!(coll.first().unwrap().id, first.id);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let note = {
            let coll = Collection::open(&path).unwrap();
            coll.insert(Note::new("persisted")).unwrap()
        };

        let reopened: Collection<Note> = Collection::open(&path).unwrap();
        assert_eq!(reopened.get(note.id), Some(note));
    }

    #[test]
    fn malformed_snapshot_reinitializes_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, b"{ this is not json").unwrap();

        let coll: Collection<Note> = Collection::open(&path).unwrap();
        assert!(coll.is_empty());

        // The file was repaired in place, so a reopen parses cleanly.
        let bytes = fs::read(&path).unwrap();
        let parsed: Vec<Note> = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn missing_snapshot_file_is_initialized_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let _coll: Collection<Note> = Collection::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn remove_of_absent_id_does_not_rewrite_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let coll: Collection<Note> = Collection::open(&path).unwrap();
        coll.insert(Note::new("keep")).unwrap();

        let before = fs::metadata(&path).unwrap().modified().unwrap();
        assert!(!coll.remove(Uuid::now_v7()).unwrap());
        let after = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }
}
