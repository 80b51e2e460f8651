use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;
use crate::models::PlayerId;

/// Blocking key-value backend holding one serialized progress record per player.
pub trait ProgressStorage: Send + Sync {
    /// `Ok(None)` when nothing has been stored for the player yet.
    fn read(&self, player: &PlayerId) -> Result<Option<String>, StorageError>;

    fn write(&self, player: &PlayerId, payload: &str) -> Result<(), StorageError>;
}

/// One JSON file per player under `root`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, player: &PlayerId) -> PathBuf {
        self.root.join(format!("{}.json", player.storage_key()))
    }
}

impl ProgressStorage for FileStorage {
    fn read(&self, player: &PlayerId) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(player)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, player: &PlayerId, payload: &str) -> Result<(), StorageError> {
        let path = self.path_for(player);
        let tmp = path.with_extension("json.tmp");

        // Readers only ever see a complete record.
        let mut file = fs::File::create(&tmp)?;
        file.write_all(payload.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Process-local storage for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw payload for a player, bypassing the store.
    pub fn put_raw(&self, player: &PlayerId, payload: &str) -> Result<(), StorageError> {
        self.write(player, payload)
    }
}

impl ProgressStorage for MemoryStorage {
    fn read(&self, player: &PlayerId) -> Result<Option<String>, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(records.get(&player.storage_key()).cloned())
    }

    fn write(&self, player: &PlayerId, payload: &str) -> Result<(), StorageError> {
        let mut records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        records.insert(player.storage_key(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("progress")).unwrap();
        let player = PlayerId::parse("Ava").unwrap();

        assert!(storage.read(&player).unwrap().is_none());
        storage.write(&player, "{\"a\":1}").unwrap();
        assert_eq!(storage.read(&player).unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(storage.root().join("417661.json").exists());
        assert!(!storage.root().join("417661.json.tmp").exists());
    }

    #[test]
    fn file_storage_keys_players_separately() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let ava = PlayerId::parse("Ava").unwrap();
        let zoe = PlayerId::parse("Zoe").unwrap();

        storage.write(&ava, "ava").unwrap();
        storage.write(&zoe, "zoe").unwrap();
        assert_eq!(storage.read(&ava).unwrap().as_deref(), Some("ava"));
        assert_eq!(storage.read(&zoe).unwrap().as_deref(), Some("zoe"));
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        let player = PlayerId::parse("Ava").unwrap();
        assert!(storage.read(&player).unwrap().is_none());
        storage.put_raw(&player, "payload").unwrap();
        assert_eq!(storage.read(&player).unwrap().as_deref(), Some("payload"));
    }
}
