use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const TOKEN_KEY: &str = "token";
pub const CURRENT_ENTITY_KEY: &str = "current_entity";
/// One-shot status line shown after a reload, then deleted.
pub const PREVIOUS_ACTION_MESSAGE_KEY: &str = "previous_action_message";

/// Persistent client-side key/value store. Every write goes straight to disk
/// so a crash never loses a login or entity switch.
#[derive(Debug, Default)]
pub struct Storage {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Storage {
    pub fn open(path: &Path) -> Self {
        let values = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "storage file unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path.to_path_buf()),
            values,
        }
    }

    /// A store that never touches disk.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<String>> {
        let old = self.values.remove(key);
        if old.is_some() {
            self.persist()?;
        }
        Ok(old)
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, format!("{json}\n"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let mut storage = Storage::open(&path);
        storage.set(TOKEN_KEY, "abc.def.ghi").unwrap();
        storage.set(CURRENT_ENTITY_KEY, "e-42").unwrap();

        let reopened = Storage::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY), Some("abc.def.ghi"));
        assert_eq!(reopened.get(CURRENT_ENTITY_KEY), Some("e-42"));
    }

    #[test]
    fn test_remove_returns_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut storage = Storage::open(&path);
        storage.set(PREVIOUS_ACTION_MESSAGE_KEY, "Entity updated").unwrap();

        let taken = storage.remove(PREVIOUS_ACTION_MESSAGE_KEY).unwrap();
        assert_eq!(taken.as_deref(), Some("Entity updated"));
        assert_eq!(storage.remove(PREVIOUS_ACTION_MESSAGE_KEY).unwrap(), None);
        assert_eq!(Storage::open(&path).get(PREVIOUS_ACTION_MESSAGE_KEY), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = Storage::open(&path);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_in_memory_never_writes() {
        let mut storage = Storage::in_memory();
        storage.set(TOKEN_KEY, "t").unwrap();
        assert_eq!(storage.get(TOKEN_KEY), Some("t"));
    }
}
