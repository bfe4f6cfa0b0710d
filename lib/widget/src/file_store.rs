//! Directory-backed key-value store.
//!
//! Each key is one `<key>.json` file. Writes go to a sibling temporary file,
//! are synced to disk, and are then renamed into place, so a crash never leaves
//! a half-written slot.

use qa_chat_conversation::{KeyValueStore, StorageError};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// [`KeyValueStore`] keeping one file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Uses `dir`, creating it on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        // Keys like ".." must not escape the directory.
        let name = name.trim_start_matches('.');
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_failed = |e: io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };
        std::fs::create_dir_all(&self.dir).map_err(write_failed)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut file = File::create(&tmp).map_err(write_failed)?;
        file.write_all(value.as_bytes()).map_err(write_failed)?;
        // Flush to disk before the rename makes the new contents visible.
        file.sync_all().map_err(write_failed)?;
        drop(file);
        std::fs::rename(&tmp, &path).map_err(write_failed)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_chat_conversation::{Entry, HistoryPersistence, PersistOutcome};
    use std::sync::Arc;

    #[test]
    fn missing_slot_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        assert_eq!(store.load("qa-chatbot-history").expect("load"), None);
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested"));

        store.save("qa-chatbot-history", "[]").expect("save");

        assert_eq!(
            store.load("qa-chatbot-history").expect("load").as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("nested/qa-chatbot-history.json").exists());
    }

    #[test]
    fn overwrite_replaces_contents_without_leftovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        store.save("k", "first").expect("save");
        store.save("k", "second").expect("overwrite");

        assert_eq!(store.load("k").expect("load").as_deref(), Some("second"));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["k.json"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.save("k", "v").expect("save");

        store.remove("k").expect("remove");
        store.remove("k").expect("remove again");

        assert_eq!(store.load("k").expect("load"), None);
    }

    #[test]
    fn keys_cannot_escape_directory() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/data/_etc_passwd.json"));
        assert_eq!(store.path_for("a b"), PathBuf::from("/data/a_b.json"));
    }

    #[test]
    fn unreadable_slot_is_a_read_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        std::fs::create_dir(dir.path().join("k.json")).expect("mkdir");

        assert!(matches!(
            store.load("k"),
            Err(StorageError::ReadFailed { .. })
        ));
    }

    #[test]
    fn history_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let history = vec![
            Entry::user("What is X?", chrono::Utc::now()),
            Entry::bot("X is Y", chrono::Utc::now()),
        ];

        let first = HistoryPersistence::new(Arc::new(FileStore::new(dir.path())), 50);
        assert_eq!(first.persist(&history), PersistOutcome::Saved);

        let second = HistoryPersistence::new(Arc::new(FileStore::new(dir.path())), 50);
        assert_eq!(second.restore(), history);
    }
}
