use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::CoreError;

use super::kv::KeyValueStore;

/// File-backed [`KeyValueStore`].
///
/// All keys live in one JSON file (a map of key → raw value string)
/// which is rewritten in full on every mutation. A file that cannot be
/// read or parsed at open time is treated as empty rather than an
/// error, matching the corrupt-entry tolerance of the store contract.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cells: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let cells = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!(
                    "store file {} is unreadable ({e}), starting empty",
                    path.display()
                );
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            path,
            cells: Mutex::new(cells),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, cells: &HashMap<String, String>) -> Result<(), CoreError> {
        let contents = serde_json::to_string_pretty(cells)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| CoreError::Storage(format!("failed to write {}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.cells
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        let previous = cells.insert(key.to_string(), value.to_string());

        if let Err(e) = self.flush(&cells) {
            // Keep memory consistent with disk: undo the insert so a
            // failed set leaves the old value observable.
            match previous {
                Some(old) => cells.insert(key.to_string(), old),
                None => cells.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        if cells.remove(key).is_some() {
            if let Err(e) = self.flush(&cells) {
                log::warn!("failed to persist delete of '{key}': {e}");
            }
        }
    }
}
