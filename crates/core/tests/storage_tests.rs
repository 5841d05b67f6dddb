// ═══════════════════════════════════════════════════════════════════
// Storage Tests — KeyValueStore contract, MemoryStore, FileStore
// ═══════════════════════════════════════════════════════════════════

use crypto_portfolio_core::errors::CoreError;
use crypto_portfolio_core::storage::file_store::FileStore;
use crypto_portfolio_core::storage::kv::{KeyValueStore, KeyValueStoreExt};
use crypto_portfolio_core::storage::memory_store::MemoryStore;

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn set_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get_raw("k"), None);

        store.set_raw("k", "v").unwrap();
        assert_eq!(store.get_raw("k").as_deref(), Some("v"));

        store.delete("k");
        assert_eq!(store.get_raw("k"), None);
    }

    #[test]
    fn delete_absent_key_is_noop() {
        let store = MemoryStore::new();
        store.delete("never-set");
        assert!(store.is_empty());
    }

    #[test]
    fn typed_round_trip() {
        let store = MemoryStore::new();
        store.set("nums", &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = store.get("nums").unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn corrupt_value_reads_as_absent() {
        let store = MemoryStore::new();
        store.set_raw("nums", "{not json").unwrap();
        let back: Option<Vec<u32>> = store.get("nums");
        assert!(back.is_none());
    }

    #[test]
    fn wrong_shape_reads_as_absent() {
        let store = MemoryStore::new();
        store.set_raw("nums", "\"a string, not a list\"").unwrap();
        let back: Option<Vec<u32>> = store.get("nums");
        assert!(back.is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// FileStore
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("answer", &42u32).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get::<u32>("answer"), Some(42));
    }

    #[test]
    fn delete_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("answer", &42u32).unwrap();
            store.delete("answer");
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get::<u32>("answer"), None);
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("does-not-exist.json")).unwrap();
        assert_eq!(store.get_raw("anything"), None);
    }

    #[test]
    fn unreadable_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "this is not a json map").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get_raw("anything"), None);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/store.json");
        let store = FileStore::open(&path).unwrap();
        store.set("k", &1u8).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn failed_set_is_reported_and_rolled_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set("k", &"old").unwrap();

        // Make the flush fail by removing the directory under the store.
        std::fs::remove_dir_all(dir.path()).unwrap();

        let err = store.set("k", &"new").unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        // The old value must still be observable.
        assert_eq!(store.get::<String>("k").as_deref(), Some("old"));
    }

    #[test]
    fn corrupt_single_value_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        store.set_raw("broken", "{oops").unwrap();
        store.set("fine", &7u32).unwrap();

        assert_eq!(store.get::<u32>("broken"), None);
        assert_eq!(store.get::<u32>("fine"), Some(7));
    }
}
