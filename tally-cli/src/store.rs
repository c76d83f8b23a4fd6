//! Key-value persistence: one JSON document per key.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores `<key>.json` files under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let p = self.path(key);
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        Ok(Some(s))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        let p = self.path(key);
        // Replace atomically via rename.
        let tmp = p.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &p).with_context(|| format!("rename {}", p.display()))?;
        log::debug!("stored {}", p.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let p = self.path(key);
        if p.exists() {
            fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Read a JSON value strictly. `Ok(None)` only when the key is absent;
/// unreadable or corrupt data is an error.
pub fn try_read_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let v = serde_json::from_str(&raw).with_context(|| format!("corrupt record {key}"))?;
    Ok(Some(v))
}

/// Read a JSON value for display. Missing or unreadable data yields
/// `T::default()`; corruption is logged, never fatal.
pub fn read_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    try_read_json(store, key)
        .unwrap_or_else(|e| {
            log::error!("error reading {key}: {e:#}");
            None
        })
        .unwrap_or_default()
}

pub fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let s = serde_json::to_string_pretty(value).with_context(|| format!("serialize {key}"))?;
    store.set(key, &s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "[1,2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("nested").join("k.json").exists());

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn test_corrupt_json_reads_as_default() {
        let store = MemoryStore::default();
        store.set("list", "{not json").unwrap();
        let v: Vec<String> = read_json(&store, "list");
        assert!(v.is_empty());
    }

    #[test]
    fn test_strict_read_reports_corruption() {
        let store = MemoryStore::default();
        store.set("list", "{not json").unwrap();
        let err = try_read_json::<Vec<String>, _>(&store, "list").unwrap_err();
        assert!(format!("{err:#}").contains("corrupt record list"));
        assert_eq!(try_read_json::<Vec<String>, _>(&store, "absent").unwrap(), None);
    }

    #[test]
    fn test_write_then_read_json() {
        let store = MemoryStore::default();
        write_json(&store, "list", &vec!["a".to_string()]).unwrap();
        let v: Vec<String> = read_json(&store, "list");
        assert_eq!(v, vec!["a".to_string()]);
    }
}
