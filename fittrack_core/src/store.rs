//! Key-value persistence with file locking.
//!
//! Every record lives under a string key. `FileStore` keeps one JSON file
//! per key and writes it atomically; `MemoryStore` backs tests and dry runs.
//! Typed access goes through [`load_record`] and [`save_record`], which
//! treat unreadable records as absent and move corrupted files aside.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const DAILY_LOGS_KEY: &str = "daily_logs";
pub const NUTRITION_PLAN_KEY: &str = "nutrition_plan";
pub const USER_PROFILE_KEY: &str = "user_profile";
pub const CYCLE_DATA_KEY: &str = "cycle_data";

/// Raw string storage keyed by name
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Set an unreadable record aside so a later `set` cannot destroy it
    fn quarantine(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    /// Read with a shared lock. Missing or unreadable files count as absent.
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!("No record file for {:?}", key);
            return Ok(None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open {:?}: {}. Treating as empty.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock {:?}: {}. Treating as empty.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read {:?}: {}. Treating as empty.", path, e);
            return Ok(None);
        }

        file.unlock()?;
        Ok(Some(contents))
    }

    /// Atomically replace the record: temp file, fsync, rename.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {:?} to {:?}", key, path);
        Ok(())
    }

    /// Rename `<key>.json` to `<key>.json.corrupt-<epoch ms>`
    fn quarantine(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(());
        }
        let aside = self.dir.join(format!(
            "{}.json.corrupt-{}",
            key,
            chrono::Utc::now().timestamp_millis()
        ));
        std::fs::rename(&path, &aside)?;
        tracing::warn!("Moved unreadable {:?} to {:?}", path, aside);
        Ok(())
    }
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load and decode a record. A record that does not parse is logged and
/// reported as absent so callers fall back to defaults.
pub fn load_record<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(contents) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => {
            tracing::debug!("Loaded record {:?}", key);
            Ok(Some(value))
        }
        Err(e) => {
            tracing::warn!("Failed to parse record {:?}: {}. Using defaults.", key, e);
            store.quarantine(key)?;
            Ok(None)
        }
    }
}

/// Encode and store a record as compact JSON
pub fn save_record<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let contents = serde_json::to_string(value)?;
    store.set(key, &contents)
}
