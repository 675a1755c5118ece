//! Durable key-value storage for session snapshots and cached reference data.
//!
//! [`FileStore`] keeps one JSON file per key and writes atomically with file
//! locking so a crash mid-write never leaves a torn snapshot behind.

use crate::catalog::ReferenceData;
use crate::timer::RestTimer;
use crate::{Error, Result, SessionStore};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key holding the session snapshot
pub const SESSION_KEY: &str = "session";

/// Key holding the reference data cache
pub const REFERENCE_KEY: &str = "reference-data";

/// Current schema version of the session snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Current version of the reference data cache. Older caches are discarded.
pub const CACHE_VERSION: u32 = 2;

/// String key-value storage
pub trait KeyValueStore {
    fn get(&self, name: &str) -> Result<Option<String>>;
    fn set(&mut self, name: &str, value: &str) -> Result<()>;
    fn remove(&mut self, name: &str) -> Result<()>;
}

/// In-memory store, used in tests and for throwaway sessions
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
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.entries.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.entries.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.entries.remove(name);
        Ok(())
    }
}

/// Directory-backed store: key `name` lives in `<dir>/<name>.json`
#[derive(Clone, Debug)]
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

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        tracing::debug!("Read key '{}' from {:?}", name, path);
        Ok(Some(contents))
    }

    /// Atomically writes the value by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);

        let temp = NamedTempFile::new_in(&self.dir)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote key '{}' to {:?}", name, path);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed key '{}'", name);
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SessionSnapshot {
    version: u32,
    #[serde(default)]
    store: SessionStore,
    #[serde(default)]
    timer: RestTimer,
}

#[derive(Serialize, Deserialize)]
struct ReferenceCache {
    version: u32,
    data: ReferenceData,
}

/// Snapshots session state into a [`KeyValueStore`]
pub struct SessionPersister<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> SessionPersister<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    /// Load the last snapshot.
    ///
    /// Returns a default session if none exists. A snapshot that cannot be
    /// read or parsed is logged and replaced by a default session.
    pub fn load_session(&self) -> (SessionStore, RestTimer) {
        let raw = match self.kv.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!("No session snapshot found, starting fresh");
                return Default::default();
            }
            Err(e) => {
                tracing::warn!("Unable to read session snapshot: {}. Using defaults.", e);
                return Default::default();
            }
        };

        match serde_json::from_str::<SessionSnapshot>(&raw) {
            Ok(snapshot) => {
                tracing::debug!("Loaded session snapshot v{}", snapshot.version);
                (snapshot.store, snapshot.timer)
            }
            Err(e) => {
                tracing::warn!("Failed to parse session snapshot: {}. Using defaults.", e);
                Default::default()
            }
        }
    }

    /// Snapshot the session. Failures are logged, never returned: the
    /// in-memory state stays authoritative.
    pub fn save_session(&mut self, store: &SessionStore, timer: &RestTimer) {
        if let Err(e) = self.try_save_session(store, timer) {
            tracing::warn!("Failed to persist session snapshot: {}", e);
        }
    }

    pub fn try_save_session(&mut self, store: &SessionStore, timer: &RestTimer) -> Result<()> {
        let snapshot = SessionSnapshot {
            version: SNAPSHOT_VERSION,
            store: store.clone(),
            timer: timer.clone(),
        };
        // Use compact JSON, snapshots are rewritten on every action
        let contents = serde_json::to_string(&snapshot)?;
        self.kv.set(SESSION_KEY, &contents)
    }

    pub fn clear_session(&mut self) -> Result<()> {
        self.kv.remove(SESSION_KEY)
    }

    /// Load cached reference data.
    ///
    /// A cache written under an older [`CACHE_VERSION`] (or unreadable) is
    /// deleted and `None` is returned so the caller refetches it.
    pub fn load_reference(&mut self) -> Option<ReferenceData> {
        let raw = match self.kv.get(REFERENCE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Unable to read reference cache: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<ReferenceCache>(&raw) {
            Ok(cache) if cache.version >= CACHE_VERSION => return Some(cache.data),
            Ok(cache) => tracing::info!(
                "Reference cache v{} is older than v{}, discarding",
                cache.version,
                CACHE_VERSION
            ),
            Err(e) => tracing::warn!("Failed to parse reference cache: {}. Discarding.", e),
        }

        if let Err(e) = self.kv.remove(REFERENCE_KEY) {
            tracing::warn!("Failed to remove stale reference cache: {}", e);
        }
        None
    }

    pub fn save_reference(&mut self, data: &ReferenceData) -> Result<()> {
        let cache = ReferenceCache {
            version: CACHE_VERSION,
            data: data.clone(),
        };
        self.kv.set(REFERENCE_KEY, &serde_json::to_string(&cache)?)
    }
}
