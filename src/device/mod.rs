//! Device-local state / 기기 로컬 상태
//!
//! Architecture principles / 구조 원칙:
//! - `LocalStore` is an observable key-value store: read / write / subscribe
//! - Values are JSON; a value that fails to parse reads as the caller's default
//! - Persistence goes through a `PersistenceAdapter` (memory, or a JSON file)
//! - Handles cloned from one store share a change bus, so every "tab" sees every write
//! - Last write wins, no merge; read-modify-write through one store is serialized

pub mod learning;
pub mod review;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::broadcast;

use crate::error::{HanjaError, Result};

pub use learning::{Favorites, Prefs, RecentChars, Streak, MAX_RECENT};
pub use review::{ReviewItem, ReviewQueue};

/// Storage keys / 저장 키
pub mod keys {
    pub const RECENT: &str = "hanja-recent";
    pub const FAVORITES: &str = "hanja-favorites";
    pub const STREAK: &str = "hanja-streak";
    pub const LAST_MISSION: &str = "hanja-last-mission";
    pub const REVIEW_QUEUE: &str = "hanja-review-queue";
    pub const PREFS: &str = "hanja-prefs";
}

/// Raw string storage behind a `LocalStore` / 영속화 어댑터
pub trait PersistenceAdapter: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile adapter / 메모리 어댑터
#[derive(Default)]
pub struct MemoryAdapter {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// All keys in one JSON object file, replaced atomically on every write / 파일 어댑터
pub struct JsonFileAdapter {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(HanjaError::Persistence(format!(
                    "Failed to read {:?}: {}",
                    self.path, e
                )))
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("Device state file {:?} is corrupt, starting empty: {}", self.path, e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let persist_err = |e: &dyn std::fmt::Display| {
            HanjaError::Persistence(format!("Failed to write {:?}: {}", self.path, e))
        };

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| persist_err(&e))?;

        let content = serde_json::to_string_pretty(entries)?;
        let mut temp = NamedTempFile::new_in(parent).map_err(|e| persist_err(&e))?;
        temp.write_all(content.as_bytes()).map_err(|e| persist_err(&e))?;
        temp.persist(&self.path).map_err(|e| persist_err(&e))?;
        Ok(())
    }
}

impl PersistenceAdapter for JsonFileAdapter {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.store(&entries)?;
        }
        Ok(())
    }
}

/// Change notification / 변경 알림
///
/// `key: None` means every key may have changed (storage cleared).
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub key: Option<String>,
}

impl StorageEvent {
    pub fn concerns(&self, key: &str) -> bool {
        self.key.as_deref().map_or(true, |k| k == key)
    }
}

/// Observable key-value store / 관찰 가능한 로컬 저장소
#[derive(Clone)]
pub struct LocalStore {
    adapter: Arc<dyn PersistenceAdapter>,
    events: broadcast::Sender<StorageEvent>,
    // Shared by clones; reentrant so `transaction` may call `update`
    mutation: Arc<ReentrantMutex<()>>,
}

impl LocalStore {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            adapter,
            events,
            mutation: Arc::new(ReentrantMutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryAdapter::new()))
    }

    /// Store backed by `state.json` in `dir` / 파일 저장소
    pub fn open_dir(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join("state.json");
        tracing::info!("Device state at {:?}", path);
        Self::new(Arc::new(JsonFileAdapter::new(path)))
    }

    /// Read a value; absent or unparseable reads as `default` / 값 읽기
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.adapter.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!("Reading '{}' failed: {}", key, e);
                return default;
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::debug!("Stored '{}' is not valid, using default: {}", key, e);
            default
        })
    }

    /// Write a value and notify every handle / 값 쓰기
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let _guard = self.mutation.lock();
        self.adapter.set(key, &raw)?;
        self.publish(Some(key));
        Ok(())
    }

    /// Read-modify-write; returns the stored value / 값 갱신
    ///
    /// No other mutation through this store or its clones runs between the read and the write.
    pub fn update<T, F>(&self, key: &str, default: T, f: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let _guard = self.mutation.lock();
        let next = f(self.read(key, default));
        self.write(key, &next)?;
        Ok(next)
    }

    /// Run several reads and writes as one step / 묶음 갱신
    pub fn transaction<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.mutation.lock();
        f()
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.mutation.lock();
        self.adapter.remove(key)?;
        self.publish(Some(key));
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    /// Announce a change made outside this process (another tab, a sync tool)
    pub fn notify_external_change(&self, key: Option<&str>) {
        self.publish(key);
    }

    fn publish(&self, key: Option<&str>) {
        // No listeners is fine
        let _ = self.events.send(StorageEvent {
            key: key.map(str::to_string),
        });
    }
}
