//! Durable per-user preferences.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PreferenceStore                          │
//! │   - In-memory cache of string preferences                     │
//! │   - Writes through to the StorageBackend on every set         │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (testing, ephemeral)             │
//! │   - FileStorage: JSON file (requires `persistence`)           │
//! │   - browser localStorage (folio-web, wasm32 only)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: storage failures never panic; the cache keeps
//!    the latest value and the error is returned to the caller.
//! 2. **Atomic writes**: file storage uses the write-rename pattern.
//! 3. **Last write wins**: a value read after reload is the last one set.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returns error, cache keeps new value |
//! | `StorageError::Serialization` | JSON encode/decode | Load fails, caller falls back to defaults |
//! | `StorageError::Unavailable` | Host storage disabled | Returns error, cache keeps new value |
//! | Missing key | First visit | `None` |

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during preference storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Stored data is corrupted or a lock was poisoned.
    Corruption(String),
    /// Backend is not available (e.g. storage disabled by the browser).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_) => None,
            StorageError::Corruption(_) => None,
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Pluggable key-value storage for preferences.
pub trait StorageBackend {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load every stored preference. Empty on first run.
    fn load_all(&self) -> StorageResult<HashMap<String, String>>;

    /// Store a single preference.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a single preference.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend for testing and ephemeral state.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load_all(&self) -> StorageResult<HashMap<String, String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for std::rc::Rc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_all(&self) -> StorageResult<HashMap<String, String>> {
        (**self).load_all()
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "persistence")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// File format for stored preferences (JSON).
    #[derive(Serialize, Deserialize)]
    struct PreferenceFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Preference key -> value.
        entries: HashMap<String, String>,
    }

    impl PreferenceFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// File-based storage backend using JSON.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "theme": "dark"
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Create storage at the default location for the application.
        ///
        /// Uses `$XDG_STATE_HOME/folio/{app_name}/preferences.json`, falling
        /// back to `~/.local/state` and then the current directory.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            let base = dirs_or_fallback();
            let path = base.join("folio").join(app_name).join("preferences.json");
            Self { path }
        }

        /// Path of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn write_all(&self, entries: HashMap<String, String>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let file_content = PreferenceFile {
                format_version: PreferenceFile::FORMAT_VERSION,
                entries,
            };

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &file_content).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize preferences: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }

            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = file_content.entries.len(),
                "saved preferences"
            );
            Ok(())
        }
    }

    /// Entries a save extends. An unparseable file is replaced; any other
    /// read failure aborts the save so stored entries are not overwritten.
    pub(super) fn entries_for_save(
        loaded: StorageResult<HashMap<String, String>>,
        path: &Path,
    ) -> StorageResult<HashMap<String, String>> {
        match loaded {
            Ok(entries) => Ok(entries),
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(path = %path.display(), %reason, "replacing unreadable preference file");
                Ok(HashMap::new())
            }
            Err(e) => Err(e),
        }
    }

    fn dirs_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load_all(&self) -> StorageResult<HashMap<String, String>> {
            if !self.path.exists() {
                return Ok(HashMap::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);
            let stored: PreferenceFile = serde_json::from_reader(reader).map_err(|e| {
                if e.is_io() {
                    StorageError::Io(e.into())
                } else {
                    StorageError::Serialization(format!("failed to parse preference file: {e}"))
                }
            })?;

            if stored.format_version != PreferenceFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = stored.format_version,
                    expected = PreferenceFile::FORMAT_VERSION,
                    "preference file format version mismatch, ignoring stored preferences"
                );
                return Ok(HashMap::new());
            }

            Ok(stored.entries)
        }

        fn save(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut entries = entries_for_save(self.load_all(), &self.path)?;
            entries.insert(key.to_owned(), value.to_owned());
            self.write_all(entries)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let mut entries = self.load_all()?;
            if entries.remove(key).is_none() {
                return Ok(());
            }
            self.write_all(entries)
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "persistence")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Preference Store
// ─────────────────────────────────────────────────────────────────────────────

/// Cached, write-through preference store.
///
/// Reads are served from the cache loaded at construction. Writes update the
/// cache first and then the backend, so a failing backend never loses the
/// in-session value.
pub struct PreferenceStore {
    backend: Box<dyn StorageBackend>,
    cache: HashMap<String, String>,
}

impl PreferenceStore {
    /// Open a store, loading whatever the backend holds.
    ///
    /// A backend that fails to load yields an empty store; the failure is
    /// logged.
    #[must_use]
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let cache = match backend.load_all() {
            Ok(entries) => {
                tracing::debug!(backend = backend.name(), count = entries.len(), "loaded preferences");
                entries
            }
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "failed to load preferences, using defaults");
                HashMap::new()
            }
        };
        Self { backend, cache }
    }

    /// Open an ephemeral in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStorage::new()))
    }

    /// Open a store backed by a JSON file.
    #[cfg(feature = "persistence")]
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::open(Box::new(FileStorage::new(path)))
    }

    /// Read a preference.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cache.get(key).map(String::as_str)
    }

    /// Write a preference through to the backend.
    pub fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.cache.insert(key.to_owned(), value.to_owned());
        self.backend.save(key, value)
    }

    /// Delete a preference.
    pub fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.cache.remove(key);
        self.backend.remove(key)
    }

    /// Backend name for diagnostics.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("backend", &self.backend.name())
            .field("entries", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn name(&self) -> &str {
            "BrokenStorage"
        }

        fn load_all(&self) -> StorageResult<HashMap<String, String>> {
            Err(StorageError::Unavailable("disabled".into()))
        }

        fn save(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("disabled".into()))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("disabled".into()))
        }
    }

    #[test]
    fn memory_round_trip() {
        let mut store = PreferenceStore::in_memory();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme"), Some("dark"));
        store.remove("theme").unwrap();
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn reopen_sees_last_write() {
        let storage = Rc::new(MemoryStorage::new());
        {
            let mut store = PreferenceStore::open(Box::new(storage.clone()));
            store.set("theme", "dark").unwrap();
            store.set("theme", "light").unwrap();
        }
        let store = PreferenceStore::open(Box::new(storage));
        assert_eq!(store.get("theme"), Some("light"));
    }

    #[test]
    fn prepopulated_memory_storage() {
        let store = PreferenceStore::open(Box::new(MemoryStorage::with_entries([("theme", "dark")])));
        assert_eq!(store.get("theme"), Some("dark"));
    }

    #[test]
    fn broken_backend_keeps_cache() {
        let mut store = PreferenceStore::open(Box::new(BrokenStorage));
        assert_eq!(store.get("theme"), None);
        let err = store.set("theme", "dark").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.get("theme"), Some("dark"));
    }

    #[test]
    fn error_display() {
        let err = StorageError::Unavailable("localStorage disabled".into());
        assert_eq!(err.to_string(), "storage unavailable: localStorage disabled");
        let io: StorageError = std::io::Error::other("disk full").into();
        assert!(std::error::Error::source(&io).is_some());
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn save_resets_only_unparseable_files() {
        use std::path::Path;

        let path = Path::new("preferences.json");
        let kept = HashMap::from([("other".to_owned(), "value".to_owned())]);
        assert_eq!(
            file_storage::entries_for_save(Ok(kept.clone()), path).unwrap(),
            kept
        );

        let corrupt = Err(StorageError::Serialization("bad json".into()));
        assert!(file_storage::entries_for_save(corrupt, path).unwrap().is_empty());

        let unreadable = Err(StorageError::Io(std::io::Error::other("read failed")));
        assert!(matches!(
            file_storage::entries_for_save(unreadable, path),
            Err(StorageError::Io(_))
        ));
    }
}
