//! Versioned JSON blob persistence.
//!
//! Every persisted document is a named JSON blob read and written through
//! the `BlobStore` trait. Reads hand back an opaque version token; writes
//! carry the token the caller last saw and fail with `WriteConflict` when
//! somebody else wrote in between. `update` wraps the read-modify-write
//! loop with a bounded number of conflict retries.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Opaque version token. 0 means "blob does not exist yet".
pub type Version = u64;

pub const MISSING: Version = 0;

const UPDATE_RETRIES: u32 = 3;

pub trait BlobStore {
    /// Returns the blob content and its current version, or `None` if the
    /// blob has never been written.
    fn read(&self, key: &str) -> Result<Option<(String, Version)>, AppError>;

    /// Writes `content` if the blob is still at `expected` (use `MISSING`
    /// when creating). A stale token yields `AppError::WriteConflict`.
    fn write(&self, key: &str, content: &str, expected: Version) -> Result<(), AppError>;
}

/// Parses a blob into `T`, treating a missing blob or corrupt JSON as the
/// default (empty) state. Informational data can always be rebuilt, so a
/// bad file must never take the process down.
pub fn read_document<B: BlobStore, T>(store: &B, key: &str) -> Result<(T, Version), AppError>
where
    T: DeserializeOwned + Default,
{
    match store.read(key)? {
        Some((content, version)) => {
            let doc = serde_json::from_str(&content).unwrap_or_default();
            Ok((doc, version))
        }
        None => Ok((T::default(), MISSING)),
    }
}

/// Read-modify-write with optimistic concurrency. The closure mutates the
/// document and returns whether anything changed; an unchanged document
/// skips the write entirely. Conflicts re-read and retry a bounded number
/// of times, then surface `WriteConflict` for the caller to log and drop.
pub fn update<B: BlobStore, T, F>(store: &B, key: &str, mut mutate: F) -> Result<bool, AppError>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnMut(&mut T) -> bool,
{
    for _ in 0..UPDATE_RETRIES {
        let (mut doc, version) = read_document::<B, T>(store, key)?;
        if !mutate(&mut doc) {
            return Ok(false);
        }
        let content = serde_json::to_string_pretty(&doc)
            .map_err(|e| AppError::JsonError(format!("Failed to serialize '{}': {}", key, e)))?;
        match store.write(key, &content, version) {
            Ok(()) => return Ok(true),
            Err(AppError::WriteConflict(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(AppError::WriteConflict(key.to_string()))
}

/// Blob store backed by one JSON file per key under the data directory
/// (defaults to `~/.lp_tracker`). The version token is a hash of the file
/// content, so any out-of-band edit invalidates in-flight writes too.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: Option<PathBuf>) -> Self {
        let dir = dir.unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".lp_tracker")
        });
        FileBlobStore { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys may embed riot ids; keep file names shell-friendly.
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }

    fn version_of(content: &str) -> Version {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        // Reserve 0 for "missing".
        hasher.finish().max(1)
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<(String, Version)>, AppError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let version = Self::version_of(&content);
                Ok(Some((content, version)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, content: &str, expected: Version) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::StorageError(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let path = self.path_for(key);
        let current = match fs::read_to_string(&path) {
            Ok(content) => Self::version_of(&content),
            Err(_) => MISSING,
        };
        if current != expected {
            return Err(AppError::WriteConflict(key.to_string()));
        }

        // Write through a temp file so readers never see a half-written blob.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| {
            AppError::StorageError(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &path).map_err(|e| {
            AppError::StorageError(format!("Failed to replace {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
pub struct MemoryBlobStore {
    blobs: std::sync::Mutex<std::collections::HashMap<String, (String, Version)>>,
}

#[cfg(test)]
impl MemoryBlobStore {
    pub fn new() -> Self {
        MemoryBlobStore {
            blobs: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    /// Seed a blob directly, bypassing version checks.
    pub fn put_raw(&self, key: &str, content: &str) {
        let mut blobs = self.blobs.lock().unwrap();
        let next = blobs.get(key).map(|(_, v)| v + 1).unwrap_or(1);
        blobs.insert(key.to_string(), (content.to_string(), next));
    }
}

#[cfg(test)]
impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<(String, Version)>, AppError> {
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, content: &str, expected: Version) -> Result<(), AppError> {
        let mut blobs = self.blobs.lock().unwrap();
        let current = blobs.get(key).map(|(_, v)| *v).unwrap_or(MISSING);
        if current != expected {
            return Err(AppError::WriteConflict(key.to_string()));
        }
        blobs.insert(key.to_string(), (content.to_string(), current + 1));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn write_requires_current_version() {
        let store = MemoryBlobStore::new();
        store.write("k", "a", MISSING).unwrap();
        let (_, v1) = store.read("k").unwrap().unwrap();

        // Writer with a stale token loses.
        store.write("k", "b", v1).unwrap();
        let err = store.write("k", "c", v1).unwrap_err();
        assert!(matches!(err, AppError::WriteConflict(_)));
    }

    #[test]
    fn corrupt_json_reads_as_empty_state() {
        let store = MemoryBlobStore::new();
        store.put_raw("doc", "{not json");
        let (doc, _) = read_document::<_, BTreeMap<String, i32>>(&store, "doc").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn update_skips_write_when_unchanged() {
        let store = MemoryBlobStore::new();
        let wrote =
            update::<_, BTreeMap<String, i32>, _>(&store, "doc", |_| false).unwrap();
        assert!(!wrote);
        assert!(store.read("doc").unwrap().is_none());
    }

    #[test]
    fn update_round_trips_document() {
        let store = MemoryBlobStore::new();
        update::<_, BTreeMap<String, i32>, _>(&store, "doc", |doc| {
            doc.insert("a".into(), 1);
            true
        })
        .unwrap();
        update::<_, BTreeMap<String, i32>, _>(&store, "doc", |doc| {
            doc.insert("b".into(), 2);
            true
        })
        .unwrap();

        let (doc, _) = read_document::<_, BTreeMap<String, i32>>(&store, "doc").unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["a"], 1);
    }
}
