//! Key/value persistence for the last fetched catalog.

use crate::models::CatalogEntry;
use crate::storage::write_atomic;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

pub const CATALOG_KEY: &str = "arscfg.catalog";
pub const CATALOG_FETCHED_AT_KEY: &str = "arscfg.catalog.fetchedAt";

#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    /// Stores all entries together; readers never observe half of them.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), String>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), String> {
        let mut stored = self.entries.lock().await;
        for (key, value) in entries {
            stored.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

/// Keeps every key in one JSON object file.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `None` when the file does not exist yet.
    async fn read_contents(&self) -> Result<Option<String>, String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("failed to read cache file: {err}")),
        }
    }
}

fn parse_entries(contents: &str) -> Result<HashMap<String, String>, String> {
    serde_json::from_str(contents).map_err(|err| format!("failed to parse cache file: {err}"))
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        match self.read_contents().await? {
            Some(contents) => Ok(parse_entries(&contents)?.remove(key)),
            None => Ok(None),
        }
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;
        // A corrupt file is replaced; a file we cannot read is left alone.
        let mut stored = match self.read_contents().await? {
            Some(contents) => parse_entries(&contents).unwrap_or_else(|err| {
                warn!("replacing cache file: {err}");
                HashMap::new()
            }),
            None => HashMap::new(),
        };
        for (key, value) in entries {
            stored.insert((*key).to_string(), value.clone());
        }
        let data = serde_json::to_string_pretty(&stored)
            .map_err(|err| format!("failed to serialize cache: {err}"))?;
        write_atomic(&self.path, data).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCache {
    pub document: Vec<CatalogEntry>,
    /// Epoch milliseconds.
    pub fetched_at: u64,
}

impl CatalogCache {
    pub fn new(document: Vec<CatalogEntry>, fetched_at: u64) -> Self {
        Self {
            document,
            fetched_at,
        }
    }

    /// A timestamp ahead of `now_ms` counts as stale.
    pub fn is_fresh(&self, now_ms: u64, ttl: Duration) -> bool {
        now_ms
            .checked_sub(self.fetched_at)
            .map(|age| u128::from(age) < ttl.as_millis())
            .unwrap_or(false)
    }
}

/// Reads the cached catalog. Missing or malformed entries read as `None`.
pub async fn read_catalog_cache(store: &dyn KeyValueStore) -> Option<CatalogCache> {
    let (document, fetched_at) = match (
        store.get(CATALOG_KEY).await,
        store.get(CATALOG_FETCHED_AT_KEY).await,
    ) {
        (Ok(Some(document)), Ok(Some(fetched_at))) => (document, fetched_at),
        (Ok(_), Ok(_)) => return None,
        (Err(err), _) | (_, Err(err)) => {
            warn!("catalog cache unreadable: {err}");
            return None;
        }
    };

    let document = match serde_json::from_str::<Vec<CatalogEntry>>(&document) {
        Ok(document) => document,
        Err(err) => {
            warn!("ignoring malformed cached catalog: {err}");
            return None;
        }
    };
    let fetched_at = match fetched_at.trim().parse::<u64>() {
        Ok(value) => value,
        Err(err) => {
            warn!("ignoring malformed catalog timestamp {fetched_at:?}: {err}");
            return None;
        }
    };

    Some(CatalogCache::new(document, fetched_at))
}

pub async fn write_catalog_cache(
    store: &dyn KeyValueStore,
    cache: &CatalogCache,
) -> Result<(), String> {
    let document = serde_json::to_string(&cache.document)
        .map_err(|err| format!("failed to serialize catalog: {err}"))?;
    store
        .set_many(&[
            (CATALOG_KEY, document),
            (CATALOG_FETCHED_AT_KEY, cache.fetched_at.to_string()),
        ])
        .await
}

pub fn current_epoch_millis() -> u64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: format!("Mod {id}"),
            scenario_ids: vec![format!("{{{id}}}Missions/Test.conf")],
        }
    }

    #[test]
    fn freshness_follows_ttl() {
        let cache = CatalogCache::new(Vec::new(), 1_000_000);
        assert!(cache.is_fresh(1_000_000, HOUR));
        assert!(cache.is_fresh(1_000_000 + 3_599_999, HOUR));
        assert!(!cache.is_fresh(1_000_000 + 3_600_000, HOUR));
        assert!(!cache.is_fresh(999_999, HOUR));
    }

    #[tokio::test]
    async fn memory_store_round_trips_cache() {
        let store = MemoryStore::new();
        assert_eq!(read_catalog_cache(&store).await, None);

        let cache = CatalogCache::new(vec![entry("A")], 42);
        write_catalog_cache(&store, &cache).await.expect("write");
        assert_eq!(read_catalog_cache(&store).await, Some(cache));
        assert_eq!(
            store.get(CATALOG_FETCHED_AT_KEY).await,
            Ok(Some("42".to_string()))
        );
    }

    #[tokio::test]
    async fn malformed_entries_read_as_absent() {
        let store = MemoryStore::new();
        store
            .set_many(&[
                (CATALOG_KEY, "{not json".to_string()),
                (CATALOG_FETCHED_AT_KEY, "42".to_string()),
            ])
            .await
            .expect("seed");
        assert_eq!(read_catalog_cache(&store).await, None);

        store
            .set_many(&[
                (CATALOG_KEY, "[]".to_string()),
                (CATALOG_FETCHED_AT_KEY, "yesterday".to_string()),
            ])
            .await
            .expect("seed");
        assert_eq!(read_catalog_cache(&store).await, None);
    }

    #[tokio::test]
    async fn file_store_persists_between_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        let cache = CatalogCache::new(vec![entry("A"), entry("B")], 7);

        write_catalog_cache(&FileStore::new(&path), &cache)
            .await
            .expect("write");
        let reopened = FileStore::new(&path);
        assert_eq!(read_catalog_cache(&reopened).await, Some(cache));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "garbage").expect("seed");

        let store = FileStore::new(&path);
        assert_eq!(read_catalog_cache(&store).await, None);

        let cache = CatalogCache::new(vec![entry("A")], 9);
        write_catalog_cache(&store, &cache).await.expect("write");
        assert_eq!(read_catalog_cache(&store).await, Some(cache));
    }

    #[tokio::test]
    async fn file_store_keeps_unreadable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory in place of the file fails to read without being corrupt.
        let path = dir.path().join("cache.json");
        std::fs::create_dir(&path).expect("seed");

        let store = FileStore::new(&path);
        let err = store
            .set_many(&[(CATALOG_FETCHED_AT_KEY, "1".to_string())])
            .await
            .expect_err("should fail");
        assert!(err.starts_with("failed to read cache file"), "{err}");
        assert!(path.is_dir());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
