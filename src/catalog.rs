use crate::cache::{
    current_epoch_millis, read_catalog_cache, write_catalog_cache, CatalogCache, KeyValueStore,
};
use crate::error::CatalogError;
use crate::models::CatalogEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

const DEFAULT_CATALOG: &str = include_str!("../assets/default_catalog.json");

pub const CATALOG_TTL: Duration = Duration::from_secs(3600);

/// How long a fallback result is served before the remote is tried again.
pub const FALLBACK_RETRY: Duration = Duration::from_secs(60);

/// Wire shape of the remote catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub data: Vec<CatalogEntry>,
}

pub fn parse_catalog_document(body: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    serde_json::from_str::<CatalogDocument>(body)
        .map(|document| document.data)
        .map_err(|err| CatalogError::Malformed(err.to_string()))
}

/// The catalog bundled with the binary, used when nothing better is available.
pub fn default_catalog() -> Vec<CatalogEntry> {
    parse_catalog_document(DEFAULT_CATALOG).unwrap_or_else(|err| {
        warn!("bundled catalog unusable: {err}");
        Vec::new()
    })
}

#[async_trait::async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_catalog(&self, url: &str) -> Result<String, CatalogError>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl CatalogFetcher for ReqwestFetcher {
    async fn fetch_catalog(&self, url: &str) -> Result<String, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| CatalogError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        response
            .text()
            .await
            .map_err(|err| CatalogError::Request(format!("failed to read response: {err}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    /// Fresh cache entry, no network access.
    Cache,
    /// Fetched just now.
    Remote,
    /// Fetch failed, expired cache entry served instead.
    StaleCache,
    /// Fetch failed with nothing cached.
    Bundled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedCatalog {
    pub source: CatalogSource,
    pub fetched_at: Option<u64>,
    #[serde(skip)]
    pub expires_at: u64,
    pub entries: Vec<CatalogEntry>,
}

impl LoadedCatalog {
    fn from_cache(cache: CatalogCache, source: CatalogSource, expires_at: u64) -> Self {
        Self {
            source,
            fetched_at: Some(cache.fetched_at),
            expires_at,
            entries: cache.document,
        }
    }
}

/// Loads the catalog through the cache, refreshing it from the remote when it
/// has expired.
#[derive(Clone)]
pub struct CatalogService {
    fetcher: Arc<dyn CatalogFetcher>,
    store: Arc<dyn KeyValueStore>,
    url: String,
    ttl: Duration,
    refresh_lock: Arc<Mutex<()>>,
    latest: Arc<RwLock<Option<Arc<LoadedCatalog>>>>,
}

impl CatalogService {
    pub fn new(
        fetcher: Arc<dyn CatalogFetcher>,
        store: Arc<dyn KeyValueStore>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            url: url.into(),
            ttl: CATALOG_TTL,
            refresh_lock: Arc::new(Mutex::new(())),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn load_catalog(&self) -> Arc<LoadedCatalog> {
        self.load_catalog_at(current_epoch_millis()).await
    }

    /// Never fails: fetch errors fall back to the expired cache entry, then to
    /// the bundled catalog.
    pub async fn load_catalog_at(&self, now_ms: u64) -> Arc<LoadedCatalog> {
        let _guard = self.refresh_lock.lock().await;
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);

        let cached = read_catalog_cache(self.store.as_ref()).await;
        if let Some(cache) = cached.as_ref().filter(|cache| cache.is_fresh(now_ms, self.ttl)) {
            let expires_at = cache.fetched_at.saturating_add(ttl_ms);
            let loaded = LoadedCatalog::from_cache(cache.clone(), CatalogSource::Cache, expires_at);
            return self.publish(loaded).await;
        }

        let loaded = match self.fetch_remote().await {
            Ok(entries) => {
                info!(entries = entries.len(), "catalog refreshed from {}", self.url);
                let cache = CatalogCache::new(entries, now_ms);
                if let Err(err) = write_catalog_cache(self.store.as_ref(), &cache).await {
                    warn!("failed to store catalog cache: {err}");
                }
                LoadedCatalog::from_cache(
                    cache,
                    CatalogSource::Remote,
                    now_ms.saturating_add(ttl_ms),
                )
            }
            Err(err) => {
                match err {
                    CatalogError::Disabled => debug!("{err}"),
                    _ => warn!("catalog fetch failed: {err}"),
                }
                let retry_at = now_ms.saturating_add(FALLBACK_RETRY.as_millis() as u64);
                match cached {
                    Some(cache) => {
                        LoadedCatalog::from_cache(cache, CatalogSource::StaleCache, retry_at)
                    }
                    None => LoadedCatalog {
                        source: CatalogSource::Bundled,
                        fetched_at: None,
                        expires_at: retry_at,
                        entries: default_catalog(),
                    },
                }
            }
        };
        self.publish(loaded).await
    }

    /// Last loaded catalog while it is still current, otherwise a new load.
    pub async fn current(&self) -> Arc<LoadedCatalog> {
        self.current_at(current_epoch_millis()).await
    }

    pub async fn current_at(&self, now_ms: u64) -> Arc<LoadedCatalog> {
        let latest = self.latest.read().await.clone();
        if let Some(latest) = latest {
            if now_ms < latest.expires_at {
                return latest;
            }
        }
        self.load_catalog_at(now_ms).await
    }

    async fn fetch_remote(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        if self.url.trim().is_empty() {
            return Err(CatalogError::Disabled);
        }
        let body = self.fetcher.fetch_catalog(&self.url).await?;
        parse_catalog_document(&body)
    }

    async fn publish(&self, loaded: LoadedCatalog) -> Arc<LoadedCatalog> {
        let loaded = Arc::new(loaded);
        *self.latest.write().await = Some(loaded.clone());
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = default_catalog();
        assert!(!catalog.is_empty());
        assert!(catalog.iter().any(|entry| entry.id == "59727DAE364DEADB"));
    }

    #[test]
    fn rejects_documents_without_data() {
        assert!(matches!(
            parse_catalog_document(r#"[{"id":"A","name":"A"}]"#),
            Err(CatalogError::Malformed(_))
        ));
        assert!(matches!(
            parse_catalog_document("<html>"),
            Err(CatalogError::Malformed(_))
        ));
    }

    #[test]
    fn missing_scenario_list_reads_as_empty() {
        let entries = parse_catalog_document(r#"{"data":[{"id":"A","name":"Mod A"}]}"#)
            .expect("parse");
        assert!(entries[0].scenario_ids.is_empty());
    }
}
