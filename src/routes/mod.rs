pub mod catalog;
pub mod config;
pub mod health;
pub mod password;

use arscfg::{
    cache::FileStore,
    catalog::{CatalogService, ReqwestFetcher},
    models::ConfigDocument,
    storage::{cache_path, AppSettings},
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub document: Arc<Mutex<ConfigDocument>>,
    pub catalog: CatalogService,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/config", get(config::get_config))
        .route("/api/config/field", post(config::set_field))
        .route("/api/config/mods", post(config::set_mods))
        .route("/api/config/mods/toggle", post(config::toggle_mod))
        .route("/api/config/platforms/toggle", post(config::toggle_platform))
        .route("/api/config/import", post(config::import_config))
        .route("/api/config/reset", post(config::reset_config))
        .route("/api/config/export", get(config::export_config))
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/scenarios", get(catalog::get_scenarios))
        .route("/api/mods/options", get(catalog::get_mod_options))
        .route("/api/password", post(password::generate))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn default_state(settings: &AppSettings) -> Result<AppState, String> {
    let fetcher = ReqwestFetcher::new(settings.fetch_timeout())?;
    let catalog = CatalogService::new(
        Arc::new(fetcher),
        Arc::new(FileStore::new(cache_path())),
        settings.catalog_url.clone(),
    )
    .with_ttl(settings.catalog_ttl());

    Ok(AppState {
        document: Arc::new(Mutex::new(ConfigDocument::default())),
        catalog,
    })
}
