mod forms;
mod routes;
mod services;

use arscfg::storage::{load_or_init_settings, settings_path};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = settings_path();
    let mut settings = load_or_init_settings(&path).await.unwrap_or_else(|message| {
        warn!("using default settings: {message}");
        Default::default()
    });
    settings.apply_env_overrides();
    settings.validate().expect("invalid settings");

    let state = routes::default_state(&settings).expect("failed to prepare app state");

    let catalog = state.catalog.clone();
    tokio::spawn(async move {
        let loaded = catalog.load_catalog().await;
        info!(
            entries = loaded.entries.len(),
            source = ?loaded.source,
            "catalog ready"
        );
    });

    let app = routes::build_router(state);
    let addr: SocketAddr = settings.bind_address.parse().expect("invalid bind address");
    info!("server listening on http://{addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .expect("server failed");
}
