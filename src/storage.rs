use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 3600;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub bind_address: String,
    /// Empty disables the remote fetch; the bundled catalog is used instead.
    pub catalog_url: String,
    pub catalog_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            catalog_url: String::new(),
            catalog_ttl_secs: DEFAULT_CATALOG_TTL_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.trim().is_empty() {
            return Err("bind_address must not be empty".to_string());
        }
        for (field, value) in [
            ("catalog_ttl_secs", self.catalog_ttl_secs),
            ("fetch_timeout_secs", self.fetch_timeout_secs),
        ] {
            if value == 0 {
                return Err(format!("{field} must be greater than zero"));
            }
        }
        Ok(())
    }

    /// `ARSCFG_BIND` and `ARSCFG_CATALOG_URL` win over the settings file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("ARSCFG_BIND") {
            if !bind.trim().is_empty() {
                self.bind_address = bind.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var("ARSCFG_CATALOG_URL") {
            self.catalog_url = url.trim().to_string();
        }
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

pub fn base_dir() -> PathBuf {
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("arscfg");
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("arscfg");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join("arscfg");
    }
    PathBuf::from("arscfg-data")
}

pub fn settings_path() -> PathBuf {
    base_dir().join("settings.json")
}

pub fn cache_path() -> PathBuf {
    base_dir().join("cache.json")
}

pub async fn load_settings(path: &Path) -> Result<AppSettings, String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str(&contents)
            .map_err(|err| format!("failed to parse settings: {err}")),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(AppSettings::default()),
        Err(err) => Err(format!("failed to read settings: {err}")),
    }
}

pub async fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), String> {
    let data = serde_json::to_string_pretty(settings)
        .map_err(|err| format!("failed to serialize settings: {err}"))?;
    write_atomic(path, data).await
}

/// Loads the settings file, writing the defaults on first run so there is a
/// file to edit.
pub async fn load_or_init_settings(path: &Path) -> Result<AppSettings, String> {
    if tokio::fs::metadata(path).await.is_ok() {
        return load_settings(path).await;
    }
    let settings = AppSettings::default();
    save_settings(path, &settings).await?;
    Ok(settings)
}

/// Writes through a sibling temp file and renames it into place.
pub async fn write_atomic(path: &Path, data: String) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| format!("failed to create dir {}: {err}", parent.display()))?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, data)
        .await
        .map_err(|err| format!("failed to write temp file: {err}"))?;

    if tokio::fs::metadata(path).await.is_ok() {
        tokio::fs::remove_file(path)
            .await
            .map_err(|err| format!("failed to remove old file: {err}"))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|err| format!("failed to move file into place: {err}"))
}
