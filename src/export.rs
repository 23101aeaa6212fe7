use crate::engine::normalize;
use crate::models::ConfigDocument;
use serde_json::Value;
use tracing::error;

pub const EXPORT_FILE_NAME: &str = "arma_server_config.json";

/// The document in file shape, keys in declaration order.
pub fn serialize(doc: &ConfigDocument) -> Value {
    serde_json::to_value(doc).unwrap_or_else(|err| {
        error!("failed to serialize config document: {err}");
        Value::Null
    })
}

pub fn to_export_json(doc: &ConfigDocument) -> Result<String, String> {
    serde_json::to_string_pretty(doc).map_err(|err| format!("failed to serialize config: {err}"))
}

/// Reads a previously exported file. Missing keys take their defaults and the
/// result is normalized, so a hand-edited file cannot break the invariants.
pub fn parse_document(text: &str) -> Result<ConfigDocument, String> {
    let doc: ConfigDocument =
        serde_json::from_str(text).map_err(|err| format!("failed to parse config: {err}"))?;
    Ok(normalize(doc))
}
