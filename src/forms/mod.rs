use arscfg::models::ModRef;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FieldRequest {
    pub field: String,
    pub value: FieldValue,
}

/// What a form control posts: checkbox state, a number, or raw text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Checked(bool),
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModToggleRequest {
    pub mod_id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl From<ModToggleRequest> for ModRef {
    fn from(request: ModToggleRequest) -> Self {
        ModRef {
            mod_id: request.mod_id,
            name: request.name,
            version: request.version,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModSelectionRequest {
    #[serde(default)]
    pub mods: Vec<ModRef>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformToggleRequest {
    pub platform: String,
}
