use crate::forms::{FieldRequest, ModSelectionRequest, ModToggleRequest, PlatformToggleRequest};
use crate::routes::AppState;
use crate::services::{
    apply_field_request, apply_mod_selection, apply_mod_toggle, apply_platform_toggle,
    attachment_disposition,
};
use arscfg::{
    export::{parse_document, serialize, to_export_json, EXPORT_FILE_NAME},
    models::ConfigDocument,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub async fn get_config(State(state): State<AppState>) -> Json<Value> {
    let doc = state.document.lock().await;
    Json(serialize(&doc))
}

pub async fn set_field(
    State(state): State<AppState>,
    Json(request): Json<FieldRequest>,
) -> ApiResult<Json<Value>> {
    update(&state, |doc| apply_field_request(doc, request)).await
}

pub async fn toggle_mod(
    State(state): State<AppState>,
    Json(request): Json<ModToggleRequest>,
) -> ApiResult<Json<Value>> {
    update(&state, |doc| apply_mod_toggle(doc, request)).await
}

pub async fn set_mods(
    State(state): State<AppState>,
    Json(request): Json<ModSelectionRequest>,
) -> ApiResult<Json<Value>> {
    update(&state, |doc| apply_mod_selection(doc, request.mods)).await
}

pub async fn toggle_platform(
    State(state): State<AppState>,
    Json(request): Json<PlatformToggleRequest>,
) -> ApiResult<Json<Value>> {
    update(&state, |doc| apply_platform_toggle(doc, request)).await
}

pub async fn import_config(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    update(&state, |_| parse_document(&body)).await
}

pub async fn reset_config(State(state): State<AppState>) -> Json<Value> {
    let mut doc = state.document.lock().await;
    *doc = ConfigDocument::default();
    Json(serialize(&doc))
}

pub async fn export_config(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let doc = state.document.lock().await;
    let body = to_export_json(&doc).map_err(|message| (StatusCode::INTERNAL_SERVER_ERROR, message))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment_disposition(EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}

/// Swaps in the document returned by `apply`; a rejected request leaves the
/// session untouched.
async fn update<F>(state: &AppState, apply: F) -> ApiResult<Json<Value>>
where
    F: FnOnce(&ConfigDocument) -> Result<ConfigDocument, String>,
{
    let mut doc = state.document.lock().await;
    let next = apply(&*doc).map_err(|message| (StatusCode::BAD_REQUEST, message))?;
    *doc = next;
    Ok(Json(serialize(&doc)))
}
