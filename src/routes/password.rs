use arscfg::password::{generate_password, PasswordOptions};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct PasswordResponse {
    pub password: String,
}

pub async fn generate(options: Option<Json<PasswordOptions>>) -> Json<PasswordResponse> {
    let options = options.map(|Json(options)| options).unwrap_or_default();
    Json(PasswordResponse {
        password: generate_password(&options),
    })
}
