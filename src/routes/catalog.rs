use crate::routes::AppState;
use arscfg::{
    catalog::LoadedCatalog,
    models::ModRef,
    projection::{mod_options, project_scenarios, scenario_display_name},
};
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioGroupView {
    pub label: String,
    pub scenarios: Vec<ScenarioOption>,
}

#[derive(Serialize)]
pub struct ScenarioOption {
    pub id: String,
    pub name: String,
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<LoadedCatalog> {
    let loaded = state.catalog.current().await;
    Json((*loaded).clone())
}

pub async fn get_scenarios(State(state): State<AppState>) -> Json<Vec<ScenarioGroupView>> {
    let loaded = state.catalog.current().await;
    let groups = project_scenarios(&loaded.entries)
        .into_iter()
        .map(|group| ScenarioGroupView {
            label: group.label,
            scenarios: group
                .scenario_ids
                .into_iter()
                .map(|id| ScenarioOption {
                    name: scenario_display_name(&id).unwrap_or_else(|| id.clone()),
                    id,
                })
                .collect(),
        })
        .collect();
    Json(groups)
}

pub async fn get_mod_options(State(state): State<AppState>) -> Json<Vec<ModRef>> {
    let loaded = state.catalog.current().await;
    Json(mod_options(&loaded.entries))
}
