use crate::server::AppState;
use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};

/// Run every plugin's health probe and return the combined results, one
/// status record per configured credential.
pub async fn auth_status(State(state): State<AppState>) -> Json<Value> {
    let mut plugins = serde_json::Map::new();
    for (name, plugin) in state.plugins.iter() {
        let statuses = plugin.health_check(&state.http).await;
        plugins.insert(name.clone(), Value::Array(statuses));
    }
    Json(json!({ "plugins": plugins }))
}
