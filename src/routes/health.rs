use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::AppState;

/// Health check endpoint
///
/// Reports whether the store answers a read. Used by load balancers and
/// monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.clone();
    let db_status = tokio::task::spawn_blocking(move || match store.ping() {
        Ok(()) => "connected",
        Err(e) => {
            tracing::error!("Store health check failed: {:?}", e);
            "disconnected"
        }
    })
    .await
    .unwrap_or("error");

    Json(json!({
        "status": if db_status == "connected" { "healthy" } else { "unhealthy" },
        "database": db_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
