use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `"up"` when the panel store answered, `"down"` otherwise.
    pub storage: &'static str,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage_up = match state.panels.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Panel store unreachable");
            false
        }
    };

    Json(HealthResponse {
        status: if storage_up { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage: if storage_up { "up" } else { "down" },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
