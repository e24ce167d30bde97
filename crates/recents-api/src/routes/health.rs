use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Pings the summary store and the message feed
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (store, feed) = state.service.ping().await;

    let mut services = HashMap::new();
    let mut healthy = true;
    for (name, result) in [("summary_store", store), ("message_feed", feed)] {
        let status = match result {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(service = name, "Health check failed: {}", e);
                healthy = false;
                "disconnected"
            }
        };
        services.insert(name.to_string(), status.to_string());
    }

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
