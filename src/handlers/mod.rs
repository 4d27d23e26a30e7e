use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;
use crate::utils::response::success;

pub mod board_members;
pub mod contact;
pub mod events;
pub mod members;
pub mod newsletter;
pub mod semesters;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    timestamp: String,
    environment: String,
}

/// Liveness probe; intentionally checks no dependencies.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let payload = HealthPayload {
        status: "healthy",
        service: "sjba-api",
        timestamp: Utc::now().to_rfc3339(),
        environment: state.config.environment.clone(),
    };

    success(payload, "Health check successful")
}

pub async fn service_info() -> axum::Json<serde_json::Value> {
    axum::Json(json!({
        "name": "SJBA API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "description": "Backend API for the SJBA website",
        "endpoints": {
            "health": "/health",
            "api": "/v1"
        }
    }))
}
