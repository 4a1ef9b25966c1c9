use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use carebridge_agent::IntakeRelay;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    relay: Arc<IntakeRelay>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub agent: HealthCheck,
    pub checked_at: String,
}

pub fn router(relay: Arc<IntakeRelay>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { relay })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let agent = agent_check(&state.relay);
    let ready = agent.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "carebridge-server runtime initialized".to_string(),
        },
        agent,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn agent_check(relay: &IntakeRelay) -> HealthCheck {
    if relay.has_credential() {
        HealthCheck { status: "ready", detail: "agent api key configured".to_string() }
    } else {
        HealthCheck { status: "degraded", detail: "agent api key is not configured".to_string() }
    }
}
