use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use carebridge_agent::{ClientError, IntakeRelay};
use carebridge_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{ask, health};

pub struct Application {
    pub config: AppConfig,
    pub relay: Arc<IntakeRelay>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        agent_id = %config.agent.agent_id,
        endpoint = %config.agent.conversations_url(),
        locale = ?config.relay.locale,
        "starting application bootstrap"
    );

    let relay = IntakeRelay::from_config(&config)?;
    if !relay.has_credential() {
        warn!(
            event_name = "system.bootstrap.credential_missing",
            correlation_id = "bootstrap",
            "MISTRAL_API_KEY is not set; /ask will answer with a configuration error"
        );
    }

    Ok(Application { config, relay: Arc::new(relay) })
}

impl Application {
    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                tracing::info_span!("request", method = %req.method(), uri = %req.uri())
            })
            .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
                info!(
                    latency_ms = latency.as_millis() as u64,
                    status = res.status().as_u16(),
                    "finished processing request"
                );
            });

        Router::new()
            .merge(ask::router(self.relay.clone()))
            .merge(health::router(self.relay.clone()))
            .layer(trace_layer)
            .layer(CorsLayer::permissive())
    }
}
