use std::time::Duration;

use async_trait::async_trait;
use carebridge_core::config::AgentConfig;
use carebridge_core::{ConversationRequest, ConversationResponse, UpstreamError};
use reqwest::header::ACCEPT;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[async_trait]
pub trait ConversationClient: Send + Sync {
    async fn start_conversation(
        &self,
        credential: &SecretString,
        request: &ConversationRequest,
    ) -> Result<ConversationResponse, UpstreamError>;
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build agent http client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Mistral Agents conversations client.
pub struct MistralClient {
    http: Client,
    endpoint: String,
}

impl MistralClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build().map_err(ClientError::Build)?;
        Ok(Self::with_http(http, endpoint))
    }

    pub fn with_http(http: Client, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self, ClientError> {
        Self::new(config.conversations_url(), Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl ConversationClient for MistralClient {
    async fn start_conversation(
        &self,
        credential: &SecretString,
        request: &ConversationRequest,
    ) -> Result<ConversationResponse, UpstreamError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(credential.expose_secret())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(error) if !status.is_success() => {
                debug!(status = %status, error = %error, "agent error body could not be read");
                return Err(UpstreamError::Status { status: status.as_u16(), body: None });
            }
            Err(error) => return Err(transport_error(error)),
        };
        let body = parse_body(&bytes);
        debug!(status = %status, bytes = bytes.len(), "agent conversations endpoint responded");

        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }

        Ok(body.map(ConversationResponse::from).unwrap_or_default())
    }
}

/// JSON when the body parses, raw text otherwise, nothing for an empty body.
fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
}

fn transport_error(error: reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::Timeout(error.to_string())
    } else if error.is_connect() {
        UpstreamError::Connect(error.to_string())
    } else {
        UpstreamError::Transport(error.to_string())
    }
}
