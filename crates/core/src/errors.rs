use serde_json::Value;
use thiserror::Error;

use crate::intake::is_truthy;
use crate::locale::Messages;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("missing required intake fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum UpstreamError {
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: Option<Value> },
    #[error("could not connect to upstream: {0}")]
    Connect(String),
    #[error("upstream request timed out: {0}")]
    Timeout(String),
    #[error("upstream transport failure: {0}")]
    Transport(String),
}

/// Coarse classification used to pick the caller-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpstreamFailure {
    InvalidCredential,
    RateLimited,
    ConnectionFailed,
    EndpointNotFound,
    TimedOut,
    Other,
}

impl UpstreamError {
    pub fn classify(&self) -> UpstreamFailure {
        match self {
            Self::Status { status: 401, .. } => UpstreamFailure::InvalidCredential,
            Self::Status { status: 429, .. } => UpstreamFailure::RateLimited,
            Self::Connect(_) => UpstreamFailure::ConnectionFailed,
            Self::Status { status: 404, .. } => UpstreamFailure::EndpointNotFound,
            Self::Timeout(_) => UpstreamFailure::TimedOut,
            Self::Status { .. } | Self::Transport(_) => UpstreamFailure::Other,
        }
    }

    /// Upstream error payload when one was returned, otherwise the local error text.
    pub fn details(&self) -> Value {
        match self {
            Self::Status { body: Some(body), .. } if is_truthy(body) => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl UpstreamFailure {
    pub fn message(self, messages: &Messages) -> &'static str {
        match self {
            Self::InvalidCredential => messages.invalid_api_key,
            Self::RateLimited => messages.rate_limited,
            Self::ConnectionFailed => messages.connection_failed,
            Self::EndpointNotFound => messages.endpoint_not_found,
            Self::TimedOut => messages.timed_out,
            Self::Other => messages.processing_failed,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("upstream credential is not configured")]
    MissingCredential,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    pub fn user_message(&self, messages: &Messages) -> &'static str {
        match self {
            Self::Validation(_) => messages.fields_required,
            Self::MissingCredential => messages.api_key_missing,
            Self::Upstream(error) => error.classify().message(messages),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::errors::{RelayError, UpstreamError, UpstreamFailure, ValidationError};
    use crate::locale::Locale;

    fn status(status: u16) -> UpstreamError {
        UpstreamError::Status { status, body: None }
    }

    #[test]
    fn status_codes_map_to_failure_classes() {
        assert_eq!(status(401).classify(), UpstreamFailure::InvalidCredential);
        assert_eq!(status(429).classify(), UpstreamFailure::RateLimited);
        assert_eq!(status(404).classify(), UpstreamFailure::EndpointNotFound);
        assert_eq!(status(500).classify(), UpstreamFailure::Other);
        assert_eq!(status(403).classify(), UpstreamFailure::Other);
    }

    #[test]
    fn transport_failures_map_to_failure_classes() {
        assert_eq!(
            UpstreamError::Connect("refused".to_owned()).classify(),
            UpstreamFailure::ConnectionFailed
        );
        assert_eq!(UpstreamError::Timeout("60s".to_owned()).classify(), UpstreamFailure::TimedOut);
        assert_eq!(
            UpstreamError::Transport("reset".to_owned()).classify(),
            UpstreamFailure::Other
        );
    }

    #[test]
    fn relay_errors_pick_localized_messages() {
        let en = Locale::En.messages();
        let ru = Locale::Ru.messages();

        assert_eq!(RelayError::from(status(401)).user_message(en), "Invalid API key");
        assert_eq!(RelayError::from(status(429)).user_message(en), "Rate limit exceeded");
        assert_eq!(
            RelayError::from(UpstreamError::Connect("refused".to_owned())).user_message(en),
            "Could not connect to the API"
        );
        assert_eq!(RelayError::MissingCredential.user_message(ru), "API ключ не настроен");
        assert_eq!(
            RelayError::from(ValidationError { missing: vec!["age"] }).user_message(en),
            "All fields are required."
        );
    }

    #[test]
    fn details_prefer_upstream_body() {
        let error = UpstreamError::Status {
            status: 401,
            body: Some(json!({ "message": "Unauthorized" })),
        };
        assert_eq!(error.details(), json!({ "message": "Unauthorized" }));
    }

    #[test]
    fn details_fall_back_to_error_text() {
        let empty_body = UpstreamError::Status { status: 502, body: Some(json!("")) };
        assert_eq!(empty_body.details(), json!("Request failed with status code 502"));

        let no_body = UpstreamError::Status { status: 503, body: None };
        assert_eq!(no_body.details(), json!("Request failed with status code 503"));

        let connect = UpstreamError::Connect("connection refused".to_owned());
        assert_eq!(connect.details(), json!("could not connect to upstream: connection refused"));
    }

    #[test]
    fn validation_error_lists_missing_fields() {
        let error = ValidationError { missing: vec!["gender", "age"] };
        assert_eq!(error.to_string(), "missing required intake fields: gender, age");
    }
}
