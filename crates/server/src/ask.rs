//! `POST /ask` - relays a patient intake form to the agent.
//!
//! Replies:
//! - `200 {success: true, response, conversation_id}`
//! - `400 {error}` when a required field is missing or the body is not a JSON object
//! - `500 {error, hint}` when the agent api key is not configured
//! - `500 {success: false, error, details}` when the agent call fails

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use carebridge_agent::{IntakeRelay, RelayReply};
use carebridge_core::{IntakeForm, Messages, RelayError};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct AskState {
    relay: Arc<IntakeRelay>,
}

#[derive(Debug, Serialize)]
pub struct AskSuccess {
    pub success: bool,
    pub response: String,
    pub conversation_id: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AskFailure {
    pub success: bool,
    pub error: &'static str,
    pub details: Value,
}

#[derive(Debug, Serialize)]
pub struct AskRejected {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

pub fn router(relay: Arc<IntakeRelay>) -> Router {
    Router::new().route("/ask", post(ask)).with_state(AskState { relay })
}

pub async fn ask(
    State(state): State<AskState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    // Unreadable bodies are treated as an empty form so callers get the
    // same validation reply as for missing fields.
    let form = match payload {
        Ok(Json(body)) => IntakeForm::from_json(body),
        Err(rejection) => {
            warn!(
                event_name = "relay.ask.unreadable_body",
                correlation_id = %correlation_id,
                rejection = %rejection.body_text(),
                "request body is not a json intake form"
            );
            IntakeForm::default()
        }
    };

    match state.relay.handle(form, &correlation_id).await {
        Ok(reply) => success_response(reply),
        Err(error) => failure_response(&error, state.relay.locale().messages()),
    }
}

fn success_response(reply: RelayReply) -> Response {
    let body = AskSuccess {
        success: true,
        response: reply.response,
        conversation_id: reply.conversation_id,
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn failure_response(error: &RelayError, messages: &Messages) -> Response {
    let message = error.user_message(messages);
    match error {
        RelayError::Validation(_) => {
            (StatusCode::BAD_REQUEST, Json(AskRejected { error: message, hint: None }))
                .into_response()
        }
        RelayError::MissingCredential => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AskRejected { error: message, hint: Some(messages.api_key_hint) }),
        )
            .into_response(),
        RelayError::Upstream(failure) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AskFailure { success: false, error: message, details: failure.details() }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use carebridge_agent::{ConversationClient, IntakeRelay};
    use carebridge_core::{ConversationRequest, ConversationResponse, Locale, UpstreamError};
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;

    struct StubClient {
        calls: AtomicUsize,
        requests: Mutex<Vec<Value>>,
        reply: Result<Value, UpstreamError>,
    }

    #[async_trait]
    impl ConversationClient for StubClient {
        async fn start_conversation(
            &self,
            _credential: &SecretString,
            request: &ConversationRequest,
        ) -> Result<ConversationResponse, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let wire = serde_json::to_value(request).expect("request should serialize");
            self.requests.lock().expect("request log lock").push(wire);
            self.reply.clone().map(ConversationResponse::from)
        }
    }

    fn stub(reply: Result<Value, UpstreamError>) -> Arc<StubClient> {
        Arc::new(StubClient { calls: AtomicUsize::new(0), requests: Mutex::default(), reply })
    }

    fn app(stub: &Arc<StubClient>, credential: Option<&str>, locale: Locale) -> Router {
        let relay = IntakeRelay::new(
            stub.clone(),
            credential.map(|key| SecretString::from(key.to_string())),
            "ag:test",
            locale,
        );
        router(Arc::new(relay))
    }

    fn complete_form() -> Value {
        json!({
            "gender": "male",
            "age": "47",
            "allergies": "none",
            "diagnosis": "type 2 diabetes",
            "prescriptions": "metformin",
        })
    }

    async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request should build");

        let response = app.oneshot(request).await.expect("router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
        let payload = serde_json::from_slice(&bytes).expect("body should be json");
        (status, payload)
    }

    #[tokio::test]
    async fn success_returns_reply_envelope() {
        let stub = stub(Ok(json!({ "outputs": [{ "content": "Hello" }], "conversation_id": "c1" })));

        let (status, payload) =
            post_json(app(&stub, Some("key"), Locale::En), complete_form().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!({ "success": true, "response": "Hello", "conversation_id": "c1" }));
    }

    #[tokio::test]
    async fn missing_conversation_id_is_returned_as_null() {
        let stub = stub(Ok(json!({ "outputs": [{ "content": { "x": 1 } }] })));

        let (status, payload) =
            post_json(app(&stub, Some("key"), Locale::En), complete_form().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["response"], json!("{\n  \"x\": 1\n}"));
        assert_eq!(payload["conversation_id"], Value::Null);
    }

    #[tokio::test]
    async fn each_missing_required_field_is_rejected_without_upstream_call() {
        for field in ["gender", "age", "allergies", "diagnosis", "prescriptions"] {
            let stub = stub(Ok(json!({})));
            let mut form = complete_form();
            form.as_object_mut().expect("form object").remove(field);

            let (status, payload) =
                post_json(app(&stub, Some("key"), Locale::En), form.to_string()).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
            assert_eq!(payload, json!({ "error": "All fields are required." }));
            assert_eq!(stub.calls.load(Ordering::SeqCst), 0, "field {field}");
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let stub = stub(Ok(json!({})));

        let (status, payload) =
            post_json(app(&stub, Some("key"), Locale::En), "{not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], json!("All fields are required."));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn array_and_scalar_bodies_are_validation_errors() {
        let bodies = [json!(["male", "47", "none", "flu", "rest"]), json!("male"), json!(47)];

        for body in bodies {
            let stub = stub(Ok(json!({ "outputs": [{ "content": "Hello" }] })));

            let (status, payload) =
                post_json(app(&stub, Some("key"), Locale::En), body.to_string()).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(payload, json!({ "error": "All fields are required." }));
            assert_eq!(stub.calls.load(Ordering::SeqCst), 0, "body {body}");
        }
    }

    #[tokio::test]
    async fn missing_credential_returns_configuration_error() {
        let stub = stub(Ok(json!({})));

        let (status, payload) =
            post_json(app(&stub, None, Locale::En), complete_form().to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            payload,
            json!({
                "error": "API key not configured",
                "hint": "Add MISTRAL_API_KEY=your_key to .env",
            })
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upstream_statuses_map_to_messages() {
        let cases = [
            (401, "Invalid API key"),
            (429, "Rate limit exceeded"),
            (404, "API endpoint not found"),
            (500, "An error occurred while processing the request"),
        ];

        for (code, message) in cases {
            let stub = stub(Err(UpstreamError::Status {
                status: code,
                body: Some(json!({ "object": "error", "code": code })),
            }));

            let (status, payload) =
                post_json(app(&stub, Some("key"), Locale::En), complete_form().to_string()).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(payload["success"], json!(false));
            assert_eq!(payload["error"], json!(message));
            assert_eq!(payload["details"], json!({ "object": "error", "code": code }));
            assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn connection_failure_reports_local_details() {
        let stub = stub(Err(UpstreamError::Connect("tcp connect error".to_string())));

        let (status, payload) =
            post_json(app(&stub, Some("key"), Locale::En), complete_form().to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload["error"], json!("Could not connect to the API"));
        assert_eq!(payload["details"], json!("could not connect to upstream: tcp connect error"));
    }

    #[tokio::test]
    async fn conversation_id_is_forwarded_or_omitted() {
        let stub = stub(Ok(json!({ "outputs": [] })));
        let mut continued = complete_form();
        continued["conversation_id"] = json!("conv_9");

        post_json(app(&stub, Some("key"), Locale::En), continued.to_string()).await;
        post_json(app(&stub, Some("key"), Locale::En), complete_form().to_string()).await;

        let requests = stub.requests.lock().expect("request log lock");
        assert_eq!(requests[0]["conversation_id"], json!("conv_9"));
        assert!(requests[1].get("conversation_id").is_none());
    }

    #[tokio::test]
    async fn russian_locale_uses_russian_messages() {
        let stub = stub(Ok(json!({})));

        let (status, payload) = post_json(app(&stub, Some("key"), Locale::Ru), "{}".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], json!("Все поля обязательны для заполнения."));
    }
}
