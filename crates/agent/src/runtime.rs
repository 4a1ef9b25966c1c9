use std::sync::Arc;
use std::time::Instant;

use carebridge_core::config::AppConfig;
use carebridge_core::prompt::render_prompt;
use carebridge_core::{ConversationRequest, IntakeForm, Locale, RelayError};
use secrecy::SecretString;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::{ClientError, ConversationClient, MistralClient};

/// Agent reply ready to hand back to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct RelayReply {
    pub response: String,
    pub conversation_id: Option<Value>,
}

/// Runs one intake through validation, prompt rendering, a single agent call
/// and reply normalization. Holds no per-request state.
pub struct IntakeRelay {
    client: Arc<dyn ConversationClient>,
    credential: Option<SecretString>,
    agent_id: String,
    locale: Locale,
}

impl IntakeRelay {
    pub fn new(
        client: Arc<dyn ConversationClient>,
        credential: Option<SecretString>,
        agent_id: impl Into<String>,
        locale: Locale,
    ) -> Self {
        Self { client, credential, agent_id: agent_id.into(), locale }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let client = MistralClient::from_config(&config.agent)?;
        Ok(Self::new(
            Arc::new(client),
            config.agent.credential().cloned(),
            config.agent.agent_id.clone(),
            config.relay.locale,
        ))
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub async fn handle(
        &self,
        form: IntakeForm,
        correlation_id: &str,
    ) -> Result<RelayReply, RelayError> {
        let intake = match form.validate() {
            Ok(intake) => intake,
            Err(rejected) => {
                warn!(
                    event_name = "relay.intake.rejected",
                    correlation_id = %correlation_id,
                    missing = %rejected.missing.join(","),
                    "intake form is missing required fields"
                );
                return Err(rejected.into());
            }
        };

        let Some(credential) = self.credential.as_ref() else {
            error!(
                event_name = "relay.agent.credential_missing",
                correlation_id = %correlation_id,
                "agent api key is not configured"
            );
            return Err(RelayError::MissingCredential);
        };

        let continues_conversation = intake.conversation_id.is_some();
        let prompt = render_prompt(&intake, self.locale.prompt_labels());
        let request = ConversationRequest::new(prompt, &self.agent_id, intake.conversation_id);

        info!(
            event_name = "relay.agent.sending",
            correlation_id = %correlation_id,
            agent_id = %self.agent_id,
            continues_conversation,
            "sending intake to agent"
        );
        let started = Instant::now();

        let response = self.client.start_conversation(credential, &request).await.map_err(
            |failure| {
                error!(
                    event_name = "relay.agent.failed",
                    correlation_id = %correlation_id,
                    failure = ?failure.classify(),
                    details = %failure.details(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "agent request failed"
                );
                RelayError::Upstream(failure)
            },
        )?;

        info!(
            event_name = "relay.agent.received",
            correlation_id = %correlation_id,
            outputs = response.outputs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "agent reply received"
        );

        Ok(RelayReply { response: response.reply_text(), conversation_id: response.conversation_id })
    }
}
