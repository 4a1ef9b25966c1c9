//! Wire types for the agent conversations API and reply normalization.

use serde::Serialize;
use serde_json::Value;

/// Body of `POST /v1/conversations`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversationRequest {
    pub inputs: String,
    pub agent_id: String,
    pub stream: bool,
    pub store: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Value>,
}

impl ConversationRequest {
    pub fn new(inputs: String, agent_id: impl Into<String>, conversation_id: Option<Value>) -> Self {
        Self { inputs, agent_id: agent_id.into(), stream: false, store: true, conversation_id }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutputContent {
    Text(String),
    Structured(Value),
    Absent,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentOutput {
    pub content: OutputContent,
}

/// Reply from the conversations API. Built leniently from whatever JSON the
/// upstream returned: a missing or non-list `outputs` reads as no outputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationResponse {
    pub outputs: Vec<AgentOutput>,
    pub conversation_id: Option<Value>,
}

impl From<Value> for AgentOutput {
    fn from(value: Value) -> Self {
        let content = match value {
            Value::Object(mut fields) => match fields.remove("content") {
                Some(Value::String(text)) => OutputContent::Text(text),
                Some(other) => OutputContent::Structured(other),
                None => OutputContent::Absent,
            },
            _ => OutputContent::Absent,
        };
        Self { content }
    }
}

impl From<Value> for ConversationResponse {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        let outputs = match fields.remove("outputs") {
            Some(Value::Array(items)) => items.into_iter().map(AgentOutput::from).collect(),
            _ => Vec::new(),
        };
        let conversation_id = fields.remove("conversation_id").filter(|id| !id.is_null());

        Self { outputs, conversation_id }
    }
}

impl OutputContent {
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Absent => String::new(),
        }
    }
}

impl ConversationResponse {
    /// All outputs rendered in order and separated by a blank line.
    pub fn reply_text(&self) -> String {
        self.outputs.iter().map(|output| output.content.render()).collect::<Vec<_>>().join("\n\n")
    }
}
