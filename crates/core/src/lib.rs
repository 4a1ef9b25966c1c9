//! Domain types for the carebridge intake relay: configuration, the intake
//! form and its prompt rendering, the agent conversation wire format, and the
//! error taxonomy shared by the agent runtime and the HTTP surface.

pub mod config;
pub mod conversation;
pub mod errors;
pub mod intake;
pub mod locale;
pub mod prompt;

pub use conversation::{AgentOutput, ConversationRequest, ConversationResponse, OutputContent};
pub use errors::{RelayError, UpstreamError, UpstreamFailure, ValidationError};
pub use intake::{IntakeForm, ValidatedIntake};
pub use locale::{Locale, Messages, PromptLabels};
