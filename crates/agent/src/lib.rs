//! Agent runtime for the intake relay.
//!
//! - `client` - the `ConversationClient` seam and the reqwest-backed
//!   `MistralClient` that talks to the Mistral Agents conversations API
//! - `runtime` - `IntakeRelay`, which validates an intake form, renders the
//!   prompt, performs exactly one agent call and normalizes the reply
//!
//! The agent owns conversational state. This crate only passes the
//! `conversation_id` through and never retries a failed call.

pub mod client;
pub mod runtime;

pub use client::{ClientError, ConversationClient, MistralClient};
pub use runtime::{IntakeRelay, RelayReply};
