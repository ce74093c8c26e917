//! Conversation state for the chat widget.
//!
//! A [`ChatSession`] is owned by its caller and passed to every submit, so
//! several conversations can run side by side in one process.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::backoff_client::{BackoffClient, ClientError};
use crate::client::sanitize::sanitize_input;
use crate::upstream::{candidate_text, ChatPayload};

/// API base used when none is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are FusionBot, a friendly and helpful AI assistant for Fusion4o. \
Fusion4o specializes in AI-powered marketing, learning solutions, white-label software, and a Skill \
Development Program for youngsters (courses in AI, Digital Marketing, HR, Graphic Designing). Answer \
questions concisely. For pricing or project specifics, politely guide them to the contact options.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One conversation turn in the upstream wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl ChatTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self { role, parts: vec![Part { text: text.into() }] }
    }
}

/// System prompt plus conversation history.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_prompt: String,
    history: Vec<ChatTurn>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self { system_prompt: system_prompt.into(), history: Vec::new() }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// `{contents, systemInstruction}` for the current history.
    pub fn payload(&self) -> ChatPayload {
        ChatPayload::new(
            json!(self.history),
            json!({ "parts": [{ "text": self.system_prompt }] }),
        )
    }

    /// Send one user message and return the model's reply.
    ///
    /// Input is sanitized first; if nothing is left, no request is made and
    /// `Ok(None)` is returned. The user turn is recorded before sending and
    /// kept even if the call fails; the model turn is recorded only on
    /// success.
    pub async fn submit(
        &mut self,
        client: &BackoffClient,
        endpoint: &str,
        text: &str,
    ) -> Result<Option<String>, ClientError> {
        let text = sanitize_input(text);
        if text.is_empty() {
            return Ok(None);
        }

        self.history.push(ChatTurn::new(Role::User, text));
        let response = client.send(endpoint, &self.payload()).await?;
        let reply = extract_reply(&response)?;
        self.history.push(ChatTurn::new(Role::Model, reply.clone()));
        Ok(Some(reply))
    }
}

/// Candidate text from a proxy response, or [`ClientError::NoContent`].
pub fn extract_reply(response: &Value) -> Result<String, ClientError> {
    candidate_text(response)
        .map(str::to_string)
        .ok_or(ClientError::NoContent)
}

/// Endpoint URL under an API base, e.g. `http://localhost:3000/api/chat`.
pub fn endpoint_url(api_base: &str, path: &str) -> String {
    format!("{}{}", api_base.trim_end_matches('/'), path)
}

/// Message to show a user in place of a raw failure.
pub fn friendly_message(err: &ClientError) -> &'static str {
    if err.is_unreachable() {
        return "Unable to connect to the server. Please check your internet connection and try again.";
    }
    match err.status().map(|s| s.as_u16()) {
        Some(403) => "Access denied. Please refresh the page and try again.",
        Some(429) => "Too many requests. Please wait a moment and try again.",
        Some(500..=599) => "Server error. Please try again in a few moments.",
        _ => "I'm having trouble connecting. Please try again.",
    }
}
