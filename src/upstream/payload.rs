//! Wire shapes shared by the proxy and its clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{contents, systemInstruction}` request body.
///
/// Both sub-documents are opaque and forwarded verbatim. A field missing from
/// the inbound body stays missing in the outbound one. Only a JSON object is
/// accepted; other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(from = "Map<String, Value>")]
pub struct ChatPayload {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub contents: Value,
    #[serde(
        rename = "systemInstruction",
        default,
        skip_serializing_if = "Value::is_null"
    )]
    pub system_instruction: Value,
}

impl From<Map<String, Value>> for ChatPayload {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            contents: body.remove("contents").unwrap_or(Value::Null),
            system_instruction: body.remove("systemInstruction").unwrap_or(Value::Null),
        }
    }
}

impl ChatPayload {
    pub fn new(contents: Value, system_instruction: Value) -> Self {
        Self { contents, system_instruction }
    }

    /// Number of conversation turns, when `contents` is an array.
    pub fn turn_count(&self) -> usize {
        self.contents.as_array().map(Vec::len).unwrap_or(0)
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
///
/// Accepts `candidates[0].content.parts[0].text` and the older
/// `candidates[0].content[0].text` shape.
pub fn candidate_text(response: &Value) -> Option<&str> {
    let content = response.get("candidates")?.get(0)?.get("content")?;
    content
        .get("parts")
        .and_then(|parts| parts.get(0))
        .and_then(|part| part.get("text"))
        .or_else(|| content.get(0).and_then(|part| part.get("text")))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}
