use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_RANDOMNESS: f64 = 0.8;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub message: String,
    pub topic: String,
    pub randomness: f64,
}

impl GenerateRequest {
    /// Builds a request whose topic is the message itself, which is what the
    /// agent expects when the user has not named a topic separately.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            topic: message.clone(),
            message,
            randomness: DEFAULT_RANDOMNESS,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_randomness(mut self, randomness: f64) -> Self {
        self.randomness = randomness;
        self
    }
}

/// Payload carried by one `data:` line of the generation stream.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FramePayload {
    #[serde(default)]
    pub chunk: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl FramePayload {
    pub fn chunk_text(&self) -> &str {
        self.chunk.as_deref().unwrap_or("")
    }

    /// A payload ends the stream when it carries a non-empty `message` or
    /// reports a failure. An empty `message` on its own is not terminal.
    pub fn is_terminal(&self) -> bool {
        self.message.as_deref().is_some_and(|m| !m.is_empty())
            || self.success == Some(false)
            || self.error.is_some()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResult {
    pub message: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ChatResult {
    pub fn from_accumulated(message: String) -> Self {
        Self {
            message,
            success: true,
            error: None,
            data: None,
        }
    }

    /// Returns `None` unless the payload is terminal. The message may be
    /// empty, in which case the caller supplies the accumulated text.
    pub fn from_terminal(payload: FramePayload) -> Option<Self> {
        payload.is_terminal().then(|| Self::from_payload(payload))
    }

    /// `success` defaults to `true` unless the payload names an `error`.
    pub fn from_payload(payload: FramePayload) -> Self {
        Self {
            success: payload.success.unwrap_or(payload.error.is_none()),
            message: payload.message.unwrap_or_default(),
            error: payload.error,
            data: payload.data,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlogListing {
    #[serde(default)]
    pub blogs: Vec<Value>,
    #[serde(default)]
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generate_request_defaults_topic_to_message() {
        let request = GenerateRequest::from_message("rust async");
        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            body,
            json!({ "message": "rust async", "topic": "rust async", "randomness": 0.8 })
        );
    }

    #[test]
    fn terminal_payload_defaults_success_to_true() {
        let payload: FramePayload =
            serde_json::from_str(r#"{"message":"done","data":{"topic":"x"}}"#).expect("parse");
        assert!(payload.is_terminal());

        let result = ChatResult::from_terminal(payload).expect("terminal");
        assert_eq!(result.message, "done");
        assert!(result.success);
        assert_eq!(result.data, Some(json!({ "topic": "x" })));
    }

    #[test]
    fn chunk_only_payload_is_not_terminal() {
        let payload: FramePayload = serde_json::from_str(r#"{"chunk":"abc"}"#).expect("parse");
        assert!(!payload.is_terminal());
        assert_eq!(payload.chunk_text(), "abc");
        assert!(ChatResult::from_terminal(payload).is_none());
    }

    #[test]
    fn empty_message_alone_is_not_terminal() {
        let payload: FramePayload =
            serde_json::from_str(r#"{"message":"","success":true}"#).expect("parse");
        assert!(!payload.is_terminal());
        assert!(ChatResult::from_terminal(payload).is_none());
    }

    #[test]
    fn error_payload_is_terminal_and_unsuccessful() {
        let payload: FramePayload =
            serde_json::from_str(r#"{"error":"model unavailable"}"#).expect("parse");
        assert!(payload.is_terminal());

        let result = ChatResult::from_terminal(payload).expect("terminal");
        assert!(!result.success);
        assert_eq!(result.message, "");
        assert_eq!(result.error.as_deref(), Some("model unavailable"));
    }
}
