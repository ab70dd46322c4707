//! Wire types for the chat endpoint.
//!
//! ```text
//! POST /chat   { "message": "...", "history": [{ "role": "user", "content": "..." }, ...] }
//!          <-  { "reply": "..." }
//! GET  /       { "status": "ok", "message": "..." }
//! ```

use serde::{Deserialize, Serialize};

/// Role of a turn inside the `history` payload.
///
/// Narrower than the conversation's own role set: error notices are local
/// to the client and have no representation on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One prior turn sent back to the endpoint as context.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Request body for a single conversational turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// The text typed for this turn. Never duplicated inside `history`.
    pub message: String,
    pub history: Vec<HistoryTurn>,
}

/// Successful response body. Unknown fields are ignored.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}

/// Body of the endpoint's health route.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_exactly_two_fields() {
        let request = ChatRequest {
            message: "is pump 3 failing?".to_string(),
            history: vec![
                HistoryTurn {
                    role: TurnRole::User,
                    content: "hello".to_string(),
                },
                HistoryTurn {
                    role: TurnRole::Model,
                    content: "hi".to_string(),
                },
            ],
        };

        let value = serde_json::to_value(&request).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(value["message"], "is pump 3 failing?");
        assert_eq!(value["history"][0]["role"], "user");
        assert_eq!(value["history"][1]["role"], "model");
        assert_eq!(value["history"][1]["content"], "hi");
    }

    #[test]
    fn reply_ignores_extra_fields() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"reply":"line one\nline two","model":"x"}"#).unwrap();
        assert_eq!(reply.reply, "line one\nline two");
    }

    #[test]
    fn reply_without_reply_field_is_rejected() {
        assert!(serde_json::from_str::<ChatReply>(r#"{"answer":"hi"}"#).is_err());
        assert!(serde_json::from_str::<ChatReply>(r#"{"reply":42}"#).is_err());
    }

    #[test]
    fn health_status_message_is_optional() {
        let health: HealthStatus = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(health.is_ok());
        assert_eq!(health.message, None);

        let health: HealthStatus =
            serde_json::from_str(r#"{"status":"degraded","message":"model loading"}"#).unwrap();
        assert!(!health.is_ok());
        assert_eq!(health.message.as_deref(), Some("model loading"));
    }
}
