// src/message.rs
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_REPLY: &str = "Sorry, I didn’t understand that.";
pub const ERROR_REPLY: &str = "An error occurred while fetching the response.";

pub const GREETING_SUGGESTIONS: [&str; 4] = [
    "What are IDC’s capabilities & service areas?",
    "Show me industry-specific solutions.",
    "Tell me about client success stories.",
    "How can I request a proposal?",
];

pub fn greeting_text(name: &str) -> String {
    format!(
        "Hi {name}, I’m IDC Bot – your digital guide to IDC Technologies.\n\nHow can I help you today?"
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// The greeting seeded when the visitor passes verification.
    Initial,
}

/// One entry of the conversation. Never mutated once pushed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: Sender,
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// For bot replies: the user message whose request produced this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<MessageId>,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            from: Sender::User,
            text: text.into(),
            kind: None,
            suggestions: None,
            in_reply_to: None,
        }
    }

    pub fn bot_reply(id: MessageId, text: impl Into<String>, in_reply_to: MessageId) -> Self {
        Self {
            id,
            from: Sender::Bot,
            text: text.into(),
            kind: None,
            suggestions: None,
            in_reply_to: Some(in_reply_to),
        }
    }

    pub fn greeting(id: MessageId, name: &str) -> Self {
        Self {
            id,
            from: Sender::Bot,
            text: greeting_text(name),
            kind: Some(MessageKind::Initial),
            suggestions: Some(GREETING_SUGGESTIONS.iter().map(|s| s.to_string()).collect()),
            in_reply_to: None,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.from == Sender::Bot
    }
}

/// Visitor details captured by the verification form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    pub user: Identity,
}

/// Body returned by the Q&A service. Kept as raw JSON so that any shape
/// other than `{"response": "<text>"}` degrades to the fallback reply.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AskResponse(pub Value);

impl AskResponse {
    pub fn text(&self) -> Option<&str> {
        self.0
            .get("response")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn reply_text(&self) -> &str {
        self.text().unwrap_or(FALLBACK_REPLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_text_falls_back_on_other_shapes() {
        assert_eq!(AskResponse(json!({"response": "Hi there"})).reply_text(), "Hi there");
        assert_eq!(AskResponse(json!({"answer": "x"})).reply_text(), FALLBACK_REPLY);
        assert_eq!(AskResponse(json!({"response": ""})).reply_text(), FALLBACK_REPLY);
        assert_eq!(AskResponse(json!({"response": 42})).reply_text(), FALLBACK_REPLY);
        assert_eq!(AskResponse(json!(["response"])).reply_text(), FALLBACK_REPLY);
    }

    #[test]
    fn greeting_serializes_type_and_suggestions() {
        let msg = Message::greeting(MessageId(1), "Ada");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["from"], "bot");
        assert_eq!(value["type"], "initial");
        assert_eq!(value["suggestions"].as_array().unwrap().len(), 4);
        assert!(value.get("in_reply_to").is_none());
        assert!(msg.text.starts_with("Hi Ada,"));
    }

    #[test]
    fn request_body_shape() {
        let req = AskRequest {
            query: "hello".into(),
            user: Identity { name: "Ada".into(), email: "ada@x.com".into() },
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"query": "hello", "user": {"name": "Ada", "email": "ada@x.com"}})
        );
    }
}
