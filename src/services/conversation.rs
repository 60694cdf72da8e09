// src/services/conversation.rs
use crate::{
    error::{GateError, SendError},
    message::{AskRequest, ERROR_REPLY, Identity, Message, MessageId},
};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Gate {
    #[default]
    Unverified,
    Verified(Identity),
}

/// Ticket for one outstanding backend request.
///
/// Not `Clone`: `receive` and `fail` take it by value, so every user message
/// gets exactly one bot message.
#[derive(Debug)]
#[must_use = "an unresolved turn leaves the conversation loading"]
pub struct Turn {
    pub user_message: MessageId,
    pub request: AskRequest,
}

/// The verification gate plus the append-only message list.
#[derive(Clone, Debug)]
pub struct Conversation {
    gate: Gate,
    messages: Vec<Message>,
    next_id: u64,
    in_flight: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            gate: Gate::Unverified,
            messages: Vec::new(),
            next_id: 1,
            in_flight: 0,
        }
    }

    fn mint_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    // One-way: a verified conversation never goes back.
    pub fn verify(&mut self, name: &str, email: &str) -> Result<Identity, GateError> {
        if matches!(self.gate, Gate::Verified(_)) {
            return Err(GateError::AlreadyVerified);
        }
        if name.trim().is_empty() {
            return Err(GateError::EmptyName);
        }
        if email.trim().is_empty() {
            return Err(GateError::EmptyEmail);
        }

        let identity = Identity {
            name: name.to_string(),
            email: email.to_string(),
        };
        let id = self.mint_id();
        self.messages.push(Message::greeting(id, name));
        self.gate = Gate::Verified(identity.clone());
        Ok(identity)
    }

    /// Append the user's message and open a turn for the backend call.
    pub fn begin_send(&mut self, text: &str) -> Result<Turn, SendError> {
        let identity = match &self.gate {
            Gate::Verified(identity) => identity.clone(),
            Gate::Unverified => return Err(SendError::Unverified),
        };
        if text.trim().is_empty() {
            return Err(SendError::EmptyText);
        }

        let id = self.mint_id();
        self.messages.push(Message::user(id, text));
        self.in_flight += 1;

        Ok(Turn {
            user_message: id,
            request: AskRequest {
                query: text.to_string(),
                user: identity,
            },
        })
    }

    /// Resolve a turn with the text the backend produced.
    pub fn receive(&mut self, turn: Turn, text: &str) -> &Message {
        self.resolve(turn.user_message, text)
    }

    /// Resolve a turn whose request failed.
    pub fn fail(&mut self, turn: Turn) -> &Message {
        self.resolve(turn.user_message, ERROR_REPLY)
    }

    fn resolve(&mut self, user_message: MessageId, text: &str) -> &Message {
        let id = self.mint_id();
        self.messages.push(Message::bot_reply(id, text, user_message));
        self.in_flight = self.in_flight.saturating_sub(1);
        &self.messages[self.messages.len() - 1]
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.gate {
            Gate::Verified(identity) => Some(identity),
            Gate::Unverified => None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.identity().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Chips of the seeded greeting, in display order.
    pub fn suggestions(&self) -> &[String] {
        self.messages
            .iter()
            .find_map(|m| m.suggestions.as_deref())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{FALLBACK_REPLY, MessageKind, Sender};

    fn verified() -> Conversation {
        let mut convo = Conversation::new();
        convo.verify("Ada", "ada@x.com").unwrap();
        convo
    }

    #[test]
    fn verify_seeds_single_greeting() {
        let convo = verified();
        assert!(convo.is_verified());
        assert_eq!(convo.messages().len(), 1);
        let greeting = &convo.messages()[0];
        assert_eq!(greeting.id, MessageId(1));
        assert_eq!(greeting.kind, Some(MessageKind::Initial));
        assert_eq!(greeting.suggestions.as_ref().map(Vec::len), Some(4));
        assert!(greeting.text.contains("Hi Ada"));
    }

    #[test]
    fn verify_rejects_blank_fields() {
        let mut convo = Conversation::new();
        assert_eq!(convo.verify("  ", "a@b.c").unwrap_err(), GateError::EmptyName);
        assert_eq!(convo.verify("Ada", "\t").unwrap_err(), GateError::EmptyEmail);
        assert!(!convo.is_verified());
        assert!(convo.messages().is_empty());
    }

    #[test]
    fn identity_is_immutable_after_verification() {
        let mut convo = verified();
        assert_eq!(convo.verify("Eve", "eve@x.com").unwrap_err(), GateError::AlreadyVerified);
        assert_eq!(convo.identity().unwrap().name, "Ada");
        assert_eq!(convo.messages().len(), 1);
    }

    #[test]
    fn send_requires_verification_and_text() {
        let mut convo = Conversation::new();
        assert_eq!(convo.begin_send("hi").unwrap_err(), SendError::Unverified);

        let mut convo = verified();
        assert_eq!(convo.begin_send("   ").unwrap_err(), SendError::EmptyText);
        assert_eq!(convo.messages().len(), 1);
        assert!(!convo.is_loading());
    }

    #[test]
    fn turn_lifecycle_tracks_loading() {
        let mut convo = verified();
        let turn = convo.begin_send(" hello ").unwrap();
        assert!(convo.is_loading());
        assert_eq!(turn.request.query, " hello ");
        assert_eq!(turn.request.user.email, "ada@x.com");

        let reply = convo.receive(turn, FALLBACK_REPLY).clone();
        assert_eq!(reply.from, Sender::Bot);
        assert_eq!(reply.in_reply_to, Some(MessageId(2)));
        assert!(!convo.is_loading());
    }

    #[test]
    fn overlapping_turns_resolve_in_completion_order() {
        let mut convo = verified();
        let first = convo.begin_send("first").unwrap();
        let second = convo.begin_send("second").unwrap();
        assert_eq!(convo.in_flight(), 2);

        convo.receive(second, "answer two");
        assert!(convo.is_loading());
        convo.fail(first);
        assert!(!convo.is_loading());

        let texts: Vec<_> = convo.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts[1..], ["first", "second", "answer two", ERROR_REPLY]);
        assert_eq!(convo.messages()[3].in_reply_to, Some(MessageId(3)));
        assert_eq!(convo.messages()[4].in_reply_to, Some(MessageId(2)));
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut convo = verified();
        for i in 0..5 {
            let turn = convo.begin_send(&format!("msg {i}")).unwrap();
            convo.receive(turn, "ok");
        }
        let ids: Vec<_> = convo.messages().iter().map(|m| m.id.0).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
