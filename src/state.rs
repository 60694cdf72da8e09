// src/state.rs
use crate::{message::Message, services::conversation::Conversation};

/// Everything one mounted widget knows. Guarded by `ChatWidget`.
#[derive(Clone, Debug, Default)]
pub struct WidgetState {
    pub is_open: bool,
    pub name_field: String,
    pub email_field: String,
    pub draft: String,
    pub conversation: Conversation,
    /// Bumped whenever the message list or the loading flag changes.
    pub revision: u64,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self, title: &str) -> WidgetView {
        WidgetView {
            title: title.to_string(),
            is_open: self.is_open,
            is_verified: self.conversation.is_verified(),
            is_loading: self.conversation.is_loading(),
            messages: self.conversation.messages().to_vec(),
            draft: self.draft.clone(),
            revision: self.revision,
        }
    }
}

/// Read-only snapshot handed to renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetView {
    pub title: String,
    pub is_open: bool,
    pub is_verified: bool,
    pub is_loading: bool,
    pub messages: Vec<Message>,
    pub draft: String,
    pub revision: u64,
}

impl WidgetView {
    // The send button is disabled while a request is outstanding.
    pub fn can_submit(&self) -> bool {
        self.is_verified && !self.is_loading
    }
}
