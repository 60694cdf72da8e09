// src/widget.rs
use std::sync::Arc;

use tokio::{
    sync::{RwLock, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    config::WidgetConfig,
    message::Message,
    services::{backend::AskBackend, conversation::Turn},
    state::{WidgetState, WidgetView},
};

/// Controller for one chat panel. Cheap to clone; clones share state.
pub struct ChatWidget<B> {
    inner: Arc<RwLock<WidgetState>>,
    backend: Arc<B>,
    revision: Arc<watch::Sender<u64>>,
    session_id: Arc<str>,
    title: Arc<str>,
}

impl<B> Clone for ChatWidget<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            backend: Arc::clone(&self.backend),
            revision: Arc::clone(&self.revision),
            session_id: Arc::clone(&self.session_id),
            title: Arc::clone(&self.title),
        }
    }
}

impl<B: AskBackend> ChatWidget<B> {
    pub fn new(backend: B, config: &WidgetConfig) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(WidgetState::new())),
            backend: Arc::new(backend),
            revision: Arc::new(revision),
            session_id: Uuid::new_v4().to_string().into(),
            title: config.title.as_str().into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Receives the revision number after every message or loading change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub async fn view(&self) -> WidgetView {
        self.inner.read().await.view(&self.title)
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.inner.read().await.conversation.messages().to_vec()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.conversation.is_loading()
    }

    pub async fn is_verified(&self) -> bool {
        self.inner.read().await.conversation.is_verified()
    }

    pub async fn is_open(&self) -> bool {
        self.inner.read().await.is_open
    }

    pub async fn draft(&self) -> String {
        self.inner.read().await.draft.clone()
    }

    // Must be called with the write guard held so revisions stay ordered.
    fn publish(&self, state: &mut WidgetState) {
        state.revision += 1;
        self.revision.send_replace(state.revision);
    }

    // ---- panel ----

    pub async fn toggle(&self) -> bool {
        let mut guard = self.inner.write().await;
        guard.is_open = !guard.is_open;
        info!(session = %self.session_id, open = guard.is_open, "panel toggled");
        guard.is_open
    }

    pub async fn open(&self) {
        self.set_open(true).await;
    }

    pub async fn close(&self) {
        self.set_open(false).await;
    }

    async fn set_open(&self, open: bool) {
        let mut guard = self.inner.write().await;
        if guard.is_open != open {
            guard.is_open = open;
            info!(session = %self.session_id, open, "panel visibility changed");
        }
    }

    // ---- verification form ----

    pub async fn set_name(&self, name: &str) {
        self.inner.write().await.name_field = name.to_string();
    }

    pub async fn set_email(&self, email: &str) {
        self.inner.write().await.email_field = email.to_string();
    }

    /// Submit the form fields. Returns whether the gate opened; a blank field
    /// leaves everything as it was without telling the visitor.
    pub async fn submit_verification(&self) -> bool {
        let mut guard = self.inner.write().await;
        let state = &mut *guard;
        match state
            .conversation
            .verify(&state.name_field, &state.email_field)
        {
            Ok(identity) => {
                info!(session = %self.session_id, name = %identity.name, "visitor verified");
                self.publish(state);
                true
            }
            Err(e) => {
                debug!(session = %self.session_id, reason = %e, "verification ignored");
                false
            }
        }
    }

    pub async fn verify(&self, name: &str, email: &str) -> bool {
        {
            let mut guard = self.inner.write().await;
            guard.name_field = name.to_string();
            guard.email_field = email.to_string();
        }
        self.submit_verification().await
    }

    // ---- composer ----

    pub async fn set_draft(&self, text: &str) {
        self.inner.write().await.draft = text.to_string();
    }

    // Loading check, draft take and user append happen under one guard. A
    // blank draft, or a submit while loading, leaves the draft in place.
    async fn begin_composer(&self) -> Option<Turn> {
        let mut guard = self.inner.write().await;
        let state = &mut *guard;
        if state.conversation.is_loading() {
            debug!(session = %self.session_id, "composer submit while loading ignored");
            return None;
        }
        match state.conversation.begin_send(&state.draft) {
            Ok(turn) => {
                state.draft.clear();
                self.publish(state);
                Some(turn)
            }
            Err(e) => {
                debug!(session = %self.session_id, reason = %e, "composer submit ignored");
                None
            }
        }
    }

    /// Send the composer draft and clear it. Does nothing while a request is
    /// outstanding, matching the disabled send button.
    pub async fn submit_composer(&self) {
        if let Some(turn) = self.begin_composer().await {
            self.await_turn(self.run_turn(turn)).await;
        }
    }

    /// Take the draft now and answer it in the background. `None` when the
    /// submit was ignored.
    pub async fn spawn_submit(&self) -> Option<JoinHandle<()>> {
        let turn = self.begin_composer().await?;
        Some(detach(self.run_turn(turn)))
    }

    /// Send a chip's literal text. The draft is left alone.
    pub async fn click_suggestion(&self, suggestion: &str) {
        self.send_message(suggestion).await;
    }

    /// Resolve a chip by its zero-based position on the greeting and send it.
    pub async fn click_suggestion_at(&self, index: usize) -> bool {
        let suggestion = {
            let guard = self.inner.read().await;
            guard.conversation.suggestions().get(index).cloned()
        };
        match suggestion {
            Some(text) => {
                self.send_message(&text).await;
                true
            }
            None => false,
        }
    }

    async fn begin_turn(&self, text: &str) -> Option<Turn> {
        let mut guard = self.inner.write().await;
        match guard.conversation.begin_send(text) {
            Ok(turn) => {
                self.publish(&mut guard);
                Some(turn)
            }
            Err(e) => {
                debug!(session = %self.session_id, reason = %e, "send ignored");
                None
            }
        }
    }

    /// Append the user's message, ask the backend, append exactly one reply.
    ///
    /// The exchange runs on its own task, so dropping this future after the
    /// user message is appended still yields the reply.
    pub async fn send_message(&self, text: &str) {
        if let Some(turn) = self.begin_turn(text).await {
            self.await_turn(self.run_turn(turn)).await;
        }
    }

    /// Fire-and-forget variant of [`send_message`](Self::send_message).
    pub fn spawn_send(&self, text: impl Into<String>) -> JoinHandle<()> {
        let widget = self.clone();
        let text = text.into();
        tokio::spawn(async move { widget.send_message(&text).await })
    }

    // No await between begin_* and this call, so a started turn always
    // reaches its exchange task.
    fn run_turn(&self, turn: Turn) -> JoinHandle<()> {
        tokio::spawn(self.clone().exchange(turn))
    }

    async fn await_turn(&self, exchange: JoinHandle<()>) {
        if let Err(e) = exchange.await {
            error!(session = %self.session_id, error = %e, "exchange task failed");
        }
    }

    async fn exchange(self, turn: Turn) {
        debug!(session = %self.session_id, user_message = %turn.user_message, "asking backend");
        let outcome = self.backend.ask(&turn.request).await;

        let mut guard = self.inner.write().await;
        match outcome {
            Ok(response) => {
                let reply = guard.conversation.receive(turn, response.reply_text());
                debug!(session = %self.session_id, reply = %reply.id, "backend answered");
            }
            Err(e) => {
                error!(session = %self.session_id, error = %e, "error fetching response");
                guard.conversation.fail(turn);
            }
        }
        self.publish(&mut guard);
    }
}

// Aborting the returned handle leaves the exchange running.
fn detach(exchange: JoinHandle<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _ = exchange.await;
    })
}
