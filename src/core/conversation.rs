//! Root controller: turns a submitted line into a user message, a generation
//! call, and an assistant message.

use std::sync::Arc;
use tracing::{info, warn};

use crate::core::generation::ReplyGenerator;
use crate::core::message::Role;
use crate::core::store::{ChatStore, TurnGuard};

/// Stored in place of a reply whenever generation fails for any reason.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The model's reply was stored.
    Replied,
    /// Generation failed and the fallback reply was stored instead.
    Fallback,
    /// Another send was still in flight; nothing happened.
    Rejected,
}

#[derive(Clone)]
pub struct Conversation {
    store: ChatStore,
    generator: Arc<dyn ReplyGenerator>,
}

impl Conversation {
    pub fn new(store: ChatStore, generator: Arc<dyn ReplyGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Initial history load.
    pub async fn start(&self) {
        info!(datastore = %self.store.datastore_description(), "loading conversation");
        self.store.fetch_messages().await;
    }

    pub async fn refresh(&self) {
        self.store.fetch_messages().await;
    }

    /// Delete the whole conversation. "New chat" is the same operation since
    /// only one conversation exists. Refused while a send turn is pending, so
    /// its reply cannot land in the emptied list.
    pub async fn clear(&self) -> bool {
        let Some(turn) = self.store.begin_turn() else {
            warn!("clear rejected: a reply is still pending");
            return false;
        };
        self.run_clear(turn).await
    }

    /// Clear under a slot the caller already claimed.
    pub async fn run_clear(&self, _turn: TurnGuard) -> bool {
        let cleared = self.store.clear_messages().await;
        if cleared {
            info!("conversation cleared");
        }
        cleared
    }

    /// Run one turn. The prompt is the submitted text alone; earlier messages
    /// are not sent to the model.
    pub async fn handle_send_message(&self, text: &str) -> SendOutcome {
        let Some(turn) = self.store.begin_turn() else {
            warn!("send rejected: a reply is still pending");
            return SendOutcome::Rejected;
        };
        self.run_turn(turn, text).await
    }

    /// Run a turn whose slot the caller already claimed. The slot is released
    /// when this returns.
    pub async fn run_turn(&self, _turn: TurnGuard, text: &str) -> SendOutcome {
        self.store.add_message(Role::User, text).await;

        match self.generator.generate(text).await {
            Ok(reply) => {
                self.store.add_message(Role::Assistant, reply).await;
                SendOutcome::Replied
            }
            Err(err) => {
                warn!(error = %err, model = self.generator.model_name(), "error calling generation endpoint");
                self.store.add_message(Role::Assistant, FALLBACK_REPLY).await;
                SendOutcome::Fallback
            }
        }
    }
}
