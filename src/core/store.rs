//! In-memory message list and busy state, backed by a [`MessageDatastore`].
//!
//! The store is the only owner of the transcript. Every mutation goes through
//! [`ChatStore::fetch_messages`], [`ChatStore::add_message`] or
//! [`ChatStore::clear_messages`]; each logs and swallows datastore failures so
//! callers never see an error, only the (possibly unchanged) state.
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`: the lock is taken to flip flags or splice the list, released for
//! the network round trip, and taken again to publish the result.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::core::datastore::MessageDatastore;
use crate::core::message::{Message, NewMessage, Role};

#[derive(Default)]
struct StoreState {
    messages: Vec<Message>,
    pending_writes: usize,
    turn_active: bool,
    revision: u64,
}

/// Read-only view handed to closures passed to [`ChatStore::read`].
pub struct StoreView<'a> {
    pub messages: &'a [Message],
    pub busy: bool,
    pub revision: u64,
}

#[derive(Clone)]
pub struct ChatStore {
    state: Arc<Mutex<StoreState>>,
    datastore: Arc<dyn MessageDatastore>,
}

impl ChatStore {
    pub fn new(datastore: Arc<dyn MessageDatastore>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            datastore,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panic elsewhere must not take the transcript down with it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn datastore_description(&self) -> String {
        self.datastore.describe()
    }

    /// Run `f` against the current state without cloning the list.
    pub fn read<R>(&self, f: impl FnOnce(StoreView<'_>) -> R) -> R {
        let state = self.lock();
        f(StoreView {
            messages: &state.messages,
            busy: state.pending_writes > 0 || state.turn_active,
            revision: state.revision,
        })
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    /// True while a write is in flight or a send turn holds the slot.
    pub fn is_busy(&self) -> bool {
        let state = self.lock();
        state.pending_writes > 0 || state.turn_active
    }

    /// Bumped on every change to the list; lets the view notice new content.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Claim the single in-flight slot for a send turn. Returns `None` when
    /// another turn already holds it; the slot frees when the guard drops.
    pub fn begin_turn(&self) -> Option<TurnGuard> {
        let mut state = self.lock();
        if state.turn_active {
            return None;
        }
        state.turn_active = true;
        Some(TurnGuard {
            state: Arc::clone(&self.state),
        })
    }

    /// Replace the list with every persisted row, oldest first. On failure the
    /// previous list stays as it was. Returns whether the load succeeded.
    pub async fn fetch_messages(&self) -> bool {
        match self.datastore.list().await {
            Ok(mut rows) => {
                rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                debug!(count = rows.len(), "loaded conversation history");
                let mut state = self.lock();
                state.messages = rows;
                state.revision += 1;
                true
            }
            Err(err) => {
                warn!(error = %err, "error fetching messages");
                false
            }
        }
    }

    /// Persist a message and append the stored row. A failed insert clears
    /// the busy state and appends nothing; the text is not retained.
    pub async fn add_message(&self, role: Role, content: impl Into<String>) -> Option<Message> {
        self.lock().pending_writes += 1;

        let result = self.datastore.insert(NewMessage::new(role, content)).await;

        let mut state = self.lock();
        state.pending_writes = state.pending_writes.saturating_sub(1);
        match result {
            Ok(stored) => {
                state.messages.push(stored.clone());
                state.revision += 1;
                Some(stored)
            }
            Err(err) => {
                warn!(error = %err, role = role.as_str(), "error adding message");
                None
            }
        }
    }

    /// Delete every persisted row, then empty the list. On failure the list is
    /// left untouched even though some rows may already be gone.
    pub async fn clear_messages(&self) -> bool {
        match self.datastore.delete_all().await {
            Ok(()) => {
                let mut state = self.lock();
                state.messages.clear();
                state.revision += 1;
                true
            }
            Err(err) => {
                warn!(error = %err, "error clearing messages");
                false
            }
        }
    }
}

/// Holds the send slot claimed by [`ChatStore::begin_turn`].
pub struct TurnGuard {
    state: Arc<Mutex<StoreState>>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.turn_active = false;
    }
}
