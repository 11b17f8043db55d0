//! Persistence seam for the message table.
//!
//! [`MessageDatastore`] mirrors the three row operations the chat needs:
//! insert-one-returning, select-all ordered by creation time, and delete-all.
//! [`crate::api::postgrest::PostgrestDatastore`] talks to a hosted table;
//! [`MemoryDatastore`] keeps rows for the lifetime of the process.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

use crate::api::summarize_error_body;
use crate::core::message::{Message, NewMessage};

#[async_trait]
pub trait MessageDatastore: Send + Sync {
    /// Persist one row and return it as stored, with id and timestamp filled in.
    async fn insert(&self, message: NewMessage) -> Result<Message, DatastoreError>;

    /// Every row, oldest first.
    async fn list(&self) -> Result<Vec<Message>, DatastoreError>;

    /// Remove every row unconditionally.
    async fn delete_all(&self) -> Result<(), DatastoreError>;

    /// Short human-readable description for status lines and logs.
    fn describe(&self) -> String;
}

#[derive(Debug)]
pub enum DatastoreError {
    /// The request never produced a response.
    Http(reqwest::Error),

    /// The datastore answered with a non-success status.
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not match the row shape.
    Decode(serde_json::Error),

    /// An insert succeeded but returned no row.
    EmptyInsert,

    /// The in-process store's lock was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for DatastoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatastoreError::Http(err) => write!(f, "datastore request failed: {err}"),
            DatastoreError::Status { status, body } => write!(
                f,
                "datastore returned {status}: {}",
                summarize_error_body(body)
            ),
            DatastoreError::Decode(err) => write!(f, "unexpected datastore response: {err}"),
            DatastoreError::EmptyInsert => write!(f, "datastore insert returned no row"),
            DatastoreError::Poisoned => write!(f, "in-memory datastore is unavailable"),
        }
    }
}

impl Error for DatastoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DatastoreError::Http(err) => Some(err),
            DatastoreError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DatastoreError {
    fn from(err: reqwest::Error) -> Self {
        DatastoreError::Http(err)
    }
}

impl From<serde_json::Error> for DatastoreError {
    fn from(err: serde_json::Error) -> Self {
        DatastoreError::Decode(err)
    }
}

#[derive(Default)]
struct MemoryRows {
    rows: Vec<Message>,
    next_id: u64,
}

/// Process-local table. Rows vanish when the process exits.
#[derive(Default)]
pub struct MemoryDatastore {
    state: Mutex<MemoryRows>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageDatastore for MemoryDatastore {
    async fn insert(&self, message: NewMessage) -> Result<Message, DatastoreError> {
        let mut state = self.state.lock().map_err(|_| DatastoreError::Poisoned)?;
        state.next_id += 1;

        // Keep created_at strictly increasing even when the clock does not
        // advance between inserts.
        let mut created_at = Utc::now();
        if let Some(last) = state.rows.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + Duration::microseconds(1);
            }
        }

        let stored = Message {
            id: format!("mem-{:08}", state.next_id),
            role: message.role,
            content: message.content,
            created_at,
        };
        state.rows.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Message>, DatastoreError> {
        let state = self.state.lock().map_err(|_| DatastoreError::Poisoned)?;
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn delete_all(&self) -> Result<(), DatastoreError> {
        let mut state = self.state.lock().map_err(|_| DatastoreError::Poisoned)?;
        state.rows.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory (not persisted)".to_string()
    }
}
