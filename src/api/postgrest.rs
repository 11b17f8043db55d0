//! Message table hosted behind a PostgREST endpoint (as exposed by Supabase).

use async_trait::async_trait;
use reqwest::RequestBuilder;
use tracing::debug;

use crate::core::datastore::{DatastoreError, MessageDatastore};
use crate::core::message::{Message, NewMessage};
use crate::utils::url::construct_api_url;

pub const DEFAULT_TABLE: &str = "messages";

/// Delete filters must name a column; no row ever carries the nil UUID, so
/// "id is not nil" matches the whole table.
pub const NIL_ID_SENTINEL: &str = "00000000-0000-0000-0000-000000000000";

pub struct PostgrestDatastore {
    client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl PostgrestDatastore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        table: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            table: table.into(),
            api_key: api_key.into(),
        }
    }

    pub fn table_url(&self) -> String {
        construct_api_url(&self.base_url, &format!("rest/v1/{}", self.table))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, DatastoreError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DatastoreError::Status { status, body });
        }
        Ok(body)
    }
}

/// Decode the representation returned by an insert; PostgREST always answers
/// with an array even for single-row inserts.
pub fn parse_inserted_row(body: &str) -> Result<Message, DatastoreError> {
    let rows: Vec<Message> = serde_json::from_str(body)?;
    rows.into_iter().next().ok_or(DatastoreError::EmptyInsert)
}

pub fn parse_rows(body: &str) -> Result<Vec<Message>, DatastoreError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl MessageDatastore for PostgrestDatastore {
    async fn insert(&self, message: NewMessage) -> Result<Message, DatastoreError> {
        debug!(table = %self.table, role = message.role.as_str(), "inserting message row");
        let request = self
            .client
            .post(self.table_url())
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&[message]);
        let body = self.send(request).await?;
        parse_inserted_row(&body)
    }

    async fn list(&self) -> Result<Vec<Message>, DatastoreError> {
        debug!(table = %self.table, "listing message rows");
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "created_at.asc")]);
        let body = self.send(request).await?;
        parse_rows(&body)
    }

    async fn delete_all(&self) -> Result<(), DatastoreError> {
        debug!(table = %self.table, "deleting all message rows");
        let filter = format!("neq.{NIL_ID_SENTINEL}");
        let request = self
            .client
            .delete(self.table_url())
            .query(&[("id", filter.as_str())]);
        self.send(request).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.table_url()
    }
}
