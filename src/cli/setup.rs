//! Wiring from config and credentials to a ready [`Conversation`].

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::gemini::GeminiClient;
use crate::api::postgrest::PostgrestDatastore;
use crate::core::config::data::path_display;
use crate::core::config::{Config, DatastoreKind};
use crate::core::conversation::Conversation;
use crate::core::credentials::{CredentialStore, Secret};
use crate::core::datastore::{MemoryDatastore, MessageDatastore};
use crate::core::generation::ReplyGenerator;
use crate::core::store::ChatStore;
use crate::utils::logging::init_file_logging;
use crate::utils::url::is_http_url;

pub fn build_http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("palaver/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Datastore selected by config, or the in-memory one when `force_memory`.
pub fn build_datastore(
    config: &Config,
    force_memory: bool,
    client: &reqwest::Client,
    credentials: &CredentialStore,
) -> Result<Arc<dyn MessageDatastore>, Box<dyn Error>> {
    let kind = if force_memory {
        DatastoreKind::Memory
    } else {
        config.datastore_kind()
    };

    match kind {
        DatastoreKind::Memory => Ok(Arc::new(MemoryDatastore::new())),
        DatastoreKind::Supabase => {
            let url = config.resolved_datastore_url().ok_or(
                "No datastore URL configured. Run 'palaver set datastore-url \
                 https://<project>.supabase.co', set PALAVER_DATASTORE_URL, or pass --memory.",
            )?;
            if !is_http_url(&url) {
                return Err(format!("Datastore URL is not an http(s) URL: {url}").into());
            }
            let (key, source) = credentials.require(Secret::DatastoreKey)?;
            info!(%source, "datastore key resolved");
            Ok(Arc::new(PostgrestDatastore::new(
                client.clone(),
                url,
                config.resolved_table(),
                key,
            )))
        }
    }
}

pub fn build_generator(
    config: &Config,
    client: &reqwest::Client,
    credentials: &CredentialStore,
) -> Result<Arc<dyn ReplyGenerator>, Box<dyn Error>> {
    let (key, source) = credentials.require(Secret::GeminiApiKey)?;
    info!(%source, "Gemini API key resolved");
    Ok(Arc::new(GeminiClient::new(
        client.clone(),
        config.resolved_gemini_base_url(),
        config.resolved_model(),
        key,
    )))
}

pub fn bootstrap_conversation(
    config: &Config,
    force_memory: bool,
) -> Result<Conversation, Box<dyn Error>> {
    let client = build_http_client(config)?;
    let credentials = CredentialStore::new();
    let datastore = build_datastore(config, force_memory, &client, &credentials)?;
    let generator = build_generator(config, &client, &credentials)?;
    Ok(Conversation::new(ChatStore::new(datastore), generator))
}

/// Datastore-only wiring for commands that never call the model.
pub fn bootstrap_store(config: &Config, force_memory: bool) -> Result<ChatStore, Box<dyn Error>> {
    let client = build_http_client(config)?;
    let datastore = build_datastore(config, force_memory, &client, &CredentialStore::new())?;
    Ok(ChatStore::new(datastore))
}

/// Start file logging at `--log`, the configured path, or the default.
/// Logging problems are reported but never stop the program.
pub fn init_logging(cli_log: Option<&str>, config: &Config) -> Option<PathBuf> {
    let path = cli_log
        .map(PathBuf::from)
        .or_else(|| config.log_file.as_deref().map(PathBuf::from))
        .or_else(Config::default_log_path)?;

    match init_file_logging(path.clone()) {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!(
                "⚠️  Could not open log file {}: {err}",
                path_display(&path)
            );
            warn!(error = %err, "file logging disabled");
            None
        }
    }
}
