use async_trait::async_trait;
use std::error::Error;
use std::fmt;

use crate::api::summarize_error_body;

/// Produces an assistant reply from a prompt. Each call is stateless: the
/// prompt is the whole context the model sees.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

    /// Model identifier shown in the header.
    fn model_name(&self) -> &str;
}

#[derive(Debug)]
pub enum GenerateError {
    /// Network failure or timeout before a response arrived.
    Http(reqwest::Error),

    /// The endpoint answered with a non-success status.
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The body was not valid JSON of the expected shape.
    Decode(serde_json::Error),

    /// The response parsed but held no candidate text (for example when a
    /// safety filter blocked the reply).
    MissingText { finish_reason: Option<String> },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Http(err) => write!(f, "generation request failed: {err}"),
            GenerateError::Status { status, body } => write!(
                f,
                "generation endpoint returned {status}: {}",
                summarize_error_body(body)
            ),
            GenerateError::Decode(err) => write!(f, "malformed generation response: {err}"),
            GenerateError::MissingText {
                finish_reason: Some(reason),
            } => write!(f, "response contained no text (finish reason: {reason})"),
            GenerateError::MissingText {
                finish_reason: None,
            } => write!(f, "response contained no text"),
        }
    }
}

impl Error for GenerateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GenerateError::Http(err) => Some(err),
            GenerateError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        GenerateError::Http(err)
    }
}

impl From<serde_json::Error> for GenerateError {
    fn from(err: serde_json::Error) -> Self {
        GenerateError::Decode(err)
    }
}
