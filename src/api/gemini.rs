//! Client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use tracing::debug;

use crate::api::{GenerateRequest, GenerateResponse};
use crate::core::generation::{GenerateError, ReplyGenerator};
use crate::utils::url::construct_api_url;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Full URL for this model's generate call. The key travels in a header,
    /// so the URL is safe to log.
    pub fn endpoint(&self) -> String {
        construct_api_url(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        )
    }
}

/// Pull the reply text out of a raw response body.
pub fn parse_generate_response(body: &str) -> Result<String, GenerateError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    match response.first_text() {
        Some(text) => Ok(text.to_string()),
        None => Err(GenerateError::MissingText {
            finish_reason: response
                .candidates
                .first()
                .and_then(|candidate| candidate.finish_reason.clone()),
        }),
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = self.endpoint();
        debug!(%url, prompt_chars = prompt.chars().count(), "sending generate request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerateError::Status { status, body });
        }

        parse_generate_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
