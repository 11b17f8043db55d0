use serde::{Deserialize, Serialize};

pub mod gemini;
pub mod postgrest;

/// Body of a Gemini `generateContent` call.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

impl GenerateRequest {
    /// A single user turn carrying the whole prompt. No history is sent.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, the only piece of the
    /// response the chat uses.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Reduce an error response body to one line for logs and error displays.
///
/// Gemini nests the reason under `error.message`; PostgREST puts it in a
/// top-level `message`. Anything else is collapsed and truncated.
pub fn summarize_error_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            if !summary.is_empty() {
                return summary;
            }
        }
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_CHARS {
        let cut: String = collapsed.chars().take(MAX_CHARS).collect();
        format!("{cut}…")
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wraps_prompt_in_single_part() {
        let body = serde_json::to_value(GenerateRequest::from_prompt("Hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "Hello"}]}]})
        );
    }

    #[test]
    fn first_text_reads_first_candidate_first_part() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[
                {"content":{"role":"model","parts":[{"text":"Hi there!"},{"text":"ignored"}]},"finishReason":"STOP"},
                {"content":{"parts":[{"text":"second candidate"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("Hi there!"));
    }

    #[test]
    fn first_text_is_none_without_candidates_or_parts() {
        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_text(), None);

        let blocked: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
        )
        .unwrap();
        assert_eq!(blocked.first_text(), None);

        let no_parts: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert_eq!(no_parts.first_text(), None);
    }

    #[test]
    fn summarizes_gemini_and_postgrest_errors() {
        let gemini = r#"{"error":{"code":400,"message":"API key not valid.  Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            summarize_error_body(gemini),
            "API key not valid. Please pass a valid API key."
        );

        let postgrest = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.messages\" does not exist"}"#;
        assert_eq!(
            summarize_error_body(postgrest),
            "relation \"public.messages\" does not exist"
        );
    }

    #[test]
    fn summarizes_plain_and_empty_bodies() {
        assert_eq!(summarize_error_body("  "), "<empty body>");
        assert_eq!(summarize_error_body("Bad\n  Gateway"), "Bad Gateway");
        let long = "x".repeat(500);
        assert_eq!(summarize_error_body(&long).chars().count(), 201);
    }
}
