//! Gemini streaming client (SSE transport).

use std::env;
use std::io::{BufRead, BufReader};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ApiContent, LlmClient, LlmError, LlmRequest};
use crate::constants::GEMINI_API_ROOT;

/// Gemini client over `streamGenerateContent` with `alt=sse`.
pub struct GeminiClient {
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new() -> Self {
        dotenvy::dotenv().ok();
        Self { api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()) }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: &'a [ApiContent],
    #[serde(rename = "safetySettings")]
    safety_settings: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<usize>,
}

/// Extract the text deltas from one SSE data payload. Malformed payloads
/// yield nothing; the stream carries on.
fn chunk_texts(json_str: &str) -> (Vec<String>, Option<usize>) {
    let Ok(chunk) = serde_json::from_str::<StreamChunk>(json_str) else {
        return (Vec::new(), None);
    };
    let texts = chunk
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.clone())
        .collect();
    let tokens = chunk.usage_metadata.and_then(|u| u.candidates_token_count);
    (texts, tokens)
}

impl LlmClient for GeminiClient {
    fn stream(&self, request: &LlmRequest, emit: &mut dyn FnMut(String)) -> Result<usize, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingKey)?;

        let url =
            format!("{}/models/{}:streamGenerateContent?alt=sse&key={}", GEMINI_API_ROOT, request.model, api_key);

        let body = GeminiRequest {
            contents: &request.contents,
            safety_settings: json!([
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_ONLY_HIGH" }
            ]),
        };

        let client = Client::new();
        let response = client.post(&url).header("content-type", "application/json").json(&body).send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        // The stream ends at EOF; there is no explicit terminator event.
        let reader = BufReader::new(response);
        let mut output_tokens = 0;
        for line in reader.lines() {
            let line = line.map_err(|e| LlmError::StreamRead(e.to_string()))?;
            let Some(json_str) = line.strip_prefix("data: ") else {
                continue;
            };
            let (texts, tokens) = chunk_texts(json_str);
            for text in texts {
                emit(text);
            }
            if let Some(tokens) = tokens {
                output_tokens = tokens;
            }
        }

        Ok(output_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::ApiPart;

    #[test]
    fn chunk_texts_extracts_parts_in_order() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "The "}, {"text": "repo "}]}}]}"#;
        let (texts, tokens) = chunk_texts(json);
        assert_eq!(texts, vec!["The ".to_string(), "repo ".to_string()]);
        assert!(tokens.is_none());
    }

    #[test]
    fn chunk_texts_reads_usage() {
        let json = r#"{"candidates": [], "usageMetadata": {"candidatesTokenCount": 17}}"#;
        let (texts, tokens) = chunk_texts(json);
        assert!(texts.is_empty());
        assert_eq!(tokens, Some(17));
    }

    #[test]
    fn chunk_texts_survives_malformed_payloads() {
        assert_eq!(chunk_texts("not json").0.len(), 0);
        assert_eq!(chunk_texts("{}").0.len(), 0);
        assert_eq!(chunk_texts(r#"{"candidates": [{"content": null}]}"#).0.len(), 0);
    }

    #[test]
    fn missing_key_is_an_auth_error() {
        let client = GeminiClient { api_key: None };
        let request = LlmRequest {
            model: "m".into(),
            contents: vec![ApiContent { role: "user".into(), parts: vec![ApiPart { text: "hi".into() }] }],
        };
        let mut sink = |_: String| {};
        assert!(matches!(client.stream(&request, &mut sink), Err(LlmError::MissingKey)));
    }

    #[test]
    fn request_body_serializes_wire_shape() {
        let body = GeminiRequest {
            contents: &[ApiContent { role: "user".into(), parts: vec![ApiPart { text: "hello".into() }] }],
            safety_settings: json!([]),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert!(value.get("safetySettings").is_some());
    }
}
