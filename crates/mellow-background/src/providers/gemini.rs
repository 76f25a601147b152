//! Gemini generateContent client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mellow_protocol::{ProviderError, ProviderKind, RewriteRequest};

use super::{build_user_prompt, RewriteProvider, SYSTEM_PROMPT};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash";
const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 800;

pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl RewriteProvider for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn rewrite(
        &self,
        request: &RewriteRequest,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{MODEL}:generateContent?key={api_key}",
            self.base_url
        );
        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_user_prompt(&request.text, &request.context),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(model = MODEL, "gemini generate_content");
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ProviderError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ProviderError::Network(err.to_string()))?;

        if !status.is_success() {
            let embedded = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|parsed| parsed.error.message);
            return Err(ProviderError::from_api_response(
                ProviderKind::Gemini,
                status.as_u16(),
                embedded,
            ));
        }

        parse_suggestion(&body)
    }
}

fn parse_suggestion(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|_| ProviderError::unexpected_format(ProviderKind::Gemini))?;
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text.trim().to_string())
        .ok_or_else(|| ProviderError::unexpected_format(ProviderKind::Gemini))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn suggestion_comes_from_first_candidate_part_trimmed() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "  warm words  " } ] } },
                { "content": { "parts": [ { "text": "second" } ] } }
            ]
        })
        .to_string();
        assert_eq!(parse_suggestion(&body).expect("suggestion"), "warm words");
    }

    #[test]
    fn bodies_without_candidates_are_unexpected_format() {
        let err = parse_suggestion("{}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected response format from Gemini API."
        );

        let err = parse_suggestion(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected response format from Gemini API."
        );
    }

    #[tokio::test]
    async fn request_carries_prompt_and_key_and_success_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("I think pineapple belongs on pizza"))
            .and(body_string_contains("this take is garbage and you're an idiot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [ { "content": { "parts": [
                    { "text": "Totally respect this take — pineapple pizza is underrated!" }
                ] } } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri());
        let request = RewriteRequest::new(
            "this take is garbage and you're an idiot",
            "I think pineapple belongs on pizza",
        );
        let suggestion = client.rewrite(&request, "test-key").await.expect("rewrite");
        assert_eq!(
            suggestion,
            "Totally respect this take — pineapple pizza is underrated!"
        );
    }

    #[tokio::test]
    async fn error_body_message_wins_over_generic_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Resource has been exhausted" }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri());
        let err = client
            .rewrite(&RewriteRequest::new("draft", ""), "test-key")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Resource has been exhausted");
    }

    #[tokio::test]
    async fn opaque_error_bodies_fall_back_to_status_coded_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream blew up"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri());
        let err = client
            .rewrite(&RewriteRequest::new("draft", ""), "test-key")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Gemini API Error: 500");
    }

    #[tokio::test]
    async fn malformed_success_body_is_unexpected_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri());
        let err = client
            .rewrite(&RewriteRequest::new("draft", ""), "test-key")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected response format from Gemini API."
        );
    }
}
