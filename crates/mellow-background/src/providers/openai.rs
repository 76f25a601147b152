//! OpenAI chat completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mellow_protocol::{ProviderError, ProviderKind, RewriteRequest};

use super::{build_user_prompt, RewriteProvider, SYSTEM_PROMPT};

const BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.7;

pub struct OpenAiClient {
    client: Client,
    base_url: String,
}

impl OpenAiClient {
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

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl RewriteProvider for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn rewrite(
        &self,
        request: &RewriteRequest,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(&request.text, &request.context),
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!(model = MODEL, "openai chat completion");
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
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
                ProviderKind::OpenAi,
                status.as_u16(),
                embedded,
            ));
        }

        parse_suggestion(&body)
    }
}

fn parse_suggestion(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|_| ProviderError::unexpected_format(ProviderKind::OpenAi))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| ProviderError::unexpected_format(ProviderKind::OpenAi))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
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
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn suggestion_comes_from_first_choice_trimmed() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  gentle reply  " } }
            ]
        })
        .to_string();
        assert_eq!(parse_suggestion(&body).expect("suggestion"), "gentle reply");
    }

    #[test]
    fn empty_choices_are_unexpected_format() {
        let err = parse_suggestion(r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected response format from OpenAI API."
        );
    }

    #[tokio::test]
    async fn request_carries_bearer_key_and_both_prompt_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_string_contains("pineapple belongs on pizza"))
            .and(body_string_contains("this take is garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [ { "message": {
                    "role": "assistant",
                    "content": "Totally respect this take — pineapple pizza is underrated!"
                } } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(server.uri());
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
    async fn error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided" }
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(server.uri());
        let err = client
            .rewrite(&RewriteRequest::new("draft", ""), "bad-key")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Incorrect API key provided");
    }

    #[tokio::test]
    async fn opaque_errors_fall_back_to_status_coded_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(server.uri());
        let err = client
            .rewrite(&RewriteRequest::new("draft", ""), "test-key")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API Error: 502");
    }
}
