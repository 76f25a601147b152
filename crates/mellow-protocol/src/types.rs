use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Action tag carried by every content → background rewrite message.
pub const REWRITE_ACTION: &str = "rewriteText";

/// chrome.storage.local key holding the selected provider.
pub const STORAGE_KEY_PROVIDER: &str = "mellow_provider";
/// chrome.storage.local key holding the provider API key.
pub const STORAGE_KEY_API_KEY: &str = "mellow_apiKey";

/// Language-model provider the background worker dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Stored form, as written by the settings popup.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Human-facing name used in provider error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    pub fn from_stored(value: &str) -> Result<Self, ConfigError> {
        match value {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            _ => Err(ConfigError::InvalidProvider),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings pair read from the extension's key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
}

impl Settings {
    /// Resolves settings from the raw stored values. A missing or blank
    /// provider falls back to Gemini; an unknown provider string is a
    /// configuration error. Blank API keys count as absent.
    pub fn from_stored(
        provider: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let provider = match provider.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => ProviderKind::from_stored(value)?,
            None => ProviderKind::Gemini,
        };
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        Ok(Self { provider, api_key })
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

/// Content → background rewrite message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub action: String,
    pub text: String,
    pub context: String,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            action: REWRITE_ACTION.to_string(),
            text: text.into(),
            context: context.into(),
        }
    }

    pub fn is_rewrite(&self) -> bool {
        self.action == REWRITE_ACTION
    }
}

/// Background → content reply: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RewriteResponse {
    #[serde(rename_all = "camelCase")]
    Success { suggested_text: String },
    Failure { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape_matches_channel_contract() {
        let request = RewriteRequest::new("draft", "thread context");
        let encoded = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(
            encoded,
            serde_json::json!({
                "action": "rewriteText",
                "text": "draft",
                "context": "thread context",
            })
        );
    }

    #[test]
    fn success_response_uses_camel_case_field() {
        let reply = RewriteResponse::Success {
            suggested_text: "kind words".to_string(),
        };
        let encoded = serde_json::to_value(&reply).expect("serialize response");
        assert_eq!(
            encoded,
            serde_json::json!({ "suggestedText": "kind words" })
        );
    }

    #[test]
    fn failure_response_round_trips() {
        let decoded: RewriteResponse =
            serde_json::from_value(serde_json::json!({ "error": "boom" })).expect("decode");
        assert_eq!(
            decoded,
            RewriteResponse::Failure {
                error: "boom".to_string()
            }
        );
    }

    #[test]
    fn settings_default_provider_is_gemini() {
        let settings = Settings::from_stored(None, Some("sk-123")).expect("settings");
        assert_eq!(settings.provider, ProviderKind::Gemini);
        assert_eq!(settings.api_key.as_deref(), Some("sk-123"));
    }

    #[test]
    fn settings_blank_provider_falls_back_to_gemini() {
        let settings = Settings::from_stored(Some("  "), Some("key")).expect("settings");
        assert_eq!(settings.provider, ProviderKind::Gemini);
    }

    #[test]
    fn settings_reject_unknown_provider() {
        let err = Settings::from_stored(Some("claude"), Some("key")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid provider selected.");
    }

    #[test]
    fn settings_treat_blank_key_as_absent() {
        let settings = Settings::from_stored(Some("openai"), Some("   ")).expect("settings");
        assert!(settings.api_key.is_none());
        assert!(settings.require_api_key().is_err());
    }
}
