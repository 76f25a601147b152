use thiserror::Error;

use crate::types::ProviderKind;

/// Misconfiguration detected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API key not configured. Please set it in the extension popup.")]
    MissingApiKey,
    #[error("Invalid provider selected.")]
    InvalidProvider,
}

/// Failure reported by (or while reaching) a provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Non-2xx reply. The message is the provider's embedded error message
    /// when one was present, otherwise a generic status-coded fallback.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response format from {0} API.")]
    UnexpectedFormat(&'static str),
    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Builds the error for a non-2xx reply, preferring the provider's own
    /// embedded message over the generic status-coded one.
    pub fn from_api_response(
        provider: ProviderKind,
        status: u16,
        embedded_message: Option<String>,
    ) -> Self {
        let message = embedded_message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("{} API Error: {status}", provider.label()));
        Self::Api { status, message }
    }

    pub fn unexpected_format(provider: ProviderKind) -> Self {
        Self::UnexpectedFormat(provider.label())
    }
}

/// Anything that can end a single rewrite attempt in the background worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
