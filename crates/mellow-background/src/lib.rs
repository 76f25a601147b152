//! Background collaborator of the mellow extension: resolves stored
//! settings, dispatches rewrite requests to the configured provider, and
//! answers the content script over the runtime message channel.

pub mod providers;

#[cfg(target_arch = "wasm32")]
mod worker;

use mellow_protocol::{ProviderKind, RewriteError, RewriteRequest, Settings};
use providers::{gemini::GeminiClient, openai::OpenAiClient, RewriteProvider};

/// Runs one rewrite attempt against the configured provider. Configuration
/// problems short-circuit before any network activity.
pub async fn handle_rewrite(
    request: &RewriteRequest,
    settings: &Settings,
) -> Result<String, RewriteError> {
    let api_key = settings.require_api_key()?;
    let provider: Box<dyn RewriteProvider> = match settings.provider {
        ProviderKind::Gemini => Box::new(GeminiClient::new()),
        ProviderKind::OpenAi => Box::new(OpenAiClient::new()),
    };
    tracing::info!(provider = provider.kind().as_str(), "dispatching rewrite");
    let suggestion = provider.rewrite(request, api_key).await?;
    Ok(suggestion)
}
