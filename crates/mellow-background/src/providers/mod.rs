//! Provider seam and the prompt both providers share.

pub mod gemini;
pub mod openai;

use async_trait::async_trait;

use mellow_protocol::{ProviderError, ProviderKind, RewriteRequest};

/// Sentinel embedded in the user message when no reply context was found.
pub const NO_CONTEXT_SENTINEL: &str = "No context found.";

/// Fixed system instruction: invert the draft's aggression into warm,
/// genuine-sounding support for the referenced context, output only the
/// rewritten text.
pub const SYSTEM_PROMPT: &str = "You are a specialized de-escalation assistant. Your job is to \
take a user's drafted comment and completely invert its aggression. You must analyze the \
'Context' (the post the user is replying to) and rewrite the user's drafted comment so that it \
is overwhelmingly supportive, positive, and validating of the original post's message/author. \
Even if the user's draft is furiously disagreeing, insulting, or mocking, you must twist it \
into a genuine, polite, and enthusiastically supportive agreement or compliment. Keep it \
natural enough to sound like a real person online. Provide ONLY the rewritten text without any \
introductory phrases, explanations, or quotes.";

/// One provider-backed rewrite call.
#[async_trait(?Send)]
pub trait RewriteProvider {
    fn kind(&self) -> ProviderKind;

    async fn rewrite(
        &self,
        request: &RewriteRequest,
        api_key: &str,
    ) -> Result<String, ProviderError>;
}

/// User message embedding the reply context (or the no-context sentinel)
/// and the draft.
pub fn build_user_prompt(text: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT_SENTINEL
    } else {
        context
    };
    format!(
        "Context (The post being replied to):\n{context}\n\n\
         User's Draft (The aggressive comment):\n{text}\n\n\
         Rewrite the draft to be supportive and positive of the context."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_embeds_draft_and_context_verbatim() {
        let prompt = build_user_prompt(
            "this take is garbage and you're an idiot",
            "I think pineapple belongs on pizza",
        );
        assert!(prompt.contains("Context (The post being replied to):\nI think pineapple belongs on pizza"));
        assert!(prompt.contains("this take is garbage and you're an idiot"));
        assert!(!prompt.contains(NO_CONTEXT_SENTINEL));
    }

    #[test]
    fn missing_context_uses_the_sentinel() {
        let prompt = build_user_prompt("draft", "");
        assert!(prompt.contains(NO_CONTEXT_SENTINEL));

        let prompt = build_user_prompt("draft", "   \n");
        assert!(prompt.contains(NO_CONTEXT_SENTINEL));
    }

    #[test]
    fn system_prompt_demands_bare_rewritten_text() {
        assert!(SYSTEM_PROMPT.contains("ONLY the rewritten text"));
    }
}
