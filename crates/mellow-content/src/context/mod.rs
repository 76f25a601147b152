//! Best-effort extraction of "what is being replied to" from unknown page
//! structure. Site-specific strategies run first, then a generic fallback;
//! nothing here ever errors, the worst case is an empty string.

pub mod sites;

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::surface::{io, ActiveSurface};

/// Upper bound on extracted context, in characters.
pub const MAX_CONTEXT_CHARS: usize = 500;

/// Extracts reply context for the given surface.
pub fn extract(surface: &ActiveSurface) -> String {
    if !surface.is_attached() {
        return String::new();
    }

    let hostname = current_hostname();
    for strategy in sites::registry() {
        if !(strategy.matches)(&hostname) {
            continue;
        }
        if let Some(found) = (strategy.extract)(surface.element()) {
            let found = clamp_context(found.trim());
            if !found.is_empty() {
                tracing::debug!(strategy = strategy.name, "site strategy produced context");
                return found;
            }
        }
    }

    generic_fallback(surface)
}

/// Takes the parent's rendered text, minus any echo of the draft itself.
fn generic_fallback(surface: &ActiveSurface) -> String {
    let Some(parent) = surface.element().parent_element() else {
        return String::new();
    };
    let Some(parent) = parent.dyn_ref::<HtmlElement>() else {
        return String::new();
    };
    let draft = io::read(surface);
    clamp_context(&remove_draft_echo(&parent.inner_text(), &draft))
}

fn current_hostname() -> String {
    web_sys::window()
        .and_then(|window| window.location().hostname().ok())
        .unwrap_or_default()
}

/// Removes every occurrence of the draft from the surrounding text so the
/// draft is never fed back to the transformer as its own context. Repeats
/// until no occurrence is left, since removal can butt two fragments into a
/// fresh occurrence.
fn remove_draft_echo(text: &str, draft: &str) -> String {
    if draft.is_empty() {
        return text.trim().to_string();
    }
    let mut remaining = text.to_string();
    while remaining.contains(draft) {
        remaining = remaining.replace(draft, "");
    }
    remaining.trim().to_string()
}

fn clamp_context(text: &str) -> String {
    match text.char_indices().nth(MAX_CONTEXT_CHARS) {
        Some((boundary, _)) => text[..boundary].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_short_text_intact() {
        assert_eq!(clamp_context("short"), "short");
    }

    #[test]
    fn clamp_bounds_length_in_chars() {
        let long = "x".repeat(MAX_CONTEXT_CHARS + 40);
        assert_eq!(clamp_context(&long).chars().count(), MAX_CONTEXT_CHARS);
    }

    #[test]
    fn clamp_respects_multibyte_boundaries() {
        let long = "你".repeat(MAX_CONTEXT_CHARS + 3);
        let clamped = clamp_context(&long);
        assert_eq!(clamped.chars().count(), MAX_CONTEXT_CHARS);
        assert!(long.starts_with(&clamped));
    }

    #[test]
    fn echo_removal_strips_every_occurrence() {
        let page = "post body draft text sidebar draft text footer";
        assert_eq!(
            remove_draft_echo(page, "draft text"),
            "post body  sidebar  footer"
        );
    }

    #[test]
    fn echo_removal_handles_occurrences_created_by_removal() {
        // Removing "ab" from "aabb" leaves "ab"; one pass is not enough.
        assert!(!remove_draft_echo("aabb", "ab").contains("ab"));
    }

    #[test]
    fn echo_removal_with_empty_draft_keeps_text() {
        assert_eq!(remove_draft_echo("  context  ", ""), "context");
    }
}
