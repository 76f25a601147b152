//! Per-site extraction strategies, keyed by page hostname. Adding a site
//! means adding a row to the registry; the generic fallback never changes.

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

pub struct SiteStrategy {
    pub name: &'static str,
    /// Whether this strategy applies to the given page hostname.
    pub matches: fn(&str) -> bool,
    /// Attempts extraction from the active surface element. `None` falls
    /// through to the next strategy or the generic fallback.
    pub extract: fn(&Element) -> Option<String>,
}

pub fn registry() -> &'static [SiteStrategy] {
    const REGISTRY: &[SiteStrategy] = &[SiteStrategy {
        name: "x-reply",
        matches: is_x_host,
        extract: extract_x_reply_context,
    }];
    REGISTRY
}

fn is_x_host(hostname: &str) -> bool {
    matches_domain(hostname, "x.com") || matches_domain(hostname, "twitter.com")
}

fn matches_domain(hostname: &str, domain: &str) -> bool {
    hostname == domain
        || hostname
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// X/Twitter reply UI. A modal reply dialog renders the post being replied
/// to inside the dialog itself; an inline reply box sits in the timeline
/// cell right below the post.
fn extract_x_reply_context(element: &Element) -> Option<String> {
    let in_reply_dialog = element
        .closest(r#"[data-testid="reply"]"#)
        .ok()
        .flatten()
        .is_some();

    if in_reply_dialog {
        let modal = element
            .closest(r#"[aria-labelledby="modal-header"]"#)
            .ok()
            .flatten()?;
        let posts = modal
            .query_selector_all(r#"[data-testid="tweetText"]"#)
            .ok()?;
        let mut texts = Vec::new();
        for index in 0..posts.length() {
            let Some(node) = posts.get(index) else {
                continue;
            };
            if let Some(post) = node.dyn_ref::<HtmlElement>() {
                let text = post.inner_text();
                if !text.trim().is_empty() {
                    texts.push(text);
                }
            }
        }
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(" "))
        }
    } else {
        let cell = element
            .closest(r#"[data-testid="cellInnerDiv"]"#)
            .ok()
            .flatten()?;
        let previous = cell.previous_element_sibling()?;
        let post = previous
            .query_selector(r#"[data-testid="tweetText"]"#)
            .ok()
            .flatten()?;
        post.dyn_ref::<HtmlElement>().map(|el| el.inner_text())
    }
}
