pub mod io;

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

/// Input mechanism of a recognized surface, resolved once at classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// `<textarea>` or single-line text `<input>`.
    PlainField,
    /// Element the page itself marks editable, typically backed by a
    /// framework-managed text model rather than a scalar value.
    RichEditableRegion,
}

/// The one element currently focused for editing. The page owns the node;
/// this is only an observation of it, so every read/write revalidates that
/// the element is still in the document.
#[derive(Debug, Clone)]
pub struct ActiveSurface {
    element: HtmlElement,
    kind: SurfaceKind,
}

impl ActiveSurface {
    pub fn new(element: HtmlElement, kind: SurfaceKind) -> Self {
        Self { element, kind }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    pub fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    /// Returns focus to the surface unless the page has since removed it.
    pub fn restore_focus(&self) {
        if !self.is_attached() {
            return;
        }
        if let Err(err) = self.element.focus() {
            tracing::debug!("could not restore focus to surface: {err:?}");
        }
    }
}

/// Single owner of the "currently active surface" state. All mutation goes
/// through here; nothing else holds the element.
#[derive(Debug, Default)]
pub struct SurfaceTracker {
    active: Option<ActiveSurface>,
}

impl SurfaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, surface: ActiveSurface) {
        self.active = Some(surface);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActiveSurface> {
        self.active.as_ref()
    }
}

/// Classifies an event target, returning the surface kind it qualifies as.
pub fn classify(target: &Element) -> Option<SurfaceKind> {
    let editable = target
        .dyn_ref::<HtmlElement>()
        .is_some_and(|element| element.is_content_editable());
    let input_type = target.dyn_ref::<HtmlInputElement>().map(|input| input.type_());
    classify_parts(&target.tag_name(), input_type.as_deref(), editable)
}

fn classify_parts(tag: &str, input_type: Option<&str>, editable: bool) -> Option<SurfaceKind> {
    if tag.eq_ignore_ascii_case("textarea") {
        return Some(SurfaceKind::PlainField);
    }
    if tag.eq_ignore_ascii_case("input") && input_type == Some("text") {
        return Some(SurfaceKind::PlainField);
    }
    if editable {
        return Some(SurfaceKind::RichEditableRegion);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textarea_is_a_plain_field() {
        assert_eq!(
            classify_parts("TEXTAREA", None, false),
            Some(SurfaceKind::PlainField)
        );
    }

    #[test]
    fn only_text_inputs_qualify() {
        assert_eq!(
            classify_parts("INPUT", Some("text"), false),
            Some(SurfaceKind::PlainField)
        );
        assert_eq!(classify_parts("INPUT", Some("checkbox"), false), None);
        assert_eq!(classify_parts("INPUT", Some("password"), false), None);
    }

    #[test]
    fn editable_region_wins_only_when_not_a_field() {
        assert_eq!(
            classify_parts("DIV", None, true),
            Some(SurfaceKind::RichEditableRegion)
        );
        // A textarea nested in an editable container is still a plain field.
        assert_eq!(
            classify_parts("TEXTAREA", None, true),
            Some(SurfaceKind::PlainField)
        );
    }

    #[test]
    fn ordinary_elements_do_not_qualify() {
        assert_eq!(classify_parts("DIV", None, false), None);
        assert_eq!(classify_parts("BUTTON", None, false), None);
    }

    #[test]
    fn tracker_holds_at_most_one_surface() {
        let mut tracker = SurfaceTracker::new();
        assert!(tracker.active().is_none());
        tracker.clear();
        assert!(tracker.active().is_none());
    }
}
