//! The injected affordance: a floating trigger control and a floating result
//! panel, both owned by this module and positioned against the active
//! surface. Styles are applied inline at mount so the content script stays
//! self-contained.

pub mod position;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use crate::rewrite::{PanelModel, PanelPhase};
use position::PagePoint;

/// Marker id of the trigger control; excluded from surface classification.
pub const TRIGGER_ID: &str = "mellow-trigger";
/// Marker id of the result panel; excluded from surface classification.
pub const PANEL_ID: &str = "mellow-panel";

const TRIGGER_LABEL: &str = "Mellow";
const PANEL_TITLE: &str = "MELLOW";
const LOADING_LABEL: &str = "Rewriting...";
const ACCEPT_LABEL: &str = "Accept";

const TRIGGER_CSS: &str = "position:absolute;z-index:2147483646;display:none;padding:4px 10px;\
    border:1px solid #1d9bf0;border-radius:14px;background:#1d9bf0;color:#fff;\
    font:600 12px/1.4 sans-serif;cursor:pointer;";
const PANEL_CSS: &str = "position:absolute;z-index:2147483647;display:none;width:350px;\
    border:1px solid #cfd9de;border-radius:12px;background:#fff;color:#0f1419;\
    font:400 13px/1.5 sans-serif;box-shadow:0 4px 16px rgba(0,0,0,0.2);";
const HEADER_CSS: &str = "display:flex;justify-content:space-between;align-items:center;\
    padding:8px 12px;border-bottom:1px solid #eff3f4;font-weight:700;";
const CLOSE_CSS: &str = "border:none;background:none;font-size:16px;cursor:pointer;color:#536471;";
const BODY_CSS: &str = "padding:12px;min-height:40px;white-space:pre-wrap;";
const ERROR_CSS: &str = "display:none;color:#f4212e;";
const FOOTER_CSS: &str = "padding:8px 12px;border-top:1px solid #eff3f4;text-align:right;";
const ACCEPT_CSS: &str = "padding:4px 14px;border:none;border-radius:14px;background:#1d9bf0;\
    color:#fff;font:600 12px/1.4 sans-serif;cursor:pointer;";

/// True when the event target lies within the injected UI itself.
pub fn is_own_ui(target: &Element) -> bool {
    target
        .closest(&format!("#{TRIGGER_ID}, #{PANEL_ID}"))
        .ok()
        .flatten()
        .is_some()
}

/// Owns the injected DOM and applies panel models to it.
pub struct Affordance {
    trigger: HtmlButtonElement,
    panel: HtmlElement,
    loading: HtmlElement,
    suggestion: HtmlElement,
    error: HtmlElement,
    accept: HtmlButtonElement,
    close: HtmlButtonElement,
}

impl Affordance {
    /// Builds the trigger and panel and appends them to the document body.
    pub fn mount(document: &Document) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let trigger = make_button(document, TRIGGER_CSS)?;
        trigger.set_id(TRIGGER_ID);
        trigger.set_text_content(Some(TRIGGER_LABEL));

        let panel: HtmlElement = make_element(document, "div", PANEL_CSS)?;
        panel.set_id(PANEL_ID);

        let header = make_element(document, "div", HEADER_CSS)?;
        let title = make_element(document, "span", "")?;
        title.set_text_content(Some(PANEL_TITLE));
        let close = make_button(document, CLOSE_CSS)?;
        close.set_text_content(Some("\u{00d7}"));
        header.append_child(&title)?;
        header.append_child(&close)?;

        let body_section = make_element(document, "div", BODY_CSS)?;
        let loading = make_element(document, "div", "display:none;color:#536471;")?;
        loading.set_text_content(Some(LOADING_LABEL));
        let suggestion = make_element(document, "div", "display:none;")?;
        let error = make_element(document, "div", ERROR_CSS)?;
        body_section.append_child(&loading)?;
        body_section.append_child(&suggestion)?;
        body_section.append_child(&error)?;

        let footer = make_element(document, "div", FOOTER_CSS)?;
        let accept = make_button(document, ACCEPT_CSS)?;
        accept.set_text_content(Some(ACCEPT_LABEL));
        accept.set_disabled(true);
        footer.append_child(&accept)?;

        panel.append_child(&header)?;
        panel.append_child(&body_section)?;
        panel.append_child(&footer)?;

        body.append_child(&trigger)?;
        body.append_child(&panel)?;

        Ok(Self {
            trigger,
            panel,
            loading,
            suggestion,
            error,
            accept,
            close,
        })
    }

    pub fn trigger(&self) -> &HtmlButtonElement {
        &self.trigger
    }

    pub fn accept_button(&self) -> &HtmlButtonElement {
        &self.accept
    }

    pub fn close_button(&self) -> &HtmlButtonElement {
        &self.close
    }

    pub fn show_trigger(&self, at: PagePoint) {
        self.move_to(&self.trigger, at);
        set_display(&self.trigger, "inline-block");
    }

    pub fn hide_trigger(&self) {
        set_display(&self.trigger, "none");
    }

    pub fn place_panel(&self, at: PagePoint) {
        self.move_to(&self.panel, at);
    }

    /// Applies a panel model to the DOM.
    pub fn render_panel(&self, model: &PanelModel) {
        match model.phase() {
            PanelPhase::Hidden => {
                set_display(&self.panel, "none");
            }
            PanelPhase::Loading => {
                set_display(&self.panel, "block");
                set_display(&self.loading, "block");
                set_display(&self.suggestion, "none");
                set_display(&self.error, "none");
                self.accept.set_disabled(true);
            }
            PanelPhase::ShowingSuggestion(text) => {
                set_display(&self.panel, "block");
                set_display(&self.loading, "none");
                self.suggestion.set_inner_text(text);
                set_display(&self.suggestion, "block");
                set_display(&self.error, "none");
                self.accept.set_disabled(false);
            }
            PanelPhase::ShowingError(message) => {
                set_display(&self.panel, "block");
                set_display(&self.loading, "none");
                set_display(&self.suggestion, "none");
                self.error.set_inner_text(message);
                set_display(&self.error, "block");
                self.accept.set_disabled(true);
            }
        }
    }

    fn move_to(&self, element: &HtmlElement, at: PagePoint) {
        let style = element.style();
        let _ = style.set_property("top", &format!("{}px", at.top));
        let _ = style.set_property("left", &format!("{}px", at.left));
    }
}

fn set_display(element: &HtmlElement, value: &str) {
    let _ = element.style().set_property("display", value);
}

fn make_element(document: &Document, tag: &str, css: &str) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = document.create_element(tag)?.dyn_into()?;
    if !css.is_empty() {
        element.style().set_css_text(css);
    }
    Ok(element)
}

fn make_button(document: &Document, css: &str) -> Result<HtmlButtonElement, JsValue> {
    let button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
    button.set_type("button");
    button.style().set_css_text(css);
    Ok(button)
}
