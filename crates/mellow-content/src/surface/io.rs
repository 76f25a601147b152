//! Reads and writes surface text so that the host page's own framework
//! observes the change as a genuine user edit.
//!
//! Both write paths deliberately avoid plain DOM assignment: reactive
//! frameworks intercept the element's own `value` property and rich editors
//! keep their own text model, so a raw assignment leaves framework state
//! stale behind a screen that already shows the new text. This dependency on
//! host-framework conventions is a known compatibility risk and is contained
//! entirely in this module.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventInit, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

use crate::surface::{ActiveSurface, SurfaceKind};

/// Current text of the surface. Detached surfaces read as empty.
pub fn read(surface: &ActiveSurface) -> String {
    if !surface.is_attached() {
        return String::new();
    }
    match surface.kind() {
        SurfaceKind::RichEditableRegion => surface.element().inner_text(),
        SurfaceKind::PlainField => {
            let element = surface.element();
            if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
                area.value()
            } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                input.value()
            } else {
                String::new()
            }
        }
    }
}

/// Replaces the surface's entire text. A surface detached since capture is a
/// silent no-op: that is a benign page mutation, not a failure.
pub fn write(surface: &ActiveSurface, text: &str) {
    if !surface.is_attached() {
        tracing::debug!("skipped write to detached surface");
        return;
    }
    let result = match surface.kind() {
        SurfaceKind::PlainField => write_plain(surface.element(), text),
        SurfaceKind::RichEditableRegion => write_rich(surface.element(), text),
    };
    if let Err(err) = result {
        tracing::warn!("surface write failed: {err:?}");
    }
}

fn write_plain(element: &HtmlElement, text: &str) -> Result<(), JsValue> {
    // Frameworks patch `value` on the instance; the prototype setter is the
    // original, un-intercepted pathway.
    let setter = native_value_setter(value_setter_owner(&element.tag_name()))?;
    let this: &JsValue = element.as_ref();
    setter.call1(this, &JsValue::from_str(text))?;
    dispatch_bubbling(element, "input")?;
    dispatch_bubbling(element, "change")?;
    Ok(())
}

fn write_rich(element: &HtmlElement, text: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    element.focus()?;
    let selection = window
        .get_selection()?
        .ok_or_else(|| JsValue::from_str("selection unavailable"))?;
    let range = document.create_range()?;
    range.select_node_contents(element)?;
    selection.remove_all_ranges()?;
    selection.add_range(&range)?;

    // insertText replaces the selection through the browser's editing
    // pipeline, which emits the input notifications framework editors
    // subscribe to; a direct innerText assignment would not.
    let html_document = document.unchecked_ref::<web_sys::HtmlDocument>();
    html_document.exec_command_with_show_ui_and_value("insertText", false, text)?;
    Ok(())
}

fn value_setter_owner(tag: &str) -> &'static str {
    if tag.eq_ignore_ascii_case("textarea") {
        "HTMLTextAreaElement"
    } else {
        "HTMLInputElement"
    }
}

fn native_value_setter(constructor: &str) -> Result<Function, JsValue> {
    let global = js_sys::global();
    let ctor = Reflect::get(&global, &JsValue::from_str(constructor))?;
    let prototype: Object = Reflect::get(&ctor, &JsValue::from_str("prototype"))?.dyn_into()?;
    let descriptor = Object::get_own_property_descriptor(&prototype, &JsValue::from_str("value"));
    Reflect::get(&descriptor, &JsValue::from_str("set"))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str("value property has no native setter"))
}

fn dispatch_bubbling(element: &HtmlElement, event_name: &str) -> Result<(), JsValue> {
    let init = EventInit::new();
    init.set_bubbles(true);
    let event = Event::new_with_event_init_dict(event_name, &init)?;
    element.dispatch_event(&event)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_setter_owner_matches_element_tag() {
        assert_eq!(value_setter_owner("TEXTAREA"), "HTMLTextAreaElement");
        assert_eq!(value_setter_owner("textarea"), "HTMLTextAreaElement");
        assert_eq!(value_setter_owner("INPUT"), "HTMLInputElement");
    }
}
