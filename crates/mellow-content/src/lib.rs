//! Content-script core: watches the page for editable surfaces, offers the
//! rewrite affordance, and splices accepted rewrites back into the surface.

mod channel;
mod error;

pub mod context;
pub mod rewrite;
pub mod surface;
pub mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement};

use channel::BackgroundChannel;
use mellow_protocol::RewriteRequest;
use rewrite::{BeginOutcome, Resolution, RewriteFlow, Transformer};
use surface::{ActiveSurface, SurfaceTracker};
use ui::position::{self, AnchorRect};
use ui::Affordance;

const EMPTY_DRAFT_PROMPT: &str = "Please enter some text first.";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = tracing_wasm::try_set_as_global_default();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.body().is_some() {
        install(&document)?;
    } else {
        // Injection can land before the parser has produced <body>.
        let deferred = document.clone();
        let on_ready = Closure::<dyn FnMut()>::new(move || {
            if let Err(err) = install(&deferred) {
                tracing::error!("failed to install content core: {err:?}");
            }
        });
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
        on_ready.forget();
    }
    Ok(())
}

struct Runtime {
    affordance: Affordance,
    tracker: RefCell<SurfaceTracker>,
    flow: RefCell<RewriteFlow>,
    transformer: Box<dyn Transformer>,
}

fn install(document: &Document) -> Result<(), JsValue> {
    let runtime = Rc::new(Runtime {
        affordance: Affordance::mount(document)?,
        tracker: RefCell::new(SurfaceTracker::new()),
        flow: RefCell::new(RewriteFlow::new()),
        transformer: Box::new(BackgroundChannel),
    });

    {
        let captured = Rc::clone(&runtime);
        let on_trigger = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            event.stop_propagation();
            trigger_activated(&captured);
        });
        runtime
            .affordance
            .trigger()
            .add_event_listener_with_callback("click", on_trigger.as_ref().unchecked_ref())?;
        // Listeners live for the page lifetime, as does the injected UI.
        on_trigger.forget();
    }

    {
        let captured = Rc::clone(&runtime);
        let on_accept = Closure::<dyn FnMut()>::new(move || captured.accept_suggestion());
        runtime
            .affordance
            .accept_button()
            .add_event_listener_with_callback("click", on_accept.as_ref().unchecked_ref())?;
        on_accept.forget();
    }

    {
        let captured = Rc::clone(&runtime);
        let on_close = Closure::<dyn FnMut()>::new(move || captured.dismiss_panel());
        runtime
            .affordance
            .close_button()
            .add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;
        on_close.forget();
    }

    // Two channels into the same classification: some rich editors do not
    // re-emit focusin when an already-focused region is clicked again.
    for event_name in ["focusin", "click"] {
        let captured = Rc::clone(&runtime);
        let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            captured.handle_surface_event(&event);
        });
        document.add_event_listener_with_callback(event_name, handler.as_ref().unchecked_ref())?;
        handler.forget();
    }

    tracing::info!("mellow content core installed");
    Ok(())
}

impl Runtime {
    /// Funnel for both focus-entering and pointer-press events; idempotent
    /// for repeated events on the same surface.
    fn handle_surface_event(&self, event: &Event) {
        let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
        else {
            return;
        };
        if ui::is_own_ui(&target) {
            return;
        }

        match surface::classify(&target) {
            Some(kind) => {
                let Ok(element) = target.dyn_into::<HtmlElement>() else {
                    return;
                };
                let anchor = anchor_rect(&element);
                let (scroll_x, scroll_y) = scroll_offsets();
                self.tracker
                    .borrow_mut()
                    .set(ActiveSurface::new(element, kind));
                self.affordance
                    .show_trigger(position::trigger_position(&anchor, scroll_x, scroll_y));
            }
            None => {
                self.tracker.borrow_mut().clear();
                self.affordance.hide_trigger();
                self.dismiss_panel();
            }
        }
    }

    fn accept_suggestion(&self) {
        let accepted = self.flow.borrow_mut().accept();
        let Some(text) = accepted else {
            return;
        };
        self.affordance.render_panel(self.flow.borrow().panel());
        let tracker = self.tracker.borrow();
        if let Some(active) = tracker.active() {
            surface::io::write(active, &text);
            active.restore_focus();
        }
    }

    fn dismiss_panel(&self) {
        let mut flow = self.flow.borrow_mut();
        flow.dismiss();
        self.affordance.render_panel(flow.panel());
    }
}

fn trigger_activated(runtime: &Rc<Runtime>) {
    let dispatch = {
        let tracker = runtime.tracker.borrow();
        let Some(active) = tracker.active() else {
            return;
        };
        if !active.is_attached() {
            // The page re-rendered underneath us between focus and trigger.
            return;
        }
        let draft = surface::io::read(active);
        let context = context::extract(active);
        let anchor = anchor_rect(active.element());
        match runtime.flow.borrow_mut().begin(&draft) {
            BeginOutcome::EmptyDraft => None,
            BeginOutcome::Dispatch { generation } => {
                Some((RewriteRequest::new(draft, context), generation, anchor))
            }
        }
    };

    let Some((request, generation, anchor)) = dispatch else {
        prompt_for_draft();
        return;
    };

    let (scroll_x, scroll_y) = scroll_offsets();
    runtime.affordance.place_panel(position::panel_position(
        &anchor,
        scroll_x,
        scroll_y,
        viewport_width(),
    ));
    runtime.affordance.render_panel(runtime.flow.borrow().panel());

    let runtime = Rc::clone(runtime);
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = runtime.transformer.transform(&request).await;
        let mut flow = runtime.flow.borrow_mut();
        if flow.resolve(generation, outcome) == Resolution::Applied {
            runtime.affordance.render_panel(flow.panel());
        }
    });
}

fn anchor_rect(element: &HtmlElement) -> AnchorRect {
    let rect = element.get_bounding_client_rect();
    AnchorRect {
        left: rect.left(),
        right: rect.right(),
        top: rect.top(),
        bottom: rect.bottom(),
    }
}

fn scroll_offsets() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (0.0, 0.0);
    };
    (
        window.scroll_x().unwrap_or(0.0),
        window.scroll_y().unwrap_or(0.0),
    )
}

fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|window| window.inner_width().ok())
        .and_then(|width| width.as_f64())
        .unwrap_or(0.0)
}

fn prompt_for_draft() {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(EMPTY_DRAFT_PROMPT);
    }
}
