//! Browser event wiring
//!
//! Listeners translate DOM events into [`PageEvent`]s for one shared
//! [`Site`]. Frames are requested on demand and keep running while the site
//! has work pending.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use pagefx_core::dom::Point;
use pagefx_core::{ElementId, EventOutcome, PageEvent, Site};
use tracing::{debug, error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, ErrorEvent, Event, EventTarget, KeyboardEvent,
    MouseEvent, TouchEvent, Window,
};

use crate::dom_page::DomPage;
use crate::markup::{config_from_markup, CONFIG_ELEMENT_ID};

type SharedSite = Rc<RefCell<Site<DomPage>>>;

struct Host {
    window: Window,
    site: SharedSite,
    frame_requested: Cell<bool>,
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Host {
    fn now(&self) -> Duration {
        let ms = self
            .window
            .performance()
            .map(|p| p.now())
            .unwrap_or_default();
        pagefx_core::scroll::timing::timestamp_from_millis(ms)
    }

    fn intern(&self, element: Element) -> Option<ElementId> {
        self.site
            .try_borrow()
            .ok()
            .map(|site| site.page().intern(element))
    }

    /// Dispatch one event stamped with `performance.now()`
    fn dispatch(self: &Rc<Self>, event: PageEvent) -> EventOutcome {
        self.dispatch_at(self.now(), event)
    }

    /// Dispatch one event at `now`; re-entrant calls are dropped
    fn dispatch_at(self: &Rc<Self>, now: Duration, event: PageEvent) -> EventOutcome {
        let outcome = match self.site.try_borrow_mut() {
            Ok(mut site) => site.handle_at(now, event),
            Err(_) => {
                debug!("Event dropped during dispatch");
                EventOutcome::default()
            }
        };
        self.request_frame();
        outcome
    }

    fn request_frame(self: &Rc<Self>) {
        let needed = self
            .site
            .try_borrow()
            .map(|site| site.needs_frame())
            .unwrap_or(true);
        if !needed || self.frame_requested.get() {
            return;
        }

        let slot = self.frame_callback.borrow();
        let Some(callback) = slot.as_ref() else {
            return;
        };
        match self.window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(_) => self.frame_requested.set(true),
            Err(e) => warn!(error = ?e, "requestAnimationFrame failed"),
        }
    }

    fn install_frame_loop(self: &Rc<Self>) {
        let host = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let Some(host) = host.upgrade() else {
                return;
            };
            host.frame_requested.set(false);
            let timestamp = pagefx_core::scroll::timing::timestamp_from_millis(timestamp);
            let _ = host.dispatch_at(timestamp, PageEvent::Frame { timestamp });
        });
        *self.frame_callback.borrow_mut() = Some(callback);
    }
}

fn element_target(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn listen<E, F>(target: &EventTarget, kind: &str, passive: bool, capture: bool, handler: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    options.set_capture(capture);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    // Listeners live as long as the page
    closure.forget();
    Ok(())
}

fn wire(host: &Rc<Host>, document: &Document) -> Result<(), JsValue> {
    let window: &EventTarget = host.window.as_ref();
    let doc: &EventTarget = document.as_ref();

    let h = host.clone();
    listen(window, "scroll", true, false, move |_: Event| {
        let timestamp = h.now();
        let _ = h.dispatch_at(timestamp, PageEvent::Scroll { timestamp });
    })?;

    let h = host.clone();
    listen(doc, "click", false, false, move |e: MouseEvent| {
        let Some(target) = element_target(&e).and_then(|t| h.intern(t)) else {
            return;
        };
        let pointer = Some(Point::new(f64::from(e.client_x()), f64::from(e.client_y())));
        if h.dispatch(PageEvent::Click { target, pointer }).prevent_default {
            e.prevent_default();
        }
    })?;

    let h = host.clone();
    listen(doc, "keydown", false, false, move |e: KeyboardEvent| {
        let key = e.key();
        let event = PageEvent::KeyDown {
            key: key.as_str().into(),
            shift: e.shift_key(),
        };
        if h.dispatch(event).prevent_default {
            e.prevent_default();
        }
    })?;

    for kind in ["touchstart", "touchmove", "touchend"] {
        let h = host.clone();
        listen(doc, kind, true, false, move |e: TouchEvent| {
            let Some(target) = element_target(&e).and_then(|t| h.intern(t)) else {
                return;
            };
            let y = e.touches().get(0).map(|t| f64::from(t.client_y()));
            let event = match (kind, y) {
                ("touchstart", Some(y)) => PageEvent::TouchStart { target, y },
                ("touchmove", Some(y)) => PageEvent::TouchMove { target, y },
                ("touchend", _) => PageEvent::TouchEnd { target },
                _ => return,
            };
            let _ = h.dispatch(event);
        })?;
    }

    for (kind, entering) in [("mouseenter", true), ("mouseleave", false)] {
        let h = host.clone();
        // Non-bubbling: observed in the capture phase
        listen(doc, kind, true, true, move |e: MouseEvent| {
            let Some(target) = element_target(&e).and_then(|t| h.intern(t)) else {
                return;
            };
            let event = if entering {
                PageEvent::PointerEnter(target)
            } else {
                PageEvent::PointerLeave(target)
            };
            let _ = h.dispatch(event);
        })?;
    }

    let h = host.clone();
    listen(doc, "submit", false, false, move |e: Event| {
        let Some(form) = element_target(&e).and_then(|t| h.intern(t)) else {
            return;
        };
        if h.dispatch(PageEvent::Submit(form)).prevent_default {
            e.prevent_default();
        }
    })?;

    let h = host.clone();
    listen(window, "load", false, false, move |_: Event| {
        let load_time_ms = h.now().as_secs_f64() * 1000.0;
        let _ = h.dispatch(PageEvent::Load { load_time_ms });
    })?;

    let h = host.clone();
    listen(window, "error", false, false, move |e: ErrorEvent| {
        let _ = h.dispatch(PageEvent::Error { message: e.message() });
    })?;

    Ok(())
}

/// Mount the engine on the current document
pub fn mount() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let markup = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|e| e.text_content());
    let config = match config_from_markup(markup.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid page configuration, using defaults: {}", e);
            Default::default()
        }
    };

    let page = DomPage::new(window.clone(), document.clone());
    let site = Rc::new(RefCell::new(Site::mount(page, config)));
    let host = Rc::new(Host {
        window,
        site,
        frame_requested: Cell::new(false),
        frame_callback: RefCell::new(None),
    });

    host.install_frame_loop();
    wire(&host, &document)?;
    host.request_frame();

    info!("pagefx mounted");
    Ok(())
}
