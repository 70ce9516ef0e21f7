//! DOM listeners that feed engagement measurements into the shared bridge.
//!
//! Each listener removes itself from the page when dropped.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, Window};

use crate::analytics::engagement::{is_outbound_link, now_millis, ScrollDepthTracker, Throttle};
use crate::analytics::tracker::{track_outbound_link, track_scroll_depth};

struct ListenerHandle {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl ListenerHandle {
    fn attach(
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Option<Self> {
        if let Err(err) =
            target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        {
            log_js_error("addEventListener", err);
            return None;
        }
        Some(Self {
            target,
            event,
            callback,
        })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            log_js_error("removeEventListener", err);
        }
    }
}

/// Reports the 25/50/75/100 % scroll milestones of the current page, throttled.
pub struct ScrollDepthListener {
    _handle: ListenerHandle,
}

impl ScrollDepthListener {
    /// Attaches to `window` and immediately reports the milestones already visible.
    pub fn attach(route: impl Into<String>) -> Option<Self> {
        let window = web_sys::window()?;
        let route = route.into();
        let depth = Rc::new(RefCell::new(ScrollDepthTracker::new()));

        let report = move |window: &Window| {
            let Some((scroll_top, viewport_height, document_height)) = scroll_metrics(window) else {
                return;
            };
            let crossed = depth
                .borrow_mut()
                .observe(scroll_top, viewport_height, document_height);
            for milestone in crossed {
                track_scroll_depth(&route, milestone);
            }
        };
        report(&window);

        let mut throttle = Throttle::default();
        let listener_window = window.clone();
        let callback = Closure::wrap(Box::new(move |_event: Event| {
            if throttle.ready(now_millis()) {
                report(&listener_window);
            }
        }) as Box<dyn FnMut(Event)>);

        let handle = ListenerHandle::attach(window.into(), "scroll", callback)?;
        Some(Self { _handle: handle })
    }
}

/// Reports clicks on links inside a container that leave the site.
pub struct OutboundLinkListener {
    _handle: ListenerHandle,
}

impl OutboundLinkListener {
    pub fn attach(container_id: &str, post_id: Option<String>) -> Option<Self> {
        let window = web_sys::window()?;
        let container = window.document()?.get_element_by_id(container_id)?;
        let location = window.location();

        let callback = Closure::wrap(Box::new(move |event: Event| {
            let Some(anchor) = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|element| element.closest("a").ok().flatten())
            else {
                return;
            };
            let Some(href) = anchor.get_attribute("href") else {
                return;
            };
            let origin = location.origin().unwrap_or_default();
            if is_outbound_link(&href, &origin) {
                let referer = location.href().unwrap_or_default();
                track_outbound_link(&href, &referer, post_id.as_deref());
            }
        }) as Box<dyn FnMut(Event)>);

        let handle = ListenerHandle::attach(container.into(), "click", callback)?;
        Some(Self { _handle: handle })
    }
}

fn scroll_metrics(window: &Window) -> Option<(f64, f64, f64)> {
    let document = window.document()?;
    let scroll_top = window.scroll_y().unwrap_or(0.0);
    let viewport_height = window.inner_height().ok()?.as_f64().unwrap_or(0.0);
    let document_height = document
        .body()
        .map(|body| body.scroll_height())
        .or_else(|| document.document_element().map(|element| element.scroll_height()))?;
    Some((scroll_top, viewport_height, f64::from(document_height)))
}

fn log_js_error(context: &str, err: JsValue) {
    web_sys::console::error_2(&JsValue::from_str(context), &err);
}
