//! Train markers glide between polls via a CSS transition. Leaflet rewrites
//! marker transforms while zooming, so the glide is paused for the zoom.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use railmap_shared::config::ZOOM_TRANSITION_RESUME_MS;

use crate::leaflet::LeafletMap;

const MARKER_SELECTOR: &str = ".train-marker";
const GLIDE: &str = "transform 2.5s linear, opacity 0.5s ease";

struct ZoomBinding {
    _on_start: Closure<dyn Fn()>,
    _on_end: Closure<dyn Fn()>,
}

thread_local! {
    static ZOOM_BINDING: RefCell<Option<ZoomBinding>> = const { RefCell::new(None) };
    static PENDING_RESUME: RefCell<Option<Timeout>> = const { RefCell::new(None) };
}

fn set_transition(value: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(nodes) = document.query_selector_all(MARKER_SELECTOR) else {
        return;
    };
    for idx in 0..nodes.length() {
        let Some(el) = nodes.item(idx).and_then(|n| n.dyn_into::<web_sys::HtmlElement>().ok()) else {
            continue;
        };
        el.style()
            .set_property_with_priority("transition", value, "important")
            .ok();
    }
}

/// Idempotent: Leaflet keeps the first pair of listeners alive for the page.
pub(crate) fn install(map: &LeafletMap) {
    if ZOOM_BINDING.with(|slot| slot.borrow().is_some()) {
        return;
    }
    let on_start = Closure::<dyn Fn()>::new(|| {
        // A zoom that starts before the previous resume fired keeps markers frozen.
        PENDING_RESUME.with(|slot| {
            if let Some(pending) = slot.borrow_mut().take() {
                pending.cancel();
            }
        });
        set_transition("none");
    });
    let on_end = Closure::<dyn Fn()>::new(|| {
        let resume = Timeout::new(ZOOM_TRANSITION_RESUME_MS, || set_transition(GLIDE));
        PENDING_RESUME.with(|slot| {
            if let Some(old) = slot.borrow_mut().replace(resume) {
                old.cancel();
            }
        });
    });
    map.on("zoomstart", on_start.as_ref().unchecked_ref());
    map.on("zoomend", on_end.as_ref().unchecked_ref());

    ZOOM_BINDING.with(|slot| {
        *slot.borrow_mut() = Some(ZoomBinding {
            _on_start: on_start,
            _on_end: on_end,
        });
    });
}
