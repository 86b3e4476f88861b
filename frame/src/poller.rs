//! Live train positions: fetch a snapshot every interval and reconcile the
//! map's train markers against it.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

use railmap_shared::live::parse_snapshot;
use railmap_shared::viewing::VIEWING_GLOBAL;
use railmap_shared::{
    ApiRoutes, FetchError, LiveSnapshot, MarkerSet, PollConfig, PollState, TickOutcome,
    ViewingContext, apply_tick,
};

use crate::leaflet::Marker;
use crate::surface::LeafletSurface;

struct LivePoller {
    state: PollState,
    config: PollConfig,
    routes: ApiRoutes,
    /// Used when the parent page does not publish a viewing context.
    fallback: ViewingContext,
    surface: LeafletSurface,
    markers: MarkerSet<Marker>,
}

thread_local! {
    static LIVE_POLLER: RefCell<Option<Rc<RefCell<LivePoller>>>> = const { RefCell::new(None) };
}

async fn fetch_snapshot(url: &str) -> Result<LiveSnapshot, FetchError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    parse_snapshot(&body).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// The host page's current from/to/time, read fresh on every tick.
fn current_viewing(fallback: &ViewingContext) -> ViewingContext {
    let Some(window) = web_sys::window() else {
        return fallback.clone();
    };
    let Ok(Some(parent)) = window.parent() else {
        return fallback.clone();
    };
    // Cross-origin parents throw on property access.
    let Ok(published) = js_sys::Reflect::get(parent.as_ref(), &JsValue::from_str(VIEWING_GLOBAL)) else {
        return fallback.clone();
    };
    if !published.is_object() {
        return fallback.clone();
    }
    serde_wasm_bindgen::from_value(published).unwrap_or_else(|_| fallback.clone())
}

async fn tick(poller: &Rc<RefCell<LivePoller>>) {
    let (ticket, url) = {
        let mut p = poller.borrow_mut();
        let Some(ticket) = p.state.begin_tick() else {
            return;
        };
        let context = current_viewing(&p.fallback);
        let url = p.routes.train_positions(&context);
        (ticket, url)
    };

    let result = fetch_snapshot(&url).await;

    let mut guard = poller.borrow_mut();
    let p = &mut *guard;
    match apply_tick(&mut p.state, &mut p.markers, &mut p.surface, ticket, result) {
        TickOutcome::Applied(report) => {
            for failure in &report.failures {
                web_sys::console::warn_1(&format!("train {}: {}", failure.key, failure.error).into());
            }
        }
        TickOutcome::Failed(e) => {
            web_sys::console::warn_1(
                &format!(
                    "train positions: {e} (failures={})",
                    p.state.consecutive_failures()
                )
                .into(),
            );
        }
        TickOutcome::Discarded => {}
    }
}

async fn run(poller: Rc<RefCell<LivePoller>>) {
    loop {
        if poller.borrow().state.is_stopped() {
            break;
        }
        tick(&poller).await;

        let delay_ms = {
            let p = poller.borrow();
            if p.state.is_stopped() {
                break;
            }
            p.state.next_delay_ms(&p.config)
        };
        TimeoutFuture::new(delay_ms).await;
    }
}

/// Stop `poller` and take its train markers off the map.
fn retire(poller: &Rc<RefCell<LivePoller>>) {
    let mut guard = poller.borrow_mut();
    let p = &mut *guard;
    p.state.stop();
    let removed = p.markers.clear(&mut p.surface);
    if removed > 0 {
        web_sys::console::info_1(&format!("train map: removed {removed} markers").into());
    }
}

/// Start polling right away, replacing any running poller.
pub(crate) fn start(
    surface: LeafletSurface,
    config: PollConfig,
    routes: ApiRoutes,
    fallback: ViewingContext,
) {
    let poller = Rc::new(RefCell::new(LivePoller {
        state: PollState::new(),
        config,
        routes,
        fallback,
        surface,
        markers: MarkerSet::new(),
    }));

    let previous = LIVE_POLLER.with(|slot| slot.borrow_mut().replace(poller.clone()));
    if let Some(previous) = previous {
        retire(&previous);
    }
    spawn_local(run(poller));
}

/// Stop the running poller. A fetch already in flight is discarded on arrival.
pub(crate) fn stop() {
    let current = LIVE_POLLER.with(|slot| slot.borrow_mut().take());
    if let Some(current) = current {
        current.borrow_mut().state.stop();
    }
}
