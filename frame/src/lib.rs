//! Script for the server-rendered Leaflet map page. The page calls
//! `initTrainMap()` once; the frame then keeps train markers live and talks
//! to the host page over `postMessage`.

mod bridge;
mod leaflet;
mod poller;
mod stations;
mod surface;
mod transitions;

use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use railmap_shared::config::CONFIG_GLOBAL;
use railmap_shared::{ApiRoutes, AppConfig, ConfigError, HighlightState, ViewingContext};

use crate::leaflet::LeafletMap;
use crate::stations::StationLayer;
use crate::surface::LeafletSurface;

/// Tries at the poll interval before giving up on finding the page's map.
const MAP_LOOKUP_ATTEMPTS: u32 = 20;

/// Optional argument of `initTrainMap`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FrameInit {
    from_station: Option<String>,
    to_station: Option<String>,
    fallback_time: Option<String>,
}

impl FrameInit {
    fn viewing(&self) -> ViewingContext {
        let from = self.from_station.as_deref();
        let to = self.to_station.as_deref();
        match self.fallback_time.as_deref() {
            Some(time) => ViewingContext::pinned(from, to, time),
            None => ViewingContext::live(from, to),
        }
    }
}

/// Handles assembled once the page's map exists.
struct ViewBindings {
    map: LeafletMap,
    stations: Rc<Vec<StationLayer>>,
}

impl ViewBindings {
    /// `page` is the route the map page was rendered for.
    fn assemble(map: LeafletMap, page: &ViewingContext) -> Self {
        let stations = Rc::new(stations::discover(&map, &HighlightState::drawn_by_page(page)));
        Self { map, stations }
    }
}

fn read_config(target: &JsValue) -> Option<Result<AppConfig, ConfigError>> {
    let raw = js_sys::Reflect::get(target, &JsValue::from_str(CONFIG_GLOBAL)).ok()?;
    if raw.is_undefined() || raw.is_null() {
        return None;
    }
    Some(
        serde_wasm_bindgen::from_value::<AppConfig>(raw)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .and_then(AppConfig::validated),
    )
}

/// The host page's config wins over one injected into the map page.
fn load_config(window: &web_sys::Window) -> AppConfig {
    let parent = window.parent().ok().flatten();
    let found = parent
        .as_ref()
        .and_then(|parent| read_config(parent.as_ref()))
        .or_else(|| read_config(window.as_ref()));
    match found {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            web_sys::console::warn_1(&format!("config: {e}; using defaults").into());
            AppConfig::default()
        }
        None => AppConfig::default(),
    }
}

async fn boot(window: web_sys::Window, config: AppConfig, fallback: ViewingContext) {
    TimeoutFuture::new(config.poll.initial_delay_ms).await;

    let mut attempts = 0;
    let map = loop {
        if let Some(map) = leaflet::find_map(&window) {
            break map;
        }
        attempts += 1;
        if attempts >= MAP_LOOKUP_ATTEMPTS {
            web_sys::console::warn_1(&"train map: no Leaflet map on the page".into());
            return;
        }
        TimeoutFuture::new(config.poll.interval_ms).await;
    };

    let bindings = ViewBindings::assemble(map, &fallback);
    web_sys::console::info_1(
        &format!("train map: stations={}", bindings.stations.len()).into(),
    );
    bridge::attach(&window, bindings.stations.clone());
    transitions::install(&bindings.map);
    poller::start(
        LeafletSurface::new(bindings.map),
        config.poll,
        ApiRoutes::new(config.api_base),
        fallback,
    );
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Entry point for the map page. `init` is `{fromStation, toStation, fallbackTime}`
/// or absent, in which case the page's own query string is used.
#[wasm_bindgen(js_name = initTrainMap)]
pub fn init_train_map(init: JsValue) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let init = if init.is_undefined() || init.is_null() {
        None
    } else {
        serde_wasm_bindgen::from_value::<FrameInit>(init)
            .map_err(|e| web_sys::console::warn_1(&format!("train map init: {e}").into()))
            .ok()
    };
    let fallback = match init {
        Some(init) => init.viewing(),
        None => ViewingContext::from_query(&window.location().search().unwrap_or_default()),
    };
    bridge::listen(&window);
    let config = load_config(&window);
    spawn_local(boot(window, config, fallback));
}

#[wasm_bindgen(js_name = stopTrainMap)]
pub fn stop_train_map() {
    poller::stop();
}
