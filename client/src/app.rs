use leptos::html::Iframe;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use std::cell::RefCell;

use railmap_shared::config::CONFIG_GLOBAL;
use railmap_shared::time::{input_date, input_time};
use railmap_shared::{
    ApiRoutes, AppConfig, BridgeMessage, ConfigError, MapTheme, Selection, Slot, Station,
    TimeMode, Trip,
};

use crate::about::{Overlay, ProjectInfoButton, ProjectInfoModal, topmost_overlay};
use crate::clock::DigitalClock;
use crate::map_frame::MapFrame;
use crate::results::{Results, ResultsPanel, TrainDetails};
use crate::search::SearchPanel;
use crate::{api, bridge, controller};

/// Everything the search page shares. All fields are arena handles, so the
/// struct is `Copy` and handlers capture it by value.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<AppConfig>,
    pub routes: StoredValue<ApiRoutes>,
    pub stations: RwSignal<Vec<Station>>,
    pub selection: RwSignal<Selection>,
    /// Raw input text. Typing edits these without running a search.
    pub from_text: RwSignal<String>,
    pub to_text: RwSignal<String>,
    pub date: RwSignal<String>,
    pub time: RwSignal<String>,
    pub time_mode: RwSignal<TimeMode>,
    pub theme: RwSignal<MapTheme>,
    pub map_src: RwSignal<String>,
    pub results: RwSignal<Results>,
    pub details: RwSignal<Option<Trip>>,
    pub info_open: RwSignal<bool>,
    pub search_nonce: RwSignal<u64>,
    pub highlight_nonce: RwSignal<u64>,
    pub last_highlight: StoredValue<Option<BridgeMessage>>,
    pub frame: NodeRef<Iframe>,
}

impl AppState {
    pub(crate) fn text(self, slot: Slot) -> RwSignal<String> {
        match slot {
            Slot::From => self.from_text,
            Slot::To => self.to_text,
        }
    }

    pub(crate) fn date_past_cutoff(self) -> bool {
        let date = self.date.get();
        self.config
            .with_value(|config| config.input_exceeds_cutoff(&date))
    }
}

struct KeydownBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

fn clear_keydown() {
    KEYDOWN_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            old.window
                .remove_event_listener_with_callback("keydown", old.handler.as_ref().unchecked_ref())
                .ok();
        }
    });
}

/// Escape closes the project info modal, or else the train details panel.
fn install_keydown(info_open: RwSignal<bool>, details: RwSignal<Option<Trip>>) {
    clear_keydown();
    let Some(window) = web_sys::window() else {
        return;
    };
    let handler = Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
        if e.key() != "Escape" {
            return;
        }
        match topmost_overlay(info_open.get_untracked(), details.with_untracked(Option::is_some)) {
            Some(Overlay::ProjectInfo) => info_open.set(false),
            Some(Overlay::Details) => details.set(None),
            None => {}
        }
    });
    if window
        .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        KEYDOWN_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(KeydownBinding { window, handler });
        });
    }
}

/// Read `window.RAILMAP_CONFIG`. Missing means defaults; invalid is logged
/// and also falls back to defaults.
fn load_config() -> AppConfig {
    let Some(window) = web_sys::window() else {
        return AppConfig::default();
    };
    let raw = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str(CONFIG_GLOBAL))
        .unwrap_or(JsValue::UNDEFINED);
    if raw.is_undefined() || raw.is_null() {
        return AppConfig::default();
    }

    let parsed = serde_wasm_bindgen::from_value::<AppConfig>(raw)
        .map_err(|e| ConfigError::Parse(e.to_string()))
        .and_then(AppConfig::validated);
    match parsed {
        Ok(config) => config,
        Err(e) => {
            web_sys::console::warn_1(&format!("config: {e}; using defaults").into());
            AppConfig::default()
        }
    }
}

fn load_stations(state: AppState) {
    let routes = state.routes.get_value();
    spawn_local(async move {
        match api::fetch_stations(&routes).await {
            Ok(stations) => {
                web_sys::console::info_1(&format!("stations: {} loaded", stations.len()).into());
                state.stations.set(stations);
                // The reset highlight lists every station.
                controller::sync_highlight(state);
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("stations: {e}").into());
            }
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let routes = ApiRoutes::new(config.api_base.clone());
    let now = chrono::Local::now();

    let state = AppState {
        config: StoredValue::new(config),
        routes: StoredValue::new(routes),
        stations: RwSignal::new(Vec::new()),
        selection: RwSignal::new(Selection::default()),
        from_text: RwSignal::new(String::new()),
        to_text: RwSignal::new(String::new()),
        date: RwSignal::new(input_date(now.date_naive())),
        time: RwSignal::new(input_time(now.time())),
        time_mode: RwSignal::new(TimeMode::Live),
        theme: RwSignal::new(MapTheme::default()),
        map_src: RwSignal::new(String::new()),
        results: RwSignal::new(Results::Hidden),
        details: RwSignal::new(None),
        info_open: RwSignal::new(false),
        search_nonce: RwSignal::new(0),
        highlight_nonce: RwSignal::new(0),
        last_highlight: StoredValue::new(None),
        frame: NodeRef::new(),
    };
    provide_context(state);

    Effect::new(move || {
        bridge::connect(move |name| controller::pick_from_map(state, name));
        on_cleanup(|| {
            bridge::disconnect();
        });
    });

    Effect::new(move || {
        install_keydown(state.info_open, state.details);
        on_cleanup(clear_keydown);
    });

    // Station list and first map load, once.
    Effect::new(move || {
        load_stations(state);
        controller::refresh(state);
    });

    view! {
        <div class="app">
            <header class="top-bar">
                <span class="brand">"Потяги України"</span>
                <DigitalClock />
                <ProjectInfoButton />
                <button
                    class="theme-toggler"
                    title="Змінити тему"
                    on:click=move |_| controller::toggle_theme(state)
                >
                    {move || match state.theme.get() {
                        MapTheme::Light => "☾",
                        MapTheme::Dark => "☀",
                    }}
                </button>
            </header>
            <SearchPanel />
            <main class="map-area">
                <ResultsPanel />
                <MapFrame />
                <TrainDetails />
            </main>
            <ProjectInfoModal />
        </div>
    }
}
