//! Frame side of the host bridge: station clicks go up to the parent page,
//! highlight updates come down and restyle the station circles.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::MessageEvent;

use railmap_shared::bridge::HIGHLIGHT_GLOBAL;
use railmap_shared::{BridgeMessage, HighlightInbox, HighlightState};

use crate::stations::StationLayer;

struct FrameBridge {
    _on_message: Closure<dyn Fn(MessageEvent)>,
    on_clicks: Vec<Closure<dyn Fn()>>,
}

/// Highlight bookkeeping plus the circles to paint once the map is found.
#[derive(Default)]
struct FrameView {
    inbox: HighlightInbox,
    stations: Rc<Vec<StationLayer>>,
}

impl FrameView {
    fn paint(stations: &[StationLayer], highlight: Option<&HighlightState>) {
        let Some(highlight) = highlight else {
            return;
        };
        for station in stations {
            station.restyle(highlight);
        }
    }
}

thread_local! {
    static FRAME_BRIDGE: RefCell<Option<FrameBridge>> = const { RefCell::new(None) };
    static FRAME_VIEW: RefCell<FrameView> = RefCell::new(FrameView::default());
}

fn decode(event: &MessageEvent, origin: Option<&str>) -> Option<BridgeMessage> {
    if origin.is_some_and(|origin| origin != event.origin()) {
        return None;
    }
    let data = event.data();
    if let Some(raw) = data.as_string() {
        return BridgeMessage::decode_str(&raw);
    }
    let value: serde_json::Value = serde_wasm_bindgen::from_value(data).ok()?;
    BridgeMessage::decode(value)
}

fn post_to_parent(window: &web_sys::Window, origin: &str, message: &BridgeMessage) {
    let Ok(Some(parent)) = window.parent() else {
        return;
    };
    let Ok(payload) = message.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) else {
        return;
    };
    if let Err(e) = parent.post_message(&payload, origin) {
        web_sys::console::warn_1(&format!("bridge: post {} failed: {e:?}", message.kind()).into());
    }
}

/// The host's last highlight, published on its `window` in case the message
/// went out before this page was listening.
fn published_highlight(window: &web_sys::Window) -> Option<BridgeMessage> {
    let parent = window.parent().ok().flatten()?;
    // Cross-origin parents throw on property access.
    let raw = js_sys::Reflect::get(parent.as_ref(), &JsValue::from_str(HIGHLIGHT_GLOBAL)).ok()?;
    if !raw.is_object() {
        return None;
    }
    let value: serde_json::Value = serde_wasm_bindgen::from_value(raw).ok()?;
    BridgeMessage::decode(value)
}

/// Start taking highlight messages. Runs as soon as the page script loads so
/// nothing sent while the map is still being found is lost. Only the first
/// call per page has an effect.
pub(crate) fn listen(window: &web_sys::Window) {
    if FRAME_BRIDGE.with(|slot| slot.borrow().is_some()) {
        return;
    }
    let origin = window.location().origin().ok();

    let on_message = Closure::<dyn Fn(MessageEvent)>::new(move |event: MessageEvent| {
        let Some(message) = decode(&event, origin.as_deref()) else {
            return;
        };
        match &message {
            BridgeMessage::HighlightStations { .. } => FRAME_VIEW.with(|view| {
                let mut view = view.borrow_mut();
                let stations = view.stations.clone();
                FrameView::paint(&stations, view.inbox.receive(&message));
            }),
            // Clicks only ever travel frame -> host.
            BridgeMessage::StationClicked { .. } => {}
        }
    });
    if window
        .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
        .is_err()
    {
        web_sys::console::warn_1(&"bridge: failed to register message listener".into());
    }

    FRAME_BRIDGE.with(|slot| {
        *slot.borrow_mut() = Some(FrameBridge {
            _on_message: on_message,
            on_clicks: Vec::new(),
        });
    });
}

/// Wire click handlers on `stations` and paint whatever highlight is already
/// known. Only the first call per page has an effect.
pub(crate) fn attach(window: &web_sys::Window, stations: Rc<Vec<StationLayer>>) {
    listen(window);
    let already = FRAME_BRIDGE.with(|slot| {
        slot.borrow()
            .as_ref()
            .is_some_and(|bridge| !bridge.on_clicks.is_empty())
    });
    if already {
        return;
    }
    let target_origin = window
        .location()
        .origin()
        .unwrap_or_else(|_| "*".to_string());

    let on_clicks = stations
        .iter()
        .map(|station| {
            let window = window.clone();
            let target_origin = target_origin.clone();
            let message = BridgeMessage::station_clicked(station.name.clone());
            let handler = Closure::<dyn Fn()>::new(move || {
                post_to_parent(&window, &target_origin, &message);
            });
            station.circle.on("click", handler.as_ref().unchecked_ref());
            handler
        })
        .collect::<Vec<_>>();
    FRAME_BRIDGE.with(|slot| {
        if let Some(bridge) = slot.borrow_mut().as_mut() {
            bridge.on_clicks = on_clicks;
        }
    });

    let published = published_highlight(window);
    FRAME_VIEW.with(|view| {
        let mut view = view.borrow_mut();
        view.stations = stations.clone();
        FrameView::paint(&stations, view.inbox.attach(published.as_ref()));
    });
}
