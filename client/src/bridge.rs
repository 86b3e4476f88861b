//! Host side of the map-frame message bridge.

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlIFrameElement, MessageEvent};

use railmap_shared::bridge::HIGHLIGHT_GLOBAL;
use railmap_shared::viewing::VIEWING_GLOBAL;
use railmap_shared::{BridgeMessage, ViewingContext};

struct HostBridge {
    window: web_sys::Window,
    handler: Closure<dyn Fn(MessageEvent)>,
}

impl HostBridge {
    fn close(self) {
        self.window
            .remove_event_listener_with_callback("message", self.handler.as_ref().unchecked_ref())
            .ok();
    }
}

thread_local! {
    static HOST_BRIDGE: RefCell<Option<HostBridge>> = const { RefCell::new(None) };
}

fn own_origin(window: &web_sys::Window) -> Option<String> {
    window.location().origin().ok()
}

/// Decode a bridge message, dropping cross-origin and foreign payloads.
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

fn to_js<T: Serialize>(value: &T) -> Option<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .ok()
}

/// Listen for station clicks coming from the map frame.
pub(crate) fn connect(on_station_clicked: impl Fn(String) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let origin = own_origin(&window);

    let handler = Closure::<dyn Fn(MessageEvent)>::new(move |event: MessageEvent| {
        let Some(message) = decode(&event, origin.as_deref()) else {
            return;
        };
        match message {
            BridgeMessage::StationClicked { name } => on_station_clicked(name),
            // Highlights only ever travel host -> frame.
            BridgeMessage::HighlightStations { .. } => {}
        }
    });
    if window
        .add_event_listener_with_callback("message", handler.as_ref().unchecked_ref())
        .is_err()
    {
        web_sys::console::warn_1(&"bridge: failed to register message listener".into());
        return;
    }

    HOST_BRIDGE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(old) = slot.take() {
            old.close();
        }
        *slot = Some(HostBridge { window, handler });
    });
}

pub(crate) fn disconnect() {
    HOST_BRIDGE.with(|slot| {
        if let Some(bridge) = slot.borrow_mut().take() {
            bridge.close();
        }
    });
}

/// Post `message` into the map frame. Fire-and-forget.
pub(crate) fn send(frame: &HtmlIFrameElement, message: &BridgeMessage) {
    let Some(target) = frame.content_window() else {
        return;
    };
    let Some(payload) = to_js(message) else {
        return;
    };
    let origin = web_sys::window()
        .as_ref()
        .and_then(own_origin)
        .unwrap_or_else(|| "*".to_string());
    if let Err(e) = target.post_message(&payload, &origin) {
        web_sys::console::warn_1(
            &format!("bridge: post {} failed: {e:?}", message.kind()).into(),
        );
    }
}

fn publish<T: Serialize>(key: &str, value: &T) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(value) = to_js(value) else {
        return;
    };
    js_sys::Reflect::set(window.as_ref(), &JsValue::from_str(key), &value).ok();
}

/// Expose the current viewing context for the map frame's poller.
pub(crate) fn publish_viewing(context: &ViewingContext) {
    publish(VIEWING_GLOBAL, context);
}

/// Expose the last highlight so a frame that starts late can pick it up.
pub(crate) fn publish_highlight(message: &BridgeMessage) {
    publish(HIGHLIGHT_GLOBAL, message);
}
