//! Bindings for the slice of Leaflet (`window.L`) the map frame touches.
//! The map itself is created by the server-rendered page.

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = L, js_name = Map)]
    #[derive(Clone, Debug)]
    pub type LeafletMap;

    #[wasm_bindgen(method, js_name = removeLayer)]
    pub fn remove_layer(this: &LeafletMap, layer: &Layer) -> LeafletMap;

    #[wasm_bindgen(method, js_name = eachLayer)]
    pub fn each_layer(this: &LeafletMap, f: &Function) -> LeafletMap;

    #[wasm_bindgen(method, js_name = on)]
    pub fn on(this: &LeafletMap, event: &str, f: &Function) -> LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = Layer)]
    #[derive(Clone, Debug)]
    pub type Layer;

    #[wasm_bindgen(method, js_name = getTooltip)]
    pub fn get_tooltip(this: &Layer) -> Option<Tooltip>;

    #[wasm_bindgen(method, js_name = on)]
    pub fn on(this: &Layer, event: &str, f: &Function) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = Marker, extends = Layer)]
    #[derive(Clone, Debug)]
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker, catch)]
    pub fn marker(lat_lng: &Array, options: &JsValue) -> Result<Marker, JsValue>;

    #[wasm_bindgen(method, js_name = setLatLng, catch)]
    pub fn set_lat_lng(this: &Marker, lat_lng: &Array) -> Result<Marker, JsValue>;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &Marker, content: &str) -> Marker;

    #[wasm_bindgen(method, js_name = getPopup)]
    pub fn get_popup(this: &Marker) -> Option<Popup>;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Marker, map: &LeafletMap) -> Marker;

    #[wasm_bindgen(js_namespace = L, js_name = Popup)]
    #[derive(Clone, Debug)]
    pub type Popup;

    #[wasm_bindgen(method, js_name = setContent)]
    pub fn set_content(this: &Popup, content: &str) -> Popup;

    #[wasm_bindgen(js_namespace = L, js_name = CircleMarker, extends = Layer)]
    #[derive(Clone, Debug)]
    pub type CircleMarker;

    #[wasm_bindgen(method, js_name = setStyle)]
    pub fn set_style(this: &CircleMarker, style: &JsValue) -> CircleMarker;

    #[wasm_bindgen(method, js_name = setRadius)]
    pub fn set_radius(this: &CircleMarker, radius: f64) -> CircleMarker;

    #[wasm_bindgen(method, js_name = getRadius)]
    pub fn get_radius(this: &CircleMarker) -> f64;

    #[wasm_bindgen(js_namespace = L, js_name = Tooltip)]
    #[derive(Clone, Debug)]
    pub type Tooltip;

    #[wasm_bindgen(method, js_name = getContent)]
    pub fn get_content(this: &Tooltip) -> JsValue;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    pub fn div_icon(options: &JsValue) -> JsValue;
}

pub fn lat_lng(lat: f64, lon: f64) -> Array {
    Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lon))
}

/// Pixel `[x, y]` for icon sizes and anchors.
pub fn point(x: f64, y: f64) -> Array {
    Array::of2(&JsValue::from_f64(x), &JsValue::from_f64(y))
}

/// Plain `{key: value}` options object.
pub fn options(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value).ok();
    }
    obj.into()
}

/// The page's map is a global with a generated name; scan `window` for it.
pub fn find_map(window: &web_sys::Window) -> Option<LeafletMap> {
    let keys = Object::keys(window.as_ref());
    keys.iter().find_map(|key| {
        let value = Reflect::get(window.as_ref(), &key).ok()?;
        if !value.is_object() {
            return None;
        }
        if value.has_type::<LeafletMap>() {
            return Some(value.unchecked_into());
        }
        // Maps from a second copy of Leaflet fail `instanceof`; the pane table still marks them.
        Reflect::has(&value, &JsValue::from_str("_panes"))
            .unwrap_or(false)
            .then(|| value.unchecked_into())
    })
}
