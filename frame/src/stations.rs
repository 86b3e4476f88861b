use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use railmap_shared::{HighlightState, StationStyle};

use crate::leaflet::{self, CircleMarker, LeafletMap};

/// A station circle drawn by the map page, identified by its tooltip.
pub(crate) struct StationLayer {
    pub name: String,
    pub circle: CircleMarker,
    base_radius: f64,
}

impl StationLayer {
    pub(crate) fn restyle(&self, highlight: &HighlightState) {
        let style = StationStyle::for_role(highlight.role_of(&self.name), self.base_radius);
        self.circle.set_style(&leaflet::options(&[
            ("color", JsValue::from_str(style.color)),
            ("fillColor", JsValue::from_str(style.fill_color)),
            ("weight", JsValue::from_f64(style.weight)),
            ("fillOpacity", JsValue::from_f64(style.fill_opacity)),
            ("opacity", JsValue::from_f64(style.fill_opacity)),
        ]));
        self.circle.set_radius(style.radius);
    }
}

/// Tooltips arrive as markup like `<div>\n Київ\n</div>`; keep the text.
pub(crate) fn tooltip_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Every circle marker on `map` that carries a tooltip. `page` holds the roles
/// the page drew, so focused circles get their unscaled radius back.
pub(crate) fn discover(map: &LeafletMap, page: &HighlightState) -> Vec<StationLayer> {
    let found = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = found.clone();
    let page = page.clone();
    let visit = Closure::<dyn Fn(JsValue)>::new(move |layer: JsValue| {
        let Some(circle) = layer.dyn_ref::<CircleMarker>() else {
            return;
        };
        let Some(tooltip) = circle.get_tooltip() else {
            return;
        };
        let Some(raw) = tooltip.get_content().as_string() else {
            return;
        };
        let name = tooltip_text(&raw);
        if name.is_empty() {
            return;
        }
        let base_radius = page.role_of(&name).base_radius(circle.get_radius());
        sink.borrow_mut().push(StationLayer {
            name,
            circle: circle.clone(),
            base_radius,
        });
    });
    map.each_layer(visit.as_ref().unchecked_ref());
    drop(visit);
    found.take()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_markup_is_stripped() {
        assert_eq!(tooltip_text("<div>\n    Київ-Пасажирський\n</div>"), "Київ-Пасажирський");
        assert_eq!(tooltip_text("Львів"), "Львів");
        assert_eq!(tooltip_text("<b></b>"), "");
    }
}
