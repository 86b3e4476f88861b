use wasm_bindgen::JsValue;

use railmap_shared::{MarkerSurface, SurfaceError, TrainPosition};

use crate::leaflet::{self, LeafletMap, Marker};

pub(crate) const TRAIN_ICON_CLASS: &str = "leaflet-marker-icon train-marker";
const TRAIN_ICON_HTML: &str = r#"<div style="color:red;font-size:20px;text-shadow:1px 1px 2px white;"><i class="fa fa-train"></i></div>"#;
const TRAIN_ICON_SIZE: f64 = 24.0;

fn rejected(err: JsValue) -> SurfaceError {
    SurfaceError::Rejected(format!("{err:?}"))
}

fn checked(entity: &TrainPosition) -> Result<js_sys::Array, SurfaceError> {
    if !entity.has_valid_position() {
        return Err(SurfaceError::invalid_position(entity));
    }
    Ok(leaflet::lat_lng(entity.lat, entity.lon))
}

/// Train markers drawn straight onto the page's Leaflet map.
pub(crate) struct LeafletSurface {
    map: LeafletMap,
    icon: JsValue,
}

impl LeafletSurface {
    pub(crate) fn new(map: LeafletMap) -> Self {
        let half = TRAIN_ICON_SIZE / 2.0;
        let icon = leaflet::div_icon(&leaflet::options(&[
            ("html", JsValue::from_str(TRAIN_ICON_HTML)),
            ("className", JsValue::from_str(TRAIN_ICON_CLASS)),
            ("iconSize", leaflet::point(TRAIN_ICON_SIZE, TRAIN_ICON_SIZE).into()),
            ("iconAnchor", leaflet::point(half, half).into()),
        ]));
        Self { map, icon }
    }
}

impl MarkerSurface for LeafletSurface {
    type Marker = Marker;

    fn create_marker(&mut self, entity: &TrainPosition) -> Result<Marker, SurfaceError> {
        let position = checked(entity)?;
        let marker = leaflet::marker(&position, &leaflet::options(&[("icon", self.icon.clone())]))
            .map_err(rejected)?;
        marker.bind_popup(&entity.popup_html());
        marker.add_to(&self.map);
        Ok(marker)
    }

    fn update_marker(&mut self, marker: &mut Marker, entity: &TrainPosition) -> Result<(), SurfaceError> {
        let position = checked(entity)?;
        marker.set_lat_lng(&position).map_err(rejected)?;
        match marker.get_popup() {
            Some(popup) => {
                popup.set_content(&entity.popup_html());
            }
            None => {
                marker.bind_popup(&entity.popup_html());
            }
        }
        Ok(())
    }

    fn destroy_marker(&mut self, marker: Marker) {
        self.map.remove_layer(&marker);
    }
}
