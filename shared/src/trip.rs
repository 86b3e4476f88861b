use serde::{Deserialize, Serialize};

use crate::de;
use crate::time::first_time;

pub const DEFAULT_TRAIN_LABEL: &str = "Поїзд";
pub const DEFAULT_DETAILS_SUBHEADER: &str = "Деталі маршруту";

/// One stop on a trip. Times are `HH:MM[:SS]` strings as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStop {
    pub station: String,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub arrival: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub departure: Option<String>,
    #[serde(default, deserialize_with = "de::opt_order")]
    pub order: Option<u32>,
}

impl RouteStop {
    /// Time shown when boarding here: departure, else arrival.
    pub fn departure_label(&self) -> &str {
        first_time(self.departure.as_deref(), self.arrival.as_deref())
    }

    /// Time shown when alighting or passing: arrival, else departure.
    pub fn arrival_label(&self) -> &str {
        first_time(self.arrival.as_deref(), self.departure.as_deref())
    }
}

/// Row of `/api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRoute {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub train_number: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub train_name: Option<String>,
    #[serde(default)]
    pub route: Vec<RouteStop>,
}

/// Row of `/api/route_trains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub trip_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub train_number: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub train_name: Option<String>,
    #[serde(default)]
    pub route: Vec<RouteStop>,
    #[serde(default, deserialize_with = "de::opt_order")]
    pub dep_order: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_order")]
    pub arr_order: Option<u32>,
    #[serde(default, deserialize_with = "de::flag")]
    pub has_wifi: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub has_air_con: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub has_restaurant: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub has_bicycle: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub accessible: bool,
}

impl From<SearchRoute> for Trip {
    fn from(route: SearchRoute) -> Self {
        Self {
            trip_id: None,
            train_number: route.train_number,
            train_name: route.train_name,
            route: route.route,
            dep_order: None,
            arr_order: None,
            has_wifi: false,
            has_air_con: false,
            has_restaurant: false,
            has_bicycle: false,
            accessible: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amenity {
    pub label: &'static str,
    pub available: bool,
}

/// Compact card data for the results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSummary {
    pub number: String,
    pub name: Option<String>,
    pub departure_time: String,
    pub departure_station: String,
    pub arrival_time: String,
    pub arrival_station: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStop {
    pub time: String,
    pub station: String,
    pub terminal: bool,
    pub in_segment: bool,
}

impl TimelineStop {
    pub fn css_class(&self) -> String {
        let mut class = String::from("stop-item");
        if self.terminal {
            class.push_str(" terminal");
        }
        if self.in_segment {
            class.push_str(" active-segment");
        }
        class
    }
}

impl Trip {
    pub fn number_label(&self) -> &str {
        self.train_number.as_deref().unwrap_or(DEFAULT_TRAIN_LABEL)
    }

    pub fn details_subheader(&self) -> &str {
        self.train_name.as_deref().unwrap_or(DEFAULT_DETAILS_SUBHEADER)
    }

    fn stop_with_order(&self, order: Option<u32>) -> Option<&RouteStop> {
        let order = order?;
        self.route.iter().find(|stop| stop.order == Some(order))
    }

    /// Stop the passenger boards at: `dep_order`, else the first stop.
    pub fn boarding_stop(&self) -> Option<&RouteStop> {
        self.stop_with_order(self.dep_order)
            .or_else(|| self.route.first())
    }

    /// Stop the passenger leaves at: `arr_order`, else the last stop.
    pub fn alighting_stop(&self) -> Option<&RouteStop> {
        self.stop_with_order(self.arr_order)
            .or_else(|| self.route.last())
    }

    pub fn summary(&self) -> Option<TripSummary> {
        let dep = self.boarding_stop()?;
        let arr = self.alighting_stop()?;
        Some(TripSummary {
            number: self.number_label().to_string(),
            name: self.train_name.clone(),
            departure_time: dep.departure_label().to_string(),
            departure_station: dep.station.clone(),
            arrival_time: arr.arrival_label().to_string(),
            arrival_station: arr.station.clone(),
        })
    }

    pub fn amenities(&self) -> [Amenity; 5] {
        [
            Amenity { label: "WiFi", available: self.has_wifi },
            Amenity { label: "Кондиціонер", available: self.has_air_con },
            Amenity { label: "Ресторан", available: self.has_restaurant },
            Amenity { label: "Велосипед", available: self.has_bicycle },
            Amenity { label: "Інклюзивність", available: self.accessible },
        ]
    }

    fn in_segment(&self, stop: &RouteStop) -> bool {
        match (stop.order, self.dep_order, self.arr_order) {
            (Some(order), Some(dep), Some(arr)) => dep <= order && order <= arr,
            _ => false,
        }
    }

    pub fn timeline(&self) -> Vec<TimelineStop> {
        let last = self.route.len().saturating_sub(1);
        self.route
            .iter()
            .enumerate()
            .map(|(idx, stop)| TimelineStop {
                time: stop.arrival_label().to_string(),
                station: stop.station.clone(),
                terminal: idx == 0 || idx == last,
                in_segment: self.in_segment(stop),
            })
            .collect()
    }
}
