use std::fmt;

use serde::{Deserialize, Serialize};

use crate::de;

/// Stable identity of a running trip across polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TripKey {
    Id(i64),
    Name(String),
}

impl fmt::Display for TripKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for TripKey {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for TripKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// One record of `/api/train_positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainPosition {
    pub trip_id: TripKey,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub train_number: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub previous_station: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub next_station: Option<String>,
    #[serde(default)]
    pub speed_ratio: Option<f64>,
}

/// A full poll result. Replaces the previous one wholesale.
pub type LiveSnapshot = Vec<TrainPosition>;

impl TrainPosition {
    pub fn has_valid_position(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Popup markup: bold train label over a `previous ➔ next` line.
    pub fn popup_html(&self) -> String {
        let number = self.train_number.as_deref().unwrap_or("");
        let previous = self.previous_station.as_deref().unwrap_or("");
        let next = self.next_station.as_deref().unwrap_or("");
        format!(
            "<b>Поїзд {}</b><br>{} ➔ {}",
            escape_html(number),
            escape_html(previous),
            escape_html(next)
        )
    }
}

pub fn parse_snapshot(body: &str) -> Result<LiveSnapshot, serde_json::Error> {
    serde_json::from_str(body)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
