//! Messages exchanged between the host page and the embedded map frame over
//! `postMessage`. Anything that does not decode into [`BridgeMessage`] is
//! someone else's traffic and must be dropped without side effects.

use serde::{Deserialize, Serialize};

use crate::de;

pub const HIGHLIGHT_STATIONS: &str = "HIGHLIGHT_STATIONS";
pub const STATION_CLICKED: &str = "station_clicked";

/// Host `window` property holding the last highlight sent, for a frame whose
/// listener came up after the message was posted.
pub const HIGHLIGHT_GLOBAL: &str = "railmapHighlight";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    /// Host -> frame. Replaces the frame's highlight state wholesale.
    #[serde(rename = "HIGHLIGHT_STATIONS")]
    HighlightStations {
        #[serde(
            default,
            deserialize_with = "de::non_empty",
            skip_serializing_if = "Option::is_none"
        )]
        selected: Option<String>,
        reachable: Vec<String>,
        /// Chosen arrival station, painted apart from the plain reachable set.
        #[serde(
            default,
            deserialize_with = "de::non_empty",
            skip_serializing_if = "Option::is_none"
        )]
        destination: Option<String>,
    },
    /// Frame -> host.
    #[serde(rename = "station_clicked")]
    StationClicked { name: String },
}

impl BridgeMessage {
    pub fn highlight(selected: Option<&str>, reachable: Vec<String>) -> Self {
        Self::HighlightStations {
            selected: selected.filter(|s| !s.is_empty()).map(str::to_string),
            reachable,
            destination: None,
        }
    }

    /// Both endpoints chosen: the origin is focused and the destination is the
    /// only selectable station.
    pub fn route(from: &str, to: &str) -> Self {
        Self::HighlightStations {
            selected: Some(from.to_string()).filter(|s| !s.is_empty()),
            reachable: vec![to.to_string()],
            destination: Some(to.to_string()).filter(|s| !s.is_empty()),
        }
    }

    pub fn station_clicked(name: impl Into<String>) -> Self {
        Self::StationClicked { name: name.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::HighlightStations { .. } => HIGHLIGHT_STATIONS,
            Self::StationClicked { .. } => STATION_CLICKED,
        }
    }

    /// Decode an arbitrary payload; unrelated or malformed payloads yield `None`.
    pub fn decode(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    pub fn decode_str(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
