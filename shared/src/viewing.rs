use serde::{Deserialize, Serialize};

use crate::selection::Selection;
use crate::time::normalize_time;

/// Name of the host `window` property the map frame reads its context from.
pub const VIEWING_GLOBAL: &str = "railmapViewing";

/// Parameters of one live-position poll: the two endpoints plus an optional
/// pinned instant. Without `time` the backend serves the live feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingContext {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeMode {
    #[default]
    Live,
    /// The user edited the date or time; polls are pinned to the entered time.
    Pinned,
}

impl ViewingContext {
    pub fn live(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            time: None,
        }
    }

    /// Pin to `raw_time` (`HH:MM` or `HH:MM:SS`). Unparseable times fall back to live.
    pub fn pinned(from: Option<&str>, to: Option<&str>, raw_time: &str) -> Self {
        Self {
            time: normalize_time(raw_time),
            ..Self::live(from, to)
        }
    }

    pub fn for_selection(selection: &Selection, mode: TimeMode, raw_time: &str) -> Self {
        match mode {
            TimeMode::Live => Self::live(selection.from(), selection.to()),
            TimeMode::Pinned => Self::pinned(selection.from(), selection.to(), raw_time),
        }
    }

    pub fn is_live(&self) -> bool {
        self.time.is_none()
    }

    pub fn has_route(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Context carried in the map frame's own URL
    /// (`from_station`, `to_station`, `time`); used when the host is unreachable.
    pub fn from_query(query: &str) -> Self {
        let query: FrameQuery =
            serde_urlencoded::from_str(query.trim_start_matches('?')).unwrap_or_default();
        let filled = |value: String| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Self {
            from: filled(query.from_station),
            to: filled(query.to_station),
            time: normalize_time(query.time.trim()),
        }
    }
}

/// The map page's query string; other keys such as `map_theme` are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrameQuery {
    from_station: String,
    to_station: String,
    time: String,
}
