//! Backend endpoint URLs and the error taxonomy for fetching them.

use serde::Serialize;
use thiserror::Error;

use crate::viewing::ViewingContext;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("fetch error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    /// The body was not the JSON shape we expected.
    #[error("parse error: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapTheme {
    #[default]
    Light,
    Dark,
}

impl MapTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Serialize)]
struct ReachableParams<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct SearchParams<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
}

#[derive(Serialize)]
struct MapParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from_station: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_station: Option<&'a str>,
    map_theme: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<&'a str>,
}

/// Shared by `/api/route_trains` and `/api/train_positions`.
#[derive(Serialize)]
struct RouteParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from_station: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_station: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<&'a str>,
}

/// URL builder for every backend endpoint, rooted at a configurable base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiRoutes {
    base: String,
}

impl ApiRoutes {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// `path` plus the form-encoded `params`; no `?` when nothing is set.
    fn url<P: Serialize>(&self, path: &str, params: &P) -> String {
        // Only flat structs of strings reach here, which always encode.
        let query = serde_urlencoded::to_string(params).unwrap_or_default();
        if query.is_empty() {
            format!("{}{}", self.base, path)
        } else {
            format!("{}{}?{}", self.base, path, query)
        }
    }

    pub fn stations(&self) -> String {
        format!("{}/api/stations", self.base)
    }

    pub fn reachable(&self, name: &str) -> String {
        self.url("/api/reachable", &ReachableParams { name })
    }

    pub fn search(&self, from: &str, to: &str, date: Option<&str>) -> String {
        self.url(
            "/api/search",
            &SearchParams {
                from,
                to,
                date: present(date),
            },
        )
    }

    /// Source of the map iframe.
    pub fn map(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        theme: MapTheme,
        time: Option<&str>,
    ) -> String {
        self.url(
            "/api/map",
            &MapParams {
                from_station: present(from),
                to_station: present(to),
                map_theme: theme.as_str(),
                time: present(time),
            },
        )
    }

    pub fn route_trains(&self, from: &str, to: &str, date: Option<&str>, time: Option<&str>) -> String {
        self.url(
            "/api/route_trains",
            &RouteParams {
                from_station: Some(from),
                to_station: Some(to),
                date: present(date),
                time: present(time),
            },
        )
    }

    pub fn train_positions(&self, context: &ViewingContext) -> String {
        self.url(
            "/api/train_positions",
            &RouteParams {
                from_station: present(context.from.as_deref()),
                to_station: present(context.to.as_deref()),
                date: None,
                time: present(context.time.as_deref()),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_station_names() {
        let routes = ApiRoutes::default();
        assert_eq!(
            routes.reachable("Київ-Пас"),
            "/api/reachable?name=%D0%9A%D0%B8%D1%97%D0%B2-%D0%9F%D0%B0%D1%81"
        );
        assert_eq!(routes.stations(), "/api/stations");
    }

    #[test]
    fn map_url_skips_missing_endpoints() {
        let routes = ApiRoutes::new("https://rail.example/");
        assert_eq!(
            routes.map(None, Some("B"), MapTheme::Dark, Some("10:00:00")),
            "https://rail.example/api/map?to_station=B&map_theme=dark&time=10%3A00%3A00"
        );
    }

    #[test]
    fn route_trains_url() {
        let routes = ApiRoutes::default();
        assert_eq!(
            routes.route_trains("A B", "C", Some("2026-03-01"), None),
            "/api/route_trains?from_station=A+B&to_station=C&date=2026-03-01"
        );
        assert_eq!(
            routes.search("A", "C", None),
            "/api/search?from=A&to=C"
        );
    }

    #[test]
    fn positions_url_follows_context() {
        let routes = ApiRoutes::default();
        let live = ViewingContext::live(Some("A"), Some("B"));
        assert_eq!(
            routes.train_positions(&live),
            "/api/train_positions?from_station=A&to_station=B"
        );
        let pinned = ViewingContext::pinned(Some("A"), Some("B"), "08:15");
        assert_eq!(
            routes.train_positions(&pinned),
            "/api/train_positions?from_station=A&to_station=B&time=08%3A15%3A00"
        );
    }

    #[test]
    fn positions_url_without_context_has_no_query() {
        let routes = ApiRoutes::new("https://rail.example");
        let blank = ViewingContext {
            from: Some(String::new()),
            ..ViewingContext::default()
        };
        assert_eq!(
            routes.train_positions(&blank),
            "https://rail.example/api/train_positions"
        );
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let routes = ApiRoutes::default();
        assert_eq!(
            routes.search("Lviv & Co", "A=B?", Some("2026-03-01")),
            "/api/search?from=Lviv+%26+Co&to=A%3DB%3F&date=2026-03-01"
        );
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(MapTheme::Light.toggled(), MapTheme::Dark);
        assert_eq!(MapTheme::default().as_str(), "light");
    }
}
