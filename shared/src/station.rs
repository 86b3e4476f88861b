use serde::{Deserialize, Serialize};

use crate::de;

/// One entry of `/api/stations`. Only `name` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_order")]
    pub platforms: Option<u32>,
}

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: None,
            lon: None,
            platforms: None,
        }
    }
}

/// Case-insensitive substring match over the station list, keeping backend
/// order and returning at most `limit` hits. An empty query matches nothing.
pub fn autocomplete<'a>(stations: &'a [Station], query: &str, limit: usize) -> Vec<&'a Station> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    stations
        .iter()
        .filter(|station| station.name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

pub fn station_names(stations: &[Station]) -> Vec<String> {
    stations.iter().map(|s| s.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stations(names: &[&str]) -> Vec<Station> {
        names.iter().map(|n| Station::new(*n)).collect()
    }

    #[test]
    fn matches_case_insensitively() {
        let list = stations(&["Київ-Пасажирський", "Львів", "Kyiv Zhuliany"]);
        let hits: Vec<&str> = autocomplete(&list, "КИЇВ", 7)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Київ-Пасажирський"]);
    }

    #[test]
    fn respects_limit_and_order() {
        let list = stations(&["Odesa", "Odesa-Holovna", "Odesa-Zastava", "Podilsk"]);
        let hits: Vec<&str> = autocomplete(&list, "odesa", 2)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Odesa", "Odesa-Holovna"]);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let list = stations(&["Lviv"]);
        assert!(autocomplete(&list, "", 7).is_empty());
    }

    #[test]
    fn decodes_station_records() {
        let list: Vec<Station> = serde_json::from_str(
            r#"[{"name":"Lviv","lat":49.84,"lon":24.0,"platforms":"6","region":"west"},{"name":"Stryi"}]"#,
        )
        .unwrap();
        assert_eq!(list[0].platforms, Some(6));
        assert_eq!(list[0].lat, Some(49.84));
        assert_eq!(list[1], Station::new("Stryi"));
    }
}
