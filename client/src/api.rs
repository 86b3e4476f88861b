use serde::de::DeserializeOwned;

use railmap_shared::{ApiRoutes, FetchError, SearchRoute, Station, Trip};

pub(crate) async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }

    resp.json::<T>()
        .await
        .map_err(|e| FetchError::Malformed(e.to_string()))
}

pub(crate) async fn fetch_stations(routes: &ApiRoutes) -> Result<Vec<Station>, FetchError> {
    fetch_json(&routes.stations()).await
}

/// Names of stations with a direct connection from `name`.
pub(crate) async fn fetch_reachable(routes: &ApiRoutes, name: &str) -> Result<Vec<String>, FetchError> {
    fetch_json(&routes.reachable(name)).await
}

/// Direct trains between two stations. Backends without `/api/route_trains`
/// (404) are served from the older `/api/search` endpoint instead.
pub(crate) async fn fetch_trips(
    routes: &ApiRoutes,
    from: &str,
    to: &str,
    date: Option<&str>,
    time: Option<&str>,
) -> Result<Vec<Trip>, FetchError> {
    match fetch_json::<Vec<Trip>>(&routes.route_trains(from, to, date, time)).await {
        Err(FetchError::Status(404)) => {
            let found: Vec<SearchRoute> = fetch_json(&routes.search(from, to, date)).await?;
            Ok(found.into_iter().map(Trip::from).collect())
        }
        other => other,
    }
}
