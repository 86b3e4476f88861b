use leptos::prelude::*;

use railmap_shared::Trip;

use crate::app::AppState;

const LOADING_TEXT: &str = "Завантаження...";
const EMPTY_TEXT: &str = "Прямих поїздів не знайдено.";
const FAILED_TEXT: &str = "Сталася помилка при завантаженні поїздів.";

/// State of the direct-trains list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Results {
    /// No complete from/to pair, or the date is past the timetable.
    Hidden,
    Loading,
    Empty,
    Loaded(Vec<Trip>),
    Failed,
}

#[component]
pub(crate) fn ResultsPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <aside
            class="left-sidebar"
            style:display=move || {
                if state.results.with(|r| matches!(r, Results::Hidden)) { "none" } else { "flex" }
            }
        >
            <div class="train-results-list">
                {move || match state.results.get() {
                    Results::Hidden => ().into_any(),
                    Results::Loading => {
                        view! { <div class="results-note">{LOADING_TEXT}</div> }.into_any()
                    }
                    Results::Empty => {
                        view! { <div class="results-note">{EMPTY_TEXT}</div> }.into_any()
                    }
                    Results::Failed => {
                        view! { <div class="results-note error">{FAILED_TEXT}</div> }.into_any()
                    }
                    Results::Loaded(trips) => {
                        trips
                            .into_iter()
                            .map(|trip| view! { <TrainCard trip=trip /> })
                            .collect_view()
                            .into_any()
                    }
                }}
            </div>
        </aside>
    }
}

#[component]
fn TrainCard(trip: Trip) -> impl IntoView {
    let state = expect_context::<AppState>();
    // Trips without stops have nothing to show.
    let Some(summary) = trip.summary() else {
        return ().into_any();
    };

    view! {
        <div class="train-card" on:click=move |_| state.details.set(Some(trip.clone()))>
            <div class="train-card-header">
                <span class="train-number">{summary.number}</span>
                {summary.name.map(|name| view! { <span class="train-name">{name}</span> })}
            </div>
            <div class="train-card-times">
                <div class="time-block">
                    <span class="time">{summary.departure_time}</span>
                    <span class="station">{summary.departure_station}</span>
                </div>
                <span class="arrow">"➔"</span>
                <div class="time-block">
                    <span class="time">{summary.arrival_time}</span>
                    <span class="station">{summary.arrival_station}</span>
                </div>
            </div>
        </div>
    }
    .into_any()
}

fn details_view(trip: &Trip) -> impl IntoView + use<> {
    let amenities = trip
        .amenities()
        .into_iter()
        .map(|amenity| {
            let class = if amenity.available { "amenity-badge active" } else { "amenity-badge" };
            view! { <span class=class>{amenity.label}</span> }
        })
        .collect_view();
    let stops = trip
        .timeline()
        .into_iter()
        .map(|stop| {
            let class = stop.css_class();
            view! {
                <div class=class>
                    <span class="stop-time">{stop.time}</span>
                    <span class="stop-name">{stop.station}</span>
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="details-header">{trip.number_label().to_string()}</div>
        <div class="details-subheader">{trip.details_subheader().to_string()}</div>
        <div class="amenities-list">{amenities}</div>
        <div class="stops-timeline">{stops}</div>
    }
}

/// Side panel with the full route of the clicked train.
#[component]
pub(crate) fn TrainDetails() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <aside class="right-sidebar" class:open=move || state.details.with(Option::is_some)>
            <button class="close-right-sidebar" on:click=move |_| state.details.set(None)>
                "×"
            </button>
            <div class="train-details-content">
                {move || state.details.get().map(|trip| details_view(&trip))}
            </div>
        </aside>
    }
}
