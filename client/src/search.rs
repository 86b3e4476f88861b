use leptos::prelude::*;

use railmap_shared::station::autocomplete;
use railmap_shared::{Slot, TimeMode};

use crate::app::AppState;
use crate::controller;

#[component]
pub(crate) fn SearchPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <section class="search-panel">
            <div class="station-inputs">
                <StationInput field=Slot::From placeholder="Звідки" />
                <button
                    class="swap-btn"
                    title="Поміняти місцями"
                    on:click=move |_| controller::swap(state)
                >
                    "⇅"
                </button>
                <StationInput field=Slot::To placeholder="Куди" />
            </div>
            <DateTimeControls />
        </section>
    }
}

/// Text input with a substring autocomplete over the station list.
#[component]
fn StationInput(field: Slot, placeholder: &'static str) -> impl IntoView {
    let state = expect_context::<AppState>();
    let text = state.text(field);
    let open = RwSignal::new(false);

    let suggestions = Memo::new(move |_| {
        let query = text.get();
        let limit = state.config.with_value(|config| config.autocomplete_limit);
        state.stations.with(|stations| {
            autocomplete(stations, &query, limit)
                .into_iter()
                .map(|station| station.name.clone())
                .collect::<Vec<_>>()
        })
    });

    view! {
        <div class="station-input">
            <input
                type="text"
                autocomplete="off"
                placeholder=placeholder
                prop:value=move || text.get()
                on:input=move |ev| {
                    controller::edit_text(state, field, event_target_value(&ev));
                    open.set(true);
                }
                on:focus=move |_| open.set(true)
                on:blur=move |_| open.set(false)
            />
            <button
                class="clear-btn"
                title="Очистити"
                style:display=move || if text.with(|t| t.trim().is_empty()) { "none" } else { "block" }
                on:click=move |_| controller::clear(state, field)
            >
                "×"
            </button>
            <div
                class="autocomplete-list"
                class:active=move || open.get() && suggestions.with(|s| !s.is_empty())
            >
                {move || {
                    suggestions
                        .get()
                        .into_iter()
                        .map(|name| {
                            let chosen = name.clone();
                            view! {
                                // mousedown runs before the input's blur closes the list
                                <div
                                    class="autocomplete-item"
                                    on:mousedown=move |ev: web_sys::MouseEvent| {
                                        ev.prevent_default();
                                        open.set(false);
                                        controller::choose(state, field, chosen.clone());
                                    }
                                >
                                    {name}
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </div>
    }
}

#[component]
fn DateTimeControls() -> impl IntoView {
    let state = expect_context::<AppState>();

    let cutoff_warning = move || {
        state.config.with_value(|config| {
            config
                .schedule_cutoff
                .map(|cutoff| format!("Розклад доступний лише до {}", cutoff.format("%d.%m.%Y")))
        })
    };

    view! {
        <div class="datetime-controls">
            <input
                type="date"
                class="date-input"
                prop:value=move || state.date.get()
                on:change=move |ev| controller::change_date(state, event_target_value(&ev))
            />
            <input
                type="time"
                class="time-input"
                prop:value=move || state.time.get()
                on:change=move |ev| controller::change_time(state, event_target_value(&ev))
            />
            <button
                class="reset-datetime-btn"
                title="Поточний час"
                on:click=move |_| controller::reset_datetime(state)
            >
                "Зараз"
            </button>
            <span
                class="live-badge"
                style:display=move || if state.time_mode.get() == TimeMode::Live { "inline" } else { "none" }
            >
                "LIVE"
            </span>
            <div
                class="date-warning"
                style:display=move || if state.date_past_cutoff() { "block" } else { "none" }
            >
                {cutoff_warning}
            </div>
        </div>
    }
}
