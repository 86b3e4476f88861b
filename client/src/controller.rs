//! User-intent handlers. Every action that changes the from/to pair, the
//! date or the time funnels into [`refresh`], which rebuilds the map source,
//! re-sends the station highlight and reloads the results list.

use leptos::prelude::*;
use leptos::task::spawn_local;

use railmap_shared::station::station_names;
use railmap_shared::time::{input_date, input_time, normalize_time};
use railmap_shared::{BridgeMessage, Selection, Slot, TimeMode, ViewingContext};

use crate::api;
use crate::app::AppState;
use crate::bridge;
use crate::results::Results;

fn bump(nonce: RwSignal<u64>) -> u64 {
    let next = nonce.get_untracked().wrapping_add(1);
    nonce.set(next);
    next
}

fn sync_texts(state: AppState) {
    let selection = state.selection.get_untracked();
    state
        .from_text
        .set(selection.from().unwrap_or_default().to_string());
    state.to_text.set(selection.to().unwrap_or_default().to_string());
}

/// The pair and poll context that typed text amounts to once it is acted on.
fn committed(from_text: &str, to_text: &str, mode: TimeMode, time: &str) -> (Selection, ViewingContext) {
    let selection = Selection::new(Some(from_text.trim()), Some(to_text.trim()));
    let context = ViewingContext::for_selection(&selection, mode, time);
    (selection, context)
}

/// Take the input texts as the current pair and tell the map frame about it.
fn commit_inputs(state: AppState) {
    let (selection, context) = committed(
        &state.from_text.get_untracked(),
        &state.to_text.get_untracked(),
        state.time_mode.get_untracked(),
        &state.time.get_untracked(),
    );
    state.selection.set(selection);
    bridge::publish_viewing(&context);
}

pub(crate) fn refresh(state: AppState) {
    commit_inputs(state);
    let selection = state.selection.get_untracked();
    let theme = state.theme.get_untracked();
    let time = normalize_time(&state.time.get_untracked());
    let date = state.date.get_untracked();

    let src = state
        .routes
        .with_value(|routes| routes.map(selection.from(), selection.to(), theme, time.as_deref()));
    state.map_src.set(src);

    sync_highlight(state);

    let past_cutoff = state
        .config
        .with_value(|config| config.input_exceeds_cutoff(&date));
    match (selection.from(), selection.to()) {
        (Some(from), Some(to)) if !past_cutoff => {
            load_trips(state, from.to_string(), to.to_string(), date, time);
        }
        _ => {
            bump(state.search_nonce);
            state.results.set(Results::Hidden);
        }
    }
}

fn load_trips(state: AppState, from: String, to: String, date: String, time: Option<String>) {
    let nonce = bump(state.search_nonce);
    state.results.set(Results::Loading);
    let routes = state.routes.get_value();

    spawn_local(async move {
        let date = (!date.is_empty()).then_some(date);
        let result = api::fetch_trips(&routes, &from, &to, date.as_deref(), time.as_deref()).await;
        if state.search_nonce.get_untracked() != nonce {
            return;
        }
        let next = match result {
            Ok(trips) if trips.is_empty() => Results::Empty,
            Ok(trips) => Results::Loaded(trips),
            Err(e) => {
                web_sys::console::warn_1(&format!("route trains {from} -> {to}: {e}").into());
                Results::Failed
            }
        };
        state.results.set(next);
    });
}

/// Compute the highlight for the current selection and post it to the map.
pub(crate) fn sync_highlight(state: AppState) {
    let nonce = bump(state.highlight_nonce);
    let selection = state.selection.get_untracked();

    match (selection.from(), selection.to()) {
        (None, _) => {
            let all = state.stations.with_untracked(|stations| station_names(stations));
            send_highlight(state, BridgeMessage::highlight(None, all));
        }
        (Some(from), Some(to)) => {
            send_highlight(state, BridgeMessage::route(from, to));
        }
        (Some(from), None) => {
            let from = from.to_string();
            let routes = state.routes.get_value();
            spawn_local(async move {
                let result = api::fetch_reachable(&routes, &from).await;
                if state.highlight_nonce.get_untracked() != nonce {
                    return;
                }
                match result {
                    Ok(reachable) => {
                        send_highlight(state, BridgeMessage::highlight(Some(&from), reachable));
                    }
                    Err(e) => {
                        web_sys::console::warn_1(&format!("reachable from {from}: {e}").into());
                    }
                }
            });
        }
    }
}

fn send_highlight(state: AppState, message: BridgeMessage) {
    if let Some(frame) = state.frame.get_untracked() {
        bridge::send(&frame, &message);
    }
    bridge::publish_highlight(&message);
    state.last_highlight.set_value(Some(message));
}

/// The frame reloads on every source change and loses its styling.
pub(crate) fn resend_highlight(state: AppState) {
    let Some(message) = state.last_highlight.get_value() else {
        return;
    };
    if let Some(frame) = state.frame.get_untracked() {
        bridge::send(&frame, &message);
    }
}

/// Typing only edits the text; the pair changes on the next refresh.
pub(crate) fn edit_text(state: AppState, slot: Slot, value: String) {
    state.text(slot).set(value);
}

pub(crate) fn choose(state: AppState, slot: Slot, name: String) {
    state.selection.update(|selection| selection.set(slot, name));
    sync_texts(state);
    refresh(state);
}

pub(crate) fn clear(state: AppState, slot: Slot) {
    state.selection.update(|selection| selection.clear(slot));
    sync_texts(state);
    refresh(state);
}

pub(crate) fn swap(state: AppState) {
    state.selection.update(|selection| selection.swap());
    sync_texts(state);
    refresh(state);
}

/// Station clicked on the map.
pub(crate) fn pick_from_map(state: AppState, name: String) {
    commit_inputs(state);
    let mut slot = Slot::From;
    state.selection.update(|selection| slot = selection.pick(name));
    web_sys::console::info_1(&format!("map pick -> {slot:?}").into());
    sync_texts(state);
    refresh(state);
}

pub(crate) fn change_date(state: AppState, value: String) {
    state.date.set(value);
    state.time_mode.set(TimeMode::Pinned);
    refresh(state);
}

pub(crate) fn change_time(state: AppState, value: String) {
    state.time.set(value);
    state.time_mode.set(TimeMode::Pinned);
    refresh(state);
}

/// Back to the current moment and live positions.
pub(crate) fn reset_datetime(state: AppState) {
    let now = chrono::Local::now();
    state.date.set(input_date(now.date_naive()));
    state.time.set(input_time(now.time()));
    state.time_mode.set(TimeMode::Live);
    refresh(state);
}

pub(crate) fn toggle_theme(state: AppState) {
    let theme = state.theme.get_untracked().toggled();
    state.theme.set(theme);
    if let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    {
        root.set_attribute("data-theme", theme.as_str()).ok();
    }
    refresh(state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_inputs_are_trimmed_and_blank_means_unset() {
        let (selection, context) = committed("  Київ ", "   ", TimeMode::Live, "10:00");
        assert_eq!(selection.from(), Some("Київ"));
        assert_eq!(selection.to(), None);
        assert_eq!(context, ViewingContext::live(Some("Київ"), None));
    }

    #[test]
    fn committed_context_pins_only_in_pinned_mode() {
        let (_, live) = committed("A", "B", TimeMode::Live, "07:30");
        assert!(live.is_live());
        let (selection, pinned) = committed("A", "B", TimeMode::Pinned, "07:30");
        assert!(selection.is_complete());
        assert_eq!(pinned.time.as_deref(), Some("07:30:00"));
    }
}
