use leptos::prelude::*;

use crate::app::AppState;
use crate::controller;

/// The server-rendered Leaflet map. Its `src` follows the selection and the
/// highlight is re-posted after each reload.
#[component]
pub(crate) fn MapFrame() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <iframe
            id="map-frame"
            class="map-frame"
            title="Карта"
            node_ref=state.frame
            src=move || state.map_src.get()
            on:load=move |_| controller::resend_highlight(state)
        ></iframe>
    }
}
