use leptos::prelude::*;

use crate::app::AppState;

/// Overlays that Escape can dismiss, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Overlay {
    ProjectInfo,
    Details,
}

/// The overlay an Escape press closes: the modal sits above the details panel.
pub(crate) fn topmost_overlay(info_open: bool, details_open: bool) -> Option<Overlay> {
    if info_open {
        Some(Overlay::ProjectInfo)
    } else if details_open {
        Some(Overlay::Details)
    } else {
        None
    }
}

#[component]
pub(crate) fn ProjectInfoButton() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <button
            id="project-info-btn"
            class="project-info-btn"
            title="Про проєкт"
            on:click=move |ev| {
                ev.prevent_default();
                state.info_open.set(true);
            }
        >
            "ⓘ"
        </button>
    }
}

#[component]
pub(crate) fn ProjectInfoModal() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div
            id="project-modal"
            class="modal-overlay"
            class:active=move || state.info_open.get()
            // Clicks inside the dialog stop at `.modal-content`.
            on:click=move |_| state.info_open.set(false)
        >
            <div class="modal-content" on:click=|ev| ev.stop_propagation()>
                <button
                    id="close-modal-btn"
                    class="close-modal-btn"
                    title="Закрити"
                    on:click=move |_| state.info_open.set(false)
                >
                    "×"
                </button>
                <h2>"Потяги України"</h2>
                <p>
                    "Пошук прямих поїздів між станціями та живе положення потягів на мапі."
                </p>
                <p>
                    "Оберіть станцію відправлення: на мапі підсвітяться станції, куди можна доїхати без пересадок. "
                    "Після вибору станції прибуття з'явиться список поїздів на обрану дату."
                </p>
                <p>
                    "Позначка LIVE означає, що мапа показує поточне положення поїздів; "
                    "зміна дати або часу закріплює мапу на вказаному моменті."
                </p>
            </div>
        </div>
    }
}
