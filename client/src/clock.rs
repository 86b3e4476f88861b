use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use railmap_shared::config::CLOCK_TICK_MS;
use railmap_shared::time::{format_clock, write_clock};

struct ClockIntervalBinding {
    window: web_sys::Window,
    interval_id: i32,
    _callback: Closure<dyn Fn()>,
}

thread_local! {
    static CLOCK_INTERVAL_BINDING: RefCell<Option<ClockIntervalBinding>> = const { RefCell::new(None) };
}

fn clear_clock() {
    CLOCK_INTERVAL_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            old.window.clear_interval_with_handle(old.interval_id);
        }
    });
}

#[component]
pub(crate) fn DigitalClock() -> impl IntoView {
    let text = RwSignal::new(format_clock(chrono::Local::now().time()));

    Effect::new(move || {
        clear_clock();
        let Some(window) = web_sys::window() else {
            return;
        };
        let cb = Closure::<dyn Fn()>::new(move || {
            text.update(|buf| write_clock(buf, chrono::Local::now().time()));
        });
        let Ok(interval_id) = window.set_interval_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            CLOCK_TICK_MS as i32,
        ) else {
            return;
        };
        CLOCK_INTERVAL_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ClockIntervalBinding {
                window: window.clone(),
                interval_id,
                _callback: cb,
            });
        });
        on_cleanup(clear_clock);
    });

    view! { <div class="digital-clock">{move || text.get()}</div> }
}
