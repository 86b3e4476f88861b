mod about;
mod api;
mod app;
mod bridge;
mod clock;
mod controller;
mod map_frame;
mod results;
mod search;

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// `#app` when the page provides one, the body otherwise.
fn mount_point(document: &Document) -> Option<HtmlElement> {
    document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        .or_else(|| document.body())
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(target) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| mount_point(&document))
    else {
        web_sys::console::warn_1(&"railmap: nothing to mount into".into());
        return;
    };
    // The search page lives as long as the tab; window listeners are torn down
    // by their own bindings.
    leptos::mount::mount_to(target, app::App).forget();
}
