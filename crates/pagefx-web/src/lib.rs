//! Browser host for the pagefx engine
//!
//! Implements [`pagefx_core::Page`] over `web-sys` and feeds DOM events into a
//! [`pagefx_core::Site`]. The engine mounts itself once the document has
//! loaded; configuration comes from an inline
//! `<script type="application/toml" id="pagefx-config">` block.

pub mod markup;
pub mod registry;

#[cfg(target_arch = "wasm32")]
mod dom_page;
#[cfg(target_arch = "wasm32")]
mod host;

#[cfg(target_arch = "wasm32")]
pub use dom_page::DomPage;
pub use markup::config_from_markup;
pub use registry::Registry;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let window = web_sys::window().ok_or_else(|| wasm_bindgen::JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;

    if document.ready_state() != "loading" {
        return host::mount();
    }

    let on_ready = Closure::once_into_js(move || {
        if let Err(e) = host::mount() {
            tracing::error!(error = ?e, "Failed to mount pagefx");
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    Ok(())
}
