//! # academy-client
//!
//! Leptos + WASM front-end for the academy management application.
//!
//! The routing core (session store, profile resolver, navigation guard, auth
//! callback handler) is plain Rust and compiles without any feature flag so it
//! can be tested natively. Browser I/O is gated behind `hydrate`; the server
//! renders the same `App` with `ssr`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod routing;
pub mod state;
pub mod util;

/// WASM entry point: install browser logging and hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
