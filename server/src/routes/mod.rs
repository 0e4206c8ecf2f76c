//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The academy app is rendered by Leptos SSR and hydrated in the browser. The
//! server adds the small JSON surface the browser needs before it can talk to
//! the hosted backend directly: the public runtime config and a health check.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

use std::path::PathBuf;

use academy_client::config::{CONFIG_ENDPOINT, PublicConfig};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// JSON routes served alongside the SSR app.
fn api_routes(public: PublicConfig) -> Router {
    Router::new()
        .route(CONFIG_ENDPOINT, get(public_config))
        .route("/healthz", get(healthz))
        .with_state(public)
}

async fn public_config(State(public): State<PublicConfig>) -> Json<PublicConfig> {
    Json(public)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// API routes + Leptos SSR + `/pkg` static assets.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded (missing or
/// malformed `[workspace.metadata.leptos]` section).
pub fn leptos_app(config: &ServerConfig) -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(academy_client::app::App);

    let leptos_router = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            move || academy_client::app::shell(opts.clone())
        })
        .with_state(leptos_options.clone());

    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(api_routes(config.public.clone())
        .merge(leptos_router)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg")))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http()))
}
