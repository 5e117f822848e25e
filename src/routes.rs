//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /__lbheartbeat__`  - Load balancer liveness probe
//! - `GET  /__heartbeat__/`   - Component health
//! - `GET  /__version__/`     - Build and configuration name
//! - `GET  /api/v1/whoami/`   - Resolved caller identity
//! - `<STATIC_URL>*`          - Static assets
//!
//! # Middleware
//!
//! Outermost first:
//!
//! 1. **Received at** - Per-request context and arrival timestamp
//! 2. **Request summary** - One access summary per request
//! 3. **Security** - HTTP to HTTPS upgrade redirects
//! 4. **Static files** - Cache headers on static assets
//! 5. **Append slash** - Cached redirects to slash-terminated routes
//! 6. **Remote user** - Identity from the configured proxy header

use crate::api::handlers::{
    heartbeat_handler, lbheartbeat_handler, not_found_handler, version_handler, whoami_handler,
};
use crate::api::middleware::{
    append_slash, received_at, remote_user, request_summary, security, static_files,
};
use crate::state::AppState;
use crate::utils::route_table::RouteTable;
use axum::routing::{MethodRouter, get};
use axum::{Router, middleware};
use tower_http::services::ServeDir;

/// Routes served by [`app_router`], excluding static files.
///
/// Both the router and [`route_table`] are built from this list.
pub fn endpoints() -> Vec<(&'static str, MethodRouter<AppState>)> {
    vec![
        ("/__lbheartbeat__", get(lbheartbeat_handler)),
        ("/__heartbeat__/", get(heartbeat_handler)),
        ("/__version__/", get(version_handler)),
        ("/api/v1/whoami/", get(whoami_handler)),
    ]
}

/// The paths of [`endpoints`] as a [`RouteTable`] for trailing-slash resolution.
pub fn route_table() -> RouteTable {
    RouteTable::new(endpoints().into_iter().map(|(path, _)| path))
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers and layers;
///   its route table should come from [`route_table`]
pub fn app_router(state: AppState) -> Router {
    let static_mount = state.config.static_url.trim_end_matches('/').to_string();

    let router = endpoints()
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| {
            router.route(path, handler)
        });

    router
        .nest_service(&static_mount, ServeDir::new(&state.config.static_root))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            remote_user::layer,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            append_slash::layer,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            static_files::layer,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), security::layer))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_summary::layer,
        ))
        .layer(middleware::from_fn(received_at::layer))
        .with_state(state)
}
