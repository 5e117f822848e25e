//! # Recipe Edge
//!
//! The HTTP edge of the recipe server: an axum middleware stack that handles
//! the cross-cutting concerns every request passes through.
//!
//! ## Middleware
//!
//! - **Received at** - stamps each request with its arrival time
//! - **Request summary** - one structured access summary per request
//! - **Remote user** - identity from a header set by an authenticating proxy,
//!   with the header name taken from configuration
//! - **Static files** - cache-forever headers for content-hashed file names
//! - **Append slash** - cacheable permanent redirects to slash-terminated routes
//! - **Security** - cacheable HTTP to HTTPS redirects, each logged at `DEBUG`
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Request context, users, summaries and collaborator traits
//! - **Infrastructure Layer** ([`infrastructure`]) - Collaborator implementations
//! - **API Layer** ([`api`]) - Middleware, responses, handlers and DTOs
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod logging;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::api::responses::{CachedPermanentRedirect, PermanentRedirect};
    pub use crate::config::Config;
    pub use crate::domain::context::RequestContext;
    pub use crate::domain::summary::{RequestSummary, RequestSummarySink};
    pub use crate::domain::user::{User, UserDirectory};
    pub use crate::error::AppError;
    pub use crate::routes::{app_router, route_table};
    pub use crate::state::AppState;
}
