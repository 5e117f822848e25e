//! HTTP middleware for request annotation, identity, caching and redirects.
//!
//! Listed from outermost to innermost, as mounted by [`crate::routes::app_router`]:
//!
//! - [`received_at`] - Request timestamp and [`crate::domain::context::RequestContext`]
//! - [`request_summary`] - Access summary logging
//! - [`security`] - HTTP to HTTPS upgrade redirects
//! - [`static_files`] - Static file cache headers
//! - [`append_slash`] - Trailing-slash redirects
//! - [`remote_user`] - Identity from a trusted proxy header

pub mod append_slash;
pub mod received_at;
pub mod remote_user;
pub mod request_summary;
pub mod security;
pub mod static_files;
