//! Helpers shared by the middleware layers.
//!
//! - [`cache_control`] - Merging `Cache-Control` directives into responses
//! - [`request_meta`] - Header maps in CGI meta form, request host and full path
//! - [`route_table`] - Route patterns for trailing-slash resolution

pub mod cache_control;
pub mod request_meta;
pub mod route_table;
