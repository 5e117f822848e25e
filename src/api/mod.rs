//! HTTP layer: middleware, responses, and the operational endpoints.
//!
//! # Modules
//!
//! - [`dto`] - Response bodies for the handlers
//! - [`handlers`] - Heartbeat, version and identity endpoints
//! - [`middleware`] - The middleware stack
//! - [`responses`] - Redirect response types

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod responses;
