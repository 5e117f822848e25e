//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod fallback;
pub mod health;
pub mod whoami;

pub use fallback::not_found_handler;
pub use health::{heartbeat_handler, lbheartbeat_handler, version_handler};
pub use whoami::whoami_handler;
