//! Infrastructure layer for the collaborator contracts defined in [`crate::domain`].
//!
//! # Modules
//!
//! - [`summary`] - Access summary emission through `tracing`
//! - [`users`] - Process-local user directory

pub mod summary;
pub mod users;
