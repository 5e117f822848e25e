//! Domain layer: the records middleware attaches to requests and the
//! contracts for collaborators that resolve or consume them.
//!
//! # Modules
//!
//! - [`context`] - [`context::RequestContext`], per-request annotations
//! - [`user`] - Request identity and the [`user::UserDirectory`] contract
//! - [`summary`] - Access summary record and the [`summary::RequestSummarySink`] contract
//!
//! Implementations of the collaborator traits live in [`crate::infrastructure`].

pub mod context;
pub mod summary;
pub mod user;
