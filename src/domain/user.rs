//! Users identified by a trusted upstream header.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

/// The identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum User {
    Anonymous,
    Authenticated { id: i64, username: String },
}

impl User {
    pub fn id(&self) -> Option<i64> {
        match self {
            User::Authenticated { id, .. } => Some(*id),
            User::Anonymous => None,
        }
    }
}

/// Requests that passed through no identity layer are anonymous.
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<User>()
            .cloned()
            .unwrap_or(User::Anonymous))
    }
}

/// Errors raised by a [`UserDirectory`].
#[derive(Debug, thiserror::Error)]
pub enum UserDirectoryError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of users by the username an upstream proxy vouches for.
///
/// # Implementations
///
/// - [`crate::infrastructure::users::InMemoryUserDirectory`] - process-local directory
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the user with this username, creating it when unknown.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::EmptyUsername`] for an empty name, or
    /// [`UserDirectoryError::Unavailable`] when the backing store fails.
    async fn get_or_create(&self, username: &str) -> Result<User, UserDirectoryError>;
}
