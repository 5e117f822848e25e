//! DTO for the identity endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::user::User;

/// The caller's identity as resolved by the middleware stack.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user: User,
    pub received_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
