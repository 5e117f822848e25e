//! Fallback for unmatched routes.

use axum::http::Uri;
use serde_json::json;

use crate::error::AppError;

/// Answers `404 Not Found` with the standard error body.
///
/// Trailing-slash correction in [`crate::api::middleware::append_slash`]
/// runs on these responses.
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::not_found("Not found", json!({ "path": uri.path() }))
}
