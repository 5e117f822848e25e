//! Handler reporting what the middleware stack knows about the caller.

use axum::Json;

use crate::api::dto::whoami::WhoAmIResponse;
use crate::domain::context::RequestContext;
use crate::domain::user::User;
use crate::error::AppError;

/// Returns the resolved user and the request's arrival time.
///
/// # Endpoint
///
/// `GET /api/v1/whoami/`
///
/// # Errors
///
/// Returns `500 Internal Server Error` if the request context layer is not mounted.
pub async fn whoami_handler(
    context: RequestContext,
    user: User,
) -> Result<Json<WhoAmIResponse>, AppError> {
    Ok(Json(WhoAmIResponse {
        user,
        received_at: context.received_at(),
        request_id: context.request_id().map(str::to_string),
    }))
}
