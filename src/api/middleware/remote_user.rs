//! Identity taken from a header set by a trusted authenticating proxy.

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use crate::config::{Config, ConfigError};
use crate::domain::context::RequestContext;
use crate::domain::user::User;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the request header to take the username from.
///
/// Read from [`Config::remote_auth_header`] rather than fixed, so each
/// deployment can match whatever its proxy sends.
pub fn header(config: &Config) -> Result<HeaderName, ConfigError> {
    config.remote_auth_header_name()
}

/// Resolves the request's [`User`] from the configured identity header.
///
/// # Resolution
///
/// - Header absent or empty: [`User::Anonymous`]
/// - Header present: the directory's user for that name, created if unknown
///
/// The user is recorded on the [`RequestContext`] (when present) and inserted
/// into the request extensions, where the [`User`] extractor finds it.
///
/// The header must only be reachable through a proxy that strips it from
/// client requests; this layer trusts it unconditionally.
///
/// # Errors
///
/// Returns `500 Internal Server Error` if the user directory fails.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let username = req
        .headers()
        .get(&st.remote_auth_header)
        .and_then(|v| match v.to_str() {
            Ok(s) => Some(s),
            Err(_) => {
                debug!(header = %st.remote_auth_header, "Ignoring non-ASCII remote user header");
                None
            }
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let user = match username {
        Some(username) => st
            .user_directory
            .get_or_create(&username)
            .await
            .map_err(|e| {
                error!("Failed to resolve remote user: {}", e);
                AppError::internal(
                    "Failed to resolve remote user",
                    serde_json::json!({ "reason": e.to_string() }),
                )
            })?,
        None => User::Anonymous,
    };

    if let Some(ctx) = req.extensions().get::<RequestContext>() {
        ctx.set_user(user.clone());
    }
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::MockRequestSummarySink;
    use crate::domain::user::{MockUserDirectory, UserDirectoryError};
    use crate::utils::route_table::RouteTable;
    use axum::{Json, Router, body::Body, http::StatusCode, middleware, routing::get};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(directory: MockUserDirectory, config: Config) -> Router {
        let st = AppState::with_collaborators(
            config,
            RouteTable::default(),
            Arc::new(MockRequestSummarySink::new()),
            Arc::new(directory),
        )
        .unwrap();

        Router::new()
            .route("/", get(|user: User| async move { Json(user) }))
            .layer(middleware::from_fn_with_state(st, layer))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_header_reads_config() {
        let config = Config {
            remote_auth_header: "HTTP_X_REMOTE_USER".to_string(),
            ..Config::default()
        };

        assert_eq!(header(&config).unwrap().as_str(), "x-remote-user");
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let mut directory = MockUserDirectory::new();
        directory.expect_get_or_create().times(0);

        let response = app(directory, Config::default())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["kind"], "anonymous");
    }

    #[tokio::test]
    async fn test_configured_header_resolves_user() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_get_or_create()
            .withf(|name| name == "alice@example.com")
            .times(1)
            .returning(|name| {
                Ok(User::Authenticated {
                    id: 3,
                    username: name.to_string(),
                })
            });

        let config = Config {
            remote_auth_header: "X-Remote-User".to_string(),
            ..Config::default()
        };

        let response = app(directory, config)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("X-Remote-User", "alice@example.com")
                    .header("OIDC-Claim-ID-Token-Email", "mallory@example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["kind"], "authenticated");
        assert_eq!(json["id"], 3);
        assert_eq!(json["username"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_directory_failure_is_internal_error() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_get_or_create()
            .times(1)
            .returning(|_| Err(UserDirectoryError::Unavailable("down".to_string())));

        let response = app(directory, Config::default())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("OIDC-Claim-ID-Token-Email", "alice@example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
