//! Custom error types for the bridge service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use garmin_connect_client::GarminError;
use thiserror::Error;

/// Failure of the authenticate operation.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("connection to provider failed: {0}")]
    ConnectionFailed(String),

    #[error("credentials rejected: {0}")]
    Rejected(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// Anything outside the three expected login failures.
    #[error("unexpected provider error: {0}")]
    Unexpected(#[source] GarminError),
}

impl From<GarminError> for AuthError {
    fn from(err: GarminError) -> Self {
        match err {
            GarminError::Connection(msg) => AuthError::ConnectionFailed(msg),
            GarminError::Http(e) => AuthError::ConnectionFailed(e.to_string()),
            // Any other HTTP status from the SSO flow is a failed exchange
            // with the provider, not a fault in this service.
            GarminError::Api { status, body } => {
                AuthError::ConnectionFailed(format!("provider returned {status}: {body}"))
            }
            GarminError::Authentication(msg) => AuthError::Rejected(msg),
            GarminError::TooManyRequests(msg) => AuthError::RateLimited(msg),
            other => AuthError::Unexpected(other),
        }
    }
}

/// Failure of an activity query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no authenticated session")]
    NoSession,

    #[error("upstream error: {0}")]
    Upstream(#[from] GarminError),

    #[error("mapping error at record {index}: {source}")]
    Mapping {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup and configuration errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Client error: {0}")]
    Client(#[from] GarminError),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced on the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ConnectionFailed(_) | AuthError::Rejected(_) | AuthError::RateLimited(_) => {
                ApiError::Unauthorized
            }
            AuthError::Unexpected(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"detail": "Authentication failed"})),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"detail": "Internal Server Error"})),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_from_provider_errors() {
        assert!(matches!(
            AuthError::from(GarminError::Connection("refused".into())),
            AuthError::ConnectionFailed(_)
        ));
        assert!(matches!(
            AuthError::from(GarminError::Authentication("bad".into())),
            AuthError::Rejected(_)
        ));
        assert!(matches!(
            AuthError::from(GarminError::TooManyRequests("429".into())),
            AuthError::RateLimited(_)
        ));
        assert!(matches!(
            AuthError::from(GarminError::Api {
                status: 502,
                body: "bad gateway".into()
            }),
            AuthError::ConnectionFailed(_)
        ));
        assert!(matches!(
            AuthError::from(GarminError::Decode("html".into())),
            AuthError::Unexpected(_)
        ));
    }

    #[test]
    fn provider_client_errors_during_login_are_unauthorized() {
        for status in [400, 404, 409] {
            let err = AuthError::from(GarminError::Api {
                status,
                body: "bad request".into(),
            });
            assert!(matches!(err, AuthError::ConnectionFailed(_)), "{status}");
            let resp = ApiError::from(err).into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn api_error_status_codes() {
        let rejected = ApiError::from(AuthError::Rejected("x".into())).into_response();
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
        let limited = ApiError::from(AuthError::RateLimited("x".into())).into_response();
        assert_eq!(limited.status(), StatusCode::UNAUTHORIZED);
        let unexpected =
            ApiError::from(AuthError::Unexpected(GarminError::Decode("x".into()))).into_response();
        assert_eq!(unexpected.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
