//! Request failures and their HTTP responses.

use at_core::{Capability, Denial};
use at_db::DbError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Everything a handler can answer with other than success.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A JSON endpoint was called without a session.
    #[error("unauthorized")]
    Unauthorized,
    /// Email/password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The SSO callback arrived without an authorization code.
    #[error("authorization failed")]
    AuthorizationFailed,
    /// The identity platform would not issue a token or profile.
    #[error("failed to acquire access token: {0}")]
    TokenExchange(#[source] at_sso::SsoError),
    /// SSO is not configured on this server.
    #[error("single sign-on is not configured")]
    SsoUnavailable,
    /// The caller belongs on another view.
    #[error("redirect to {0}")]
    Redirect(String),
    /// Signed in, but not allowed here.
    #[error("forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Maps an authorization denial for `capability` to a response.
    ///
    /// Anonymous callers of views are sent to the index; anonymous punches get
    /// a 401 since they come from scripts rather than browsers.
    pub fn from_denial(denial: Denial, capability: Capability) -> Self {
        match denial {
            Denial::NotSignedIn if capability == Capability::RecordPunch => Self::Unauthorized,
            Denial::NotSignedIn => Self::Redirect("/".to_string()),
            Denial::WrongLanding(path) => Self::Redirect(path.to_string()),
            Denial::Forbidden => Self::Forbidden,
        }
    }
}

// Extractor rejections become errors only after the session check, so the
// handlers take `Result<Extractor, Rejection>` and convert here.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Unauthorized" })),
            )
                .into_response(),
            Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
            }
            Self::AuthorizationFailed => {
                (StatusCode::UNAUTHORIZED, "Authorization failed.").into_response()
            }
            Self::TokenExchange(err) => {
                tracing::warn!(error = %err, "SSO sign-in failed");
                (StatusCode::UNAUTHORIZED, "Failed to acquire access token.").into_response()
            }
            Self::SsoUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "Single sign-on is not configured" })),
            )
                .into_response(),
            Self::Redirect(path) => Redirect::to(&path).into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "Forbidden" })),
            )
                .into_response(),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("{what} not found") })),
            )
                .into_response(),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                internal_error()
            }
            Self::Internal(message) => {
                tracing::error!(%message, "internal error");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal server error" })),
    )
        .into_response()
}
