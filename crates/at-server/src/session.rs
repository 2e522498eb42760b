//! Per-request session resolution.
//!
//! The bearer token is resolved to a [`Principal`] before the handler body
//! runs, so handlers receive the caller explicitly instead of looking it up.

use at_core::{Capability, Principal, authorize};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::ApiError;
use crate::server::AppState;

/// The caller's session, if they presented a valid one.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Token presented with the request, valid or not.
    pub token: Option<String>,
    /// The employee the token resolved to.
    pub principal: Option<Principal>,
}

impl Session {
    /// Returns the principal if it holds `capability`.
    pub fn require(&self, capability: Capability) -> Result<&Principal, ApiError> {
        authorize(self.principal.as_ref(), capability)
            .map_err(|denial| ApiError::from_denial(denial, capability))
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Self::default());
        };
        let principal = state.db()?.resolve_session(&token)?;
        if principal.is_none() {
            tracing::debug!("presented session token is not recognized");
        }
        Ok(Self {
            token: Some(token),
            principal,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}
