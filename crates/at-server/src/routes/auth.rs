//! Sign-in and sign-out.

use at_core::Email;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;
use crate::session::Session;
use crate::views::SignedIn;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// GET /: signed-in callers go to their landing view.
pub async fn index(session: Session) -> Response {
    match session.principal {
        Some(principal) => Redirect::to(principal.role.landing_path()).into_response(),
        None => Json(json!({
            "login": {
                "password": "POST /login",
                "sso": "GET /login",
            }
        }))
        .into_response(),
    }
}

/// POST /login: email and password.
pub async fn password_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<SignedIn>, ApiError> {
    let db = state.db()?;
    if let Some(token) = &session.token {
        db.delete_session(token)?;
    }

    let Ok(email) = Email::new(form.email) else {
        return Err(ApiError::InvalidCredentials);
    };
    let Some(employee) = db.verify_credentials(&email, &form.password)? else {
        tracing::warn!(%email, "rejected password login");
        return Err(ApiError::InvalidCredentials);
    };

    let token = db.create_session(employee.id)?;
    tracing::info!(employee_id = %employee.id, role = %employee.role, "signed in with password");
    Ok(Json(SignedIn {
        token,
        landing: employee.role.landing_path().to_string(),
    }))
}

/// GET /login: start the SSO flow.
pub async fn sso_login(State(state): State<AppState>, session: Session) -> Result<Redirect, ApiError> {
    if let Some(token) = &session.token {
        state.db()?.delete_session(token)?;
    }
    let sso = state.sso.as_ref().ok_or(ApiError::SsoUnavailable)?;
    let url = sso
        .authorization_url(&redirect_uri(&state, sso))
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Redirect::to(url.as_str()))
}

/// GET {redirect path}: the identity platform sends the employee back here.
pub async fn sso_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<SignedIn>, ApiError> {
    let sso = state.sso.as_ref().ok_or(ApiError::SsoUnavailable)?;
    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        return Err(ApiError::AuthorizationFailed);
    };

    let profile = sso
        .sign_in(&code, &redirect_uri(&state, sso))
        .await
        .map_err(ApiError::TokenExchange)?;

    let db = state.db()?;
    let employee = db.find_or_create_sso_employee(&profile.email, &profile.name)?;
    let token = db.create_session(employee.id)?;
    tracing::info!(employee_id = %employee.id, role = %employee.role, "signed in with SSO");
    Ok(Json(SignedIn {
        token,
        landing: employee.role.landing_path().to_string(),
    }))
}

/// GET /logout: end the session and sign out of the identity platform.
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect, ApiError> {
    if let Some(token) = &session.token {
        state.db()?.delete_session(token)?;
    }
    let home = format!("{}/", state.config.public_base_url());
    let url = at_sso::logout_url(&home).map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Redirect::to(url.as_str()))
}

fn redirect_uri(state: &AppState, sso: &at_sso::Client) -> String {
    format!("{}{}", state.config.public_base_url(), sso.config().redirect_path)
}
