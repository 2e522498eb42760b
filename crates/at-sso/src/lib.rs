//! Microsoft identity platform sign-in for the attendance tracker.
//!
//! Provides the pieces of the OAuth 2.0 authorization code flow that the
//! server needs:
//! - Building the authorization URL employees are redirected to
//! - Exchanging the returned code for an access token
//! - Reading the signed-in user's profile from Microsoft Graph

use std::fmt;
use std::time::Duration;

use at_core::Email;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for identity platform calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const GRAPH_ME_URL: &str = "https://graph.microsoft.com/v1.0/me";
const LOGOUT_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/logout";
const SCOPE: &str = "User.Read";
const DEFAULT_DISPLAY_NAME: &str = "No Name";

/// SSO client errors.
#[derive(Debug, Error)]
pub enum SsoError {
    /// A required setting was missing or blank.
    #[error("invalid SSO configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The identity platform returned an error response.
    #[error("identity platform error: {message}")]
    Api { message: String },
    /// Failed to parse a response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Application registration settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SsoConfig {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    /// Path the identity platform redirects back to.
    #[serde(default = "default_redirect_path")]
    pub redirect_path: String,
}

fn default_redirect_path() -> String {
    "/auth/redirect".to_string()
}

impl fmt::Debug for SsoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("tenant_id", &self.tenant_id)
            .field("redirect_path", &self.redirect_path)
            .finish()
    }
}

/// An access token for Microsoft Graph.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The signed-in user's identity, as reported by Microsoft Graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoProfile {
    pub email: Email,
    pub name: String,
}

/// Identity platform client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: SsoConfig,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for an application registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client id, secret or tenant id is blank, or if
    /// the HTTP client fails to build.
    pub fn new(config: SsoConfig) -> Result<Self, SsoError> {
        if config.client_id.trim().is_empty() {
            return Err(SsoError::InvalidConfig {
                reason: "client id cannot be empty",
            });
        }
        if config.client_secret.trim().is_empty() {
            return Err(SsoError::InvalidConfig {
                reason: "client secret cannot be empty",
            });
        }
        if config.tenant_id.trim().is_empty() {
            return Err(SsoError::InvalidConfig {
                reason: "tenant id cannot be empty",
            });
        }
        if !config.redirect_path.starts_with('/') || config.redirect_path.len() < 2 {
            return Err(SsoError::InvalidConfig {
                reason: "redirect path must be an absolute path",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(SsoError::ClientBuild)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SsoConfig {
        &self.config
    }

    fn authority(&self) -> String {
        format!("{LOGIN_BASE_URL}/{}/oauth2/v2.0", self.config.tenant_id)
    }

    /// URL that starts the sign-in flow.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<Url, SsoError> {
        let base = format!("{}/authorize", self.authority());
        Url::parse_with_params(
            &base,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("response_mode", "query"),
                ("scope", SCOPE),
            ],
        )
        .map_err(|err| SsoError::InvalidResponse(format!("bad authorization url: {err}")))
    }

    /// Exchanges an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, SsoError> {
        let response = self
            .http
            .post(format!("{}/token", self.authority()))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("scope", SCOPE),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let payload: TokenResponse = serde_json::from_str(&body).map_err(|err| {
            if status.is_success() {
                SsoError::InvalidResponse(err.to_string())
            } else {
                SsoError::Api {
                    message: format!("status {status}: {body}"),
                }
            }
        })?;
        payload.into_token()
    }

    /// Reads the signed-in user's profile.
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<SsoProfile, SsoError> {
        let response = self
            .http
            .get(GRAPH_ME_URL)
            .bearer_auth(token.secret())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SsoError::Api {
                message: format!("status {status}: {body}"),
            });
        }
        let user: GraphUser = serde_json::from_str(&body)
            .map_err(|err| SsoError::InvalidResponse(err.to_string()))?;
        user.into_profile()
    }

    /// Runs the code exchange and profile lookup.
    pub async fn sign_in(&self, code: &str, redirect_uri: &str) -> Result<SsoProfile, SsoError> {
        let token = self.exchange_code(code, redirect_uri).await?;
        self.fetch_profile(&token).await
    }
}

/// URL that signs the user out of the identity platform and then returns them
/// to `post_logout_redirect_uri`.
pub fn logout_url(post_logout_redirect_uri: &str) -> Result<Url, SsoError> {
    Url::parse_with_params(
        LOGOUT_URL,
        &[("post_logout_redirect_uri", post_logout_redirect_uri)],
    )
    .map_err(|err| SsoError::InvalidResponse(format!("bad logout url: {err}")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Result<AccessToken, SsoError> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken(token)),
            _ => Err(SsoError::Api {
                message: self
                    .error_description
                    .or(self.error)
                    .unwrap_or_else(|| "no access token in response".to_string()),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    mail: Option<String>,
    user_principal_name: Option<String>,
    display_name: Option<String>,
}

impl GraphUser {
    fn into_profile(self) -> Result<SsoProfile, SsoError> {
        let address = self
            .mail
            .filter(|mail| !mail.trim().is_empty())
            .or(self.user_principal_name)
            .ok_or_else(|| SsoError::InvalidResponse("profile has no email".to_string()))?;
        let email =
            Email::new(address).map_err(|err| SsoError::InvalidResponse(err.to_string()))?;
        let name = self
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
        Ok(SsoProfile { email, name })
    }
}
