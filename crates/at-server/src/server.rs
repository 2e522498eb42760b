//! `AttendanceServer`: Axum HTTP server.

use std::sync::{Arc, Mutex, MutexGuard};

use at_db::Database;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::routes::{admin, attendance, auth};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    /// SSO client, when single sign-on is configured.
    pub sso: Option<at_sso::Client>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, sso: Option<at_sso::Client>, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            sso,
            config: Arc::new(config),
        }
    }

    /// Locks the database.
    ///
    /// Callers must drop the guard before awaiting.
    pub fn db(&self) -> Result<MutexGuard<'_, Database>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))
    }
}

/// The attendance server.
pub struct AttendanceServer {
    state: AppState,
}

impl AttendanceServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, db: Database, sso: Option<at_sso::Client>) -> Self {
        Self {
            state: AppState::new(db, sso, config),
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let redirect_path = self
            .state
            .sso
            .as_ref()
            .map_or_else(|| "/auth/redirect".to_string(), |sso| sso.config().redirect_path.clone());

        Router::new()
            .route("/", get(auth::index))
            .route("/login", post(auth::password_login).get(auth::sso_login))
            .route(&redirect_path, get(auth::sso_callback))
            .route("/logout", get(auth::logout))
            .route("/dashboard", get(attendance::dashboard))
            .route(
                "/attendance",
                post(attendance::record).get(attendance::own_log),
            )
            .route("/admin/users", get(admin::users))
            .route("/admin/logs/{employee_id}", get(admin::employee_log))
            .route("/health", get(health_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind and serve until Ctrl-C.
    pub async fn serve(self) -> std::io::Result<()> {
        let config = self.config().clone();
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            public_url = %config.public_base_url(),
            sso = self.state.sso.is_some(),
            "attendance server listening"
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// GET /health
async fn health_handler(State(_state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
