//! Serve command for running the HTTP application.

use anyhow::{Context, Result};
use at_db::Database;
use at_server::AttendanceServer;

use crate::Config;

/// Runs the server until interrupted. `host` and `port` override the
/// configured values.
pub fn run(config: Config, db: Database, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut server_config = config.server;
    if let Some(host) = host {
        server_config.host = host;
    }
    if let Some(port) = port {
        server_config.port = port;
    }

    let sso = match config.sso {
        Some(sso) => Some(at_sso::Client::new(sso).context("invalid SSO configuration")?),
        None => {
            tracing::warn!("SSO is not configured; only password sign-in is available");
            None
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime
        .block_on(AttendanceServer::new(server_config, db, sso).serve())
        .context("server error")
}
