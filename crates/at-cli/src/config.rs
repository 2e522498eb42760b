//! Configuration loading and management.

use std::path::{Path, PathBuf};

use at_server::ServerConfig;
use at_sso::SsoConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// The SSO client secret is redacted in `Debug` output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Single sign-on settings. SSO routes answer 503 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso: Option<SsoConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("attendance.db"),
            server: ServerConfig::default(),
            sso: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources override earlier ones: defaults, the user config file,
    /// `config_path`, then `AT_*` environment variables (`__` separates
    /// nested keys, e.g. `AT_SSO__CLIENT_ID`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (AT_*)
        figment = figment.merge(Env::prefixed("AT_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for at.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("at"))
}

/// Returns the platform-specific data directory for at.
///
/// On Linux: `~/.local/share/at`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("at"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_at() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "at");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("attendance.db"));
        assert_eq!(config.server, ServerConfig::default());
        assert!(config.sso.is_none());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
database_path = "/tmp/custom.db"

[server]
host = "0.0.0.0"
port = 9000

[sso]
client_id = "client"
client_secret = "very-secret"
tenant_id = "tenant"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);

        let sso = config.sso.clone().unwrap();
        assert_eq!(sso.client_id, "client");
        assert_eq!(sso.redirect_path, "/auth/redirect");

        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
    }
}
