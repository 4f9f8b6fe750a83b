use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use user_records::DatabaseConfig;
use user_records::infra::storage::connect::redact;

/// Effective application configuration.
///
/// Layering: defaults, then the YAML file, then `APP__*` environment
/// variables (`__` separates nesting levels), then CLI overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub connection_strings: ConnectionStrings,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Serve the `OpenAPI` document at `/openapi.json`.
    pub openapi: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            openapi: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStrings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_connection: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `user_records=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    /// `0` leaves `Access-Control-Max-Age` unset.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec![
                "http://localhost:4200".to_owned(),
                "http://localhost:3000".to_owned(),
                "http://localhost:8000".to_owned(),
            ],
            allowed_methods: vec!["*".to_owned()],
            allowed_headers: vec!["*".to_owned()],
            allow_credentials: true,
            max_age_seconds: 0,
        }
    }
}

impl CorsConfig {
    /// # Errors
    /// Returns an error when a wildcard origin is combined with credentials.
    pub fn validate(&self) -> Result<()> {
        let wildcard_origin = self.allowed_origins.iter().any(|o| o == "*");
        if self.enabled && self.allow_credentials && wildcard_origin {
            anyhow::bail!(
                "cors.allowed_origins contains \"*\" while cors.allow_credentials is true; \
                 list explicit origins when credentials are allowed"
            );
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    /// Returns an error if the YAML file or an environment override cannot be
    /// parsed into the configuration schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed("APP__").split("__"));

        figment
            .extract()
            .context("failed to parse configuration (yaml file or APP__ environment)")
    }

    pub fn apply_cli_overrides(&mut self, port: Option<u16>, mock: bool) {
        if let Some(port) = port {
            self.server.port = port;
        }
        if mock {
            self.connection_strings.default_connection = Some("sqlite::memory:".to_owned());
            self.database.dsn = None;
        }
    }

    /// Database settings with the DSN resolved.
    ///
    /// An explicit `database.dsn` wins over `connection_strings.default_connection`.
    #[must_use]
    pub fn connection_info(&self) -> DatabaseConfig {
        let mut db = self.database.clone();
        if db.dsn.as_deref().is_none_or(|d| d.trim().is_empty()) {
            db.dsn.clone_from(&self.connection_strings.default_connection);
        }
        db
    }

    /// # Errors
    /// Returns an error if no connection string is configured or the CORS
    /// policy is invalid.
    pub fn validate(&self) -> Result<()> {
        let db = self.connection_info();
        if db.dsn.as_deref().is_none_or(|d| d.trim().is_empty()) {
            anyhow::bail!(
                "no database connection string: set connection_strings.default_connection \
                 (or APP__CONNECTION_STRINGS__DEFAULT_CONNECTION)"
            );
        }
        self.cors.validate()
    }

    /// Pretty JSON with credentials stripped from every connection string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut shown = self.clone();
        for dsn in [
            &mut shown.connection_strings.default_connection,
            &mut shown.database.dsn,
        ]
        .into_iter()
        .flatten()
        {
            *dsn = redact(dsn.as_str());
        }
        serde_json::to_string_pretty(&shown).context("failed to serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_sensible() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.server.openapi);
        assert!(cfg.connection_strings.default_connection.is_none());
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.cors.allowed_origins.len(), 3);
        assert!(cfg.cors.allow_credentials);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn yaml_and_env_are_layered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "app.yaml",
                r#"
server:
  port: 9000
connection_strings:
  default_connection: "sqlite://data/records.db"
database:
  retry:
    max_retries: 2
logging:
  format: json
"#,
            )?;
            jail.set_env("APP__SERVER__PORT", "9100");

            let cfg = AppConfig::load(Some(Path::new("app.yaml"))).map_err(|e| e.to_string())?;

            assert_eq!(cfg.server.port, 9100);
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(cfg.database.retry.max_retries, 2);
            assert_eq!(
                cfg.connection_info().dsn.as_deref(),
                Some("sqlite://data/records.db")
            );
            Ok(())
        });
    }

    #[test]
    fn connection_string_can_come_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("APP__CONNECTION_STRINGS__DEFAULT_CONNECTION", "sqlite::memory:");

            let cfg = AppConfig::load(None).map_err(|e| e.to_string())?;

            assert!(cfg.validate().is_ok());
            assert_eq!(cfg.connection_info().dsn.as_deref(), Some("sqlite::memory:"));
            Ok(())
        });
    }

    #[test]
    fn explicit_database_dsn_wins() {
        let mut cfg = AppConfig::default();
        cfg.connection_strings.default_connection = Some("sqlite://a.db".to_owned());
        cfg.database.dsn = Some("sqlite://b.db".to_owned());

        assert_eq!(cfg.connection_info().dsn.as_deref(), Some("sqlite://b.db"));
    }

    #[test]
    fn cli_overrides_apply_last() {
        let mut cfg = AppConfig::default();
        cfg.database.dsn = Some("postgres://db/records".to_owned());

        cfg.apply_cli_overrides(Some(7000), true);

        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.connection_info().dsn.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn wildcard_origin_with_credentials_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.connection_strings.default_connection = Some("sqlite::memory:".to_owned());
        cfg.cors.allowed_origins = vec!["*".to_owned()];

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("allow_credentials"));

        cfg.cors.allow_credentials = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn printed_config_hides_credentials() {
        let mut cfg = AppConfig::default();
        cfg.connection_strings.default_connection =
            Some("postgres://app:s3cret@db:5432/records".to_owned());
        cfg.database.dsn = Some("postgresql://admin:hunter2@db/records".to_owned());

        let json = cfg.to_json().unwrap();

        assert!(!json.contains("s3cret"));
        assert!(!json.contains("hunter2"));
        assert!(json.contains("postgres://***@db:5432/records"));
        assert!(json.contains("postgresql://***@db/records"));
        assert_eq!(
            cfg.database.dsn.as_deref(),
            Some("postgresql://admin:hunter2@db/records")
        );
    }

    #[test]
    fn unknown_database_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "database:\n  servers: {}\n")?;

            assert!(AppConfig::load(Some(Path::new("bad.yaml"))).is_err());
            Ok(())
        });
    }
}
