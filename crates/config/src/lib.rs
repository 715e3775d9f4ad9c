//! Configuration management for pulse

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main pulse configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Service configuration
    pub service: ServiceConfig,

    /// Authentication settings
    pub auth: AuthConfig,

    /// Ingestion gateway settings
    pub ingest: IngestConfig,

    /// Session connector settings
    pub session: SessionSettings,

    /// Observability settings
    pub observability: ObservabilityConfig,
}

impl PulseConfig {
    /// Load configuration from file and environment
    ///
    /// Environment variables are prefixed with `PULSE_` and nested with
    /// `__`, e.g. `PULSE_SERVICE__PORT=9000`.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed("PULSE_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.service.port == 0 {
            return Err(ConfigError::ValidationError(
                "Invalid service port".to_string(),
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT secret required".to_string(),
            ));
        }

        if self.auth.token_ttl_hours == 0 {
            return Err(ConfigError::ValidationError(
                "Token TTL must be greater than 0".to_string(),
            ));
        }

        if self.ingest.max_append_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_append_attempts must be greater than 0".to_string(),
            ));
        }

        if self.session.heartbeat_interval_secs == 0 || self.session.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Session timer periods must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "pulse".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// Authentication settings
///
/// The identity provider is a fixed contract: one admin identity whose
/// credentials come from configuration, and HS256 bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub token_ttl_hours: u64,

    /// Admin login email
    pub admin_email: String,

    /// Admin login password
    pub admin_password: String,

    /// Admin display name
    pub admin_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "your-secret-key".to_string(),
            token_ttl_hours: 24,
            admin_email: "admin@dashboard.com".to_string(),
            admin_password: "admin123".to_string(),
            admin_name: "Admin User".to_string(),
        }
    }
}

/// Ingestion gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Channel data-changed signals are published to
    pub channel: String,

    /// Total append attempts before a transient store failure surfaces
    pub max_append_attempts: u32,

    /// Backoff between append attempts in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            channel: "dashboard".to_string(),
            max_append_attempts: 3,
            retry_backoff_ms: 50,
        }
    }
}

/// Session connector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Heartbeat period in seconds
    pub heartbeat_interval_secs: u64,

    /// Data refresh period in seconds
    pub refresh_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 30,
            refresh_interval_secs: 30,
        }
    }
}

/// Observability settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// tracing env-filter directive, e.g. `info` or `pulse=debug,info`
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PulseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.service.port, 3000);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.ingest.channel, "dashboard");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PulseConfig::default();
        config.service.port = 0;
        assert!(config.validate().is_err());

        let mut config = PulseConfig::default();
        config.auth.jwt_secret = String::new();
        assert!(config.validate().is_err());

        let mut config = PulseConfig::default();
        config.session.refresh_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PULSE_SERVICE__PORT", "9000");
            jail.set_env("PULSE_AUTH__JWT_SECRET", "env-secret");

            let config = PulseConfig::load(None).expect("load");
            assert_eq!(config.service.port, 9000);
            assert_eq!(config.auth.jwt_secret, "env-secret");
            // Untouched sections keep their defaults.
            assert_eq!(config.session.heartbeat_interval_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_layering() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "pulse.yaml",
                r#"
service:
  port: 8080
auth:
  admin_email: ops@example.com
"#,
            )?;
            jail.set_env("PULSE_SERVICE__PORT", "9000");

            let config = PulseConfig::load(Some("pulse.yaml".into())).expect("load");
            // Env wins over file; file wins over defaults.
            assert_eq!(config.service.port, 9000);
            assert_eq!(config.auth.admin_email, "ops@example.com");
            Ok(())
        });
    }
}
