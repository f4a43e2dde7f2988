//! Application settings management
//! 
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub oauth: OAuthConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    pub maintenance: MaintenanceConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
}

/// Token and password settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub min_password_length: usize,
    pub verification_ttl_hours: i64,
    pub password_reset_ttl_hours: i64,
    pub email_change_ttl_hours: i64,
    /// Emails promoted to global admin on startup
    pub bootstrap_admin_emails: Vec<String>,
}

/// OAuth providers; each is optional
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OAuthConfig {
    pub google: Option<OAuthClientConfig>,
    pub microsoft: Option<OAuthClientConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub userinfo_url: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
}

/// Outgoing mail settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    pub from_address: String,
    pub frontend_url: String,
}

/// Login throttling
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub login_attempts_per_minute: u32,
    pub login_burst: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

/// Background maintenance loop
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub cleanup_interval_seconds: u64,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    ///
    /// Environment variables use the `CAMPHUB__` prefix with `__` between
    /// nested keys, e.g. `CAMPHUB__DATABASE__URL`.
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("CAMPHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.bootstrap_admin_emails")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Parse settings from a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, crate::utils::errors::CampHubError> {
        toml::from_str(raw)
            .map_err(|e| crate::utils::errors::CampHubError::Config(format!("Invalid TOML: {}", e)))
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::CampHubError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            auth: AuthConfig::default(),
            oauth: OAuthConfig::default(),
            mail: MailConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/camphub".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            prefix: "camphub:".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_seconds: 7 * 24 * 3600,
            min_password_length: 8,
            verification_ttl_hours: 24,
            password_reset_ttl_hours: 1,
            email_change_ttl_hours: 24,
            bootstrap_admin_emails: vec![],
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: "noreply@camphub.local".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_attempts_per_minute: 10,
            login_burst: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_prefix: "camphub.log".to_string(),
            json: false,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: 3600,
        }
    }
}

impl OAuthClientConfig {
    /// Google endpoints with the given client credentials
    pub fn google(client_id: &str, client_secret: &str, redirect_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            redirect_url: redirect_url.to_string(),
            scopes: vec!["openid".to_string(), "email".to_string(), "profile".to_string()],
        }
    }

    /// Microsoft identity platform endpoints with the given client credentials
    pub fn microsoft(client_id: &str, client_secret: &str, redirect_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            authorize_url: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize".to_string(),
            userinfo_url: "https://graph.microsoft.com/v1.0/me".to_string(),
            redirect_url: redirect_url.to_string(),
            scopes: vec!["openid".to_string(), "email".to_string(), "profile".to_string(), "User.Read".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.auth.access_token_ttl_seconds, 3600);
        assert_eq!(settings.auth.refresh_token_ttl_seconds, 604800);
        assert_eq!(settings.auth.password_reset_ttl_hours, 1);
        assert!(settings.oauth.google.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [auth]
            jwt_secret = "a-very-long-secret-used-only-in-tests"
            access_token_ttl_seconds = 600

            [oauth.google]
            client_id = "id"
            client_secret = "secret"
            authorize_url = "https://accounts.example.com/auth"
            userinfo_url = "https://accounts.example.com/userinfo"
            redirect_url = "http://localhost:3000/callback"
            scopes = ["openid", "email"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.auth.access_token_ttl_seconds, 600);
        assert_eq!(settings.auth.refresh_token_ttl_seconds, 604800);
        assert!(settings.auth.bootstrap_admin_emails.is_empty());
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.oauth.google.unwrap().client_id, "id");
        assert!(settings.oauth.microsoft.is_none());
    }
}
