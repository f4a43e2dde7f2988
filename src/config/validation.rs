//! Configuration validation module
//! 
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{CampHubError, Result};
use super::Settings;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_auth_config(&settings.auth)?;
    validate_mail_config(&settings.mail)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    if settings.maintenance.cleanup_interval_seconds == 0 {
        return Err(CampHubError::Config(
            "Cleanup interval must be greater than 0".to_string()
        ));
    }

    if let Some(ref google) = settings.oauth.google {
        validate_oauth_client("google", google)?;
    }
    if let Some(ref microsoft) = settings.oauth.microsoft {
        validate_oauth_client("microsoft", microsoft)?;
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(CampHubError::Config(
            "Database URL is required".to_string()
        ));
    }
    
    if config.max_connections == 0 {
        return Err(CampHubError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }
    
    if config.min_connections > config.max_connections {
        return Err(CampHubError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }
    
    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(CampHubError::Config(
            "Redis URL is required".to_string()
        ));
    }
    
    Ok(())
}

fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(CampHubError::Config(format!(
            "JWT secret must be at least {} characters",
            MIN_JWT_SECRET_LENGTH
        )));
    }

    if config.access_token_ttl_seconds <= 0 || config.refresh_token_ttl_seconds <= 0 {
        return Err(CampHubError::Config(
            "Token lifetimes must be positive".to_string()
        ));
    }

    if config.refresh_token_ttl_seconds < config.access_token_ttl_seconds {
        return Err(CampHubError::Config(
            "Refresh token lifetime cannot be shorter than access token lifetime".to_string()
        ));
    }

    if config.min_password_length < 8 {
        return Err(CampHubError::Config(
            "Minimum password length cannot be below 8".to_string()
        ));
    }

    if config.verification_ttl_hours <= 0
        || config.password_reset_ttl_hours <= 0
        || config.email_change_ttl_hours <= 0
    {
        return Err(CampHubError::Config(
            "Email token lifetimes must be positive".to_string()
        ));
    }

    Ok(())
}

/// Validate OAuth provider configuration
fn validate_oauth_client(provider: &str, config: &super::OAuthClientConfig) -> Result<()> {
    if config.client_id.is_empty() || config.client_secret.is_empty() {
        return Err(CampHubError::Config(format!(
            "OAuth provider {} requires client_id and client_secret",
            provider
        )));
    }

    for (field, value) in [
        ("authorize_url", &config.authorize_url),
        ("userinfo_url", &config.userinfo_url),
        ("redirect_url", &config.redirect_url),
    ] {
        url::Url::parse(value).map_err(|e| {
            CampHubError::Config(format!("OAuth provider {} has invalid {}: {}", provider, field, e))
        })?;
    }

    Ok(())
}

fn validate_mail_config(config: &super::MailConfig) -> Result<()> {
    if config.from_address.is_empty() {
        return Err(CampHubError::Config(
            "Mail sender address is required".to_string()
        ));
    }

    url::Url::parse(&config.frontend_url)
        .map_err(|e| CampHubError::Config(format!("Invalid frontend URL: {}", e)))?;

    Ok(())
}

fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.login_attempts_per_minute == 0 || config.login_burst == 0 {
        return Err(CampHubError::Config(
            "Login rate limit values must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(CampHubError::Config(
            "Log level is required".to_string()
        ));
    }
    
    if config.directory.is_empty() {
        return Err(CampHubError::Config(
            "Log directory is required".to_string()
        ));
    }
    
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthClientConfig;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "x".repeat(40);
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut settings = valid_settings();
        settings.auth.jwt_secret = "short".to_string();
        assert!(matches!(validate_settings(&settings), Err(CampHubError::Config(_))));
    }

    #[test]
    fn test_connection_bounds() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_oauth_urls_checked() {
        let mut settings = valid_settings();
        let mut google = OAuthClientConfig::google("id", "secret", "http://localhost/cb");
        settings.oauth.google = Some(google.clone());
        assert!(validate_settings(&settings).is_ok());

        google.userinfo_url = "not a url".to_string();
        settings.oauth.google = Some(google);
        assert!(validate_settings(&settings).is_err());
    }
}
