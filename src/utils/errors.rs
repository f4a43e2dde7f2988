//! Error handling for CampHub
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for CampHub
#[derive(Error, Debug)]
pub enum CampHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Camp not found: {camp_id}")]
    CampNotFound { camp_id: i64 },

    #[error("Membership not found: camp {camp_id}, user {user_id}")]
    MembershipNotFound { camp_id: i64, user_id: i64 },

    #[error("Association not found: {0}")]
    AssociationNotFound(String),

    #[error("Cluster not found: {cluster_id}")]
    ClusterNotFound { cluster_id: i64 },

    #[error("Team not found: {team_id}")]
    TeamNotFound { team_id: i64 },

    #[error("Team member not found: team {team_id}, user {user_id}")]
    TeamMemberNotFound { team_id: i64, user_id: i64 },

    #[error("Inventory item not found: {item_id}")]
    InventoryItemNotFound { item_id: i64 },

    #[error("Registration not found: event {event_id}, user {user_id}")]
    RegistrationNotFound { event_id: i64, user_id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for CampHub operations
pub type Result<T> = std::result::Result<T, CampHubError>;

impl CampHubError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CampHubError::Redis(_)
                | CampHubError::Http(_)
                | CampHubError::Io(_)
                | CampHubError::RateLimitExceeded
                | CampHubError::ServiceUnavailable(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CampHubError::Database(_) => ErrorSeverity::Critical,
            CampHubError::Migration(_) => ErrorSeverity::Critical,
            CampHubError::Config(_) => ErrorSeverity::Critical,
            CampHubError::PermissionDenied(_) => ErrorSeverity::Warning,
            CampHubError::Authentication(_) => ErrorSeverity::Warning,
            CampHubError::RateLimitExceeded => ErrorSeverity::Warning,
            CampHubError::InvalidInput(_)
            | CampHubError::Conflict(_)
            | CampHubError::InvalidStateTransition { .. } => ErrorSeverity::Info,
            _ if self.is_not_found() => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// True for every "entity does not exist" variant
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CampHubError::UserNotFound { .. }
                | CampHubError::EventNotFound { .. }
                | CampHubError::CampNotFound { .. }
                | CampHubError::MembershipNotFound { .. }
                | CampHubError::AssociationNotFound(_)
                | CampHubError::ClusterNotFound { .. }
                | CampHubError::TeamNotFound { .. }
                | CampHubError::TeamMemberNotFound { .. }
                | CampHubError::InventoryItemNotFound { .. }
                | CampHubError::RegistrationNotFound { .. }
        )
    }

    /// Turn a unique-constraint violation into `Conflict(message)`. Any other
    /// database error stays a `Database` error.
    pub fn from_insert(err: sqlx::Error, message: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return CampHubError::Conflict(message.into());
            }
        }
        CampHubError::Database(err)
    }

    /// HTTP-style status hint for whatever surface wraps the services
    pub fn status_code(&self) -> u16 {
        match self {
            CampHubError::InvalidInput(_)
            | CampHubError::InvalidStateTransition { .. }
            | CampHubError::Conflict(_) => 400,
            CampHubError::Authentication(_) | CampHubError::Token(_) => 401,
            CampHubError::PermissionDenied(_) => 403,
            CampHubError::RateLimitExceeded => 429,
            CampHubError::ServiceUnavailable(_) => 503,
            _ if self.is_not_found() => 404,
            _ => 500,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CampHubError::CampNotFound { camp_id: 1 }.status_code(), 404);
        assert_eq!(CampHubError::PermissionDenied("no".into()).status_code(), 403);
        assert_eq!(CampHubError::Conflict("dup".into()).status_code(), 400);
        assert_eq!(
            CampHubError::InvalidStateTransition { from: "approved".into(), to: "approved".into() }.status_code(),
            400
        );
        assert_eq!(CampHubError::Authentication("bad".into()).status_code(), 401);
        assert_eq!(CampHubError::RateLimitExceeded.status_code(), 429);
        assert_eq!(CampHubError::Config("x".into()).status_code(), 500);
    }

    #[test]
    fn test_severity_and_recoverability() {
        assert_eq!(CampHubError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(CampHubError::TeamNotFound { team_id: 3 }.severity(), ErrorSeverity::Info);
        assert_eq!(CampHubError::RateLimitExceeded.severity(), ErrorSeverity::Warning);
        assert!(CampHubError::RateLimitExceeded.is_recoverable());
        assert!(!CampHubError::PermissionDenied("x".into()).is_recoverable());
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_from_insert_keeps_non_constraint_errors() {
        let err = CampHubError::from_insert(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, CampHubError::Database(sqlx::Error::RowNotFound)));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
