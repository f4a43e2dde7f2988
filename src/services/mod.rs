//! Services module
//!
//! Business operations. Each service checks permissions through
//! `workflow`, applies transitions and persists through the repositories.

pub mod admin;
pub mod auth;
pub mod camp;
pub mod event;
pub mod inventory;
pub mod notification;
pub mod oauth;
pub mod organization;
pub mod redis;
pub mod tokens;
pub mod user;

pub use admin::AdminService;
pub use auth::{AuthService, LoginOutcome, RegisterRequest};
pub use camp::CampService;
pub use event::EventService;
pub use inventory::InventoryService;
pub use notification::{LogMailer, MailMessage, Mailer, NotificationService};
pub use oauth::{OAuthClient, OAuthService};
pub use organization::OrganizationService;
pub use redis::RedisService;
pub use tokens::{Claims, TokenKind, TokenManager, TokenPair};
pub use user::UserService;

use std::sync::Arc;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::middleware::{AuthMiddleware, RateLimitMiddleware};
use crate::models::OAuthProviderKind;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub oauth_service: OAuthService,
    pub user_service: UserService,
    pub event_service: EventService,
    pub camp_service: CampService,
    pub organization_service: OrganizationService,
    pub inventory_service: InventoryService,
    pub admin_service: AdminService,
    pub notification_service: NotificationService,
    pub redis_service: RedisService,
    pub rate_limiter: RateLimitMiddleware,
    db: DatabaseService,
}

impl ServiceFactory {
    pub fn new(settings: &Settings, db: DatabaseService, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let tokens = TokenManager::new(&settings.auth);
        let redis_service = RedisService::new(&settings.redis)?;
        let rate_limiter = RateLimitMiddleware::new(&settings.rate_limit)?;
        let notification_service = NotificationService::new(mailer, settings.mail.clone());

        let auth_service = AuthService::new(
            db.users.clone(),
            tokens.clone(),
            redis_service.clone(),
            rate_limiter.clone(),
            notification_service.clone(),
            settings.auth.clone(),
        );
        let oauth_service = OAuthService::new(
            OAuthClient::new(settings.oauth.clone())?,
            db.users.clone(),
            db.oauth.clone(),
            tokens,
        );

        Ok(Self {
            auth_service,
            oauth_service,
            user_service: UserService::new(db.clone()),
            event_service: EventService::new(db.clone()),
            camp_service: CampService::new(db.clone()),
            organization_service: OrganizationService::new(db.clone()),
            inventory_service: InventoryService::new(db.clone()),
            admin_service: AdminService::new(db.clone(), settings.auth.clone()),
            notification_service,
            redis_service,
            rate_limiter,
            db,
        })
    }

    /// Get authentication middleware
    pub fn auth_middleware(&self) -> AuthMiddleware {
        self.auth_service.create_auth_middleware()
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = self.db.health_check().await.is_ok();
        let redis_healthy = self.redis_service.health_check().await.unwrap_or(false);
        let client = self.oauth_service.client();

        ServiceHealthStatus {
            database_healthy,
            redis_healthy,
            google_enabled: client.is_enabled(OAuthProviderKind::Google),
            microsoft_enabled: client.is_enabled(OAuthProviderKind::Microsoft),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub redis_healthy: bool,
    pub google_enabled: bool,
    pub microsoft_enabled: bool,
}

impl ServiceHealthStatus {
    /// Database and Redis are both required
    pub fn is_healthy(&self) -> bool {
        self.database_healthy && self.redis_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.redis_healthy {
            issues.push("Redis connection failed".to_string());
        }

        issues
    }
}
