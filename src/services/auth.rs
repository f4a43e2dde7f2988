//! Authentication service implementation
//!
//! Password accounts end to end: registration with email verification,
//! rate-limited login, access/refresh tokens with Redis-backed logout,
//! password reset and email change.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::database::repositories::{NewUser, UserRepository};
use crate::middleware::{AuthMiddleware, RateLimitMiddleware};
use crate::models::{User, UserRole};
use crate::services::notification::NotificationService;
use crate::services::redis::RedisService;
use crate::services::tokens::{TokenKind, TokenManager, TokenPair};
use crate::utils::errors::{CampHubError, Result};
use crate::utils::helpers::{generate_token, is_expired, normalize_email, trim_to_option};
use crate::utils::logging::log_user_action;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::{max_length, validate_email, validate_password, MAX_NAME_LENGTH};
use crate::workflow::Actor;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Clone, Debug)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenManager,
    redis: RedisService,
    rate_limiter: RateLimitMiddleware,
    notifications: NotificationService,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        tokens: TokenManager,
        redis: RedisService,
        rate_limiter: RateLimitMiddleware,
        notifications: NotificationService,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            redis,
            rate_limiter,
            notifications,
            config,
        }
    }

    pub fn create_auth_middleware(&self) -> AuthMiddleware {
        AuthMiddleware::new(self.tokens.clone(), self.users.clone())
    }

    /// Create an unverified password account and mail the verification link
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password, self.config.min_password_length)?;
        max_length("Name", request.name.as_deref(), MAX_NAME_LENGTH)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CampHubError::Conflict("Email already registered".to_string()));
        }

        let token = generate_token();
        let user = self
            .users
            .create(NewUser {
                email,
                name: trim_to_option(request.name.as_deref()),
                first_name: None,
                last_name: None,
                picture: None,
                password_hash: Some(hash_password(&request.password)?),
                role: UserRole::Member,
                email_verified: false,
                verification_token: Some(token.clone()),
            })
            .await?;

        self.notifications
            .send_verification(&user, &token, self.config.verification_ttl_hours)?;

        info!(user_id = user.id, email = %user.email, "User registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = normalize_email(email);
        self.rate_limiter.check(&email)?;

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                debug!(email = %email, "Login for unknown email");
                return Err(CampHubError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        let password_ok = match user.password_hash.as_deref() {
            Some(hash) => verify_password(password, hash)?,
            None => false,
        };
        if !password_ok {
            warn!(user_id = user.id, "Failed login attempt");
            return Err(CampHubError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        if !user.email_verified {
            return Err(CampHubError::Authentication(
                "Please verify your email address before logging in".to_string(),
            ));
        }
        if !user.is_active {
            return Err(CampHubError::PermissionDenied("Account is suspended".to_string()));
        }

        self.users.update_last_login(user.id).await?;
        let tokens = self.tokens.issue_pair(user.id, user.role)?;

        log_user_action(user.id, "login", None);
        Ok(LoginOutcome { user, tokens })
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;

        if self.redis.is_token_revoked(&claims.jti).await? {
            return Err(CampHubError::Authentication("Token has been revoked".to_string()));
        }

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| CampHubError::Authentication("Unknown user".to_string()))?;
        if !user.is_active {
            return Err(CampHubError::PermissionDenied("Account is suspended".to_string()));
        }

        self.tokens.issue_access(user.id, user.role)
    }

    /// Revoke the refresh token until it would have expired anyway
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let remaining = (claims.exp - Utc::now().timestamp()).max(0) as u64;
        self.redis.revoke_token(&claims.jti, remaining).await?;

        log_user_action(claims.sub, "logout", None);
        Ok(())
    }

    pub async fn authenticate(&self, access_token: &str) -> Result<Actor> {
        self.create_auth_middleware().authenticate(access_token).await
    }

    pub async fn verify_email(&self, token: &str) -> Result<User> {
        let user = self
            .users
            .find_by_verification_token(token)
            .await?
            .ok_or_else(|| CampHubError::InvalidInput("Invalid verification link".to_string()))?;

        let ttl = Duration::hours(self.config.verification_ttl_hours);
        if is_expired(user.email_verification_sent_at, ttl, Utc::now()) {
            return Err(CampHubError::InvalidInput(
                "Verification link has expired. Please request a new one.".to_string(),
            ));
        }

        self.users.mark_email_verified(user.id).await?;
        log_user_action(user.id, "verify_email", None);
        self.users.get(user.id).await
    }

    /// Always succeeds so callers cannot probe which emails exist
    pub async fn resend_verification(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        if let Some(user) = self.users.find_by_email(&email).await? {
            if !user.email_verified {
                let token = generate_token();
                self.users.set_verification_token(user.id, &token).await?;
                self.notifications
                    .send_verification(&user, &token, self.config.verification_ttl_hours)?;
                debug!(user_id = user.id, "Verification mail resent");
            }
        }
        Ok(())
    }

    /// Always succeeds; only password accounts get a reset link
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        if let Some(user) = self.users.find_by_email(&email).await? {
            if user.has_password() && user.is_active {
                let token = generate_token();
                self.users.set_password_reset_token(user.id, &token).await?;
                self.notifications
                    .send_password_reset(&user, &token, self.config.password_reset_ttl_hours)?;
                debug!(user_id = user.id, "Password reset mail sent");
            }
        }
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let user = self
            .users
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| CampHubError::InvalidInput("Invalid password reset link".to_string()))?;

        let ttl = Duration::hours(self.config.password_reset_ttl_hours);
        if is_expired(user.password_reset_sent_at, ttl, Utc::now()) {
            self.users.clear_password_reset_token(user.id).await?;
            return Err(CampHubError::InvalidInput(
                "Password reset link has expired. Please request a new one.".to_string(),
            ));
        }

        validate_password(new_password, self.config.min_password_length)?;
        self.users.set_password(user.id, &hash_password(new_password)?).await?;

        log_user_action(user.id, "reset_password", None);
        Ok(())
    }

    pub async fn request_email_change(&self, actor: &Actor, new_email: &str) -> Result<()> {
        actor.ensure_active()?;
        let new_email = normalize_email(new_email);
        validate_email(&new_email)?;

        let user = self.users.get(actor.user_id).await?;
        if user.email == new_email {
            return Err(CampHubError::InvalidInput(
                "New email must differ from the current one".to_string(),
            ));
        }
        if self.users.find_by_email(&new_email).await?.is_some() {
            return Err(CampHubError::Conflict("Email already in use".to_string()));
        }

        let token = generate_token();
        self.users.set_email_change(user.id, &new_email, &token).await?;
        self.notifications
            .send_email_change(&user, &new_email, &token, self.config.email_change_ttl_hours)?;

        log_user_action(user.id, "request_email_change", Some(&new_email));
        Ok(())
    }

    pub async fn verify_email_change(&self, token: &str) -> Result<User> {
        let user = self
            .users
            .find_by_email_change_token(token)
            .await?
            .ok_or_else(|| CampHubError::InvalidInput("Invalid email change link".to_string()))?;

        let ttl = Duration::hours(self.config.email_change_ttl_hours);
        let new_email = match user.email_change_new_email.clone() {
            Some(email) if !is_expired(user.email_change_sent_at, ttl, Utc::now()) => email,
            _ => {
                self.users.clear_email_change(user.id).await?;
                return Err(CampHubError::InvalidInput(
                    "Email change link has expired. Please request a new one.".to_string(),
                ));
            }
        };

        // Someone may have registered the address in the meantime
        if self.users.find_by_email(&new_email).await?.is_some() {
            self.users.clear_email_change(user.id).await?;
            return Err(CampHubError::Conflict("Email already in use".to_string()));
        }

        let updated = self.users.complete_email_change(user.id, &new_email).await?;
        log_user_action(user.id, "verify_email_change", Some(&new_email));
        Ok(updated)
    }
}
