//! Administration
//!
//! Dashboard numbers, account management, moderation overrides and the
//! periodic token cleanup run by the maintenance loop.

use std::time::Instant;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::database::repositories::NewUser;
use crate::database::DatabaseService;
use crate::models::{
    AdminStats, AssociationListFilter, CampEventAssociation, CreateUserRequest, Event, EventStatus, User,
    UserListFilter,
};
use crate::services::camp::apply_association_action;
use crate::utils::errors::{CampHubError, Result};
use crate::utils::helpers::normalize_email;
use crate::utils::logging::{log_admin_action, log_database_operation, log_workflow_transition};
use crate::utils::password::hash_password;
use crate::utils::validation::{max_length, validate_email, validate_password, MAX_NAME_LENGTH};
use crate::workflow::permissions::{
    ensure_can_administer, ensure_can_moderate_events, ensure_can_suspend, ensure_global_admin,
};
use crate::workflow::{deny, Actor, AssociationAction};

#[derive(Clone, Debug)]
pub struct AdminService {
    db: DatabaseService,
    config: AuthConfig,
}

impl AdminService {
    pub fn new(db: DatabaseService, config: AuthConfig) -> Self {
        Self { db, config }
    }

    pub async fn stats(&self, actor: &Actor) -> Result<AdminStats> {
        ensure_can_administer(actor)?;
        self.db.users.stats().await
    }

    pub async fn list_users(&self, actor: &Actor, filter: &UserListFilter) -> Result<Vec<User>> {
        ensure_can_administer(actor)?;
        self.db.users.list(filter).await
    }

    /// Accounts created here skip email verification
    pub async fn create_user(&self, actor: &Actor, request: CreateUserRequest) -> Result<User> {
        ensure_global_admin(actor)?;

        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password, self.config.min_password_length)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CampHubError::InvalidInput("Name is required".to_string()));
        }
        max_length("Name", Some(name), MAX_NAME_LENGTH)?;

        if self.db.users.find_by_email(&email).await?.is_some() {
            return Err(CampHubError::Conflict("Email already registered".to_string()));
        }

        let user = self
            .db
            .users
            .create(NewUser {
                email,
                name: Some(name.to_string()),
                first_name: None,
                last_name: None,
                picture: None,
                password_hash: Some(hash_password(&request.password)?),
                role: request.role,
                email_verified: true,
                verification_token: None,
            })
            .await?;

        log_admin_action(actor.user_id, "create_user", Some(&user.email), Some(user.role.as_str()));
        Ok(user)
    }

    pub async fn suspend_user(&self, actor: &Actor, user_id: i64) -> Result<User> {
        let target = self.db.users.get(user_id).await?;
        ensure_can_suspend(actor, &target)?;
        if !target.is_active {
            return Err(CampHubError::Conflict("User is already suspended".to_string()));
        }

        let user = self.db.users.set_active(user_id, false).await?;
        log_admin_action(actor.user_id, "suspend_user", Some(&user.email), None);
        Ok(user)
    }

    pub async fn reactivate_user(&self, actor: &Actor, user_id: i64) -> Result<User> {
        ensure_can_administer(actor)?;
        let target = self.db.users.get(user_id).await?;
        if target.is_active {
            return Err(CampHubError::Conflict("User is not suspended".to_string()));
        }

        let user = self.db.users.set_active(user_id, true).await?;
        log_admin_action(actor.user_id, "reactivate_user", Some(&user.email), None);
        Ok(user)
    }

    /// Set any status directly, bypassing the normal transition rules
    pub async fn override_event_status(
        &self,
        actor: &Actor,
        event_id: i64,
        status: EventStatus,
        reason: Option<&str>,
    ) -> Result<Event> {
        ensure_can_moderate_events(actor)?;
        let event = self.db.events.get(event_id).await?;
        if event.status == status {
            return Ok(event);
        }

        let updated = self.db.events.set_status(event_id, status).await?;
        log_workflow_transition("event", event_id, event.status.as_str(), status.as_str(), actor.user_id);
        log_admin_action(
            actor.user_id,
            "override_event_status",
            Some(&event_id.to_string()),
            reason.map(str::trim).filter(|r| !r.is_empty()),
        );
        Ok(updated)
    }

    pub async fn list_associations(
        &self,
        actor: &Actor,
        filter: &AssociationListFilter,
    ) -> Result<Vec<CampEventAssociation>> {
        ensure_can_administer(actor)?;
        self.db.associations.list(filter).await
    }

    /// Take back an approval; the camp drops out of the event
    pub async fn revoke_association(&self, actor: &Actor, association_id: i64) -> Result<CampEventAssociation> {
        ensure_can_administer(actor)?;
        let association = self.db.associations.get_by_id(association_id).await?;
        let updated = apply_association_action(&self.db, actor, &association, AssociationAction::Revoke).await?;
        log_admin_action(actor.user_id, "revoke_association", Some(&association_id.to_string()), None);
        Ok(updated)
    }

    /// Send a rejected request back to pending
    pub async fn cancel_association_rejection(
        &self,
        actor: &Actor,
        association_id: i64,
    ) -> Result<CampEventAssociation> {
        actor.ensure_active()?;
        if !actor.is_event_manager_or_higher() {
            return deny("Only event managers can reopen rejected requests");
        }
        let association = self.db.associations.get_by_id(association_id).await?;
        apply_association_action(&self.db, actor, &association, AssociationAction::CancelRejection).await
    }

    /// Drop verification, reset and email change tokens past their lifetime
    pub async fn cleanup_expired_tokens(&self) -> Result<u64> {
        let now = Utc::now();
        let started = Instant::now();
        let result = self
            .db
            .users
            .clear_expired_tokens(
                now - Duration::hours(self.config.verification_ttl_hours),
                now - Duration::hours(self.config.password_reset_ttl_hours),
                now - Duration::hours(self.config.email_change_ttl_hours),
            )
            .await;
        log_database_operation("clear_expired_tokens", "users", started.elapsed().as_millis() as u64, result.is_ok());
        let cleared = result?;

        if cleared > 0 {
            info!(cleared = cleared, "Expired tokens cleared");
        }
        Ok(cleared)
    }

    /// Promote the configured bootstrap emails to global admin
    pub async fn bootstrap_admins(&self) -> Result<u64> {
        let emails: Vec<String> = self
            .config
            .bootstrap_admin_emails
            .iter()
            .map(|e| normalize_email(e))
            .filter(|e| !e.is_empty())
            .collect();
        if emails.is_empty() {
            return Ok(0);
        }

        let promoted = self.db.users.promote_to_global_admin(&emails).await?;
        if promoted > 0 {
            warn!(promoted = promoted, "Bootstrap admins promoted to global admin");
        }
        Ok(promoted)
    }
}
