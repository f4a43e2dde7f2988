//! User service implementation
//!
//! Profile reads and edits, role changes and the "my camps" overview.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::{MyCamps, OAuthProvider, UpdateProfileRequest, User, UserRole};
use crate::models::AssociationStatus;
use crate::utils::errors::{CampHubError, Result};
use crate::utils::logging::{log_admin_action, log_user_action};
use crate::utils::validation::validate_profile;
use crate::workflow::permissions::{ensure_can_change_role, ensure_global_admin};
use crate::workflow::Actor;

#[derive(Clone, Debug)]
pub struct UserService {
    db: DatabaseService,
}

impl UserService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, actor: &Actor) -> Result<User> {
        actor.ensure_active()?;
        self.db.users.get(actor.user_id).await
    }

    pub async fn update_profile(&self, actor: &Actor, request: UpdateProfileRequest) -> Result<User> {
        actor.ensure_active()?;
        validate_profile(&request)?;

        let user = self.db.users.update_profile(actor.user_id, &request).await?;
        log_user_action(user.id, "update_profile", None);
        Ok(user)
    }

    pub async fn linked_providers(&self, actor: &Actor) -> Result<Vec<OAuthProvider>> {
        actor.ensure_active()?;
        self.db.oauth.list_for_user(actor.user_id).await
    }

    /// Every account, newest first
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>> {
        ensure_global_admin(actor)?;
        self.db.users.list_by_role().await
    }

    pub async fn change_role(&self, actor: &Actor, user_id: i64, role: UserRole) -> Result<User> {
        let target = self.db.users.get(user_id).await?;
        ensure_can_change_role(actor, &target, role)?;

        if target.role == role {
            debug!(user_id = user_id, role = %role, "Role unchanged");
            return Ok(target);
        }

        let user = self.db.users.set_role(user_id, role).await?;
        log_admin_action(
            actor.user_id,
            "change_role",
            Some(&user_id.to_string()),
            Some(&format!("{} -> {}", target.role, role)),
        );
        info!(user_id = user_id, from = %target.role, to = %role, "User role changed");
        Ok(user)
    }

    /// Approved and pending memberships with their camps; rejected ones are left out
    pub async fn my_camps(&self, actor: &Actor) -> Result<MyCamps> {
        actor.ensure_active()?;
        let memberships = self.db.memberships.list_for_user(actor.user_id).await?;

        let camp_ids: Vec<i64> = memberships.iter().map(|m| m.camp_id).collect();
        let camps: HashMap<i64, _> = self
            .db
            .camps
            .find_many(&camp_ids)
            .await?
            .into_iter()
            .map(|camp| (camp.id, camp))
            .collect();

        let mut result = MyCamps::default();
        for membership in memberships {
            let Some(camp) = camps.get(&membership.camp_id).cloned() else {
                continue;
            };
            match membership.status {
                AssociationStatus::Approved => result.approved.push((camp, membership)),
                AssociationStatus::Pending => result.pending.push((camp, membership)),
                AssociationStatus::Rejected => {}
            }
        }

        Ok(result)
    }

    pub async fn get_user(&self, actor: &Actor, user_id: i64) -> Result<User> {
        actor.ensure_active()?;
        if actor.user_id != user_id && !actor.is_site_admin_or_higher() {
            return Err(CampHubError::PermissionDenied(
                "You can only view your own account".to_string(),
            ));
        }
        self.db.users.get(user_id).await
    }
}
