//! Camp service implementation
//!
//! Camps, their membership workflow and their requests to take part in
//! events.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::{
    AssociationStatus, Camp, CampDetail, CampEventAssociation, CampLeadsRequest, CampMember, CampRequest,
    MembershipsByStatus, SharedInventoryEntry,
};
use crate::utils::errors::{CampHubError, Result};
use crate::utils::helpers::trim_to_option;
use crate::utils::logging::{log_user_action, log_workflow_transition};
use crate::utils::validation::{max_length, validate_camp_request, MAX_TITLE_LENGTH};
use crate::workflow::permissions::{
    can_approve_members, can_manage_camp, can_view_event, ensure_can_approve_members, ensure_can_decide_associations,
    ensure_can_edit_camp, ensure_can_manage_camp, ensure_can_view_organization,
};
use crate::workflow::transitions::{
    association_transition, ensure_demotable, ensure_promotable, existing_membership_error,
    membership_transition,
};
use crate::workflow::{Actor, AssociationAction, MembershipAction};

/// Apply an association action with a compare-and-set on the current status
pub(crate) async fn apply_association_action(
    db: &DatabaseService,
    actor: &Actor,
    association: &CampEventAssociation,
    action: AssociationAction,
) -> Result<CampEventAssociation> {
    let from = association.status;
    let to = association_transition(from, action)?;
    let approved_at = (action == AssociationAction::Approve).then(Utc::now);

    let updated = db
        .associations
        .transition(association.id, from, to, approved_at)
        .await?
        .ok_or_else(|| CampHubError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        })?;

    log_workflow_transition("camp_event_association", association.id, from.as_str(), to.as_str(), actor.user_id);
    Ok(updated)
}

#[derive(Clone, Debug)]
pub struct CampService {
    db: DatabaseService,
}

impl CampService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    async fn membership_of(&self, camp_id: i64, user_id: i64) -> Result<Option<CampMember>> {
        self.db.memberships.find(camp_id, user_id).await
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<Camp>> {
        actor.ensure_active()?;
        self.db.camps.list().await
    }

    /// Camp page as seen by `actor`
    pub async fn detail(&self, actor: &Actor, camp_id: i64) -> Result<CampDetail> {
        actor.ensure_active()?;
        let camp = self.db.camps.get(camp_id).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;

        let is_manager = can_manage_camp(actor, membership.as_ref());
        let can_approve = can_approve_members(actor, &camp, membership.as_ref());

        let available_events = if is_manager {
            self.db.events.list_approved_without_request_from(camp_id).await?
        } else {
            Vec::new()
        };

        let pending_member_count = if can_approve {
            self.db.memberships.count_pending(camp_id).await?
        } else {
            0
        };

        let shared: Vec<_> = self
            .db
            .camps
            .shared_items_with_owners(camp_id)
            .await?
            .into_iter()
            .map(|(item, owner)| (item, owner.display_name()))
            .collect();

        Ok(CampDetail {
            amenities: camp.amenities_list(),
            associations: self.db.associations.list_for_camp(camp_id).await?,
            shared_inventory: SharedInventoryEntry::group(&shared),
            viewer_membership: membership,
            is_manager,
            can_approve_members: can_approve,
            available_events,
            pending_member_count,
            camp,
        })
    }

    /// The creator becomes the camp's first approved manager
    pub async fn create(&self, actor: &Actor, request: CampRequest) -> Result<Camp> {
        actor.ensure_active()?;
        validate_camp_request(&request)?;

        let camp = self.db.camps.create_with_manager(actor.user_id, &request).await?;
        info!(camp_id = camp.id, creator_id = actor.user_id, name = %camp.name, "Camp created");
        Ok(camp)
    }

    pub async fn update(&self, actor: &Actor, camp_id: i64, request: CampRequest) -> Result<Camp> {
        let camp = self.db.camps.get(camp_id).await?;
        ensure_can_edit_camp(actor, &camp)?;
        validate_camp_request(&request)?;

        let updated = self.db.camps.update(camp_id, &request).await?;
        log_user_action(actor.user_id, "update_camp", Some(&camp_id.to_string()));
        Ok(updated)
    }

    /// Lead slots may only hold approved members of the camp
    pub async fn set_leads(&self, actor: &Actor, camp_id: i64, request: CampLeadsRequest) -> Result<Camp> {
        self.db.camps.get(camp_id).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, membership.as_ref(), "assign camp leads")?;

        let slots = [
            (request.enable_camp_lead, request.camp_lead_id),
            (request.enable_backup_camp_lead, request.backup_camp_lead_id),
        ];
        for lead_id in slots.iter().filter(|(enabled, _)| *enabled).filter_map(|(_, id)| *id) {
            let lead = self.membership_of(camp_id, lead_id).await?;
            if !lead.as_ref().map(CampMember::is_approved).unwrap_or(false) {
                return Err(CampHubError::InvalidInput(
                    "Camp leads must be approved members of the camp".to_string(),
                ));
            }
        }

        self.db
            .camps
            .set_leads(
                camp_id,
                request.enable_camp_lead,
                request.camp_lead_id,
                request.enable_backup_camp_lead,
                request.backup_camp_lead_id,
            )
            .await
    }

    // Membership workflow

    pub async fn request_membership(&self, actor: &Actor, camp_id: i64) -> Result<CampMember> {
        actor.ensure_active()?;
        self.db.camps.get(camp_id).await?;

        if let Some(existing) = self.membership_of(camp_id, actor.user_id).await? {
            return Err(existing_membership_error(existing.status));
        }

        let member = self.db.memberships.create_request(camp_id, actor.user_id).await?;
        log_user_action(actor.user_id, "request_membership", Some(&camp_id.to_string()));
        Ok(member)
    }

    async fn decide_membership(
        &self,
        actor: &Actor,
        camp_id: i64,
        user_id: i64,
        action: MembershipAction,
    ) -> Result<CampMember> {
        let camp = self.db.camps.get(camp_id).await?;
        let own = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_approve_members(actor, &camp, own.as_ref())?;

        let target = self.db.memberships.get(camp_id, user_id).await?;
        let to = membership_transition(target.status, action)?;
        let approved_at = (action == MembershipAction::Approve).then(Utc::now);

        let updated = self
            .db
            .memberships
            .transition(target.id, target.status, to, approved_at)
            .await?
            .ok_or_else(|| CampHubError::InvalidStateTransition {
                from: target.status.to_string(),
                to: to.to_string(),
            })?;

        log_workflow_transition("camp_member", target.id, target.status.as_str(), to.as_str(), actor.user_id);
        Ok(updated)
    }

    pub async fn approve_member(&self, actor: &Actor, camp_id: i64, user_id: i64) -> Result<CampMember> {
        self.decide_membership(actor, camp_id, user_id, MembershipAction::Approve).await
    }

    pub async fn reject_member(&self, actor: &Actor, camp_id: i64, user_id: i64) -> Result<CampMember> {
        self.decide_membership(actor, camp_id, user_id, MembershipAction::Reject).await
    }

    pub async fn promote_member(&self, actor: &Actor, camp_id: i64, user_id: i64) -> Result<CampMember> {
        let own = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, own.as_ref(), "promote members")?;

        let target = self.db.memberships.get(camp_id, user_id).await?;
        ensure_promotable(&target)?;

        let promoted = self.db.memberships.promote(target.id).await?;
        info!(camp_id = camp_id, user_id = user_id, actor_id = actor.user_id, "Member promoted to manager");
        Ok(promoted)
    }

    /// The last manager can never be demoted
    pub async fn demote_member(&self, actor: &Actor, camp_id: i64, user_id: i64) -> Result<CampMember> {
        let own = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, own.as_ref(), "demote managers")?;

        let demoted = self
            .db
            .memberships
            .demote_locked(camp_id, user_id, ensure_demotable)
            .await?;
        info!(camp_id = camp_id, user_id = user_id, actor_id = actor.user_id, "Manager demoted to member");
        Ok(demoted)
    }

    /// Approved members see each other; pending and rejected rows only go to approvers
    pub async fn members(&self, actor: &Actor, camp_id: i64) -> Result<MembershipsByStatus> {
        let camp = self.db.camps.get(camp_id).await?;
        let own = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_view_organization(actor, own.as_ref())?;
        let can_approve = can_approve_members(actor, &camp, own.as_ref());

        let mut grouped = MembershipsByStatus::default();
        for member in self.db.memberships.list_for_camp(camp_id).await? {
            match member.status {
                AssociationStatus::Approved => grouped.approved.push(member),
                AssociationStatus::Pending if can_approve => grouped.pending.push(member),
                AssociationStatus::Rejected if can_approve => grouped.rejected.push(member),
                _ => {}
            }
        }
        Ok(grouped)
    }

    /// Pending join requests across every camp the actor manages
    pub async fn pending_requests(&self, actor: &Actor) -> Result<Vec<CampMember>> {
        actor.ensure_active()?;
        self.db.memberships.pending_for_manager(actor.user_id).await
    }

    // Event participation

    pub async fn request_association(
        &self,
        actor: &Actor,
        camp_id: i64,
        event_id: i64,
        location: Option<String>,
    ) -> Result<CampEventAssociation> {
        self.db.camps.get(camp_id).await?;
        let own = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, own.as_ref(), "request event participation")?;
        max_length("Location", location.as_deref(), MAX_TITLE_LENGTH)?;

        let event = self.db.events.get(event_id).await?;
        if !event.is_approved() {
            return Err(CampHubError::InvalidInput(
                "Camps can only join approved events".to_string(),
            ));
        }

        if let Some(existing) = self.db.associations.find(camp_id, event_id).await? {
            let message = match existing.status {
                AssociationStatus::Pending => "This camp has already requested to join this event",
                AssociationStatus::Approved => "This camp is already part of this event",
                AssociationStatus::Rejected => "This camp's request for this event was rejected",
            };
            return Err(CampHubError::Conflict(message.to_string()));
        }

        let association = self
            .db
            .associations
            .create(camp_id, event_id, trim_to_option(location.as_deref()))
            .await?;
        info!(camp_id = camp_id, event_id = event_id, actor_id = actor.user_id, "Camp requested to join event");
        Ok(association)
    }

    async fn decide_association(
        &self,
        actor: &Actor,
        association_id: i64,
        action: AssociationAction,
    ) -> Result<CampEventAssociation> {
        let association = self.db.associations.get_by_id(association_id).await?;
        let event = self.db.events.get(association.event_id).await?;
        ensure_can_decide_associations(actor, &event)?;
        apply_association_action(&self.db, actor, &association, action).await
    }

    pub async fn approve_association(&self, actor: &Actor, association_id: i64) -> Result<CampEventAssociation> {
        self.decide_association(actor, association_id, AssociationAction::Approve).await
    }

    pub async fn reject_association(&self, actor: &Actor, association_id: i64) -> Result<CampEventAssociation> {
        self.decide_association(actor, association_id, AssociationAction::Reject).await
    }

    /// Placement inside the event grounds; status is untouched
    pub async fn set_association_location(
        &self,
        actor: &Actor,
        association_id: i64,
        location: Option<String>,
    ) -> Result<CampEventAssociation> {
        let association = self.db.associations.get_by_id(association_id).await?;
        let own = self.membership_of(association.camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, own.as_ref(), "set the camp location")?;
        max_length("Location", location.as_deref(), MAX_TITLE_LENGTH)?;

        let updated = self
            .db
            .associations
            .set_location(association_id, trim_to_option(location.as_deref()))
            .await?;
        debug!(association_id = association_id, location = ?updated.location, "Association location set");
        Ok(updated)
    }

    /// Approved camps attending an event, for anyone who may see the event
    pub async fn camps_for_event(&self, actor: &Actor, event_id: i64) -> Result<Vec<Camp>> {
        actor.ensure_active()?;
        let event = self.db.events.get(event_id).await?;
        if !can_view_event(Some(actor), &event) {
            return Err(CampHubError::PermissionDenied("This event is not available".to_string()));
        }

        let approved: HashSet<i64> = self
            .db
            .associations
            .list_for_event(event_id)
            .await?
            .into_iter()
            .filter(|a| a.status == AssociationStatus::Approved)
            .map(|a| a.camp_id)
            .collect();

        let ids: Vec<i64> = approved.into_iter().collect();
        self.db.camps.find_many(&ids).await
    }
}
