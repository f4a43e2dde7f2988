//! Clusters and teams
//!
//! Camps split into clusters, clusters into teams. Managers run the
//! structure; approved members can see it, join or leave teams, and take
//! up a free lead slot themselves.

use tracing::info;

use crate::database::DatabaseService;
use crate::models::{
    CampMember, Cluster, CreateClusterRequest, CreateTeamRequest, Team, TeamMember, UpdateClusterRequest,
    UpdateTeamRequest,
};
use crate::utils::errors::{CampHubError, Result};
use crate::utils::helpers::trim_to_option;
use crate::utils::logging::log_user_action;
use crate::utils::validation::{max_length, required_name, MAX_ITEM_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
use crate::workflow::permissions::{
    can_manage_camp, ensure_can_change_team_membership, ensure_can_manage_camp, ensure_can_view_organization,
    is_camp_member, is_self_lead_change,
};
use crate::workflow::{deny, Actor};

/// Apply an enable flag and a requested lead to one slot.
///
/// Disabling clears the slot; a requested lead is ignored while the slot is
/// disabled. Returns the lead that was newly put into the slot, if any.
fn apply_lead_slot(
    enabled: &mut bool,
    lead: &mut Option<i64>,
    enable: Option<bool>,
    requested: Option<Option<i64>>,
) -> Option<i64> {
    if let Some(enable) = enable {
        *enabled = enable;
        if !enable {
            *lead = None;
        }
    }

    match requested {
        Some(requested) if *enabled => {
            let assigned = requested.filter(|id| Some(*id) != *lead);
            *lead = requested;
            assigned
        }
        _ => None,
    }
}

/// Whether a non-manager's update only moves themselves in or out of lead slots
fn is_self_lead_update(
    actor: &Actor,
    touches_only_leads: bool,
    slots: [(Option<i64>, Option<Option<i64>>); 2],
) -> bool {
    touches_only_leads
        && slots.iter().all(|(current, requested)| {
            requested.map_or(true, |requested| is_self_lead_change(actor, *current, requested))
        })
}

#[derive(Clone, Debug)]
pub struct OrganizationService {
    db: DatabaseService,
}

impl OrganizationService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    async fn membership_of(&self, camp_id: i64, user_id: i64) -> Result<Option<CampMember>> {
        self.db.memberships.find(camp_id, user_id).await
    }

    async fn ensure_approved_member(&self, camp_id: i64, user_id: i64, label: &str) -> Result<()> {
        let membership = self.membership_of(camp_id, user_id).await?;
        if !is_camp_member(membership.as_ref()) {
            return Err(CampHubError::InvalidInput(format!(
                "{} must be an approved camp member",
                label
            )));
        }
        Ok(())
    }

    /// Manager check for edits; approved members pass only for self lead changes
    async fn ensure_can_update(&self, actor: &Actor, camp_id: i64, self_lead_update: bool, what: &str) -> Result<()> {
        actor.ensure_active()?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        if can_manage_camp(actor, membership.as_ref()) {
            return Ok(());
        }
        if !self_lead_update {
            return Err(CampHubError::PermissionDenied(format!(
                "Only camp managers can update {} details",
                what
            )));
        }
        if !is_camp_member(membership.as_ref()) {
            return deny("You must be an approved camp member");
        }
        Ok(())
    }

    async fn camp_of_team(&self, team: &Team) -> Result<(Cluster, i64)> {
        let cluster = self.db.organization.get_cluster(team.cluster_id).await?;
        let camp_id = cluster.camp_id;
        Ok((cluster, camp_id))
    }

    // Clusters

    pub async fn list_clusters(&self, actor: &Actor, camp_id: i64) -> Result<Vec<Cluster>> {
        self.db.camps.get(camp_id).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_view_organization(actor, membership.as_ref())?;
        self.db.organization.list_clusters(camp_id).await
    }

    pub async fn get_cluster(&self, actor: &Actor, cluster_id: i64) -> Result<Cluster> {
        let cluster = self.db.organization.get_cluster(cluster_id).await?;
        let membership = self.membership_of(cluster.camp_id, actor.user_id).await?;
        ensure_can_view_organization(actor, membership.as_ref())?;
        Ok(cluster)
    }

    pub async fn create_cluster(&self, actor: &Actor, camp_id: i64, request: CreateClusterRequest) -> Result<Cluster> {
        self.db.camps.get(camp_id).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, membership.as_ref(), "create clusters")?;

        let name = required_name("Cluster", &request.name, MAX_TITLE_LENGTH)?;
        max_length("Description", request.description.as_deref(), MAX_ITEM_DESCRIPTION_LENGTH)?;
        if let Some(lead_id) = request.cluster_lead_id {
            self.ensure_approved_member(camp_id, lead_id, "Cluster lead").await?;
        }
        if self.db.organization.cluster_name_taken(camp_id, &name, None).await? {
            return Err(CampHubError::Conflict(
                "A cluster with this name already exists in this camp".to_string(),
            ));
        }

        let cluster = self
            .db
            .organization
            .create_cluster(
                camp_id,
                &name,
                trim_to_option(request.description.as_deref()),
                request.cluster_lead_id,
            )
            .await?;
        info!(cluster_id = cluster.id, camp_id = camp_id, actor_id = actor.user_id, "Cluster created");
        Ok(cluster)
    }

    pub async fn update_cluster(&self, actor: &Actor, cluster_id: i64, request: UpdateClusterRequest) -> Result<Cluster> {
        let mut cluster = self.db.organization.get_cluster(cluster_id).await?;
        let self_lead_update = is_self_lead_update(
            actor,
            request.touches_only_leads(),
            [
                (cluster.cluster_lead_id, request.cluster_lead_id),
                (cluster.backup_cluster_lead_id, request.backup_cluster_lead_id),
            ],
        );
        self.ensure_can_update(actor, cluster.camp_id, self_lead_update, "cluster").await?;

        if let Some(name) = request.name.as_deref() {
            let name = required_name("Cluster", name, MAX_TITLE_LENGTH)?;
            if self.db.organization.cluster_name_taken(cluster.camp_id, &name, Some(cluster.id)).await? {
                return Err(CampHubError::Conflict(
                    "A cluster with this name already exists in this camp".to_string(),
                ));
            }
            cluster.name = name;
        }
        if let Some(description) = request.description.as_ref() {
            max_length("Description", description.as_deref(), MAX_ITEM_DESCRIPTION_LENGTH)?;
            cluster.description = trim_to_option(description.as_deref());
        }

        let assigned = [
            apply_lead_slot(
                &mut cluster.enable_cluster_lead,
                &mut cluster.cluster_lead_id,
                request.enable_cluster_lead,
                request.cluster_lead_id,
            ),
            apply_lead_slot(
                &mut cluster.enable_backup_cluster_lead,
                &mut cluster.backup_cluster_lead_id,
                request.enable_backup_cluster_lead,
                request.backup_cluster_lead_id,
            ),
        ];
        for lead_id in assigned.into_iter().flatten() {
            self.ensure_approved_member(cluster.camp_id, lead_id, "Cluster lead").await?;
        }

        let saved = self.db.organization.save_cluster(&cluster).await?;
        log_user_action(actor.user_id, "update_cluster", Some(&cluster_id.to_string()));
        Ok(saved)
    }

    /// Removes the cluster with all of its teams
    pub async fn delete_cluster(&self, actor: &Actor, cluster_id: i64) -> Result<()> {
        let cluster = self.db.organization.get_cluster(cluster_id).await?;
        let membership = self.membership_of(cluster.camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, membership.as_ref(), "delete clusters")?;

        self.db.organization.delete_cluster(cluster_id).await?;
        info!(cluster_id = cluster_id, actor_id = actor.user_id, "Cluster deleted");
        Ok(())
    }

    // Teams

    pub async fn list_teams(&self, actor: &Actor, cluster_id: i64) -> Result<Vec<Team>> {
        let cluster = self.get_cluster(actor, cluster_id).await?;
        self.db.organization.list_teams(cluster.id).await
    }

    pub async fn get_team(&self, actor: &Actor, team_id: i64) -> Result<Team> {
        let team = self.db.organization.get_team(team_id).await?;
        let (_, camp_id) = self.camp_of_team(&team).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_view_organization(actor, membership.as_ref())?;
        Ok(team)
    }

    /// A lead given up front is also added to the team
    pub async fn create_team(&self, actor: &Actor, cluster_id: i64, request: CreateTeamRequest) -> Result<Team> {
        let cluster = self.db.organization.get_cluster(cluster_id).await?;
        let membership = self.membership_of(cluster.camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, membership.as_ref(), "create teams")?;

        let name = required_name("Team", &request.name, MAX_TITLE_LENGTH)?;
        max_length("Description", request.description.as_deref(), MAX_ITEM_DESCRIPTION_LENGTH)?;
        if let Some(lead_id) = request.team_lead_id {
            self.ensure_approved_member(cluster.camp_id, lead_id, "Team lead").await?;
        }
        if self.db.organization.team_name_taken(cluster_id, &name, None).await? {
            return Err(CampHubError::Conflict(
                "A team with this name already exists in this cluster".to_string(),
            ));
        }

        let team = self
            .db
            .organization
            .create_team(
                cluster_id,
                &name,
                trim_to_option(request.description.as_deref()),
                request.team_lead_id,
            )
            .await?;
        info!(team_id = team.id, cluster_id = cluster_id, actor_id = actor.user_id, "Team created");
        Ok(team)
    }

    pub async fn update_team(&self, actor: &Actor, team_id: i64, request: UpdateTeamRequest) -> Result<Team> {
        let mut team = self.db.organization.get_team(team_id).await?;
        let (_, camp_id) = self.camp_of_team(&team).await?;
        let self_lead_update = is_self_lead_update(
            actor,
            request.touches_only_leads(),
            [
                (team.team_lead_id, request.team_lead_id),
                (team.backup_team_lead_id, request.backup_team_lead_id),
            ],
        );
        self.ensure_can_update(actor, camp_id, self_lead_update, "team").await?;

        if let Some(name) = request.name.as_deref() {
            let name = required_name("Team", name, MAX_TITLE_LENGTH)?;
            if self.db.organization.team_name_taken(team.cluster_id, &name, Some(team.id)).await? {
                return Err(CampHubError::Conflict(
                    "A team with this name already exists in this cluster".to_string(),
                ));
            }
            team.name = name;
        }
        if let Some(description) = request.description.as_ref() {
            max_length("Description", description.as_deref(), MAX_ITEM_DESCRIPTION_LENGTH)?;
            team.description = trim_to_option(description.as_deref());
        }

        let assigned = [
            apply_lead_slot(
                &mut team.enable_team_lead,
                &mut team.team_lead_id,
                request.enable_team_lead,
                request.team_lead_id,
            ),
            apply_lead_slot(
                &mut team.enable_backup_team_lead,
                &mut team.backup_team_lead_id,
                request.enable_backup_team_lead,
                request.backup_team_lead_id,
            ),
        ];
        for lead_id in assigned.into_iter().flatten() {
            self.ensure_approved_member(camp_id, lead_id, "Team lead").await?;
        }

        let saved = self.db.organization.save_team(&team).await?;
        log_user_action(actor.user_id, "update_team", Some(&team_id.to_string()));
        Ok(saved)
    }

    /// Move a team to another cluster of the same camp
    pub async fn move_team(&self, actor: &Actor, team_id: i64, target_cluster_id: i64) -> Result<Team> {
        let mut team = self.db.organization.get_team(team_id).await?;
        let (source, camp_id) = self.camp_of_team(&team).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, membership.as_ref(), "move teams")?;

        if source.id == target_cluster_id {
            return Ok(team);
        }

        let target = self.db.organization.get_cluster(target_cluster_id).await?;
        if target.camp_id != camp_id {
            return Err(CampHubError::InvalidInput(
                "Teams can only move between clusters of the same camp".to_string(),
            ));
        }
        if self.db.organization.team_name_taken(target.id, &team.name, Some(team.id)).await? {
            return Err(CampHubError::Conflict(
                "A team with this name already exists in the target cluster".to_string(),
            ));
        }

        team.cluster_id = target.id;
        let moved = self.db.organization.save_team(&team).await?;
        info!(team_id = team_id, from = source.id, to = target.id, actor_id = actor.user_id, "Team moved");
        Ok(moved)
    }

    pub async fn delete_team(&self, actor: &Actor, team_id: i64) -> Result<()> {
        let team = self.db.organization.get_team(team_id).await?;
        let (_, camp_id) = self.camp_of_team(&team).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_manage_camp(actor, membership.as_ref(), "delete teams")?;

        self.db.organization.delete_team(team_id).await?;
        info!(team_id = team_id, actor_id = actor.user_id, "Team deleted");
        Ok(())
    }

    // Team members

    pub async fn team_members(&self, actor: &Actor, team_id: i64) -> Result<Vec<TeamMember>> {
        let team = self.get_team(actor, team_id).await?;
        self.db.organization.list_team_members(team.id).await
    }

    /// Join a team yourself, or add someone else as a camp manager
    pub async fn add_team_member(&self, actor: &Actor, team_id: i64, user_id: i64) -> Result<TeamMember> {
        let team = self.db.organization.get_team(team_id).await?;
        let (_, camp_id) = self.camp_of_team(&team).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_change_team_membership(actor, user_id, membership.as_ref())?;

        self.ensure_approved_member(camp_id, user_id, "Team member").await?;
        if self.db.organization.find_team_member(team_id, user_id).await?.is_some() {
            return Err(CampHubError::Conflict("User is already on this team".to_string()));
        }

        let member = self.db.organization.add_team_member(team_id, user_id).await?;
        log_user_action(actor.user_id, "add_team_member", Some(&format!("team {} user {}", team_id, user_id)));
        Ok(member)
    }

    /// Leads stay on their team until the lead slot is cleared
    pub async fn remove_team_member(&self, actor: &Actor, team_id: i64, user_id: i64) -> Result<()> {
        let team = self.db.organization.get_team(team_id).await?;
        let (_, camp_id) = self.camp_of_team(&team).await?;
        let membership = self.membership_of(camp_id, actor.user_id).await?;
        ensure_can_change_team_membership(actor, user_id, membership.as_ref())?;

        if team.team_lead_id == Some(user_id) || team.backup_team_lead_id == Some(user_id) {
            return Err(CampHubError::Conflict(
                "Team leads cannot be removed from their team. Clear the lead slot first.".to_string(),
            ));
        }

        self.db.organization.remove_team_member(team_id, user_id).await?;
        log_user_action(actor.user_id, "remove_team_member", Some(&format!("team {} user {}", team_id, user_id)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    #[test]
    fn test_disabling_slot_clears_lead() {
        let (mut enabled, mut lead) = (true, Some(7));
        let assigned = apply_lead_slot(&mut enabled, &mut lead, Some(false), Some(Some(9)));
        assert!(!enabled);
        assert_eq!(lead, None);
        assert_eq!(assigned, None);
    }

    #[test]
    fn test_assigning_into_enabled_slot() {
        let (mut enabled, mut lead) = (true, None);
        assert_eq!(apply_lead_slot(&mut enabled, &mut lead, None, Some(Some(4))), Some(4));
        assert_eq!(lead, Some(4));

        // same lead again is not a new assignment
        assert_eq!(apply_lead_slot(&mut enabled, &mut lead, None, Some(Some(4))), None);

        assert_eq!(apply_lead_slot(&mut enabled, &mut lead, None, Some(None)), None);
        assert_eq!(lead, None);
    }

    #[test]
    fn test_request_ignored_while_disabled() {
        let (mut enabled, mut lead) = (false, None);
        assert_eq!(apply_lead_slot(&mut enabled, &mut lead, None, Some(Some(4))), None);
        assert_eq!(lead, None);
    }

    #[test]
    fn test_self_lead_update_rules() {
        let me = Actor::new(5, UserRole::Member);

        // take the empty main slot
        assert!(is_self_lead_update(&me, true, [(None, Some(Some(5))), (None, None)]));
        // leave the backup slot held by me
        assert!(is_self_lead_update(&me, true, [(None, None), (Some(5), Some(None))]));
        // assign someone else
        assert!(!is_self_lead_update(&me, true, [(None, Some(Some(6))), (None, None)]));
        // take a slot someone else holds
        assert!(!is_self_lead_update(&me, true, [(Some(6), Some(Some(5))), (None, None)]));
        // touching other fields
        assert!(!is_self_lead_update(&me, false, [(None, Some(Some(5))), (None, None)]));
    }
}
