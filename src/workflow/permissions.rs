//! Role- and membership-based permission guards

use crate::models::{Camp, CampMember, Event, EventStatus, MemberApprovalMode, User, UserRole};
use crate::utils::errors::Result;
use super::{deny, Actor};

/// Which events a viewer may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventVisibility {
    /// Every event, newest first
    All,
    /// Approved events plus the viewer's own
    ApprovedOrCreatedBy(i64),
    /// Only approved events, soonest first
    ApprovedOnly,
}

pub fn event_visibility(actor: Option<&Actor>) -> EventVisibility {
    match actor {
        Some(a) if a.is_site_admin_or_higher() => EventVisibility::All,
        Some(a) if a.is_event_manager_or_higher() => EventVisibility::ApprovedOrCreatedBy(a.user_id),
        _ => EventVisibility::ApprovedOnly,
    }
}

pub fn can_view_event(actor: Option<&Actor>, event: &Event) -> bool {
    if event.status == EventStatus::Approved {
        return true;
    }
    match actor {
        Some(a) => a.is_site_admin_or_higher() || a.user_id == event.creator_id,
        None => false,
    }
}

pub fn ensure_can_create_event(actor: &Actor) -> Result<()> {
    actor.ensure_active()?;
    if !actor.is_event_manager_or_higher() {
        return deny("Only event managers can create events");
    }
    Ok(())
}

/// Approve, reject and status override
pub fn ensure_can_moderate_events(actor: &Actor) -> Result<()> {
    actor.ensure_active()?;
    if !actor.is_site_admin_or_higher() {
        return deny("Only site admins can approve or reject events");
    }
    Ok(())
}

pub fn ensure_can_edit_event(actor: &Actor, event: &Event) -> Result<()> {
    actor.ensure_active()?;
    let is_creator = actor.user_id == event.creator_id && actor.is_event_manager_or_higher();
    if !is_creator && !actor.is_site_admin_or_higher() {
        return deny("You do not have permission to edit this event");
    }
    Ok(())
}

pub fn ensure_can_cancel_event(actor: &Actor, event: &Event) -> Result<()> {
    actor.ensure_active()?;
    if actor.user_id != event.creator_id && !actor.is_site_admin_or_higher() {
        return deny("You do not have permission to cancel this event");
    }
    Ok(())
}

/// Event creator or site admin decides camp requests and sees them
pub fn ensure_can_decide_associations(actor: &Actor, event: &Event) -> Result<()> {
    actor.ensure_active()?;
    if actor.user_id != event.creator_id && !actor.is_site_admin_or_higher() {
        return deny("Only the event creator or site admins can manage camp requests");
    }
    Ok(())
}

pub fn is_camp_member(membership: Option<&CampMember>) -> bool {
    membership.map(CampMember::is_approved).unwrap_or(false)
}

pub fn is_camp_manager(membership: Option<&CampMember>) -> bool {
    membership.map(CampMember::is_manager).unwrap_or(false)
}

/// Site admins and approved camp managers manage a camp
pub fn can_manage_camp(actor: &Actor, membership: Option<&CampMember>) -> bool {
    actor.is_active && (actor.is_site_admin_or_higher() || is_camp_manager(membership))
}

pub fn ensure_can_manage_camp(actor: &Actor, membership: Option<&CampMember>, what: &str) -> Result<()> {
    actor.ensure_active()?;
    if !can_manage_camp(actor, membership) {
        return Err(crate::utils::errors::CampHubError::PermissionDenied(format!(
            "Only camp managers can {}",
            what
        )));
    }
    Ok(())
}

pub fn ensure_can_edit_camp(actor: &Actor, camp: &Camp) -> Result<()> {
    actor.ensure_active()?;
    if actor.user_id != camp.creator_id && !actor.is_site_admin_or_higher() {
        return deny("Only the camp creator or site admins can edit this camp");
    }
    Ok(())
}

/// Whether the viewer may decide membership requests under the camp's approval mode
pub fn can_approve_members(actor: &Actor, camp: &Camp, membership: Option<&CampMember>) -> bool {
    if !actor.is_active {
        return false;
    }
    if actor.is_site_admin_or_higher() {
        return true;
    }
    match camp.member_approval_mode {
        MemberApprovalMode::ManagerOnly => is_camp_manager(membership),
        MemberApprovalMode::AllMembers => is_camp_member(membership),
    }
}

pub fn ensure_can_approve_members(actor: &Actor, camp: &Camp, membership: Option<&CampMember>) -> Result<()> {
    actor.ensure_active()?;
    if !can_approve_members(actor, camp, membership) {
        return deny("You do not have permission to approve members for this camp");
    }
    Ok(())
}

/// Approved members and site admins see clusters and teams
pub fn ensure_can_view_organization(actor: &Actor, membership: Option<&CampMember>) -> Result<()> {
    actor.ensure_active()?;
    if !actor.is_site_admin_or_higher() && !is_camp_member(membership) {
        return deny("You must be a camp member to view clusters and teams");
    }
    Ok(())
}

/// A non-manager may put themselves into, or take themselves out of, a lead
/// slot that is empty or already theirs.
pub fn is_self_lead_change(actor: &Actor, current: Option<i64>, requested: Option<i64>) -> bool {
    let assigns_self_or_clears = requested.map_or(true, |id| id == actor.user_id);
    let slot_free_or_own = requested.is_none() || current.map_or(true, |id| id == actor.user_id);
    assigns_self_or_clears && slot_free_or_own
}

/// Adding or removing someone from a team: yourself, or anyone if you manage the camp
pub fn ensure_can_change_team_membership(
    actor: &Actor,
    target_user_id: i64,
    membership: Option<&CampMember>,
) -> Result<()> {
    actor.ensure_active()?;
    if actor.user_id != target_user_id && !can_manage_camp(actor, membership) {
        return deny("Only camp managers can change other members' teams");
    }
    Ok(())
}

pub fn ensure_can_administer(actor: &Actor) -> Result<()> {
    actor.ensure_active()?;
    if !actor.is_site_admin_or_higher() {
        return deny("Site admin access required");
    }
    Ok(())
}

pub fn ensure_global_admin(actor: &Actor) -> Result<()> {
    actor.ensure_active()?;
    if !actor.is_global_admin() {
        return deny("Global admin access required");
    }
    Ok(())
}

/// Suspending: site admin+, never yourself, never an equal or higher role
pub fn ensure_can_suspend(actor: &Actor, target: &User) -> Result<()> {
    ensure_can_administer(actor)?;
    if actor.user_id == target.id {
        return deny("You cannot suspend yourself");
    }
    if target.role.has_role_or_higher(actor.role) {
        return deny("You cannot suspend a user with an equal or higher role");
    }
    Ok(())
}

pub fn ensure_can_change_role(actor: &Actor, target: &User, _new_role: UserRole) -> Result<()> {
    ensure_global_admin(actor)?;
    if actor.user_id == target.id {
        return deny("You cannot change your own role");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssociationStatus, CampMemberRole};
    use crate::models::user::sample_user;
    use chrono::{NaiveDate, Utc};

    fn event(creator_id: i64, status: EventStatus) -> Event {
        let now = Utc::now();
        let day = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        Event {
            id: 10,
            title: "Gathering".to_string(),
            description: None,
            location: None,
            start_date: day,
            end_date: day,
            event_manager_email: None,
            event_manager_phone: None,
            safety_manager_email: None,
            safety_manager_phone: None,
            business_manager_email: None,
            business_manager_phone: None,
            board_email: None,
            status,
            creator_id,
            has_early_arrival: false,
            early_arrival_days: None,
            has_late_departure: false,
            late_departure_days: None,
            has_accessibility_assistance: false,
            has_drinking_water: false,
            has_ice_available: false,
            has_vehicle_access: false,
            custom_event_options: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn camp(mode: MemberApprovalMode) -> Camp {
        let now = Utc::now();
        Camp {
            id: 5,
            name: "Camp".to_string(),
            description: "Testing camp".to_string(),
            max_sites: 1,
            max_people: 1,
            has_communal_kitchen: false,
            has_communal_space: false,
            has_art_exhibits: false,
            has_member_activities: false,
            has_non_member_activities: false,
            custom_amenities: None,
            member_approval_mode: mode,
            creator_id: 1,
            camp_lead_id: None,
            backup_camp_lead_id: None,
            enable_camp_lead: false,
            enable_backup_camp_lead: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn membership(user_id: i64, status: AssociationStatus, role: CampMemberRole) -> CampMember {
        CampMember {
            id: 1,
            camp_id: 5,
            user_id,
            status,
            role,
            requested_at: Utc::now(),
            approved_at: None,
        }
    }

    #[test]
    fn test_event_visibility_by_role() {
        let admin = Actor::new(1, UserRole::SiteAdmin);
        let manager = Actor::new(2, UserRole::EventManager);
        let member = Actor::new(3, UserRole::Member);

        assert_eq!(event_visibility(Some(&admin)), EventVisibility::All);
        assert_eq!(event_visibility(Some(&manager)), EventVisibility::ApprovedOrCreatedBy(2));
        assert_eq!(event_visibility(Some(&member)), EventVisibility::ApprovedOnly);
        assert_eq!(event_visibility(None), EventVisibility::ApprovedOnly);
    }

    #[test]
    fn test_view_single_event() {
        let pending = event(2, EventStatus::Pending);
        assert!(can_view_event(Some(&Actor::new(2, UserRole::EventManager)), &pending));
        assert!(can_view_event(Some(&Actor::new(9, UserRole::GlobalAdmin)), &pending));
        assert!(!can_view_event(Some(&Actor::new(3, UserRole::EventManager)), &pending));
        assert!(!can_view_event(None, &pending));
        assert!(can_view_event(None, &event(2, EventStatus::Approved)));
    }

    #[test]
    fn test_event_creation_needs_event_manager() {
        assert!(ensure_can_create_event(&Actor::new(1, UserRole::EventManager)).is_ok());
        assert!(ensure_can_create_event(&Actor::new(1, UserRole::CampManager)).is_err());

        let mut suspended = Actor::new(1, UserRole::GlobalAdmin);
        suspended.is_active = false;
        assert!(ensure_can_create_event(&suspended).is_err());
    }

    #[test]
    fn test_cancel_by_creator_or_admin() {
        let e = event(2, EventStatus::Approved);
        assert!(ensure_can_cancel_event(&Actor::new(2, UserRole::EventManager), &e).is_ok());
        assert!(ensure_can_cancel_event(&Actor::new(7, UserRole::SiteAdmin), &e).is_ok());
        assert!(ensure_can_cancel_event(&Actor::new(7, UserRole::EventManager), &e).is_err());
    }

    #[test]
    fn test_approval_mode_controls_approvers() {
        let actor = Actor::new(4, UserRole::Member);
        let plain = membership(4, AssociationStatus::Approved, CampMemberRole::Member);
        let manager = membership(4, AssociationStatus::Approved, CampMemberRole::Manager);
        let pending_manager = membership(4, AssociationStatus::Pending, CampMemberRole::Manager);

        let manager_only = camp(MemberApprovalMode::ManagerOnly);
        assert!(!can_approve_members(&actor, &manager_only, Some(&plain)));
        assert!(can_approve_members(&actor, &manager_only, Some(&manager)));
        assert!(!can_approve_members(&actor, &manager_only, Some(&pending_manager)));

        let all_members = camp(MemberApprovalMode::AllMembers);
        assert!(can_approve_members(&actor, &all_members, Some(&plain)));
        assert!(!can_approve_members(&actor, &all_members, None));

        assert!(can_approve_members(&Actor::new(9, UserRole::SiteAdmin), &manager_only, None));
    }

    #[test]
    fn test_self_lead_change() {
        let me = Actor::new(4, UserRole::Member);
        assert!(is_self_lead_change(&me, None, Some(4)));
        assert!(is_self_lead_change(&me, Some(4), Some(4)));
        assert!(is_self_lead_change(&me, Some(4), None));
        assert!(!is_self_lead_change(&me, Some(8), Some(4)));
        assert!(!is_self_lead_change(&me, None, Some(8)));
    }

    #[test]
    fn test_team_membership_changes() {
        let me = Actor::new(4, UserRole::Member);
        assert!(ensure_can_change_team_membership(&me, 4, None).is_ok());
        assert!(ensure_can_change_team_membership(&me, 5, None).is_err());

        let managing = membership(4, AssociationStatus::Approved, CampMemberRole::Manager);
        assert!(ensure_can_change_team_membership(&me, 5, Some(&managing)).is_ok());
    }

    #[test]
    fn test_suspend_rules() {
        let admin = Actor::new(1, UserRole::SiteAdmin);
        let mut target = sample_user(2, "t@example.com");
        assert!(ensure_can_suspend(&admin, &target).is_ok());

        target.role = UserRole::SiteAdmin;
        assert!(ensure_can_suspend(&admin, &target).is_err());

        let myself = sample_user(1, "me@example.com");
        assert!(ensure_can_suspend(&admin, &myself).is_err());
    }

    #[test]
    fn test_role_change_global_admin_only() {
        let target = sample_user(2, "t@example.com");
        assert!(ensure_can_change_role(&Actor::new(1, UserRole::GlobalAdmin), &target, UserRole::SiteAdmin).is_ok());
        assert!(ensure_can_change_role(&Actor::new(1, UserRole::SiteAdmin), &target, UserRole::Member).is_err());
        assert!(ensure_can_change_role(&Actor::new(2, UserRole::GlobalAdmin), &target, UserRole::Member).is_err());
    }
}
