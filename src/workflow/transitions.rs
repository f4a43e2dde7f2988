//! Status transitions with their source-state guards

use crate::models::{AssociationStatus, CampMember, CampMemberRole, EventStatus};
use crate::utils::errors::{CampHubError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Approve,
    Reject,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationAction {
    Approve,
    Reject,
    Revoke,
    CancelRejection,
}

fn invalid(from: impl ToString, to: impl ToString) -> CampHubError {
    CampHubError::InvalidStateTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Next event status for `action`, or an error when `from` does not allow it
pub fn event_transition(from: EventStatus, action: EventAction) -> Result<EventStatus> {
    let (required, to) = match action {
        EventAction::Approve => (EventStatus::Pending, EventStatus::Approved),
        EventAction::Reject => (EventStatus::Pending, EventStatus::Rejected),
        EventAction::Cancel => (EventStatus::Approved, EventStatus::Cancelled),
    };

    if from == required {
        Ok(to)
    } else {
        Err(invalid(from, to))
    }
}

/// Next membership status when a request is decided
pub fn membership_transition(from: AssociationStatus, action: MembershipAction) -> Result<AssociationStatus> {
    let to = match action {
        MembershipAction::Approve => AssociationStatus::Approved,
        MembershipAction::Reject => AssociationStatus::Rejected,
    };

    if from == AssociationStatus::Pending {
        Ok(to)
    } else {
        Err(invalid(from, to))
    }
}

pub fn association_transition(from: AssociationStatus, action: AssociationAction) -> Result<AssociationStatus> {
    let (required, to) = match action {
        AssociationAction::Approve => (AssociationStatus::Pending, AssociationStatus::Approved),
        AssociationAction::Reject => (AssociationStatus::Pending, AssociationStatus::Rejected),
        AssociationAction::Revoke => (AssociationStatus::Approved, AssociationStatus::Rejected),
        AssociationAction::CancelRejection => (AssociationStatus::Rejected, AssociationStatus::Pending),
    };

    if from == required {
        Ok(to)
    } else {
        Err(invalid(from, to))
    }
}

/// Error for a membership request when a row already exists
pub fn existing_membership_error(existing: AssociationStatus) -> CampHubError {
    let message = match existing {
        AssociationStatus::Approved => "You are already a member of this camp",
        AssociationStatus::Pending => "You have already requested to join this camp",
        AssociationStatus::Rejected => "Your previous request to join this camp was rejected",
    };
    CampHubError::Conflict(message.to_string())
}

/// Only approved plain members can become managers
pub fn ensure_promotable(member: &CampMember) -> Result<()> {
    if member.status != AssociationStatus::Approved {
        return Err(CampHubError::InvalidInput(
            "Only approved members can be promoted".to_string(),
        ));
    }
    if member.role == CampMemberRole::Manager {
        return Err(invalid(CampMemberRole::Manager, CampMemberRole::Manager));
    }
    Ok(())
}

/// A manager can step down only while another manager remains
pub fn ensure_demotable(member: &CampMember, manager_count: i64) -> Result<()> {
    if !member.is_manager() {
        return Err(invalid(member.role, CampMemberRole::Member));
    }
    if manager_count <= 1 {
        return Err(CampHubError::Conflict(
            "Cannot demote the last manager. Promote another member first.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn member(status: AssociationStatus, role: CampMemberRole) -> CampMember {
        CampMember {
            id: 1,
            camp_id: 1,
            user_id: 1,
            status,
            role,
            requested_at: Utc::now(),
            approved_at: None,
        }
    }

    #[test]
    fn test_event_transitions() {
        assert_eq!(event_transition(EventStatus::Pending, EventAction::Approve).unwrap(), EventStatus::Approved);
        assert_eq!(event_transition(EventStatus::Pending, EventAction::Reject).unwrap(), EventStatus::Rejected);
        assert_eq!(event_transition(EventStatus::Approved, EventAction::Cancel).unwrap(), EventStatus::Cancelled);

        assert_matches!(
            event_transition(EventStatus::Approved, EventAction::Approve),
            Err(CampHubError::InvalidStateTransition { ref from, ref to }) if from == "approved" && to == "approved"
        );
        assert!(event_transition(EventStatus::Pending, EventAction::Cancel).is_err());
        assert!(event_transition(EventStatus::Cancelled, EventAction::Reject).is_err());
    }

    #[test]
    fn test_membership_decisions_need_pending() {
        assert_eq!(
            membership_transition(AssociationStatus::Pending, MembershipAction::Approve).unwrap(),
            AssociationStatus::Approved
        );
        assert!(membership_transition(AssociationStatus::Rejected, MembershipAction::Approve).is_err());
        assert!(membership_transition(AssociationStatus::Approved, MembershipAction::Reject).is_err());
    }

    #[test]
    fn test_association_transitions() {
        use AssociationAction::*;
        use AssociationStatus::*;

        assert_eq!(association_transition(Pending, Approve).unwrap(), Approved);
        assert_eq!(association_transition(Pending, Reject).unwrap(), Rejected);
        assert_eq!(association_transition(Approved, Revoke).unwrap(), Rejected);
        assert_eq!(association_transition(Rejected, CancelRejection).unwrap(), Pending);

        assert!(association_transition(Approved, Approve).is_err());
        assert!(association_transition(Pending, Revoke).is_err());
        assert!(association_transition(Pending, CancelRejection).is_err());
    }

    #[test]
    fn test_existing_membership_messages() {
        assert_matches!(
            existing_membership_error(AssociationStatus::Approved),
            CampHubError::Conflict(ref m) if m.contains("already a member")
        );
        assert_matches!(
            existing_membership_error(AssociationStatus::Pending),
            CampHubError::Conflict(ref m) if m.contains("already requested")
        );
        assert_matches!(
            existing_membership_error(AssociationStatus::Rejected),
            CampHubError::Conflict(ref m) if m.contains("rejected")
        );
    }

    #[test]
    fn test_promotion_and_demotion_guards() {
        assert!(ensure_promotable(&member(AssociationStatus::Approved, CampMemberRole::Member)).is_ok());
        assert!(ensure_promotable(&member(AssociationStatus::Pending, CampMemberRole::Member)).is_err());
        assert!(ensure_promotable(&member(AssociationStatus::Approved, CampMemberRole::Manager)).is_err());

        let manager = member(AssociationStatus::Approved, CampMemberRole::Manager);
        assert!(ensure_demotable(&manager, 2).is_ok());
        assert_matches!(ensure_demotable(&manager, 1), Err(CampHubError::Conflict(_)));
        assert!(ensure_demotable(&member(AssociationStatus::Approved, CampMemberRole::Member), 3).is_err());
    }
}
