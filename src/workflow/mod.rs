//! Approval workflow rules
//!
//! Pure permission guards and status transitions for events, camp
//! memberships and camp-event associations. Nothing in here touches the
//! database; services load the rows and ask these functions what is allowed.

pub mod permissions;
pub mod transitions;

use serde::{Deserialize, Serialize};

use crate::models::{User, UserRole};
use crate::utils::errors::{CampHubError, Result};

pub use permissions::EventVisibility;
pub use transitions::{AssociationAction, EventAction, MembershipAction};

/// The authenticated user performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
    pub role: UserRole,
    pub is_active: bool,
}

impl Actor {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role, is_active: true }
    }

    pub fn is_site_admin_or_higher(&self) -> bool {
        self.role.is_site_admin_or_higher()
    }

    pub fn is_event_manager_or_higher(&self) -> bool {
        self.role.is_event_manager_or_higher()
    }

    pub fn is_global_admin(&self) -> bool {
        self.role == UserRole::GlobalAdmin
    }

    /// Suspended accounts may not act at all
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(CampHubError::PermissionDenied("Account is suspended".to_string()))
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

/// Shorthand for a permission failure
pub(crate) fn deny<T>(message: &str) -> Result<T> {
    Err(CampHubError::PermissionDenied(message.to_string()))
}
