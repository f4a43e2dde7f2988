//! Admin dashboard models

use serde::{Deserialize, Serialize};

use super::camp::AssociationStatus;
use super::user::UserRole;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub active_users: i64,
    pub suspended_users: i64,
    pub pending_events: i64,
    pub pending_associations: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatusFilter {
    #[default]
    All,
    Active,
    Suspended,
}

impl UserStatusFilter {
    /// Value the `is_active` column must have, if any
    pub fn is_active(&self) -> Option<bool> {
        match self {
            UserStatusFilter::All => None,
            UserStatusFilter::Active => Some(true),
            UserStatusFilter::Suspended => Some(false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListFilter {
    pub status: UserStatusFilter,
    pub role: Option<UserRole>,
    /// Case-insensitive match against email and name
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssociationListFilter {
    pub status: Option<AssociationStatus>,
    pub event_id: Option<i64>,
    pub camp_id: Option<i64>,
}
