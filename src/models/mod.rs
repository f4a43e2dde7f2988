//! Data models module
//!
//! This module contains all data structures used throughout the application

/// Declares a fieldless enum stored as TEXT, with string conversions in both
/// directions and serde names matching the database values.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::utils::errors::CampHubError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(crate::utils::errors::CampHubError::InvalidInput(
                        format!("Invalid {} value: {}", stringify!($name), other),
                    )),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = crate::utils::errors::CampHubError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub mod user;
pub mod oauth;
pub mod event;
pub mod camp;
pub mod organization;
pub mod inventory;
pub mod admin;

// Re-export commonly used models
pub use user::{User, UserRole, ThemePreference, CreateUserRequest, UpdateProfileRequest};
pub use oauth::{OAuthProvider, OAuthProviderKind, OAuthUserInfo};
pub use event::{
    Event, EventStatus, EventRequest, EventRegistration, RegisterForEventRequest,
    EventCampRequests,
};
pub use camp::{
    Camp, CampMember, CampMemberRole, CampEventAssociation, AssociationStatus,
    MemberApprovalMode, CampRequest, CampLeadsRequest, CampDetail, SharedInventoryEntry, MembershipsByStatus,
    MyCamps,
};
pub use organization::{
    Cluster, Team, TeamMember, CreateClusterRequest, UpdateClusterRequest, CreateTeamRequest,
    UpdateTeamRequest,
};
pub use inventory::{
    InventoryItem, InventoryItemRequest, InventoryItemUpdate, BulkInventoryUpdate,
    BulkUpdateOutcome, QuickAddItem,
};
pub use admin::{AdminStats, UserStatusFilter, UserListFilter, AssociationListFilter};
