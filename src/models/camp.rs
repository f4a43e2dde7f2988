//! Camp, membership and camp-event association models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use std::collections::BTreeMap;

use super::event::Event;
use super::inventory::InventoryItem;

text_enum! {
    /// Lifecycle shared by memberships and camp-event associations
    AssociationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    CampMemberRole {
        Manager => "manager",
        Member => "member",
    }
}

text_enum! {
    /// Who may decide membership requests for a camp
    MemberApprovalMode {
        ManagerOnly => "manager_only",
        AllMembers => "all_members",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Camp {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub max_sites: i32,
    pub max_people: i32,
    pub has_communal_kitchen: bool,
    pub has_communal_space: bool,
    pub has_art_exhibits: bool,
    pub has_member_activities: bool,
    pub has_non_member_activities: bool,
    pub custom_amenities: Option<String>,
    #[sqlx(try_from = "String")]
    pub member_approval_mode: MemberApprovalMode,
    pub creator_id: i64,
    pub camp_lead_id: Option<i64>,
    pub backup_camp_lead_id: Option<i64>,
    pub enable_camp_lead: bool,
    pub enable_backup_camp_lead: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Camp {
    /// Built-in amenities that are switched on, followed by the custom ones
    pub fn amenities_list(&self) -> Vec<String> {
        let builtin = [
            (self.has_communal_kitchen, "Communal Kitchen"),
            (self.has_communal_space, "Communal Space"),
            (self.has_art_exhibits, "Art Exhibits"),
            (self.has_member_activities, "Member Activities"),
            (self.has_non_member_activities, "Non-Member Activities"),
        ];

        let mut amenities: Vec<String> = builtin
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, label)| label.to_string())
            .collect();

        if let Some(custom) = self.custom_amenities.as_deref() {
            amenities.extend(
                custom
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
            );
        }

        amenities
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampMember {
    pub id: i64,
    pub camp_id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub status: AssociationStatus,
    #[sqlx(try_from = "String")]
    pub role: CampMemberRole,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl CampMember {
    pub fn is_approved(&self) -> bool {
        self.status == AssociationStatus::Approved
    }

    pub fn is_manager(&self) -> bool {
        self.is_approved() && self.role == CampMemberRole::Manager
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampEventAssociation {
    pub id: i64,
    pub camp_id: i64,
    pub event_id: i64,
    #[sqlx(try_from = "String")]
    pub status: AssociationStatus,
    pub location: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Editable camp fields, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampRequest {
    pub name: String,
    pub description: String,
    pub max_sites: i32,
    pub max_people: i32,
    #[serde(default)]
    pub has_communal_kitchen: bool,
    #[serde(default)]
    pub has_communal_space: bool,
    #[serde(default)]
    pub has_art_exhibits: bool,
    #[serde(default)]
    pub has_member_activities: bool,
    #[serde(default)]
    pub has_non_member_activities: bool,
    pub custom_amenities: Option<String>,
    pub member_approval_mode: Option<MemberApprovalMode>,
}

impl CampRequest {
    pub fn new(name: &str, description: &str, max_sites: i32, max_people: i32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            max_sites,
            max_people,
            has_communal_kitchen: false,
            has_communal_space: false,
            has_art_exhibits: false,
            has_member_activities: false,
            has_non_member_activities: false,
            custom_amenities: None,
            member_approval_mode: None,
        }
    }
}

/// Camp lead slots; a disabled slot is stored empty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampLeadsRequest {
    pub enable_camp_lead: bool,
    pub camp_lead_id: Option<i64>,
    pub enable_backup_camp_lead: bool,
    pub backup_camp_lead_id: Option<i64>,
}

/// One line of a camp's pooled shared gear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedInventoryEntry {
    pub name: String,
    pub total_quantity: i64,
    /// Owner display names joined with ", "
    pub owners: String,
    /// Distinct non-empty descriptions joined with "; "
    pub descriptions: Option<String>,
}

impl SharedInventoryEntry {
    /// Group shared items by name, summing quantities. Input pairs are
    /// `(item, owner display name)`; output is sorted by item name.
    pub fn group(items: &[(InventoryItem, String)]) -> Vec<SharedInventoryEntry> {
        let mut grouped: BTreeMap<&str, (i64, Vec<&str>, Vec<&str>)> = BTreeMap::new();

        for (item, owner) in items {
            let entry = grouped.entry(item.name.as_str()).or_default();
            entry.0 += i64::from(item.quantity);
            entry.1.push(owner.as_str());
            if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
                if !entry.2.contains(&description) {
                    entry.2.push(description);
                }
            }
        }

        grouped
            .into_iter()
            .map(|(name, (total_quantity, owners, descriptions))| SharedInventoryEntry {
                name: name.to_string(),
                total_quantity,
                owners: owners.join(", "),
                descriptions: (!descriptions.is_empty()).then(|| descriptions.join("; ")),
            })
            .collect()
    }
}

/// Memberships of one camp, split by status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipsByStatus {
    pub pending: Vec<CampMember>,
    pub approved: Vec<CampMember>,
    pub rejected: Vec<CampMember>,
}

/// Everything shown on a camp page for a given viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampDetail {
    pub camp: Camp,
    pub amenities: Vec<String>,
    pub viewer_membership: Option<CampMember>,
    pub is_manager: bool,
    pub can_approve_members: bool,
    pub associations: Vec<CampEventAssociation>,
    /// Approved events without any request from this camp; only filled for managers
    pub available_events: Vec<Event>,
    pub pending_member_count: i64,
    pub shared_inventory: Vec<SharedInventoryEntry>,
}

/// A user's camps, split into approved and still-pending memberships
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyCamps {
    pub approved: Vec<(Camp, CampMember)>,
    pub pending: Vec<(Camp, CampMember)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camp() -> Camp {
        let now = Utc::now();
        Camp {
            id: 1,
            name: "Dust Devils".to_string(),
            description: "A camp for testing".to_string(),
            max_sites: 2,
            max_people: 8,
            has_communal_kitchen: true,
            has_communal_space: false,
            has_art_exhibits: true,
            has_member_activities: false,
            has_non_member_activities: false,
            custom_amenities: Some("Sauna, , Hammocks ".to_string()),
            member_approval_mode: MemberApprovalMode::ManagerOnly,
            creator_id: 1,
            camp_lead_id: None,
            backup_camp_lead_id: None,
            enable_camp_lead: false,
            enable_backup_camp_lead: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_amenities_list() {
        assert_eq!(
            camp().amenities_list(),
            vec!["Communal Kitchen", "Art Exhibits", "Sauna", "Hammocks"]
        );
    }

    fn item(name: &str, quantity: i32, description: Option<&str>) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: 1,
            user_id: 1,
            name: name.to_string(),
            quantity,
            description: description.map(str::to_string),
            is_shared_gear: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_shared_inventory_grouping() {
        let items = vec![
            (item("Tent", 1, Some("4 person")), "Ana".to_string()),
            (item("Cooler", 2, None), "Ben".to_string()),
            (item("Tent", 2, Some("4 person")), "Cy".to_string()),
            (item("Tent", 1, Some("Bell tent")), "Ana".to_string()),
        ];

        let grouped = SharedInventoryEntry::group(&items);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].name, "Cooler");
        assert_eq!(grouped[0].descriptions, None);
        assert_eq!(grouped[1].name, "Tent");
        assert_eq!(grouped[1].total_quantity, 4);
        assert_eq!(grouped[1].owners, "Ana, Cy, Ana");
        assert_eq!(grouped[1].descriptions.as_deref(), Some("4 person; Bell tent"));
    }

    #[test]
    fn test_approval_mode_values() {
        assert_eq!(MemberApprovalMode::AllMembers.as_str(), "all_members");
        assert_eq!(
            MemberApprovalMode::try_from("manager_only".to_string()).unwrap(),
            MemberApprovalMode::ManagerOnly
        );
        assert!(AssociationStatus::try_from("cancelled".to_string()).is_err());
    }
}
