//! Clusters, teams and team membership inside a camp

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cluster {
    pub id: i64,
    pub camp_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cluster_lead_id: Option<i64>,
    pub backup_cluster_lead_id: Option<i64>,
    pub enable_cluster_lead: bool,
    pub enable_backup_cluster_lead: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: i64,
    pub cluster_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub team_lead_id: Option<i64>,
    pub backup_team_lead_id: Option<i64>,
    pub enable_team_lead: bool,
    pub enable_backup_team_lead: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub id: i64,
    pub team_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClusterRequest {
    pub name: String,
    pub description: Option<String>,
    pub cluster_lead_id: Option<i64>,
}

/// Partial cluster update.
///
/// `None` leaves a field untouched. For lead slots `Some(None)` clears the slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClusterRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub enable_cluster_lead: Option<bool>,
    pub enable_backup_cluster_lead: Option<bool>,
    pub cluster_lead_id: Option<Option<i64>>,
    pub backup_cluster_lead_id: Option<Option<i64>>,
}

impl UpdateClusterRequest {
    /// True when only lead slots are being changed
    pub fn touches_only_leads(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.enable_cluster_lead.is_none()
            && self.enable_backup_cluster_lead.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    pub team_lead_id: Option<i64>,
}

/// Partial team update, same conventions as [`UpdateClusterRequest`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub enable_team_lead: Option<bool>,
    pub enable_backup_team_lead: Option<bool>,
    pub team_lead_id: Option<Option<i64>>,
    pub backup_team_lead_id: Option<Option<i64>>,
}

impl UpdateTeamRequest {
    pub fn touches_only_leads(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.enable_team_lead.is_none()
            && self.enable_backup_team_lead.is_none()
    }
}
