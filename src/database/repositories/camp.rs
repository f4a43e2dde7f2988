//! Camp repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::camp::{AssociationStatus, Camp, CampMemberRole, CampRequest, MemberApprovalMode};
use crate::models::inventory::InventoryItem;
use crate::models::user::User;
use crate::utils::errors::CampHubError;
use crate::utils::helpers::trim_to_option;

#[derive(Clone, Debug)]
pub struct CampRepository {
    pool: PgPool,
}

impl CampRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the camp and its creator's approved manager membership atomically
    pub async fn create_with_manager(&self, creator_id: i64, request: &CampRequest) -> Result<Camp, CampHubError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let camp = sqlx::query_as::<_, Camp>(
            r#"
            INSERT INTO camps (name, description, max_sites, max_people, has_communal_kitchen,
                               has_communal_space, has_art_exhibits, has_member_activities,
                               has_non_member_activities, custom_amenities, member_approval_mode,
                               creator_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING *
            "#
        )
        .bind(request.name.trim())
        .bind(request.description.trim())
        .bind(request.max_sites)
        .bind(request.max_people)
        .bind(request.has_communal_kitchen)
        .bind(request.has_communal_space)
        .bind(request.has_art_exhibits)
        .bind(request.has_member_activities)
        .bind(request.has_non_member_activities)
        .bind(trim_to_option(request.custom_amenities.as_deref()))
        .bind(request.member_approval_mode.unwrap_or(MemberApprovalMode::ManagerOnly).as_str())
        .bind(creator_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO camp_members (camp_id, user_id, status, role, requested_at, approved_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#
        )
        .bind(camp.id)
        .bind(creator_id)
        .bind(AssociationStatus::Approved.as_str())
        .bind(CampMemberRole::Manager.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(camp)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Camp>, CampHubError> {
        let camp = sqlx::query_as::<_, Camp>("SELECT * FROM camps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(camp)
    }

    pub async fn get(&self, id: i64) -> Result<Camp, CampHubError> {
        self.find_by_id(id)
            .await?
            .ok_or(CampHubError::CampNotFound { camp_id: id })
    }

    /// Replace the editable fields; an absent approval mode keeps the current one
    pub async fn update(&self, id: i64, request: &CampRequest) -> Result<Camp, CampHubError> {
        let camp = sqlx::query_as::<_, Camp>(
            r#"
            UPDATE camps
            SET name = $2, description = $3, max_sites = $4, max_people = $5,
                has_communal_kitchen = $6, has_communal_space = $7, has_art_exhibits = $8,
                has_member_activities = $9, has_non_member_activities = $10,
                custom_amenities = $11, member_approval_mode = COALESCE($12, member_approval_mode),
                updated_at = $13
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(request.name.trim())
        .bind(request.description.trim())
        .bind(request.max_sites)
        .bind(request.max_people)
        .bind(request.has_communal_kitchen)
        .bind(request.has_communal_space)
        .bind(request.has_art_exhibits)
        .bind(request.has_member_activities)
        .bind(request.has_non_member_activities)
        .bind(trim_to_option(request.custom_amenities.as_deref()))
        .bind(request.member_approval_mode.map(|m| m.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        camp.ok_or(CampHubError::CampNotFound { camp_id: id })
    }

    /// Camp lead slots; a disabled slot is always stored empty
    pub async fn set_leads(
        &self,
        id: i64,
        enable_camp_lead: bool,
        camp_lead_id: Option<i64>,
        enable_backup_camp_lead: bool,
        backup_camp_lead_id: Option<i64>,
    ) -> Result<Camp, CampHubError> {
        let camp = sqlx::query_as::<_, Camp>(
            r#"
            UPDATE camps
            SET enable_camp_lead = $2, camp_lead_id = $3,
                enable_backup_camp_lead = $4, backup_camp_lead_id = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(enable_camp_lead)
        .bind(camp_lead_id.filter(|_| enable_camp_lead))
        .bind(enable_backup_camp_lead)
        .bind(backup_camp_lead_id.filter(|_| enable_backup_camp_lead))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        camp.ok_or(CampHubError::CampNotFound { camp_id: id })
    }

    /// All camps, alphabetical
    pub async fn list(&self) -> Result<Vec<Camp>, CampHubError> {
        let camps = sqlx::query_as::<_, Camp>("SELECT * FROM camps ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(camps)
    }

    pub async fn find_many(&self, ids: &[i64]) -> Result<Vec<Camp>, CampHubError> {
        let camps = sqlx::query_as::<_, Camp>("SELECT * FROM camps WHERE id = ANY($1) ORDER BY name ASC")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(camps)
    }

    /// Shared gear of the camp's approved members, each paired with its owner
    pub async fn shared_items_with_owners(&self, camp_id: i64) -> Result<Vec<(InventoryItem, User)>, CampHubError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT i.* FROM inventory_items i
            JOIN camp_members m ON m.user_id = i.user_id
            WHERE m.camp_id = $1 AND m.status = 'approved' AND i.is_shared_gear
            ORDER BY i.name ASC, i.id ASC
            "#
        )
        .bind(camp_id)
        .fetch_all(&self.pool)
        .await?;

        let owner_ids: Vec<i64> = items.iter().map(|i| i.user_id).collect();
        let owners = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(&owner_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                owners
                    .iter()
                    .find(|u| u.id == item.user_id)
                    .cloned()
                    .map(|owner| (item, owner))
            })
            .collect())
    }
}
