//! Camp membership repository

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::camp::{AssociationStatus, CampMember, CampMemberRole};
use crate::utils::errors::CampHubError;

#[derive(Clone, Debug)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's membership row for a camp, whatever its status
    pub async fn find(&self, camp_id: i64, user_id: i64) -> Result<Option<CampMember>, CampHubError> {
        let member = sqlx::query_as::<_, CampMember>(
            "SELECT * FROM camp_members WHERE camp_id = $1 AND user_id = $2"
        )
        .bind(camp_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn get(&self, camp_id: i64, user_id: i64) -> Result<CampMember, CampHubError> {
        self.find(camp_id, user_id)
            .await?
            .ok_or(CampHubError::MembershipNotFound { camp_id, user_id })
    }

    /// New pending request with the plain member role
    pub async fn create_request(&self, camp_id: i64, user_id: i64) -> Result<CampMember, CampHubError> {
        let member = sqlx::query_as::<_, CampMember>(
            r#"
            INSERT INTO camp_members (camp_id, user_id, status, role, requested_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#
        )
        .bind(camp_id)
        .bind(user_id)
        .bind(AssociationStatus::Pending.as_str())
        .bind(CampMemberRole::Member.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Membership already requested"))?;

        Ok(member)
    }

    /// Move a membership from `from` to `to`. Returns `None` if the row was no
    /// longer in `from`.
    pub async fn transition(
        &self,
        id: i64,
        from: AssociationStatus,
        to: AssociationStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<CampMember>, CampHubError> {
        let member = sqlx::query_as::<_, CampMember>(
            r#"
            UPDATE camp_members SET status = $3, approved_at = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(approved_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn promote(&self, id: i64) -> Result<CampMember, CampHubError> {
        let member = sqlx::query_as::<_, CampMember>(
            "UPDATE camp_members SET role = $2 WHERE id = $1 AND status = 'approved' RETURNING *"
        )
        .bind(id)
        .bind(CampMemberRole::Manager.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    /// Demote a manager while holding row locks on every manager of the camp,
    /// so two concurrent demotions cannot leave the camp without one.
    ///
    /// The closure receives the target row and the locked manager count and
    /// decides whether the demotion may proceed.
    pub async fn demote_locked<F>(&self, camp_id: i64, user_id: i64, guard: F) -> Result<CampMember, CampHubError>
    where
        F: FnOnce(&CampMember, i64) -> Result<(), CampHubError>,
    {
        let mut tx = self.pool.begin().await?;

        let managers = sqlx::query_as::<_, CampMember>(
            r#"
            SELECT * FROM camp_members
            WHERE camp_id = $1 AND status = 'approved' AND role = 'manager'
            ORDER BY id
            FOR UPDATE
            "#
        )
        .bind(camp_id)
        .fetch_all(&mut *tx)
        .await?;

        let target = sqlx::query_as::<_, CampMember>(
            "SELECT * FROM camp_members WHERE camp_id = $1 AND user_id = $2"
        )
        .bind(camp_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CampHubError::MembershipNotFound { camp_id, user_id })?;

        guard(&target, managers.len() as i64)?;

        let demoted = sqlx::query_as::<_, CampMember>(
            "UPDATE camp_members SET role = $2 WHERE id = $1 RETURNING *"
        )
        .bind(target.id)
        .bind(CampMemberRole::Member.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(demoted)
    }

    pub async fn count_managers(&self, camp_id: i64) -> Result<i64, CampHubError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM camp_members WHERE camp_id = $1 AND status = 'approved' AND role = 'manager'"
        )
        .bind(camp_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_pending(&self, camp_id: i64) -> Result<i64, CampHubError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM camp_members WHERE camp_id = $1 AND status = 'pending'"
        )
        .bind(camp_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Every membership of a camp, oldest request first
    pub async fn list_for_camp(&self, camp_id: i64) -> Result<Vec<CampMember>, CampHubError> {
        let members = sqlx::query_as::<_, CampMember>(
            "SELECT * FROM camp_members WHERE camp_id = $1 ORDER BY requested_at ASC"
        )
        .bind(camp_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<CampMember>, CampHubError> {
        let members = sqlx::query_as::<_, CampMember>(
            "SELECT * FROM camp_members WHERE user_id = $1 ORDER BY requested_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Pending requests across every camp the user manages, newest first
    pub async fn pending_for_manager(&self, manager_id: i64) -> Result<Vec<CampMember>, CampHubError> {
        let members = sqlx::query_as::<_, CampMember>(
            r#"
            SELECT m.* FROM camp_members m
            WHERE m.status = 'pending'
              AND m.camp_id IN (
                  SELECT camp_id FROM camp_members
                  WHERE user_id = $1 AND status = 'approved' AND role = 'manager'
              )
            ORDER BY m.requested_at DESC
            "#
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
