//! Camp-event association repository

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::admin::AssociationListFilter;
use crate::models::camp::{AssociationStatus, CampEventAssociation};
use crate::utils::errors::CampHubError;

#[derive(Clone, Debug)]
pub struct AssociationRepository {
    pool: PgPool,
}

impl AssociationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, camp_id: i64, event_id: i64) -> Result<Option<CampEventAssociation>, CampHubError> {
        let association = sqlx::query_as::<_, CampEventAssociation>(
            "SELECT * FROM camp_event_associations WHERE camp_id = $1 AND event_id = $2"
        )
        .bind(camp_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(association)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<CampEventAssociation>, CampHubError> {
        let association = sqlx::query_as::<_, CampEventAssociation>(
            "SELECT * FROM camp_event_associations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(association)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CampEventAssociation, CampHubError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| CampHubError::AssociationNotFound(format!("id {}", id)))
    }

    pub async fn create(&self, camp_id: i64, event_id: i64, location: Option<String>) -> Result<CampEventAssociation, CampHubError> {
        let association = sqlx::query_as::<_, CampEventAssociation>(
            r#"
            INSERT INTO camp_event_associations (camp_id, event_id, status, location, requested_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#
        )
        .bind(camp_id)
        .bind(event_id)
        .bind(AssociationStatus::Pending.as_str())
        .bind(location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Camp already requested this event"))?;

        Ok(association)
    }

    /// Compare-and-set status change; `None` when the row was not in `from`
    pub async fn transition(
        &self,
        id: i64,
        from: AssociationStatus,
        to: AssociationStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<CampEventAssociation>, CampHubError> {
        let association = sqlx::query_as::<_, CampEventAssociation>(
            r#"
            UPDATE camp_event_associations SET status = $3, approved_at = $4
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

        Ok(association)
    }

    pub async fn set_location(&self, id: i64, location: Option<String>) -> Result<CampEventAssociation, CampHubError> {
        let association = sqlx::query_as::<_, CampEventAssociation>(
            "UPDATE camp_event_associations SET location = $2 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(location)
        .fetch_optional(&self.pool)
        .await?;

        association.ok_or_else(|| CampHubError::AssociationNotFound(format!("id {}", id)))
    }

    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<CampEventAssociation>, CampHubError> {
        let associations = sqlx::query_as::<_, CampEventAssociation>(
            "SELECT * FROM camp_event_associations WHERE event_id = $1 ORDER BY requested_at ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(associations)
    }

    pub async fn list_for_camp(&self, camp_id: i64) -> Result<Vec<CampEventAssociation>, CampHubError> {
        let associations = sqlx::query_as::<_, CampEventAssociation>(
            "SELECT * FROM camp_event_associations WHERE camp_id = $1 ORDER BY requested_at DESC"
        )
        .bind(camp_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(associations)
    }

    /// Pending camp requests for events created by the given user, newest first
    pub async fn pending_for_event_creator(&self, creator_id: i64) -> Result<Vec<CampEventAssociation>, CampHubError> {
        let associations = sqlx::query_as::<_, CampEventAssociation>(
            r#"
            SELECT a.* FROM camp_event_associations a
            JOIN events e ON e.id = a.event_id
            WHERE a.status = 'pending' AND e.creator_id = $1
            ORDER BY a.requested_at DESC
            "#
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(associations)
    }

    /// Admin listing with optional status, event and camp filters
    pub async fn list(&self, filter: &AssociationListFilter) -> Result<Vec<CampEventAssociation>, CampHubError> {
        let associations = sqlx::query_as::<_, CampEventAssociation>(
            r#"
            SELECT * FROM camp_event_associations
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::BIGINT IS NULL OR event_id = $2)
              AND ($3::BIGINT IS NULL OR camp_id = $3)
            ORDER BY requested_at DESC
            "#
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.event_id)
        .bind(filter.camp_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(associations)
    }
}
