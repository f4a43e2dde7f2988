//! Event registration repository

use sqlx::PgPool;
use chrono::Utc;
use crate::models::event::{EventRegistration, RegisterForEventRequest};
use crate::utils::errors::CampHubError;

#[derive(Clone, Debug)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        event_id: i64,
        user_id: i64,
        request: &RegisterForEventRequest,
    ) -> Result<EventRegistration, CampHubError> {
        let now = Utc::now();
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (user_id, event_id, has_ticket, opted_early_arrival,
                                             opted_late_departure, opted_vehicle_access, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(event_id)
        .bind(request.has_ticket)
        .bind(request.opted_early_arrival)
        .bind(request.opted_late_departure)
        .bind(request.opted_vehicle_access)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Already registered for this event"))?;

        Ok(registration)
    }

    pub async fn find(&self, event_id: i64, user_id: i64) -> Result<Option<EventRegistration>, CampHubError> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE event_id = $1 AND user_id = $2"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Returns false when there was nothing to delete
    pub async fn delete(&self, event_id: i64, user_id: i64) -> Result<bool, CampHubError> {
        let result = sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<EventRegistration>, CampHubError> {
        let registrations = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE event_id = $1 ORDER BY created_at ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<EventRegistration>, CampHubError> {
        let registrations = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }
}
