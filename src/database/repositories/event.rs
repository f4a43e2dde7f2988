//! Event repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::event::{Event, EventRequest, EventStatus};
use crate::utils::errors::CampHubError;
use crate::utils::helpers::trim_to_option;
use crate::workflow::EventVisibility;

#[derive(Clone)]
#[derive(Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event in pending status
    pub async fn create(&self, creator_id: i64, request: &EventRequest) -> Result<Event, CampHubError> {
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, location, start_date, end_date,
                                event_manager_email, event_manager_phone, safety_manager_email,
                                safety_manager_phone, business_manager_email, business_manager_phone,
                                board_email, status, creator_id, has_early_arrival, early_arrival_days,
                                has_late_departure, late_departure_days, has_accessibility_assistance,
                                has_drinking_water, has_ice_available, has_vehicle_access,
                                custom_event_options, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                    $19, $20, $21, $22, $23, $24, $24)
            RETURNING *
            "#
        )
        .bind(request.title.trim())
        .bind(trim_to_option(request.description.as_deref()))
        .bind(trim_to_option(request.location.as_deref()))
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(trim_to_option(request.event_manager_email.as_deref()))
        .bind(trim_to_option(request.event_manager_phone.as_deref()))
        .bind(trim_to_option(request.safety_manager_email.as_deref()))
        .bind(trim_to_option(request.safety_manager_phone.as_deref()))
        .bind(trim_to_option(request.business_manager_email.as_deref()))
        .bind(trim_to_option(request.business_manager_phone.as_deref()))
        .bind(trim_to_option(request.board_email.as_deref()))
        .bind(EventStatus::Pending.as_str())
        .bind(creator_id)
        .bind(request.has_early_arrival)
        .bind(request.early_arrival_days.filter(|_| request.has_early_arrival))
        .bind(request.has_late_departure)
        .bind(request.late_departure_days.filter(|_| request.has_late_departure))
        .bind(request.has_accessibility_assistance)
        .bind(request.has_drinking_water)
        .bind(request.has_ice_available)
        .bind(request.has_vehicle_access)
        .bind(trim_to_option(request.custom_event_options.as_deref()))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, CampHubError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    pub async fn get(&self, id: i64) -> Result<Event, CampHubError> {
        self.find_by_id(id)
            .await?
            .ok_or(CampHubError::EventNotFound { event_id: id })
    }

    /// Replace the editable fields; status is left alone
    pub async fn update(&self, id: i64, request: &EventRequest) -> Result<Event, CampHubError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $2, description = $3, location = $4, start_date = $5, end_date = $6,
                event_manager_email = $7, event_manager_phone = $8, safety_manager_email = $9,
                safety_manager_phone = $10, business_manager_email = $11, business_manager_phone = $12,
                board_email = $13, has_early_arrival = $14, early_arrival_days = $15,
                has_late_departure = $16, late_departure_days = $17,
                has_accessibility_assistance = $18, has_drinking_water = $19,
                has_ice_available = $20, has_vehicle_access = $21, custom_event_options = $22,
                updated_at = $23
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(request.title.trim())
        .bind(trim_to_option(request.description.as_deref()))
        .bind(trim_to_option(request.location.as_deref()))
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(trim_to_option(request.event_manager_email.as_deref()))
        .bind(trim_to_option(request.event_manager_phone.as_deref()))
        .bind(trim_to_option(request.safety_manager_email.as_deref()))
        .bind(trim_to_option(request.safety_manager_phone.as_deref()))
        .bind(trim_to_option(request.business_manager_email.as_deref()))
        .bind(trim_to_option(request.business_manager_phone.as_deref()))
        .bind(trim_to_option(request.board_email.as_deref()))
        .bind(request.has_early_arrival)
        .bind(request.early_arrival_days.filter(|_| request.has_early_arrival))
        .bind(request.has_late_departure)
        .bind(request.late_departure_days.filter(|_| request.has_late_departure))
        .bind(request.has_accessibility_assistance)
        .bind(request.has_drinking_water)
        .bind(request.has_ice_available)
        .bind(request.has_vehicle_access)
        .bind(trim_to_option(request.custom_event_options.as_deref()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or(CampHubError::EventNotFound { event_id: id })
    }

    pub async fn set_status(&self, id: i64, status: EventStatus) -> Result<Event, CampHubError> {
        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or(CampHubError::EventNotFound { event_id: id })
    }

    /// Move an event from `from` to `to`. Returns `None` if the status changed underneath.
    pub async fn transition(&self, id: i64, from: EventStatus, to: EventStatus) -> Result<Option<Event>, CampHubError> {
        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2 RETURNING *"
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Events a viewer may list
    pub async fn list_visible(&self, visibility: EventVisibility) -> Result<Vec<Event>, CampHubError> {
        let query = match visibility {
            EventVisibility::All => {
                sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at DESC")
            }
            EventVisibility::ApprovedOrCreatedBy(user_id) => sqlx::query_as::<_, Event>(
                "SELECT * FROM events WHERE status = 'approved' OR creator_id = $1 ORDER BY start_date ASC"
            )
            .bind(user_id),
            EventVisibility::ApprovedOnly => sqlx::query_as::<_, Event>(
                "SELECT * FROM events WHERE status = 'approved' ORDER BY start_date ASC"
            ),
        };

        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Event>, CampHubError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE creator_id = $1 ORDER BY start_date ASC"
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Approved events the camp has not requested yet, in any status
    pub async fn list_approved_without_request_from(&self, camp_id: i64) -> Result<Vec<Event>, CampHubError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.* FROM events e
            WHERE e.status = 'approved'
              AND NOT EXISTS (
                  SELECT 1 FROM camp_event_associations a
                  WHERE a.event_id = e.id AND a.camp_id = $1
              )
            ORDER BY e.start_date ASC
            "#
        )
        .bind(camp_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
