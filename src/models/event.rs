//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::camp::CampEventAssociation;

text_enum! {
    EventStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_manager_email: Option<String>,
    pub event_manager_phone: Option<String>,
    pub safety_manager_email: Option<String>,
    pub safety_manager_phone: Option<String>,
    pub business_manager_email: Option<String>,
    pub business_manager_phone: Option<String>,
    pub board_email: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    pub creator_id: i64,
    pub has_early_arrival: bool,
    pub early_arrival_days: Option<i32>,
    pub has_late_departure: bool,
    pub late_departure_days: Option<i32>,
    pub has_accessibility_assistance: bool,
    pub has_drinking_water: bool,
    pub has_ice_available: bool,
    pub has_vehicle_access: bool,
    pub custom_event_options: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_approved(&self) -> bool {
        self.status == EventStatus::Approved
    }

    pub fn is_pending(&self) -> bool {
        self.status == EventStatus::Pending
    }

    /// Custom options entered as comma separated text
    pub fn custom_options_list(&self) -> Vec<String> {
        self.custom_event_options
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Full set of editable event fields, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_manager_email: Option<String>,
    pub event_manager_phone: Option<String>,
    pub safety_manager_email: Option<String>,
    pub safety_manager_phone: Option<String>,
    pub business_manager_email: Option<String>,
    pub business_manager_phone: Option<String>,
    pub board_email: Option<String>,
    #[serde(default)]
    pub has_early_arrival: bool,
    pub early_arrival_days: Option<i32>,
    #[serde(default)]
    pub has_late_departure: bool,
    pub late_departure_days: Option<i32>,
    #[serde(default)]
    pub has_accessibility_assistance: bool,
    #[serde(default)]
    pub has_drinking_water: bool,
    #[serde(default)]
    pub has_ice_available: bool,
    #[serde(default)]
    pub has_vehicle_access: bool,
    pub custom_event_options: Option<String>,
}

impl EventRequest {
    /// Minimal request with only the required fields filled in
    pub fn new(title: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            location: None,
            start_date,
            end_date,
            event_manager_email: None,
            event_manager_phone: None,
            safety_manager_email: None,
            safety_manager_phone: None,
            business_manager_email: None,
            business_manager_phone: None,
            board_email: None,
            has_early_arrival: false,
            early_arrival_days: None,
            has_late_departure: false,
            late_departure_days: None,
            has_accessibility_assistance: false,
            has_drinking_water: false,
            has_ice_available: false,
            has_vehicle_access: false,
            custom_event_options: None,
        }
    }
}

/// Camp requests for one event, split by status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCampRequests {
    pub pending: Vec<CampEventAssociation>,
    pub approved: Vec<CampEventAssociation>,
    pub rejected: Vec<CampEventAssociation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub has_ticket: bool,
    pub opted_early_arrival: bool,
    pub opted_late_departure: bool,
    pub opted_vehicle_access: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForEventRequest {
    pub has_ticket: bool,
    pub opted_early_arrival: bool,
    pub opted_late_departure: bool,
    pub opted_vehicle_access: bool,
}
