//! Builders for rows the integration tests need

use chrono::{Duration, Utc};

use camphub::database::repositories::NewUser;
use camphub::database::DatabaseService;
use camphub::models::{CampRequest, EventRequest, User, UserRole};
use camphub::Actor;

/// Insert a verified user with the given role
pub async fn create_user(db: &DatabaseService, email: &str, role: UserRole) -> User {
    db.users
        .create(NewUser {
            email: email.to_string(),
            name: Some(email.split('@').next().unwrap_or(email).to_string()),
            first_name: None,
            last_name: None,
            picture: None,
            password_hash: None,
            role,
            email_verified: true,
            verification_token: None,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_actor(db: &DatabaseService, email: &str, role: UserRole) -> Actor {
    Actor::from(&create_user(db, email, role).await)
}

/// A two-day event starting a month from now
pub fn event_request(title: &str) -> EventRequest {
    let start = (Utc::now() + Duration::days(30)).date_naive();
    EventRequest::new(title, start, start + Duration::days(2))
}

pub fn camp_request(name: &str) -> CampRequest {
    CampRequest::new(name, "A camp used by the integration tests", 4, 12)
}
