//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

text_enum! {
    /// Global user role, ordered from most to least privileged
    UserRole {
        GlobalAdmin => "global admin",
        SiteAdmin => "site admin",
        EventManager => "event manager",
        CampManager => "camp manager",
        Member => "member",
    }
}

impl UserRole {
    fn rank(&self) -> u8 {
        match self {
            UserRole::GlobalAdmin => 5,
            UserRole::SiteAdmin => 4,
            UserRole::EventManager => 3,
            UserRole::CampManager => 2,
            UserRole::Member => 1,
        }
    }

    /// True when `self` is `required` or sits above it in the hierarchy
    pub fn has_role_or_higher(&self, required: UserRole) -> bool {
        self.rank() >= required.rank()
    }

    pub fn is_site_admin_or_higher(&self) -> bool {
        self.has_role_or_higher(UserRole::SiteAdmin)
    }

    pub fn is_event_manager_or_higher(&self) -> bool {
        self.has_role_or_higher(UserRole::EventManager)
    }
}

text_enum! {
    ThemePreference {
        Light => "light",
        Dark => "dark",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_name: Option<String>,
    pub show_full_name: bool,
    pub pronouns: Option<String>,
    pub show_pronouns: bool,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub email_verification_token: Option<String>,
    pub email_verification_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    pub password_reset_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub email_change_token: Option<String>,
    pub email_change_new_email: Option<String>,
    pub email_change_sent_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[sqlx(try_from = "String")]
    pub theme_preference: ThemePreference,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl User {
    /// Name shown to other users.
    ///
    /// Full name when opted in and both parts are set, then preferred name,
    /// first name, the provider-supplied name, and finally the email local part.
    pub fn display_name(&self) -> String {
        if self.show_full_name {
            if let Some(full) = self.full_name() {
                return full;
            }
        }

        non_blank(&self.preferred_name)
            .or_else(|| non_blank(&self.first_name))
            .or_else(|| non_blank(&self.name))
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.email
                    .split('@')
                    .next()
                    .unwrap_or(&self.email)
                    .to_string()
            })
    }

    /// Display name followed by pronouns when the user chose to show them
    pub fn display_name_with_pronouns(&self) -> String {
        match (self.show_pronouns, non_blank(&self.pronouns)) {
            (true, Some(pronouns)) => format!("{} ({})", self.display_name(), pronouns),
            _ => self.display_name(),
        }
    }

    pub fn full_name(&self) -> Option<String> {
        match (non_blank(&self.first_name), non_blank(&self.last_name)) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Admin-created account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: UserRole,
}

/// Profile edit; every field replaces the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_name: Option<String>,
    pub show_full_name: bool,
    pub pronouns: Option<String>,
    pub show_pronouns: bool,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub theme_preference: Option<ThemePreference>,
}

#[cfg(test)]
pub(crate) fn sample_user(id: i64, email: &str) -> User {
    let now = Utc::now();
    User {
        id,
        email: email.to_string(),
        name: None,
        picture: None,
        first_name: None,
        last_name: None,
        preferred_name: None,
        show_full_name: false,
        pronouns: None,
        show_pronouns: false,
        home_phone: None,
        mobile_phone: None,
        work_phone: None,
        address_line1: None,
        address_line2: None,
        city: None,
        state: None,
        zip_code: None,
        country: "US".to_string(),
        role: UserRole::Member,
        password_hash: None,
        email_verified: true,
        email_verification_token: None,
        email_verification_sent_at: None,
        password_reset_token: None,
        password_reset_sent_at: None,
        email_change_token: None,
        email_change_new_email: None,
        email_change_sent_at: None,
        is_active: true,
        theme_preference: ThemePreference::Light,
        created_at: now,
        last_login: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(UserRole::GlobalAdmin.has_role_or_higher(UserRole::SiteAdmin));
        assert!(UserRole::SiteAdmin.has_role_or_higher(UserRole::SiteAdmin));
        assert!(!UserRole::EventManager.has_role_or_higher(UserRole::SiteAdmin));
        assert!(UserRole::CampManager.has_role_or_higher(UserRole::Member));
        assert!(!UserRole::Member.is_event_manager_or_higher());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("site admin".parse::<UserRole>().unwrap(), UserRole::SiteAdmin);
        assert!("superuser".parse::<UserRole>().is_err());
        assert_eq!(UserRole::EventManager.to_string(), "event manager");
        assert_eq!(serde_json::to_string(&UserRole::GlobalAdmin).unwrap(), "\"global admin\"");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut user = sample_user(1, "sam.river@example.com");
        assert_eq!(user.display_name(), "sam.river");

        user.name = Some("Sam R".to_string());
        assert_eq!(user.display_name(), "Sam R");

        user.first_name = Some("Sam".to_string());
        assert_eq!(user.display_name(), "Sam");

        user.preferred_name = Some("Sunny".to_string());
        assert_eq!(user.display_name(), "Sunny");

        user.last_name = Some("River".to_string());
        assert_eq!(user.display_name(), "Sunny");

        user.show_full_name = true;
        assert_eq!(user.display_name(), "Sam River");
    }

    #[test]
    fn test_full_name_needs_both_parts() {
        let mut user = sample_user(1, "a@example.com");
        user.show_full_name = true;
        user.first_name = Some("Ada".to_string());
        assert_eq!(user.full_name(), None);
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn test_pronouns_only_when_shown() {
        let mut user = sample_user(1, "a@example.com");
        user.preferred_name = Some("Ash".to_string());
        user.pronouns = Some("they/them".to_string());
        assert_eq!(user.display_name_with_pronouns(), "Ash");

        user.show_pronouns = true;
        assert_eq!(user.display_name_with_pronouns(), "Ash (they/them)");
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut user = sample_user(1, "a@example.com");
        user.password_hash = Some("hash".to_string());
        user.password_reset_token = Some("token".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("password_reset_token"));
        assert!(!json.contains("\"token\""));
    }
}
