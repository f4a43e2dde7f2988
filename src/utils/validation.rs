//! Input validation for user-supplied fields
//!
//! Every check returns `CampHubError::InvalidInput` with a message suitable
//! for showing back to the user.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{CampRequest, EventRequest, InventoryItemRequest, UpdateProfileRequest};
use super::errors::{CampHubError, Result};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_PHONE_LENGTH: usize = 20;
pub const MAX_TITLE_LENGTH: usize = 255;
pub const MIN_CAMP_DESCRIPTION_LENGTH: usize = 10;
pub const MAX_CUSTOM_AMENITIES_LENGTH: usize = 500;
pub const MAX_ITEM_DESCRIPTION_LENGTH: usize = 1000;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\s\-\(\)\+\.]+$").expect("valid phone regex"))
}

fn invalid(message: impl Into<String>) -> CampHubError {
    CampHubError::InvalidInput(message.into())
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.len() > 255 || !email_regex().is_match(email) {
        return Err(invalid("Invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str, min_length: usize) -> Result<()> {
    if password.chars().count() < min_length {
        return Err(invalid(format!(
            "Password must be at least {} characters long",
            min_length
        )));
    }
    Ok(())
}

pub fn max_length(label: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(invalid(format!(
            "{} must be less than {} characters",
            label, max
        ))),
        _ => Ok(()),
    }
}

/// Optional phone field: digits, spaces and `-()+.` only
pub fn validate_phone(label: &str, value: Option<&str>) -> Result<()> {
    let Some(phone) = value.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    max_length(label, Some(phone), MAX_PHONE_LENGTH)?;
    if !phone_regex().is_match(phone) {
        return Err(invalid(format!(
            "{} may only contain digits, spaces, and the characters - ( ) + .",
            label
        )));
    }
    Ok(())
}

fn validate_optional_email(label: &str, value: Option<&str>) -> Result<()> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(email) => validate_email(email).map_err(|_| invalid(format!("{} is not a valid email address", label))),
        None => Ok(()),
    }
}

/// Required trimmed name with an upper bound, used for clusters and teams
pub fn required_name(label: &str, value: &str, max: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("{} name is required", label)));
    }
    if trimmed.chars().count() > max {
        return Err(invalid(format!("{} name must be less than {} characters", label, max)));
    }
    Ok(trimmed.to_string())
}

pub fn validate_profile(request: &UpdateProfileRequest) -> Result<()> {
    max_length("First name", request.first_name.as_deref(), MAX_NAME_LENGTH)?;
    max_length("Last name", request.last_name.as_deref(), MAX_NAME_LENGTH)?;
    max_length("Preferred name", request.preferred_name.as_deref(), MAX_NAME_LENGTH)?;
    max_length("Pronouns", request.pronouns.as_deref(), 50)?;
    validate_phone("Home phone", request.home_phone.as_deref())?;
    validate_phone("Mobile phone", request.mobile_phone.as_deref())?;
    validate_phone("Work phone", request.work_phone.as_deref())?;
    max_length("Address line 1", request.address_line1.as_deref(), 255)?;
    max_length("Address line 2", request.address_line2.as_deref(), 255)?;
    max_length("City", request.city.as_deref(), 100)?;
    max_length("State", request.state.as_deref(), 50)?;
    max_length("ZIP code", request.zip_code.as_deref(), 20)?;
    max_length("Country", request.country.as_deref(), 100)?;
    Ok(())
}

pub fn validate_event_request(request: &EventRequest) -> Result<()> {
    if request.title.trim().is_empty() {
        return Err(invalid("Title is required"));
    }
    max_length("Title", Some(&request.title), MAX_TITLE_LENGTH)?;
    max_length("Location", request.location.as_deref(), 255)?;

    if request.end_date < request.start_date {
        return Err(invalid("End date cannot be before start date"));
    }

    validate_optional_email("Event manager email", request.event_manager_email.as_deref())?;
    validate_optional_email("Safety manager email", request.safety_manager_email.as_deref())?;
    validate_optional_email("Business manager email", request.business_manager_email.as_deref())?;
    validate_optional_email("Board email", request.board_email.as_deref())?;
    validate_phone("Event manager phone", request.event_manager_phone.as_deref())?;
    validate_phone("Safety manager phone", request.safety_manager_phone.as_deref())?;
    validate_phone("Business manager phone", request.business_manager_phone.as_deref())?;

    for (label, days) in [
        ("Early arrival days", request.early_arrival_days),
        ("Late departure days", request.late_departure_days),
    ] {
        if days.map_or(false, |d| d < 0) {
            return Err(invalid(format!("{} cannot be negative", label)));
        }
    }

    Ok(())
}

pub fn validate_camp_request(request: &CampRequest) -> Result<()> {
    if request.name.trim().is_empty() {
        return Err(invalid("Camp name is required"));
    }
    max_length("Camp name", Some(&request.name), MAX_TITLE_LENGTH)?;

    if request.description.trim().chars().count() < MIN_CAMP_DESCRIPTION_LENGTH {
        return Err(invalid(format!(
            "Description must be at least {} characters",
            MIN_CAMP_DESCRIPTION_LENGTH
        )));
    }

    if request.max_sites < 1 {
        return Err(invalid("Must have at least 1 site"));
    }
    if request.max_people < 1 {
        return Err(invalid("Must allow at least 1 person"));
    }
    if request.max_people < request.max_sites {
        return Err(invalid("Maximum people must be at least the number of sites"));
    }

    max_length("Custom amenities", request.custom_amenities.as_deref(), MAX_CUSTOM_AMENITIES_LENGTH)?;
    Ok(())
}

pub fn validate_inventory_request(request: &InventoryItemRequest) -> Result<()> {
    if request.name.trim().is_empty() {
        return Err(invalid("Item name is required"));
    }
    max_length("Item name", Some(&request.name), MAX_TITLE_LENGTH)?;
    if request.quantity < 0 {
        return Err(invalid("Quantity must be 0 or greater"));
    }
    max_length("Description", request.description.as_deref(), MAX_ITEM_DESCRIPTION_LENGTH)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("someone@example.org").is_ok());
        assert!(validate_email("no-at-sign.org").is_err());
        assert!(validate_email("two@@example.org").is_err());
        assert!(validate_email("spaces in@example.org").is_err());
    }

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone("Phone", Some("+1 (555) 123-4567")).is_ok());
        assert!(validate_phone("Phone", Some("555.123.4567")).is_ok());
        assert!(validate_phone("Phone", Some("call me")).is_err());
        assert!(validate_phone("Phone", Some("123456789012345678901")).is_err());
        assert!(validate_phone("Phone", Some("  ")).is_ok());
        assert!(validate_phone("Phone", None).is_ok());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345678", 8).is_ok());
        assert!(validate_password("1234567", 8).is_err());
    }

    #[test]
    fn test_event_dates() {
        let start = NaiveDate::from_ymd_opt(2030, 7, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2030, 7, 9).unwrap();
        assert!(validate_event_request(&EventRequest::new("Fest", start, start)).is_ok());
        assert!(validate_event_request(&EventRequest::new("Fest", start, end)).is_err());
        assert!(validate_event_request(&EventRequest::new("  ", start, start)).is_err());

        let mut request = EventRequest::new("Fest", start, start);
        request.board_email = Some("board".to_string());
        assert!(validate_event_request(&request).is_err());
    }

    #[test]
    fn test_camp_rules() {
        assert!(validate_camp_request(&CampRequest::new("Camp", "Long enough text", 2, 10)).is_ok());
        assert!(validate_camp_request(&CampRequest::new("Camp", "short", 2, 10)).is_err());
        assert!(validate_camp_request(&CampRequest::new("Camp", "Long enough text", 0, 10)).is_err());
        assert!(validate_camp_request(&CampRequest::new("Camp", "Long enough text", 5, 4)).is_err());
        assert!(validate_camp_request(&CampRequest::new(&"x".repeat(256), "Long enough text", 1, 1)).is_err());

        let mut request = CampRequest::new("Camp", "Long enough text", 1, 1);
        request.custom_amenities = Some("a".repeat(501));
        assert!(validate_camp_request(&request).is_err());
    }

    #[test]
    fn test_inventory_rules() {
        assert!(validate_inventory_request(&InventoryItemRequest::new("Tent", 0)).is_ok());
        assert!(validate_inventory_request(&InventoryItemRequest::new("Tent", -1)).is_err());
        assert!(validate_inventory_request(&InventoryItemRequest::new(" ", 1)).is_err());

        let mut request = InventoryItemRequest::new("Tent", 1);
        request.description = Some("d".repeat(1001));
        assert!(validate_inventory_request(&request).is_err());
    }

    #[test]
    fn test_required_name() {
        assert_eq!(required_name("Cluster", "  North  ", 100).unwrap(), "North");
        assert!(required_name("Cluster", "   ", 100).is_err());
    }
}
