//! Helper functions and utilities
//! 
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

/// Generate a URL-safe single-use token: 32 random bytes as 64 hex characters
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Canonical form used for storing and comparing email addresses
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trim a value, mapping blank input to `None`
pub fn trim_to_option(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Whether a token sent at `sent_at` is older than `ttl`
pub fn is_expired(sent_at: Option<DateTime<Utc>>, ttl: Duration, now: DateTime<Utc>) -> bool {
    match sent_at {
        Some(sent) => now - sent > ttl,
        None => true,
    }
}

/// Escape `%` and `_` so user input matches literally inside an ILIKE pattern
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Pat@Example.COM "), "pat@example.com");
    }

    #[test]
    fn test_trim_to_option() {
        assert_eq!(trim_to_option(Some("  Main St ")), Some("Main St".to_string()));
        assert_eq!(trim_to_option(Some("   ")), None);
        assert_eq!(trim_to_option(None), None);
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        assert!(!is_expired(Some(now - Duration::minutes(30)), Duration::hours(1), now));
        assert!(is_expired(Some(now - Duration::minutes(61)), Duration::hours(1), now));
        assert!(is_expired(None, Duration::hours(1), now));
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern(" ann "), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
