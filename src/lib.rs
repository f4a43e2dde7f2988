//! CampHub
//!
//! Camp and event coordination backend. Users form camps, camps ask to take
//! part in events, and a role hierarchy decides who may approve what. The
//! crate exposes a typed service layer over Postgres and Redis.

pub mod config;
pub mod database;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{CampHubError, Result};
pub use workflow::Actor;

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
