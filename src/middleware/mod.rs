//! Middleware module
//!
//! Request-edge concerns shared by every caller of the services

pub mod auth;
pub mod rate_limit;

pub use auth::{bearer_token, AuthMiddleware};
pub use rate_limit::RateLimitMiddleware;
