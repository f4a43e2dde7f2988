//! Database repositories module
//! 
//! This module contains all repository implementations for data access

pub mod user;
pub mod oauth;
pub mod event;
pub mod registration;
pub mod camp;
pub mod membership;
pub mod association;
pub mod organization;
pub mod inventory;

// Re-export repositories
pub use user::{UserRepository, NewUser};
pub use oauth::OAuthRepository;
pub use event::EventRepository;
pub use registration::RegistrationRepository;
pub use camp::CampRepository;
pub use membership::MembershipRepository;
pub use association::AssociationRepository;
pub use organization::OrganizationRepository;
pub use inventory::InventoryRepository;
