//! Database service layer
//! 
//! This module bundles the repositories behind one cloneable handle

use crate::database::{
    AssociationRepository, CampRepository, DatabasePool, EventRepository, InventoryRepository,
    MembershipRepository, OAuthRepository, OrganizationRepository, RegistrationRepository,
    UserRepository,
};
use crate::utils::errors::CampHubError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub oauth: OAuthRepository,
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pub camps: CampRepository,
    pub memberships: MembershipRepository,
    pub associations: AssociationRepository,
    pub organization: OrganizationRepository,
    pub inventory: InventoryRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            oauth: OAuthRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            camps: CampRepository::new(pool.clone()),
            memberships: MembershipRepository::new(pool.clone()),
            associations: AssociationRepository::new(pool.clone()),
            organization: OrganizationRepository::new(pool.clone()),
            inventory: InventoryRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), CampHubError> {
        super::connection::health_check(&self.pool).await
    }
}
