//! OAuth provider link repository

use sqlx::PgPool;
use chrono::Utc;
use crate::models::oauth::{OAuthProvider, OAuthProviderKind};
use crate::models::user::User;
use crate::utils::errors::CampHubError;

#[derive(Clone, Debug)]
pub struct OAuthRepository {
    pool: PgPool,
}

impl OAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// User already linked to this provider identity, if any
    pub async fn find_linked_user(
        &self,
        provider: OAuthProviderKind,
        provider_user_id: &str,
    ) -> Result<Option<User>, CampHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN oauth_providers p ON p.user_id = u.id
            WHERE p.provider_name = $1 AND p.provider_user_id = $2
            "#
        )
        .bind(provider.as_str())
        .bind(provider_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn link(
        &self,
        user_id: i64,
        provider: OAuthProviderKind,
        provider_user_id: &str,
    ) -> Result<OAuthProvider, CampHubError> {
        let link = sqlx::query_as::<_, OAuthProvider>(
            r#"
            INSERT INTO oauth_providers (user_id, provider_name, provider_user_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(provider.as_str())
        .bind(provider_user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Provider account already linked"))?;

        Ok(link)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<OAuthProvider>, CampHubError> {
        let links = sqlx::query_as::<_, OAuthProvider>(
            "SELECT * FROM oauth_providers WHERE user_id = $1 ORDER BY created_at"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }
}
