//! User repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::admin::{AdminStats, UserListFilter};
use crate::models::user::{UpdateProfileRequest, User, UserRole};
use crate::utils::errors::CampHubError;
use crate::utils::helpers::{like_pattern, trim_to_option};

/// Fields for inserting a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub verification_token: Option<String>,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, new_user: NewUser) -> Result<User, CampHubError> {
        let now = Utc::now();
        let sent_at = new_user.verification_token.as_ref().map(|_| now);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, first_name, last_name, picture, password_hash, role,
                               email_verified, email_verification_token, email_verification_sent_at,
                               created_at, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#
        )
        .bind(new_user.email)
        .bind(new_user.name)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.picture)
        .bind(new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(new_user.email_verified)
        .bind(new_user.verification_token)
        .bind(sent_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Email already registered"))?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, CampHubError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by ID or fail with `UserNotFound`
    pub async fn get(&self, id: i64) -> Result<User, CampHubError> {
        self.find_by_id(id)
            .await?
            .ok_or(CampHubError::UserNotFound { user_id: id })
    }

    /// Find user by normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, CampHubError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, CampHubError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email_verification_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, CampHubError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE password_reset_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email_change_token(&self, token: &str) -> Result<Option<User>, CampHubError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email_change_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Replace the editable profile fields
    pub async fn update_profile(&self, id: i64, request: &UpdateProfileRequest) -> Result<User, CampHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                preferred_name = $4,
                show_full_name = $5,
                pronouns = $6,
                show_pronouns = $7,
                home_phone = $8,
                mobile_phone = $9,
                work_phone = $10,
                address_line1 = $11,
                address_line2 = $12,
                city = $13,
                state = $14,
                zip_code = $15,
                country = $16,
                theme_preference = COALESCE($17, theme_preference)
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(trim_to_option(request.first_name.as_deref()))
        .bind(trim_to_option(request.last_name.as_deref()))
        .bind(trim_to_option(request.preferred_name.as_deref()))
        .bind(request.show_full_name)
        .bind(trim_to_option(request.pronouns.as_deref()))
        .bind(request.show_pronouns)
        .bind(trim_to_option(request.home_phone.as_deref()))
        .bind(trim_to_option(request.mobile_phone.as_deref()))
        .bind(trim_to_option(request.work_phone.as_deref()))
        .bind(trim_to_option(request.address_line1.as_deref()))
        .bind(trim_to_option(request.address_line2.as_deref()))
        .bind(trim_to_option(request.city.as_deref()))
        .bind(trim_to_option(request.state.as_deref()))
        .bind(trim_to_option(request.zip_code.as_deref()))
        .bind(trim_to_option(request.country.as_deref()).unwrap_or_else(|| "US".to_string()))
        .bind(request.theme_preference.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(CampHubError::UserNotFound { user_id: id })
    }

    pub async fn update_last_login(&self, id: i64) -> Result<(), CampHubError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_verification_token(&self, id: i64, token: &str) -> Result<(), CampHubError> {
        sqlx::query(
            "UPDATE users SET email_verification_token = $2, email_verification_sent_at = $3 WHERE id = $1"
        )
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Mark the email verified and drop any pending verification token
    pub async fn mark_email_verified(&self, id: i64) -> Result<(), CampHubError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verified = TRUE, email_verification_token = NULL, email_verification_sent_at = NULL
            WHERE id = $1
            "#
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_password_reset_token(&self, id: i64, token: &str) -> Result<(), CampHubError> {
        sqlx::query("UPDATE users SET password_reset_token = $2, password_reset_sent_at = $3 WHERE id = $1")
            .bind(id)
            .bind(token)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn clear_password_reset_token(&self, id: i64) -> Result<(), CampHubError> {
        sqlx::query("UPDATE users SET password_reset_token = NULL, password_reset_sent_at = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a new password hash and consume the reset token
    pub async fn set_password(&self, id: i64, password_hash: &str) -> Result<(), CampHubError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, password_reset_token = NULL, password_reset_sent_at = NULL
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_email_change(&self, id: i64, new_email: &str, token: &str) -> Result<(), CampHubError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_change_new_email = $2, email_change_token = $3, email_change_sent_at = $4
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(new_email)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn clear_email_change(&self, id: i64) -> Result<(), CampHubError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_change_new_email = NULL, email_change_token = NULL, email_change_sent_at = NULL
            WHERE id = $1
            "#
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Swap in the pending email; the new address counts as verified
    pub async fn complete_email_change(&self, id: i64, new_email: &str) -> Result<User, CampHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, email_verified = TRUE,
                email_change_new_email = NULL, email_change_token = NULL, email_change_sent_at = NULL
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(new_email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Email already registered"))?;

        Ok(user)
    }

    /// Verify the account and fill the picture from an OAuth provider when missing
    pub async fn mark_oauth_verified(&self, id: i64, picture: Option<&str>) -> Result<User, CampHubError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email_verified = TRUE, picture = COALESCE(picture, $2), last_login = $3
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(picture)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn set_role(&self, id: i64, role: UserRole) -> Result<User, CampHubError> {
        let user = sqlx::query_as::<_, User>("UPDATE users SET role = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or(CampHubError::UserNotFound { user_id: id })
    }

    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<User, CampHubError> {
        let user = sqlx::query_as::<_, User>("UPDATE users SET is_active = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or(CampHubError::UserNotFound { user_id: id })
    }

    /// Promote every listed email to global admin, returning how many rows changed
    pub async fn promote_to_global_admin(&self, emails: &[String]) -> Result<u64, CampHubError> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE email = ANY($2) AND role <> $1")
            .bind(UserRole::GlobalAdmin.as_str())
            .bind(emails)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// List users matching the admin filter, newest first
    pub async fn list(&self, filter: &UserListFilter) -> Result<Vec<User>, CampHubError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
              AND ($2::TEXT IS NULL OR role = $2)
              AND ($3::TEXT IS NULL OR email ILIKE $3 OR name ILIKE $3
                   OR first_name ILIKE $3 OR last_name ILIKE $3 OR preferred_name ILIKE $3)
            ORDER BY created_at DESC
            "#
        )
        .bind(filter.status.is_active())
        .bind(filter.role.map(|r| r.as_str()))
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Every user, highest privilege first, then oldest account first
    pub async fn list_by_role(&self) -> Result<Vec<User>, CampHubError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            ORDER BY CASE role
                         WHEN 'global admin' THEN 0
                         WHEN 'site admin' THEN 1
                         WHEN 'event manager' THEN 2
                         WHEN 'camp manager' THEN 3
                         WHEN 'member' THEN 4
                         ELSE 5
                     END,
                     created_at ASC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Dashboard counters
    pub async fn stats(&self) -> Result<AdminStats, CampHubError> {
        let (total_users, active_users, pending_events, pending_associations): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM users WHERE is_active),
                (SELECT COUNT(*) FROM events WHERE status = 'pending'),
                (SELECT COUNT(*) FROM camp_event_associations WHERE status = 'pending')
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminStats {
            total_users,
            active_users,
            suspended_users: total_users - active_users,
            pending_events,
            pending_associations,
        })
    }

    /// Clear verification, reset and email change tokens sent before the given cutoffs.
    /// Returns the number of rows touched.
    pub async fn clear_expired_tokens(
        &self,
        verification_cutoff: DateTime<Utc>,
        reset_cutoff: DateTime<Utc>,
        email_change_cutoff: DateTime<Utc>,
    ) -> Result<u64, CampHubError> {
        let mut tx = self.pool.begin().await?;

        let verification = sqlx::query(
            r#"
            UPDATE users SET email_verification_token = NULL, email_verification_sent_at = NULL
            WHERE email_verification_token IS NOT NULL AND email_verification_sent_at < $1
            "#
        )
        .bind(verification_cutoff)
        .execute(&mut *tx)
        .await?;

        let reset = sqlx::query(
            r#"
            UPDATE users SET password_reset_token = NULL, password_reset_sent_at = NULL
            WHERE password_reset_token IS NOT NULL AND password_reset_sent_at < $1
            "#
        )
        .bind(reset_cutoff)
        .execute(&mut *tx)
        .await?;

        let email_change = sqlx::query(
            r#"
            UPDATE users
            SET email_change_token = NULL, email_change_new_email = NULL, email_change_sent_at = NULL
            WHERE email_change_token IS NOT NULL AND email_change_sent_at < $1
            "#
        )
        .bind(email_change_cutoff)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(verification.rows_affected() + reset.rows_affected() + email_change.rows_affected())
    }
}
