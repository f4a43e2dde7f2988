//! Authentication middleware
//!
//! Turns a bearer access token into an [`Actor`]. Whatever transport sits in
//! front of the services calls this once per request.

use tracing::{debug, warn};

use crate::database::repositories::UserRepository;
use crate::services::tokens::{TokenKind, TokenManager};
use crate::utils::errors::{CampHubError, Result};
use crate::workflow::Actor;

#[derive(Clone, Debug)]
pub struct AuthMiddleware {
    tokens: TokenManager,
    users: UserRepository,
}

/// Token part of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Result<&str> {
    let mut parts = header.trim().splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(CampHubError::Authentication(
            "Expected a bearer token".to_string(),
        )),
    }
}

impl AuthMiddleware {
    pub fn new(tokens: TokenManager, users: UserRepository) -> Self {
        Self { tokens, users }
    }

    /// Resolve an access token to the current state of its user.
    ///
    /// Role and suspension are read from the database rather than the
    /// token claims, so a demotion or suspension applies immediately.
    pub async fn authenticate(&self, access_token: &str) -> Result<Actor> {
        let claims = self.tokens.verify(access_token, TokenKind::Access)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| CampHubError::Authentication("Unknown user".to_string()))?;

        if !user.is_active {
            warn!(user_id = user.id, "Suspended user presented a token");
            return Err(CampHubError::PermissionDenied("Account is suspended".to_string()));
        }

        debug!(user_id = user.id, role = %user.role, "Request authenticated");
        Ok(Actor::from(&user))
    }

    pub async fn authenticate_header(&self, header: &str) -> Result<Actor> {
        self.authenticate(bearer_token(header)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert_eq!(bearer_token("bearer   xyz ").unwrap(), "xyz");
        assert!(bearer_token("Basic abc").is_err());
        assert!(bearer_token("Bearer").is_err());
        assert!(bearer_token("").is_err());
    }
}
