//! Access and refresh token issuing
//!
//! HS256 JSON Web Tokens. Both kinds carry the user id, role and a unique
//! `jti`; the `kind` claim keeps a refresh token from being used as an
//! access token and vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::UserRole;
use crate::utils::errors::{CampHubError, Result};

const ISSUER: &str = "camphub";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: UserRole,
    pub kind: TokenKind,
    pub jti: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token pair handed out on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_token_ttl_seconds),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_seconds),
        }
    }

    fn issue(&self, user_id: i64, role: UserRole, kind: TokenKind) -> Result<String> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id,
            role,
            kind,
            jti: Uuid::new_v4().to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn issue_pair(&self, user_id: i64, role: UserRole) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(user_id, role, TokenKind::Access)?,
            refresh_token: self.issue(user_id, role, TokenKind::Refresh)?,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    pub fn issue_access(&self, user_id: i64, role: UserRole) -> Result<String> {
        self.issue(user_id, role, TokenKind::Access)
    }

    /// Decode and check signature, expiry, issuer and kind
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| CampHubError::Authentication(format!("Invalid token: {}", e)))?
            .claims;

        if claims.kind != expected {
            return Err(CampHubError::Authentication("Wrong token type".to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        let mut config = AuthConfig::default();
        config.jwt_secret = "test_secret_key_that_is_long_enough_for_hs256".to_string();
        TokenManager::new(&config)
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let manager = manager();
        let pair = manager.issue_pair(42, UserRole::CampManager).unwrap();

        let access = manager.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.sub, 42);
        assert_eq!(access.role, UserRole::CampManager);
        assert_eq!(pair.expires_in, 3600);

        let refresh = manager.verify(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_kind_is_enforced() {
        let manager = manager();
        let pair = manager.issue_pair(1, UserRole::Member).unwrap();
        assert!(manager.verify(&pair.refresh_token, TokenKind::Access).is_err());
        assert!(manager.verify(&pair.access_token, TokenKind::Refresh).is_err());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let pair = manager().issue_pair(1, UserRole::Member).unwrap();

        let mut other_config = AuthConfig::default();
        other_config.jwt_secret = "a_completely_different_secret_of_enough_length".to_string();
        let other = TokenManager::new(&other_config);

        assert!(other.verify(&pair.access_token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = AuthConfig::default();
        config.jwt_secret = "test_secret_key_that_is_long_enough_for_hs256".to_string();
        config.access_token_ttl_seconds = -10;
        let manager = TokenManager::new(&config);

        let token = manager.issue_access(1, UserRole::Member).unwrap();
        assert!(manager.verify(&token, TokenKind::Access).is_err());
    }
}
