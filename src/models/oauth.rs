//! OAuth provider link model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

text_enum! {
    OAuthProviderKind {
        Google => "google",
        Microsoft => "microsoft",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OAuthProvider {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub provider_name: OAuthProviderKind,
    pub provider_user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Identity returned by a provider's userinfo endpoint, normalized across providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    pub provider: OAuthProviderKind,
    pub provider_user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl OAuthUserInfo {
    /// Split the provider name on the first space into first and last name
    pub fn split_name(&self) -> (Option<String>, Option<String>) {
        let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            return (None, None);
        };

        match name.split_once(' ') {
            Some((first, last)) => (Some(first.to_string()), Some(last.trim().to_string())),
            None => (Some(name.to_string()), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: Option<&str>) -> OAuthUserInfo {
        OAuthUserInfo {
            provider: OAuthProviderKind::Google,
            provider_user_id: "123".to_string(),
            email: "a@example.com".to_string(),
            name: name.map(str::to_string),
            picture: None,
        }
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            info(Some("Ada Lovelace King")).split_name(),
            (Some("Ada".to_string()), Some("Lovelace King".to_string()))
        );
        assert_eq!(info(Some("Prince")).split_name(), (Some("Prince".to_string()), None));
        assert_eq!(info(None).split_name(), (None, None));
        assert_eq!(info(Some("  ")).split_name(), (None, None));
    }
}
