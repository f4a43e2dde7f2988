//! OAuth sign-in
//!
//! Builds provider authorization URLs, reads the provider's userinfo
//! endpoint with the access token the caller obtained, and links the
//! identity to a local account. The code-for-token exchange happens outside
//! this crate.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{OAuthClientConfig, OAuthConfig};
use crate::database::repositories::{NewUser, OAuthRepository, UserRepository};
use crate::models::{OAuthProviderKind, OAuthUserInfo, User, UserRole};
use crate::services::auth::LoginOutcome;
use crate::services::tokens::TokenManager;
use crate::utils::errors::{CampHubError, Result};
use crate::utils::helpers::{generate_token, normalize_email};
use crate::utils::logging::log_user_action;

/// HTTP side of the OAuth flow
#[derive(Clone, Debug)]
pub struct OAuthClient {
    http: Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("CampHub/0.1")
            .build()?;
        Ok(Self { http, config })
    }

    fn provider_config(&self, provider: OAuthProviderKind) -> Result<&OAuthClientConfig> {
        let config = match provider {
            OAuthProviderKind::Google => self.config.google.as_ref(),
            OAuthProviderKind::Microsoft => self.config.microsoft.as_ref(),
        };
        config.ok_or_else(|| CampHubError::Config(format!("OAuth provider {} is not configured", provider)))
    }

    pub fn is_enabled(&self, provider: OAuthProviderKind) -> bool {
        self.provider_config(provider).is_ok()
    }

    /// Authorization URL plus the random `state` the caller must check on return
    pub fn authorization_url(&self, provider: OAuthProviderKind) -> Result<(String, String)> {
        let config = self.provider_config(provider)?;
        let state = generate_token();

        let mut url = Url::parse(&config.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &config.scopes.join(" "))
            .append_pair("state", &state);

        Ok((url.into(), state))
    }

    pub async fn fetch_userinfo(&self, provider: OAuthProviderKind, access_token: &str) -> Result<OAuthUserInfo> {
        let config = self.provider_config(provider)?;
        debug!(provider = %provider, url = %config.userinfo_url, "Fetching OAuth userinfo");

        let response = self
            .http
            .get(&config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = %provider, status = %status, "Userinfo request rejected");
            return Err(CampHubError::Authentication(format!(
                "{} rejected the access token (HTTP {})",
                provider, status
            )));
        }

        let body: Value = response.json().await?;
        parse_userinfo(provider, &body)
    }
}

fn string_field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Normalize a provider's userinfo document
pub fn parse_userinfo(provider: OAuthProviderKind, body: &Value) -> Result<OAuthUserInfo> {
    let (id_keys, email_keys, name_keys, picture_keys): (&[&str], &[&str], &[&str], &[&str]) = match provider {
        OAuthProviderKind::Google => (&["sub"], &["email"], &["name"], &["picture"]),
        OAuthProviderKind::Microsoft => (
            &["id", "oid"],
            &["email", "mail", "userPrincipalName"],
            &["displayName", "name"],
            &[],
        ),
    };

    let provider_user_id = string_field(body, id_keys)
        .ok_or_else(|| CampHubError::Authentication(format!("{} did not return a user id", provider)))?;
    let email = string_field(body, email_keys)
        .ok_or_else(|| CampHubError::Authentication(format!("{} did not return an email address", provider)))?;

    Ok(OAuthUserInfo {
        provider,
        provider_user_id: provider_user_id.to_string(),
        email: normalize_email(email),
        name: string_field(body, name_keys).map(str::to_string),
        picture: string_field(body, picture_keys).map(str::to_string),
    })
}

#[derive(Clone, Debug)]
pub struct OAuthService {
    client: OAuthClient,
    users: UserRepository,
    links: OAuthRepository,
    tokens: TokenManager,
}

impl OAuthService {
    pub fn new(client: OAuthClient, users: UserRepository, links: OAuthRepository, tokens: TokenManager) -> Self {
        Self { client, users, links, tokens }
    }

    pub fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// Existing provider link wins, then a matching email, then a new account
    pub async fn link_or_create(&self, info: &OAuthUserInfo) -> Result<User> {
        if let Some(user) = self.links.find_linked_user(info.provider, &info.provider_user_id).await? {
            debug!(user_id = user.id, provider = %info.provider, "Existing OAuth link");
            return self.users.mark_oauth_verified(user.id, info.picture.as_deref()).await;
        }

        let user = match self.users.find_by_email(&info.email).await? {
            Some(user) => {
                info!(user_id = user.id, provider = %info.provider, "Linking OAuth identity to existing account");
                user
            }
            None => {
                let (first_name, last_name) = info.split_name();
                let user = self
                    .users
                    .create(NewUser {
                        email: info.email.clone(),
                        name: info.name.clone(),
                        first_name,
                        last_name,
                        picture: info.picture.clone(),
                        password_hash: None,
                        role: UserRole::Member,
                        email_verified: true,
                        verification_token: None,
                    })
                    .await?;
                info!(user_id = user.id, provider = %info.provider, "Account created from OAuth identity");
                user
            }
        };

        self.links.link(user.id, info.provider, &info.provider_user_id).await?;
        self.users.mark_oauth_verified(user.id, info.picture.as_deref()).await
    }

    /// Userinfo lookup, account linking and token issue in one step
    pub async fn login(&self, provider: OAuthProviderKind, access_token: &str) -> Result<LoginOutcome> {
        let info = self.client.fetch_userinfo(provider, access_token).await?;
        let user = self.link_or_create(&info).await?;

        if !user.is_active {
            return Err(CampHubError::PermissionDenied("Account is suspended".to_string()));
        }

        let tokens = self.tokens.issue_pair(user.id, user.role)?;
        log_user_action(user.id, "oauth_login", Some(provider.as_str()));
        Ok(LoginOutcome { user, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> OAuthClient {
        OAuthClient::new(OAuthConfig {
            google: Some(OAuthClientConfig::google("gid", "gsecret", "https://camphub.test/auth/google")),
            microsoft: None,
        })
        .unwrap()
    }

    #[test]
    fn test_authorization_url_contains_state_and_scopes() {
        let (url, state) = client().authorization_url(OAuthProviderKind::Google).unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(pairs.contains(&("state".to_string(), state.clone())));
        assert!(pairs.contains(&("scope".to_string(), "openid email profile".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "gid".to_string())));
        assert_eq!(state.len(), 64);
    }

    #[test]
    fn test_unconfigured_provider() {
        let client = client();
        assert!(!client.is_enabled(OAuthProviderKind::Microsoft));
        assert!(matches!(
            client.authorization_url(OAuthProviderKind::Microsoft),
            Err(CampHubError::Config(_))
        ));
    }

    #[test]
    fn test_parse_google_userinfo() {
        let body = json!({
            "sub": "1099",
            "email": "Ada@Example.com",
            "name": "Ada Lovelace",
            "picture": "https://img.example/ada.png"
        });
        let info = parse_userinfo(OAuthProviderKind::Google, &body).unwrap();
        assert_eq!(info.provider_user_id, "1099");
        assert_eq!(info.email, "ada@example.com");
        assert_eq!(info.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(info.picture.as_deref(), Some("https://img.example/ada.png"));
    }

    #[test]
    fn test_parse_microsoft_fallbacks() {
        let body = json!({
            "oid": "abc-123",
            "mail": null,
            "userPrincipalName": "grace@contoso.com",
            "name": "Grace Hopper"
        });
        let info = parse_userinfo(OAuthProviderKind::Microsoft, &body).unwrap();
        assert_eq!(info.provider_user_id, "abc-123");
        assert_eq!(info.email, "grace@contoso.com");
        assert_eq!(info.name.as_deref(), Some("Grace Hopper"));
        assert!(info.picture.is_none());
    }

    #[test]
    fn test_parse_requires_email() {
        let body = json!({ "sub": "1", "name": "No Mail" });
        assert!(matches!(
            parse_userinfo(OAuthProviderKind::Google, &body),
            Err(CampHubError::Authentication(_))
        ));
    }
}
