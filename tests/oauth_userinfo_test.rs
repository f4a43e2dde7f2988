//! OAuth userinfo exchange against a mocked provider

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use camphub::config::{OAuthClientConfig, OAuthConfig};
use camphub::models::OAuthProviderKind;
use camphub::services::OAuthClient;
use camphub::CampHubError;

fn client_for(server: &MockServer) -> OAuthClient {
    let mut google = OAuthClientConfig::google("client-id", "client-secret", "http://localhost/callback");
    google.userinfo_url = format!("{}/userinfo", server.uri());

    let mut microsoft = OAuthClientConfig::microsoft("ms-client", "ms-secret", "http://localhost/callback");
    microsoft.userinfo_url = format!("{}/me", server.uri());

    OAuthClient::new(OAuthConfig {
        google: Some(google),
        microsoft: Some(microsoft),
    })
    .expect("client builds")
}

#[tokio::test]
async fn test_google_userinfo_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "google-123",
            "email": "Camper@Gmail.com",
            "name": "Casey Camper",
            "picture": "https://example.com/p.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client_for(&server)
        .fetch_userinfo(OAuthProviderKind::Google, "good-token")
        .await
        .unwrap();

    assert_eq!(info.provider, OAuthProviderKind::Google);
    assert_eq!(info.provider_user_id, "google-123");
    assert_eq!(info.email, "camper@gmail.com");
    assert_eq!(info.name.as_deref(), Some("Casey Camper"));
    assert_eq!(info.picture.as_deref(), Some("https://example.com/p.png"));
}

#[tokio::test]
async fn test_microsoft_falls_back_to_principal_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ms-456",
            "mail": null,
            "userPrincipalName": "robin@contoso.com",
            "displayName": "Robin"
        })))
        .mount(&server)
        .await;

    let info = client_for(&server)
        .fetch_userinfo(OAuthProviderKind::Microsoft, "token")
        .await
        .unwrap();

    assert_eq!(info.provider_user_id, "ms-456");
    assert_eq!(info.email, "robin@contoso.com");
    assert_eq!(info.name.as_deref(), Some("Robin"));
    assert!(info.picture.is_none());
}

#[tokio::test]
async fn test_rejected_token_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .fetch_userinfo(OAuthProviderKind::Google, "expired")
        .await;
    assert_matches!(result, Err(CampHubError::Authentication(_)));
}

#[tokio::test]
async fn test_missing_email_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sub": "google-789" })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .fetch_userinfo(OAuthProviderKind::Google, "token")
        .await;
    assert_matches!(result, Err(CampHubError::Authentication(_)));
}

#[test]
fn test_unconfigured_provider_is_disabled() {
    let client = OAuthClient::new(OAuthConfig::default()).unwrap();
    assert!(!client.is_enabled(OAuthProviderKind::Microsoft));
    assert_matches!(
        client.authorization_url(OAuthProviderKind::Google),
        Err(CampHubError::Config(_))
    );
}
