//! Integration tests for the cookie API.
//!
//! The proxy router runs on an ephemeral port and talks to a wiremock
//! provider. Requests to the proxy are made with a plain reqwest client so
//! the `Set-Cookie` headers can be inspected and replayed by hand.

use std::sync::Arc;
use std::time::Duration;

use shopify_customer_auth::server::cookie_proxy::{router, CookieProxy};
use shopify_customer_auth::storage::{CookieTokenStorage, StorageError, TokenStorage};
use shopify_customer_auth::{
    ClientId, CustomerAuthConfig, Environment, HttpClient, ProviderUrl, RedirectUri, ShopId,
    TokenSet,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/authentication/68817551676/oauth/token";

fn config_for(provider: &MockServer) -> CustomerAuthConfig {
    CustomerAuthConfig::builder()
        .client_id(ClientId::new("shp_test_client").unwrap())
        .shop_id(ShopId::new("68817551676").unwrap())
        .redirect_uri(RedirectUri::new("https://store.example.com/account/callback").unwrap())
        .provider_url(ProviderUrl::new(provider.uri()).unwrap())
        .environment(Environment::Development)
        .build()
        .unwrap()
}

async fn start_proxy(config: CustomerAuthConfig) -> String {
    let proxy = Arc::new(CookieProxy::new(config).unwrap());
    let app = axum::Router::new().nest("/api/auth", router(proxy));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}/api/auth")
}

fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Turns `Set-Cookie` values into a `Cookie` request header.
fn cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .filter_map(|cookie| cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

fn storage_for(base: &str, config: &CustomerAuthConfig) -> CookieTokenStorage {
    CookieTokenStorage::new(
        HttpClient::with_cookie_store(config).unwrap(),
        base,
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn test_token_exchange_sets_session_cookies() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=code-from-callback"))
        .and(body_string_contains("code_verifier=verifier-from-browser"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "shcat_via_proxy",
            "refresh_token": "shcrt_via_proxy",
            "id_token": "id.token.jwt",
            "token_type": "Bearer",
            "expires_in": 1800,
            "scope": "openid email customer-account-api:full"
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let base = start_proxy(config_for(&provider)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/token-exchange"))
        .json(&serde_json::json!({
            "code": "code-from-callback",
            "codeVerifier": "verifier-from-browser"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["cache-control"], "no-store");

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 3);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("shopify-access-token=shcat_via_proxy;")));
    assert!(cookies
        .iter()
        .all(|c| c.ends_with("HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=1800")));

    let tokens: TokenSet = response.json().await.unwrap();
    assert_eq!(tokens.access_token, "shcat_via_proxy");
    assert_eq!(tokens.id_token.as_deref(), Some("id.token.jwt"));

    // The cookies alone reproduce the token set.
    let response = client
        .get(format!("{base}/get-tokens"))
        .header("Cookie", cookie_header(&cookies))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let from_cookies: TokenSet = response.json().await.unwrap();
    assert_eq!(from_cookies, tokens);
}

#[tokio::test]
async fn test_storage_backend_against_proxy() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "shcat_backend",
            "expires_in": 600
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let config = config_for(&provider);
    let base = start_proxy(config.clone()).await;
    let storage = storage_for(&base, &config);

    let tokens = storage.exchange_code("code", "verifier").await.unwrap();
    assert_eq!(tokens.access_token, "shcat_backend");
    assert!(tokens.refresh_token.is_none());

    storage.write(&tokens).await.unwrap();
    storage.clear().await.unwrap();

    // A fresh client has no cookies, so there is no session.
    let anonymous = storage_for(&base, &config);
    assert!(anonymous.read().await.unwrap().is_none());
}

#[tokio::test]
async fn test_refresh_rotates_tokens_from_cookie() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=shcrt_cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "shcat_rotated",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let base = start_proxy(config_for(&provider)).await;
    let client = reqwest::Client::new();

    let stored = TokenSet {
        access_token: "shcat_old".to_string(),
        refresh_token: Some("shcrt_cookie".to_string()),
        id_token: Some("id.token.jwt".to_string()),
        token_type: "Bearer".to_string(),
        expires_in: 60,
        scope: "openid".to_string(),
        issued_at: 1_700_000_000_000,
    };
    let response = client
        .post(format!("{base}/set-tokens"))
        .json(&stored)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let cookies = set_cookies(&response);

    let response = client
        .post(format!("{base}/refresh"))
        .header("Cookie", cookie_header(&cookies))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("shopify-refresh-token=shcrt_cookie;")));

    let refreshed: TokenSet = response.json().await.unwrap();
    assert_eq!(refreshed.access_token, "shcat_rotated");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("shcrt_cookie"));
    assert_eq!(refreshed.id_token.as_deref(), Some("id.token.jwt"));
    assert!(refreshed.issued_at > stored.issued_at);
}

#[tokio::test]
async fn test_rejected_refresh_clears_cookies() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Refresh token revoked"
        })))
        .mount(&provider)
        .await;

    let base = start_proxy(config_for(&provider)).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/refresh"))
        .header("Cookie", "shopify-refresh-token=shcrt_revoked")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 3);
    assert!(cookies.iter().all(|c| c.ends_with("Max-Age=0")));
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_grant");
}

#[tokio::test]
async fn test_provider_outage_is_bad_gateway() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&provider)
        .await;

    let config = config_for(&provider);
    let base = start_proxy(config.clone()).await;
    let storage = storage_for(&base, &config);

    let error = storage.exchange_code("code", "verifier").await.unwrap_err();
    match &error {
        StorageError::CookieApi { endpoint, source } => {
            assert_eq!(*endpoint, "token-exchange");
            assert_eq!(source.code, 502);
            assert!(source.message.contains("token_request_failed"));
        }
        other => panic!("Expected CookieApi, got {other:?}"),
    }
    assert!(error.is_transient());
}

#[tokio::test]
async fn test_refresh_without_cookie_is_rejected() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let config = config_for(&provider);
    let base = start_proxy(config.clone()).await;
    let error = storage_for(&base, &config).refresh().await.unwrap_err();
    assert!(matches!(
        error,
        StorageError::CookieApi {
            endpoint: "refresh",
            ..
        }
    ));
}
