//! Integration tests for the token endpoint grants.
//!
//! The provider is mocked with wiremock; every test points the config's
//! provider URL at the mock server.

use shopify_customer_auth::auth::oauth::{
    exchange_code_for_tokens, generate_code_challenge, generate_code_verifier,
    refresh_access_token, GrantType, OAuthError,
};
use shopify_customer_auth::{
    ClientId, CustomerAuthConfig, Environment, HttpClient, ProviderUrl, RedirectUri, ShopId,
    TokenSet,
};
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/authentication/68817551676/oauth/token";

fn config_for(server: &MockServer) -> CustomerAuthConfig {
    CustomerAuthConfig::builder()
        .client_id(ClientId::new("shp_test_client").unwrap())
        .shop_id(ShopId::new("68817551676").unwrap())
        .redirect_uri(RedirectUri::new("http://localhost:3000/account/callback").unwrap())
        .provider_url(ProviderUrl::new(server.uri()).unwrap())
        .environment(Environment::Development)
        .build()
        .unwrap()
}

fn token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": "shcat_access",
        "refresh_token": "shcrt_refresh",
        "id_token": "header.payload.signature",
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "openid email customer-account-api:full"
    })
}

#[tokio::test]
async fn test_exchange_posts_form_with_verifier() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(header_exists("User-Agent"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=shp_test_client"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Faccount%2Fcallback",
        ))
        .and(body_string_contains("code=auth-code-1"))
        .and(body_string_contains("code_verifier=verifier-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = exchange_code_for_tokens(&http, &config, "auth-code-1", "verifier-1")
        .await
        .unwrap();

    assert_eq!(response.access_token, "shcat_access");
    assert_eq!(response.refresh_token.as_deref(), Some("shcrt_refresh"));
    assert_eq!(response.expires_in, 3600);

    let tokens = TokenSet::from_response(response, 1_700_000_000_000);
    assert_eq!(tokens.expires_at_ms(), 1_700_003_600_000);
}

#[tokio::test]
async fn test_exchange_sends_configured_origin() {
    let server = MockServer::start().await;
    let config = CustomerAuthConfig::builder()
        .client_id(ClientId::new("shp_test_client").unwrap())
        .shop_id(ShopId::new("68817551676").unwrap())
        .redirect_uri(RedirectUri::new("https://store.example.com/account/callback").unwrap())
        .provider_url(ProviderUrl::new(server.uri()).unwrap())
        .environment(Environment::Development)
        .origin("https://store.example.com/some/path")
        .user_agent_prefix("Storefront/2.1")
        .build()
        .unwrap();
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("Origin", "https://store.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    exchange_code_for_tokens(&http, &config, "code", "verifier")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let user_agent = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(user_agent.starts_with("Storefront/2.1 | Shopify Customer Auth v"));
}

#[tokio::test]
async fn test_tampered_verifier_is_invalid_grant() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    let verifier = generate_code_verifier();
    let challenge = generate_code_challenge(&verifier);
    let first = if verifier.starts_with('A') { "B" } else { "A" };
    let tampered = format!("{first}{}", &verifier[1..]);

    // The provider checks SHA-256(verifier) against the challenge from the
    // authorize request; only the untouched verifier is accepted.
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains(format!("code_verifier={verifier}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": format!("code_verifier does not match {challenge}")
        })))
        .mount(&server)
        .await;

    let result = exchange_code_for_tokens(&http, &config, "code", &tampered).await;
    match result {
        Err(OAuthError::InvalidGrant {
            grant_type,
            description,
        }) => {
            assert_eq!(grant_type, GrantType::AuthorizationCode);
            assert!(description.contains("code_verifier"));
        }
        other => panic!("Expected InvalidGrant, got {other:?}"),
    }
}

#[tokio::test]
async fn test_redirect_means_invalid_shop_id() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", "https://shopify.com/elsewhere"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = exchange_code_for_tokens(&http, &config, "code", "verifier").await;
    match result {
        Err(OAuthError::InvalidShopId { shop_id }) => assert_eq!(shop_id, "68817551676"),
        other => panic!("Expected InvalidShopId, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_means_missing_user_agent() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let result = exchange_code_for_tokens(&http, &config, "code", "verifier").await;
    assert!(matches!(result, Err(OAuthError::MissingUserAgent)));
}

#[tokio::test]
async fn test_invalid_client_and_invalid_token() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("code=client-case"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_client",
            "error_description": "Unknown client"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("code=origin-case"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_token",
            "error_description": "Origin missing"
        })))
        .mount(&server)
        .await;

    let result = exchange_code_for_tokens(&http, &config, "client-case", "verifier").await;
    match result {
        Err(OAuthError::InvalidClient { description }) => assert_eq!(description, "Unknown client"),
        other => panic!("Expected InvalidClient, got {other:?}"),
    }

    let result = exchange_code_for_tokens(&http, &config, "origin-case", "verifier").await;
    assert!(matches!(result, Err(OAuthError::MissingOrigin)));
}

#[tokio::test]
async fn test_other_failures_carry_status_and_message() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "server_error",
            "error_description": "try again"
        })))
        .mount(&server)
        .await;

    let result = exchange_code_for_tokens(&http, &config, "code", "verifier").await;
    match result {
        Err(OAuthError::TokenRequestFailed { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "server_error - try again");
        }
        other => panic!("Expected TokenRequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_without_token_fields_is_invalid_response() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let result = exchange_code_for_tokens(&http, &config, "code", "verifier").await;
    assert!(matches!(result, Err(OAuthError::InvalidTokenResponse { .. })));
}

#[tokio::test]
async fn test_refresh_keeps_previous_refresh_token_when_omitted() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=shcrt_old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "shcat_new",
            "token_type": "Bearer",
            "expires_in": 7200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let previous = TokenSet {
        access_token: "shcat_old".to_string(),
        refresh_token: Some("shcrt_old".to_string()),
        id_token: Some("id.token.value".to_string()),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        scope: "openid email".to_string(),
        issued_at: 1_700_000_000_000,
    };

    let response = refresh_access_token(&http, &config, "shcrt_old").await.unwrap();
    let next = TokenSet::from_refresh(response, &previous, 1_700_003_000_000);

    assert_eq!(next.access_token, "shcat_new");
    assert_eq!(next.refresh_token.as_deref(), Some("shcrt_old"));
    assert_eq!(next.id_token.as_deref(), Some("id.token.value"));
    assert_eq!(next.scope, "openid email");
    assert_eq!(next.expires_in, 7200);
    assert_eq!(next.issued_at, 1_700_003_000_000);
}

#[tokio::test]
async fn test_revoked_refresh_token_requires_reauthentication() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let http = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Refresh token revoked"
        })))
        .mount(&server)
        .await;

    let error = refresh_access_token(&http, &config, "shcrt_revoked")
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        OAuthError::InvalidGrant {
            grant_type: GrantType::RefreshToken,
            ..
        }
    ));
    assert!(error.requires_reauthentication());
}
