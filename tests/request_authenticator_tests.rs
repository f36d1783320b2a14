//! Integration tests for server-side request authentication.
//!
//! The Customer Account API is mocked with wiremock. The extractor tests run
//! a real axum server on an ephemeral port.

use std::sync::Arc;

use axum::extract::Path;
use axum::routing::get;
use axum::Router;
use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderValue, StatusCode};
use shopify_customer_auth::server::{AuthError, AuthenticatedCustomer, RequestAuthenticator};
use shopify_customer_auth::{
    ClientId, CustomerAuthConfig, Environment, ProviderUrl, RedirectUri, ShopId,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPHQL_PATH: &str = "/68817551676/account/customer/api/2025-10/graphql";

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

async fn mount_identity(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("Authorization", token))
        .and(body_partial_json(serde_json::json!({ "operationName": "CustomerIdentity" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "customer": {
                    "id": "gid://shopify/Customer/42",
                    "displayName": "Margaret Hamilton",
                    "emailAddress": { "emailAddress": "margaret@example.com" }
                }
            }
        })))
        .mount(server)
        .await;
}

async fn mount_rejection(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(server)
        .await;
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

#[tokio::test]
async fn test_valid_bearer_token_authenticates() {
    let server = MockServer::start().await;
    mount_identity(&server, "shcat_valid").await;
    let authenticator = RequestAuthenticator::new(config_for(&server)).unwrap();

    let customer = authenticator
        .authenticate(&bearer("shcat_valid"))
        .await
        .unwrap();

    assert_eq!(customer.customer_id, "gid://shopify/Customer/42");
    assert_eq!(customer.customer.display_name, "Margaret Hamilton");
    assert_eq!(customer.customer.email.as_deref(), Some("margaret@example.com"));
}

#[tokio::test]
async fn test_access_token_cookie_authenticates() {
    let server = MockServer::start().await;
    mount_identity(&server, "shcat/cookie+value").await;
    let authenticator = RequestAuthenticator::new(config_for(&server)).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_static("theme=dark; shopify-access-token=shcat%2Fcookie%2Bvalue"),
    );

    let customer = authenticator.authenticate(&headers).await.unwrap();
    assert_eq!(customer.customer_id, "gid://shopify/Customer/42");
}

#[tokio::test]
async fn test_missing_token_never_calls_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let authenticator = RequestAuthenticator::new(config_for(&server)).unwrap();

    let error = authenticator.authenticate(&HeaderMap::new()).await.unwrap_err();
    assert!(matches!(error, AuthError::MissingToken));
    assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let server = MockServer::start().await;
    mount_rejection(&server).await;
    let authenticator = RequestAuthenticator::new(config_for(&server)).unwrap();

    let error = authenticator
        .authenticate(&bearer("shcat_revoked"))
        .await
        .unwrap_err();
    assert!(matches!(error, AuthError::Unauthorized { .. }));
    assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_null_customer_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "customer": null } })),
        )
        .mount(&server)
        .await;
    let authenticator = RequestAuthenticator::new(config_for(&server)).unwrap();

    let error = authenticator
        .authenticate_token("shcat_orphan")
        .await
        .unwrap_err();
    assert!(matches!(error, AuthError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_order_ownership() {
    let server = MockServer::start().await;
    mount_identity(&server, "shcat_valid").await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(serde_json::json!({
            "operationName": "CustomerOrder",
            "variables": { "id": "gid://shopify/Order/1" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "order": { "id": "gid://shopify/Order/1", "name": "#1001" } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(serde_json::json!({
            "operationName": "CustomerOrder",
            "variables": { "id": "gid://shopify/Order/2" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "order": null } })),
        )
        .mount(&server)
        .await;

    let authenticator = RequestAuthenticator::new(config_for(&server)).unwrap();
    let customer = authenticator
        .authenticate_token("shcat_valid")
        .await
        .unwrap();

    let order = customer.verify_order_ownership("1").await.unwrap();
    assert_eq!(order.name, "#1001");

    let error = customer
        .verify_order_ownership("gid://shopify/Order/2")
        .await
        .unwrap_err();
    match &error {
        AuthError::Forbidden { order_id } => assert_eq!(order_id, "gid://shopify/Order/2"),
        other => panic!("Expected Forbidden, got {other:?}"),
    }
    assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
}

async fn order_handler(
    customer: AuthenticatedCustomer,
    Path(id): Path<String>,
) -> Result<String, AuthError> {
    let order = customer.verify_order_ownership(&id).await?;
    Ok(format!("{} for {}", order.name, customer.customer.display_name))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

#[tokio::test]
async fn test_extractor_guards_routes() {
    let server = MockServer::start().await;
    mount_identity(&server, "shcat_valid").await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(serde_json::json!({ "operationName": "CustomerOrder" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "order": { "id": "gid://shopify/Order/5", "name": "#1005" } }
        })))
        .mount(&server)
        .await;
    mount_rejection(&server).await;

    let authenticator = Arc::new(RequestAuthenticator::new(config_for(&server)).unwrap());
    let app = Router::new()
        .route("/orders/{id}", get(order_handler))
        .with_state(authenticator);
    let base = serve(app).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/orders/5"))
        .header("Authorization", "Bearer shcat_valid")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "#1005 for Margaret Hamilton");

    let response = client.get(format!("{base}/orders/5")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let response = client
        .get(format!("{base}/orders/5"))
        .header("Authorization", "Bearer shcat_other")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}
