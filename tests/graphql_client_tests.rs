//! Integration tests for the Customer Account API GraphQL client.

use shopify_customer_auth::clients::graphql::CustomerOrder;
use shopify_customer_auth::{
    ApiVersion, ClientId, CustomerAccountClient, CustomerAuthConfig, Environment, GraphqlError,
    ProviderUrl, RedirectUri, ShopId,
};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPHQL_PATH: &str = "/68817551676/account/customer/api/2025-01/graphql";

fn config_for(server: &MockServer) -> CustomerAuthConfig {
    CustomerAuthConfig::builder()
        .client_id(ClientId::new("shp_test_client").unwrap())
        .shop_id(ShopId::new("68817551676").unwrap())
        .redirect_uri(RedirectUri::new("http://localhost:3000/account/callback").unwrap())
        .provider_url(ProviderUrl::new(server.uri()).unwrap())
        .api_version(ApiVersion::V2025_01)
        .environment(Environment::Development)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_query_sends_raw_access_token() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat_raw").unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("Authorization", "shcat_raw"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "query": "query { customer { firstName } }",
            "variables": { "first": 5 },
            "operationName": "Named"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "customer": { "firstName": "Grace" } },
            "extensions": { "cost": { "requestedQueryCost": 1 } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .query(
            "query { customer { firstName } }",
            Some(serde_json::json!({ "first": 5 })),
            Some("Named"),
        )
        .await
        .unwrap();

    assert_eq!(response.data["customer"]["firstName"], "Grace");
    assert_eq!(
        response.extensions.unwrap()["cost"]["requestedQueryCost"],
        1
    );
}

#[tokio::test]
async fn test_errors_array_reports_every_message() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat").unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [
                { "message": "Field 'nope' doesn't exist on type 'Customer'" },
                { "message": "Throttled" }
            ]
        })))
        .mount(&server)
        .await;

    let error = client
        .query("query { customer { nope } }", None, None)
        .await
        .unwrap_err();

    match &error {
        GraphqlError::Graphql { errors, .. } => assert_eq!(errors.len(), 2),
        other => panic!("Expected Graphql error, got {other:?}"),
    }
    let message = error.to_string();
    assert!(message.contains("Field 'nope' doesn't exist"));
    assert!(message.contains("Throttled"));
}

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat_expired").unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let error = client.customer().await.unwrap_err();
    assert!(matches!(error, GraphqlError::Http { status: 401, .. }));
    assert!(error.is_unauthorized());
}

#[tokio::test]
async fn test_customer_null_is_none() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat").unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(serde_json::json!({ "operationName": "CustomerIdentity" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "customer": null } })),
        )
        .mount(&server)
        .await;

    assert!(client.customer().await.unwrap().is_none());
}

#[tokio::test]
async fn test_customer_display_name_falls_back_to_full_name() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat").unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "customer": {
                    "id": "gid://shopify/Customer/7",
                    "displayName": "",
                    "firstName": "Katherine",
                    "lastName": "Johnson",
                    "emailAddress": null
                }
            }
        })))
        .mount(&server)
        .await;

    let customer = client.customer().await.unwrap().unwrap();
    assert_eq!(customer.display_name, "Katherine Johnson");
    assert!(customer.email.is_none());
}

#[tokio::test]
async fn test_language_is_injected_into_query() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat")
        .unwrap()
        .with_language("pt-br")
        .unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("@inContext(language: PT_BR)"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "customer": null } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.customer().await.unwrap();
}

#[tokio::test]
async fn test_order_is_queried_by_gid() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat").unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(serde_json::json!({
            "variables": { "id": "gid://shopify/Order/1001" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "order": {
                    "id": "gid://shopify/Order/1001",
                    "name": "#1001",
                    "processedAt": "2025-03-01T10:00:00Z",
                    "financialStatus": "PAID",
                    "totalPrice": { "amount": "49.90", "currencyCode": "EUR" }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let order: CustomerOrder = client.order("1001").await.unwrap().unwrap();
    assert_eq!(order.name, "#1001");
    assert_eq!(order.total_price.unwrap().currency_code, "EUR");
}

#[tokio::test]
async fn test_non_graphql_body_is_invalid_response() {
    let server = MockServer::start().await;
    let client = CustomerAccountClient::new(&config_for(&server), "shcat").unwrap();

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2, 3])))
        .mount(&server)
        .await;

    let error = client.query("query { shop }", None, None).await.unwrap_err();
    assert!(matches!(error, GraphqlError::InvalidResponse { .. }));
}
