use httpmock::prelude::*;
use restock_notifier::{CatalogFetcher, FetchError, ShopCredentials, ShopifyCatalogFetcher, ShopifyConfig};
use serde_json::json;
use std::time::Duration;

fn config_for(server: &MockServer) -> ShopifyConfig {
    ShopifyConfig {
        credentials: ShopCredentials {
            api_key: "key".into(),
            api_password: "secret".into(),
            shop_domain: "acme".into(),
        },
        api_version: "2022-04".into(),
        base_url: Some(server.base_url()),
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn fetch_sends_basic_auth_and_returns_document() {
    let server = MockServer::start_async().await;
    let body = json!({
        "products": [ { "variants": [ { "sku": "A1", "inventory_quantity": 5 } ] } ]
    });
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/admin/api/2022-04/products.json")
                .header("authorization", "Basic a2V5OnNlY3JldA==");
            then.status(200)
                .header("content-type", "application/json")
                .body(body.to_string());
        })
        .await;

    let fetcher = ShopifyCatalogFetcher::new(&config_for(&server)).expect("client");
    let document = fetcher.fetch().await.expect("fetch succeeds");
    assert_eq!(document, body);
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_maps_to_unauthorized_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/api/2022-04/products.json");
            then.status(401).body("{\"errors\":\"[API] Invalid API key or access token\"}");
        })
        .await;

    let fetcher = ShopifyCatalogFetcher::new(&config_for(&server)).expect("client");
    match fetcher.fetch().await {
        Err(FetchError::Unauthorized { status }) => assert_eq!(status, 401),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_status_error_with_url() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/api/2022-04/products.json");
            then.status(502);
        })
        .await;

    let fetcher = ShopifyCatalogFetcher::new(&config_for(&server)).expect("client");
    match fetcher.fetch().await {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 502);
            assert!(url.ends_with("/admin/api/2022-04/products.json"), "{url}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_maps_to_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/api/2022-04/products.json");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let fetcher = ShopifyCatalogFetcher::new(&config_for(&server)).expect("client");
    assert!(matches!(fetcher.fetch().await, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn unreachable_host_maps_to_request_error() {
    let config = ShopifyConfig {
        credentials: ShopCredentials {
            api_key: "key".into(),
            api_password: "secret".into(),
            shop_domain: "acme".into(),
        },
        api_version: "2022-04".into(),
        // Port 9 (discard) is not expected to accept HTTP connections locally.
        base_url: Some("http://127.0.0.1:9".into()),
        timeout: Duration::from_secs(2),
    };
    let fetcher = ShopifyCatalogFetcher::new(&config).expect("client");
    assert!(matches!(fetcher.fetch().await, Err(FetchError::Request(_))));
}
