//! End-to-end batch tests against a local GraphQL endpoint.

use gql_batch::batch::{BatchExecutor, ExecutorOptions, Row};
use gql_batch::client::{HttpClientConfig, HttpGraphQlClient};
use gql_batch::template::Template;
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;

const QUERY: &str = "query($city: String){weather(city:$city){temp}}";

fn client_for(server: &mockito::ServerGuard) -> HttpGraphQlClient {
    let endpoint = Url::parse(&format!("{}/graphql", server.url())).unwrap();
    let config = HttpClientConfig::new(endpoint)
        .with_bearer("t0ken")
        .with_timeout(5);
    HttpGraphQlClient::new(config).unwrap()
}

fn city_rows(names: &[&str]) -> Vec<Row> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Row::new(i, vec![name.to_string()]))
        .collect()
}

#[tokio::test]
async fn test_batch_against_http_endpoint() {
    let mut server = mockito::Server::new_async().await;

    let paris = server
        .mock("POST", "/graphql")
        .match_header("authorization", "Bearer t0ken")
        .match_body(Matcher::PartialJson(json!({"variables": {"city": "Paris"}})))
        .with_status(200)
        .with_body(r#"{"data":{"weather":{"temp":21}}}"#)
        .create_async()
        .await;
    let berlin = server
        .mock("POST", "/graphql")
        .match_header("authorization", "Bearer t0ken")
        .match_body(Matcher::PartialJson(json!({"variables": {"city": "Berlin"}})))
        .with_status(200)
        .with_body(r#"{"data":{"weather":{"temp":17}}}"#)
        .create_async()
        .await;
    let atlantis = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({"variables": {"city": "Atlantis"}})))
        .with_status(200)
        .with_body(r#"{"data":null,"errors":[{"message":"Unknown city"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let template = Template::new(QUERY);
    let headers = vec!["city".to_string()];
    let executor = BatchExecutor::new(
        &client,
        &template,
        &headers,
        ExecutorOptions::from_ceiling(Some(2)),
    )
    .unwrap();

    let report = executor
        .execute(city_rows(&["Paris", "Atlantis", "Berlin"]))
        .await
        .unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.succeeded(), 2);

    let outcomes = report.outcomes();
    assert_eq!(
        outcomes[0].status,
        gql_batch::batch::OutcomeStatus::Succeeded(json!({"weather": {"temp": 21}}))
    );
    assert_eq!(
        outcomes[1].error(),
        Some("Request error: GraphQL error: Unknown city")
    );
    assert_eq!(
        outcomes[2].status,
        gql_batch::batch::OutcomeStatus::Succeeded(json!({"weather": {"temp": 17}}))
    );

    paris.assert_async().await;
    berlin.assert_async().await;
    atlantis.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_do_not_stop_siblings() {
    let mut server = mockito::Server::new_async().await;

    let _down = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({"variables": {"city": "down"}})))
        .with_status(503)
        .with_body("service unavailable")
        .create_async()
        .await;
    let _up = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({"variables": {"city": "up"}})))
        .with_status(200)
        .with_body(r#"{"data":{"ok":true}}"#)
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let template = Template::new(QUERY);
    let headers = vec!["city".to_string()];
    let executor = BatchExecutor::new(
        &client,
        &template,
        &headers,
        ExecutorOptions::from_ceiling(Some(1)),
    )
    .unwrap();

    let report = executor
        .execute(city_rows(&["up", "down", "up", "up"]))
        .await
        .unwrap();

    let statuses: Vec<bool> = report.outcomes().iter().map(|o| o.is_success()).collect();
    assert_eq!(statuses, vec![true, false, true, true]);
    assert!(report.outcomes()[1].error().unwrap().contains("503"));
}
