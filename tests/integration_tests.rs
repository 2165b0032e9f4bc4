//! Integration tests using wiremock to simulate the REST service.

use gizmo_client::query::Endpoint;
use gizmo_client::retry::{RetryOnServerError, RetryPredicate};
use gizmo_client::{Client, Error, PageRequest};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

async fn client_for(mock_server: &MockServer) -> Client {
    builder_for(mock_server).build().unwrap()
}

fn builder_for(mock_server: &MockServer) -> gizmo_client::ClientBuilder {
    Client::builder()
        .base_url(format!("{}/v4", mock_server.uri()))
        .unwrap()
        .credentials("TOK123", "SEC456")
        .min_request_interval(Duration::ZERO)
}

fn paged_body(ids: &[u32], total_pages: u32) -> serde_json::Value {
    let data: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": id, "name": format!("item {}", id) }))
        .collect();
    json!({
        "result_ok": true,
        "total_count": ids.len().to_string(),
        "page": 1,
        "total_pages": total_pages,
        "results_per_page": 2,
        "data": data,
    })
}

#[tokio::test]
async fn test_paged_get_walks_every_page() {
    let mock_server = MockServer::start().await;

    for (page, ids) in [("1", [1, 2]), ("2", [3, 4]), ("3", [5, 6])] {
        Mock::given(method("GET"))
            .and(path("/v4/survey/42/surveyresponse"))
            .and(query_param("api_token", "TOK123"))
            .and(query_param("api_token_secret", "SEC456"))
            .and(query_param("resultsperpage", "2"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(paged_body(&ids, 3)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = builder_for(&mock_server).batch_size(2).build().unwrap();

    let listing = client
        .fetch_pages::<TestData>(
            &Endpoint::get("survey/42/surveyresponse"),
            PageRequest::All,
        )
        .await
        .unwrap();

    assert_eq!(
        listing.iter().map(|d| d.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6]
    );
    assert_eq!(listing.pages_fetched, 3);
    assert_eq!(listing.attempts, 3);
    assert!(!listing.was_retried());
}

#[tokio::test]
async fn test_server_error_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey/7"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/survey/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result_ok": true,
            "data": { "id": 7, "name": "Onboarding" }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let data = client
        .fetch_one::<TestData>(&Endpoint::get("survey/7"))
        .await
        .unwrap();

    assert_eq!(
        data,
        TestData {
            id: 7,
            name: "Onboarding".to_string()
        }
    );
}

#[tokio::test]
async fn test_persistent_failure_exhausts_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(10)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let result = client
        .fetch_pages::<TestData>(&Endpoint::get("survey"), PageRequest::All)
        .await;

    match result {
        Err(err @ Error::MaxRetriesExceeded { .. }) => {
            assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
            let url = err.url().unwrap_or_default().to_string();
            assert!(url.contains("api_token=***"), "{}", url);
            assert!(!format!("{:?}", err).contains("SEC456"));
        }
        other => panic!("Expected MaxRetriesExceeded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_error_not_retried_with_server_error_predicate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder_for(&mock_server)
        .retry_predicate(Box::new(RetryOnServerError))
        .build()
        .unwrap();

    let err = client
        .fetch_one::<TestData>(&Endpoint::get("survey/404"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { .. }));
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn test_retry_after_is_honored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_string("Too Many Requests"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/survey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged_body(&[1], 1)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let start = Instant::now();

    let listing = client
        .fetch_pages::<TestData>(&Endpoint::get("survey"), PageRequest::All)
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(900));
    assert_eq!(listing.attempts, 2);
    assert!(listing.was_retried());
}

#[tokio::test]
async fn test_declined_envelope_is_terminal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result_ok": false,
            "message": "Survey not found"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let err = client
        .fetch_one::<TestData>(&Endpoint::get("survey/9"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { page: None, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_delete_uses_method_param() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey/31"))
        .and(query_param("_method", "DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result_ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    assert!(client.delete_survey(31).await.unwrap());
}

#[tokio::test]
async fn test_get_responses_typed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey/5/surveyresponse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result_ok": true,
            "total_count": "2",
            "page": 1,
            "total_pages": 1,
            "results_per_page": 50,
            "data": [
                {
                    "id": "101",
                    "contact_id": "",
                    "status": "Complete",
                    "is_test_data": "0",
                    "datesubmitted": "2015-04-01 10:00:00",
                    "[question(2)]": "Blue",
                    "[question(3), option(10001)]": "Email",
                    "[url(\"source\")]": "newsletter"
                },
                null
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let responses = client.get_responses(5, PageRequest::All).await.unwrap();

    assert_eq!(responses.len(), 1);
    let response = &responses[0];
    assert_eq!(response.id, "101");
    assert_eq!(response.url_variable("source").as_deref(), Some("newsletter"));
    assert_eq!(response.answers().len(), 2);
}

#[tokio::test]
async fn test_custom_predicate() {
    struct NeverRetry;

    impl RetryPredicate for NeverRetry {
        fn should_retry(&self, _error: &Error, _attempt: usize) -> bool {
            false
        }
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/survey"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder_for(&mock_server)
        .retry_predicate(Box::new(NeverRetry))
        .build()
        .unwrap();

    let result = client
        .fetch_pages::<TestData>(&Endpoint::get("survey"), PageRequest::First)
        .await;

    assert!(matches!(result, Err(Error::Transport { .. })));
}
