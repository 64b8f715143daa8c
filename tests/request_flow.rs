//! Integration tests for the dispatch loop.
//!
//! These tests verify the retry policy end to end against a mock server:
//! - Success and body decoding (including empty bodies)
//! - Non-retryable failures returning after exactly one attempt
//! - Retryable failures exhausting the attempt budget
//! - The global request ceiling
//! - Idempotent close

use request_manager::{
    default_should_retry, ManagerConfig, RequestError, RequestManager, RequestOptions,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config tuned for tests: high rate so the bucket never slows us down.
fn test_config(api_base: &str) -> ManagerConfig {
    ManagerConfig {
        api_base: api_base.to_string(),
        rate_limit_rps: 100,
        burst: 20,
        timeout_seconds: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_get_decodes_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"widgets": [1, 2, 3]})))
        .expect(1)
        .mount(&server)
        .await;

    let manager = RequestManager::new(test_config(&server.uri()));
    let body = manager
        .get("/v1/widgets", RequestOptions::new())
        .await
        .expect("request should succeed");
    assert_eq!(body, json!({"widgets": [1, 2, 3]}));
    assert_eq!(manager.total_requests(), 1);
    manager.close().await;
}

#[tokio::test]
async fn test_empty_body_decodes_to_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/widgets/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let manager = RequestManager::new(test_config(&server.uri()));
    let body = manager
        .delete("/v1/widgets/7", RequestOptions::new())
        .await
        .expect("request should succeed");
    assert_eq!(body, json!({}));
    manager.close().await;
}

#[tokio::test]
async fn test_post_sends_encoded_body_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/widgets"))
        .and(header("x-api-key", "secret"))
        .and(header("x-request-id", "abc-123"))
        .and(query_param("dry_run", "true"))
        .and(body_json(json!({"name": "sprocket"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config
        .default_headers
        .insert("x-api-key".to_string(), "secret".to_string());

    let manager = RequestManager::new(config);
    let body = manager
        .post(
            "/v1/widgets",
            RequestOptions::new()
                .header("x-request-id", "abc-123")
                .query("dry_run", "true")
                .body(json!({"name": "sprocket"})),
        )
        .await
        .expect("request should succeed");
    assert_eq!(body, json!({"id": 42}));
    manager.close().await;
}

#[tokio::test]
async fn test_non_retryable_status_fails_after_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let manager = RequestManager::new(test_config(&server.uri()));
    let err = manager
        .get("/v1/missing", RequestOptions::new())
        .await
        .expect_err("404 should fail");
    match err {
        RequestError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("expected Status error, got {:?}", other),
    }
    assert_eq!(manager.total_requests(), 1);
    manager.close().await;
}

#[tokio::test]
async fn test_retryable_status_exhausts_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let manager = RequestManager::new(test_config(&server.uri()));
    let err = manager
        .get("/v1/flaky", RequestOptions::new())
        .await
        .expect_err("persistent 503 should exhaust retries");
    assert!(matches!(err, RequestError::RetriesExceeded { attempts: 3 }));
    assert_eq!(manager.total_requests(), 3);
    manager.close().await;
}

#[tokio::test]
async fn test_retryable_status_recovers_mid_budget() {
    let server = MockServer::start().await;
    // First attempt hits a transient 502, the second succeeds.
    Mock::given(method("GET"))
        .and(path("/v1/recovering"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let manager = RequestManager::new(test_config(&server.uri()));
    let body = manager
        .get("/v1/recovering", RequestOptions::new())
        .await
        .expect("second attempt should succeed");
    assert_eq!(body, json!({"ok": true}));
    assert_eq!(manager.total_requests(), 2);
    manager.close().await;
}

#[tokio::test]
async fn test_custom_retry_predicate_broadens_policy() {
    let server = MockServer::start().await;
    // 404 is not retryable by default; this caller retries it anyway.
    Mock::given(method("GET"))
        .and(path("/v1/eventually"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let manager = RequestManager::with_retry_predicate(
        test_config(&server.uri()),
        Arc::new(|err: &RequestError| {
            default_should_retry(err) || err.status() == Some(404)
        }),
    );
    let err = manager
        .get("/v1/eventually", RequestOptions::new())
        .await
        .expect_err("persistent 404 should exhaust the broadened budget");
    assert!(matches!(err, RequestError::RetriesExceeded { attempts: 3 }));
    manager.close().await;
}

#[tokio::test]
async fn test_request_ceiling_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let config = ManagerConfig {
        max_requests: Some(2),
        ..test_config(&server.uri())
    };
    let manager = RequestManager::new(config);

    manager.get("/v1/widgets", RequestOptions::new()).await.unwrap();
    manager.get("/v1/widgets", RequestOptions::new()).await.unwrap();

    let err = manager
        .get("/v1/widgets", RequestOptions::new())
        .await
        .expect_err("third request should hit the ceiling");
    assert!(matches!(
        err,
        RequestError::MaxRequestsExceeded { used: 3, limit: 2 }
    ));
    manager.close().await;
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let manager = RequestManager::new(test_config(&server.uri()));
    manager.get("/v1/widgets", RequestOptions::new()).await.unwrap();

    manager.close().await;
    manager.close().await; // no panic, no duplicate teardown

    // A rate-limited manager rejects requests once its bucket is shut down.
    let err = manager
        .get("/v1/widgets", RequestOptions::new())
        .await
        .expect_err("request after close should fail");
    assert!(matches!(err, RequestError::Closed));
}

#[tokio::test]
async fn test_invalid_base_url_is_reported() {
    let manager = RequestManager::new(test_config("not a url"));
    let err = manager
        .get("/v1/widgets", RequestOptions::new())
        .await
        .expect_err("bad base URL should fail before dispatch");
    assert!(matches!(err, RequestError::InvalidUrl(_)));
    // Nothing was dispatched, so nothing was counted.
    assert_eq!(manager.total_requests(), 0);
    manager.close().await;
}

#[tokio::test]
async fn test_undecodable_body_propagates_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let manager = RequestManager::new(test_config(&server.uri()));
    let err = manager
        .get("/v1/garbled", RequestOptions::new())
        .await
        .expect_err("non-JSON body should fail decode");
    assert!(matches!(err, RequestError::Decode(_)));
    manager.close().await;
}
