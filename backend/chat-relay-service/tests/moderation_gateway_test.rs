use chat_relay_service::services::{HttpModerationGateway, ModerationGateway, ModerationVerdict};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn gateway_for(server: &MockServer, timeout: Duration) -> HttpModerationGateway {
    HttpModerationGateway::new(format!("{}/analyze", server.uri()), timeout).unwrap()
}

#[tokio::test]
async fn test_flagged_response_with_rewrite() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_json(json!({"text": "you darn fool"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "final_decision": 1,
            "result": {"rewritten_text": "you *** fool"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Duration::from_secs(2)).await;
    let verdict = gateway.evaluate("you darn fool").await;

    assert!(verdict.flagged);
    assert_eq!(verdict.display_text("you darn fool"), "you *** fool");
}

#[tokio::test]
async fn test_string_decision_and_clean_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "final_decision": "0",
            "result": {"rewritten_text": "hello"}
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Duration::from_secs(2)).await;
    let verdict = gateway.evaluate("hello").await;

    assert_eq!(
        verdict,
        ModerationVerdict {
            flagged: false,
            rewritten_text: Some("hello".into()),
        }
    );
}

#[tokio::test]
async fn test_missing_fields_are_not_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Duration::from_secs(2)).await;
    let verdict = gateway.evaluate("hello").await;

    assert!(!verdict.flagged);
    assert_eq!(verdict.rewritten_text, None);
    assert_eq!(verdict.display_text("hello"), "hello");
}

#[tokio::test]
async fn test_server_error_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Duration::from_secs(2)).await;
    assert_eq!(
        gateway.evaluate("hello").await,
        ModerationVerdict::pass_through("hello")
    );
}

#[tokio::test]
async fn test_undecodable_body_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Duration::from_secs(2)).await;
    assert_eq!(
        gateway.evaluate("hello").await,
        ModerationVerdict::pass_through("hello")
    );
}

#[tokio::test]
async fn test_wrongly_shaped_result_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "final_decision": 1,
            "result": "not an object"
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Duration::from_secs(2)).await;
    let verdict = gateway.evaluate("hello").await;
    assert_eq!(verdict, ModerationVerdict::pass_through("hello"));
}

#[tokio::test]
async fn test_slow_classifier_times_out_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"final_decision": 1}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Duration::from_millis(200)).await;
    let started = Instant::now();
    let verdict = gateway.evaluate("hello").await;

    assert_eq!(verdict, ModerationVerdict::pass_through("hello"));
    assert!(started.elapsed() < Duration::from_secs(2));
}
