mod common;

use actix_web::{test, web, App};
use chat_relay_service::config::Config;
use chat_relay_service::middleware::error_handling::ErrorResponse;
use chat_relay_service::middleware::Logging;
use chat_relay_service::models::{Conversation, Message};
use chat_relay_service::routes;
use chat_relay_service::services::{InMemoryConversationStore, PassThroughGateway};
use chat_relay_service::state::AppState;
use common::{enter, talk, TestClient};
use std::sync::Arc;

fn state() -> AppState {
    AppState::new(
        Arc::new(Config::test_defaults()),
        Arc::new(InMemoryConversationStore::new()),
        Arc::new(PassThroughGateway),
    )
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(Logging)
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn test_room_lookup_is_order_independent() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/chat/room?user1=alice&user2=bob")
        .to_request();
    let first: Conversation = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/chat/room?user1=bob&user2=alice")
        .to_request();
    let second: Conversation = test::call_and_read_body_json(&app, req).await;

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 1);
    assert_eq!(second.user1_name, "alice");
    assert_eq!(second.departure_count, 0);
    assert_eq!(second.flagged_count, 0);
}

#[actix_web::test]
async fn test_room_body_field_names() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/chat/room?user1=alice&user2=bob")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["id"], 1);
    assert_eq!(body["user1Name"], "alice");
    assert_eq!(body["user2Name"], "bob");
    assert_eq!(body["leaveCount"], 0);
    assert_eq!(body["badwordCount"], 0);
    assert!(body["createdAt"].is_string());
}

#[actix_web::test]
async fn test_room_lookup_rejects_blank_names() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/chat/room?user1=alice&user2=")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "INVALID_REQUEST");
    assert_eq!(body.status, 400);
}

#[actix_web::test]
async fn test_room_lookup_requires_both_params() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/chat/room?user1=alice")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_history_for_unknown_room_is_empty() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/chat/history/42")
        .to_request();
    let messages: Vec<Message> = test::call_and_read_body_json(&app, req).await;
    assert!(messages.is_empty());
}

#[actix_web::test]
async fn test_history_after_relayed_message() {
    let state = state();
    let app = app!(state);

    let alice = TestClient::connect();
    state
        .router
        .handle_text(&alice.handle, &enter("alice", "bob"))
        .await
        .unwrap();
    state
        .router
        .handle_text(&alice.handle, &talk("alice", "bob", "hi bob"))
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/chat/history/1")
        .to_request();
    let messages: Vec<Message> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hi bob");
    assert_eq!(messages[0].conversation_id, 1);
}

#[actix_web::test]
async fn test_metrics_exposed() {
    let state = state();
    let app = app!(state);

    let alice = TestClient::connect();
    state
        .router
        .handle_text(&alice.handle, &enter("alice", "bob"))
        .await
        .unwrap();

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("chat_relay_envelopes_total"));
    assert!(text.contains("chat_relay_active_sessions"));
}

#[actix_web::test]
async fn test_ws_route_requires_upgrade() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get().uri("/ws/chat").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}
