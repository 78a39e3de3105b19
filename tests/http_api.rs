//! HTTP endpoint tests using `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use task_module_bot::bot::{DialogBot, build_dialogs, dialog_ids};
use task_module_bot::channels::bot_routes;
use task_module_bot::store::MemoryStorage;

fn make_app() -> axum::Router {
    let bot = DialogBot::new(
        Arc::new(build_dialogs().unwrap()),
        Arc::new(MemoryStorage::new()),
        dialog_ids::MAIN_DIALOG,
        "https://bot.example.com/",
    )
    .unwrap();
    bot_routes(Arc::new(bot))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let response = make_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn message_returns_committed_activities() {
    let activity = json!({
        "type": "message",
        "channelId": "webchat",
        "from": {"id": "u1", "name": "Ada"},
        "recipient": {"id": "bot"},
        "conversation": {"id": "conv-1"},
        "text": "hi"
    });
    let response = make_app()
        .oneshot(post_json("/api/messages", &activity.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert!(
        activities[0]["text"]
            .as_str()
            .unwrap()
            .starts_with("What can I help you with today?")
    );
    assert_eq!(activities[0]["inputHint"], "expectingInput");
    assert!(body.get("invokeResponse").is_none());
}

#[tokio::test]
async fn task_fetch_returns_invoke_response() {
    let activity = json!({
        "type": "invoke",
        "name": "task/fetch",
        "channelId": "msteams",
        "from": {"id": "u1"},
        "recipient": {"id": "bot"},
        "conversation": {"id": "conv-1"},
        "value": {"data": {"Data": "customform"}}
    });
    let response = make_app()
        .oneshot(post_json("/api/messages", &activity.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let invoke = &body["invokeResponse"];
    assert_eq!(invoke["status"], 200);
    assert_eq!(
        invoke["body"]["task"]["value"]["url"],
        "https://bot.example.com/customform"
    );
    assert_eq!(invoke["body"]["task"]["value"]["width"], 510);
}

#[tokio::test]
async fn malformed_activity_is_bad_request() {
    let response = make_app()
        .oneshot(post_json("/api/messages", r#"{"type": "carrier-pigeon"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn activity_without_conversation_is_bad_request() {
    let activity = json!({"type": "message", "channelId": "webchat", "text": "hi"});
    let response = make_app()
        .oneshot(post_json("/api/messages", &activity.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
