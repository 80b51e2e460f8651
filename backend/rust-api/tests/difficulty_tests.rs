mod common;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

/// Serves a fixed collaborator reply on an ephemeral port and returns its base URL.
async fn spawn_collaborator(reply: Value) -> String {
    let app = Router::new().route(
        "/v1/difficulty",
        post(move || {
            let reply = reply.clone();
            async move { Json(reply) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn strong_round() -> Value {
    json!({
        "totalCount": 10,
        "correctCount": 9,
        "averageTime": 3.2,
        "currentDifficulty": "easy",
        "operation": "addition",
        "levelId": "1-2"
    })
}

#[tokio::test]
async fn test_rules_only_advice() {
    let app = common::create_test_app();
    let (status, body) = common::post(&app, "/api/v1/difficulty", strong_round()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty"], "medium");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_struggling_player_steps_down() {
    let app = common::create_test_app();
    let (status, body) = common::post(
        &app,
        "/api/v1/difficulty",
        json!({
            "totalCount": 5,
            "correctCount": 4,
            "averageTime": 12.0,
            "currentDifficulty": "hard",
            "operation": "division"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty"], "medium");
}

#[tokio::test]
async fn test_invalid_counts_are_rejected() {
    let app = common::create_test_app();

    let mut request = strong_round();
    request["correctCount"] = json!(11);
    let (status, _) = common::post(&app, "/api/v1/difficulty", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut request = strong_round();
    request["totalCount"] = json!(0);
    request["correctCount"] = json!(0);
    let (status, _) = common::post(&app, "/api/v1/difficulty", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_collaborator_message_is_used() {
    let url = spawn_collaborator(json!({
        "difficulty": "hard",
        "message": "Wow, you are flying through these!"
    }))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::create_file_backed_app(&dir, Some(url));

    let (_, health) = common::get(&app, "/health").await;
    assert_eq!(health["dependencies"]["advisor"], "configured");

    let (status, body) = common::post(&app, "/api/v1/difficulty", strong_round()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Wow, you are flying through these!");
    // The tier still comes from the rules
    assert_eq!(body["difficulty"], "medium");
}

#[tokio::test]
async fn test_unsuitable_collaborator_message_falls_back() {
    let url = spawn_collaborator(json!({
        "difficulty": "easy",
        "message": "That was wrong and bad"
    }))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::create_file_backed_app(&dir, Some(url));

    let (status, body) = common::post(&app, "/api/v1/difficulty", strong_round()).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["message"], "That was wrong and bad");
    assert_eq!(body["difficulty"], "medium");
}

#[tokio::test]
async fn test_unreachable_collaborator_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::create_file_backed_app(&dir, Some("http://127.0.0.1:1".to_string()));

    let (status, body) = common::post(&app, "/api/v1/difficulty", strong_round()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty"], "medium");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}
