mod common;

use axum::http::StatusCode;
use common::{MEMBER, Options, TestApp, spawn_app};
use serde_json::json;
use tutor_admin::store::NewTutor;

async fn ada(app: &TestApp) -> String {
    app.store
        .create_tutor(NewTutor {
            user_id: "owner".into(),
            name: "Ada".into(),
            description: "patient math tutor".into(),
            instructions: "use simple examples".into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_chat_requires_identity() {
    let app = spawn_app(Options::default()).await;
    let tutor_id = ada(&app).await;

    let (status, _) = app
        .post(&format!("/api/chat/{}", tutor_id), None, json!({"prompt": "hi"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.count_messages_for_tutor(&tutor_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_test_mode_records_placeholder_exchange() {
    let app = spawn_app(Options {
        test_mode: true,
        ..Default::default()
    })
    .await;
    let tutor_id = ada(&app).await;

    let (status, body) = app
        .post(
            &format!("/api/chat/{}", tutor_id),
            Some(MEMBER),
            json!({"prompt": "anything at all"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Hi, how are you? (Test Mode)");

    let stored = app.store.list_conversation(&tutor_id, MEMBER).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().any(|m| m.role == "user" && m.content == "Test mode initiated"));
    assert!(stored.iter().any(|m| m.role == "system"));
    assert!(app.model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rate_limited_chat_records_nothing() {
    let app = spawn_app(Options {
        max_requests: 0,
        ..Default::default()
    })
    .await;
    let tutor_id = ada(&app).await;

    let (status, body) = app
        .post(&format!("/api/chat/{}", tutor_id), Some(MEMBER), json!({"prompt": "hi"}))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Rate limit exceeded");
    assert_eq!(app.store.count_messages_for_tutor(&tutor_id).await.unwrap(), 0);
    assert!(app.model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_limit_applies_per_caller() {
    let app = spawn_app(Options {
        max_requests: 1,
        ..Default::default()
    })
    .await;
    let tutor_id = ada(&app).await;
    let uri = format!("/api/chat/{}", tutor_id);

    let (status, _) = app.post(&uri, Some(MEMBER), json!({"prompt": "one"})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post(&uri, Some(MEMBER), json!({"prompt": "two"})).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let (status, _) = app.post(&uri, Some("user_other"), json!({"prompt": "one"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_chat_turn_round_trip() {
    let app = spawn_app(Options::default()).await;
    let tutor_id = ada(&app).await;
    let uri = format!("/api/chat/{}", tutor_id);

    let (status, body) = app.post(&uri, Some(MEMBER), json!({"prompt": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Two plus two is four.");

    let (status, _) = app
        .post(&uri, Some(MEMBER), json!({"prompt": "what is 2+2"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let prompts = app.model.prompts.lock().unwrap().clone();
    let second = &prompts[1];
    let persona = second.find("You are Ada").unwrap();
    let history = second.find("User: hi\nTutor: Two plus two is four.").unwrap();
    let question = second.rfind("what is 2+2").unwrap();
    assert!(persona < history && history < question);

    let (status, conversation) = app.get(&uri, Some(MEMBER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversation.as_array().unwrap().len(), 4);

    let (_, messages) = app.get("/api/admin/messages", Some(common::ADMIN)).await;
    assert_eq!(messages[0]["tutorName"], "Ada");
}

#[tokio::test]
async fn test_chat_validation_and_missing_tutor() {
    let app = spawn_app(Options::default()).await;
    let tutor_id = ada(&app).await;

    let (status, body) = app
        .post(&format!("/api/chat/{}", tutor_id), Some(MEMBER), json!({"prompt": "  "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt is required");

    let (status, body) = app
        .post("/api/chat/missing", Some(MEMBER), json!({"prompt": "hi"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tutor not found");

    assert_eq!(app.store.count_messages_for_tutor(&tutor_id).await.unwrap(), 0);
}
