use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use vitalis_core::LlmError;
use vitalis_engine::ChatService;
use vitalis_llm::GenerateResponse;
use vitalis_server::{router, ServerState};
use vitalis_test_utils::{blood_pressure_analyst, rate_limited, RecordingSleeper, ScriptedModel};
use vitalis_tools::default_registry;

fn app_with(model: Arc<ScriptedModel>) -> Router {
    let chat = ChatService::new(model, default_registry())
        .with_sleeper(Arc::new(RecordingSleeper::new()));
    router(Arc::new(ServerState::new(chat)), None)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_returns_model_text() {
    let model = Arc::new(ScriptedModel::fixed("Your readings look stable."));
    let app = app_with(model.clone());

    let res = app
        .oneshot(chat_request(r#"{ "message": "How am I doing?", "userId": "u1" }"#))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({ "text": "Your readings look stable." }));
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_missing_user_id_uses_default_history() {
    let model = Arc::new(ScriptedModel::fixed("ok"));
    let chat = ChatService::new(model, default_registry());
    let state = Arc::new(ServerState::new(chat));
    let app = router(state.clone(), None);

    let res = app.oneshot(chat_request(r#"{ "message": "hello" }"#)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let history = state.chat.history().get("default-user").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].text, "hello");
}

#[tokio::test]
async fn test_tool_exchange_over_http() {
    let model = Arc::new(ScriptedModel::responding(blood_pressure_analyst));
    let app = app_with(model.clone());

    let res = app
        .oneshot(chat_request(r#"{ "message": "What is my average?", "userId": "alice" }"#))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(
        body["text"],
        "Across 24 readings your average blood pressure is 121/80 mmHg with a pulse of 72 bpm."
    );
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn test_persistent_rate_limit_maps_to_busy() {
    let model = Arc::new(ScriptedModel::new(vec![Err(rate_limited()), Err(rate_limited())]));
    let app = app_with(model.clone());

    let res = app.oneshot(chat_request(r#"{ "message": "hi" }"#)).await.unwrap();

    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(res).await, json!({ "text": "system busy, try again later" }));
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn test_single_rate_limit_recovers() {
    let model = Arc::new(ScriptedModel::new(vec![
        Err(rate_limited()),
        Ok(GenerateResponse::from_text("second time lucky")),
    ]));
    let app = app_with(model.clone());

    let res = app.oneshot(chat_request(r#"{ "message": "hi" }"#)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["text"], "second time lucky");
}

#[tokio::test]
async fn test_upstream_failure_maps_to_unavailable() {
    let model = Arc::new(ScriptedModel::new(vec![Err(LlmError::Api {
        status: 500,
        body: "internal".into(),
    })]));
    let app = app_with(model.clone());

    let res = app.oneshot(chat_request(r#"{ "message": "hi" }"#)).await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await, json!({ "text": "server temporarily unavailable" }));
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_unavailable() {
    let model = Arc::new(ScriptedModel::fixed("unused"));
    let app = app_with(model.clone());

    let res = app.oneshot(chat_request(r#"{ "userId": "u1" }"#)).await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await["text"], "server temporarily unavailable");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_health() {
    let app = app_with(Arc::new(ScriptedModel::fixed("unused")));

    let res = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_static_files_served_from_public() {
    let public = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../public");
    let chat = ChatService::new(Arc::new(ScriptedModel::fixed("unused")), default_registry());
    let app = router(Arc::new(ServerState::new(chat)), Some(public.as_path()));

    let res = app
        .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/chat"));
}

#[tokio::test]
async fn test_blocked_model_response_is_unavailable() {
    let blocked_shapes = [
        json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
        json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
    ];

    for shape in blocked_shapes {
        let response: GenerateResponse = serde_json::from_value(shape).unwrap();
        let model = Arc::new(ScriptedModel::new(vec![Ok(response)]));
        let chat = ChatService::new(model, default_registry());
        let state = Arc::new(ServerState::new(chat));
        let app = router(state.clone(), None);

        let res = app.oneshot(chat_request(r#"{ "message": "hi" }"#)).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await, json!({ "text": "server temporarily unavailable" }));
        assert!(state.chat.history().get("default-user").await.is_empty());
    }
}

#[tokio::test]
async fn test_null_user_id_reaches_tool_as_missing() {
    let model = Arc::new(ScriptedModel::responding(blood_pressure_analyst));
    let app = app_with(model.clone());

    let res = app
        .oneshot(chat_request(r#"{ "message": "What is my average?", "userId": null }"#))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let text = json_body(res).await["text"].as_str().unwrap().to_string();
    assert!(text.contains("could not retrieve"), "unexpected answer: {text}");
    assert!(!text.contains("121"));
}
