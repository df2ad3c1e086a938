//! Test utilities for integration tests
#![allow(dead_code)]

use std::env;
use std::fs;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use tgrelay::api::{AppState, app};
use tgrelay::core::AppConfig;
use tgrelay::core::db::{async_db, initialize_db};
use tgrelay::openai::Provider;

pub const TEST_BOT_TOKEN: &str = "123456:test-token";

/// Create a unique storage directory so each test gets its own store.
pub fn temp_storage_dir() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string();
    let dir = env::temp_dir().join(format!("tgrelay-test-{}", ts));
    fs::create_dir_all(&dir).expect("Failed to create storage directory");
    dir.display().to_string()
}

/// Config fixture pointing all outbound traffic at `api_url` (a
/// mockito server in practice).
pub fn test_config(storage_path: &str, api_url: &str, context_window: u32) -> AppConfig {
    AppConfig {
        db_path: storage_path.to_string(),
        telegram_api_hostname: api_url.to_string(),
        telegram_bot_token: TEST_BOT_TOKEN.to_string(),
        telegram_webhook_secret: String::new(),
        telegram_username_whitelist: String::new(),
        chatgpt_behavior: String::new(),
        context_window,
        provider: Provider::OpenAi,
        openai_api_hostname: api_url.to_string(),
        openai_api_key: String::from("test-api-key"),
        openai_model: String::from("gpt-3.5-turbo"),
        azure_api_hostname: api_url.to_string(),
        azure_api_key: String::new(),
        azure_deployment: String::new(),
        azure_api_version: String::from("2023-05-15"),
    }
}

/// Creates a test application router over a fresh store.
pub async fn test_app(config: AppConfig) -> Router {
    let db = async_db(&config.db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    let app_state = AppState::new(db, config);
    app(Arc::new(RwLock::new(app_state)))
}

pub fn webhook_uri(token: &str) -> String {
    format!("/api/webhook/telegram/{}", token)
}

/// POST one update to the webhook and return the response.
pub async fn send_update(app: &Router, token: &str, update: Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(webhook_uri(token))
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(update.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A plain chat message update.
pub fn message_update(username: &str, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": 1000,
        "message": {
            "message_id": 99,
            "date": 1704067200,
            "from": { "id": 7, "is_bot": false, "username": username },
            "chat": { "id": chat_id, "type": "private" },
            "text": text,
        }
    })
}

/// A chat message update replying to an earlier message.
pub fn reply_update(
    username: &str,
    chat_id: i64,
    text: &str,
    replied_text: &str,
    replied_is_bot: bool,
) -> Value {
    json!({
        "update_id": 1001,
        "message": {
            "message_id": 100,
            "date": 1704067260,
            "from": { "id": 7, "is_bot": false, "username": username },
            "chat": { "id": chat_id, "type": "private" },
            "text": text,
            "reply_to_message": {
                "message_id": 98,
                "date": 1704067100,
                "from": { "id": 8, "is_bot": replied_is_bot, "username": "chatbot" },
                "chat": { "id": chat_id, "type": "private" },
                "text": replied_text,
            },
        }
    })
}

pub fn inline_query_update(username: &str, query: &str) -> Value {
    json!({
        "update_id": 1002,
        "inline_query": {
            "id": "inline-1",
            "from": { "id": 7, "is_bot": false, "username": username },
            "query": query,
            "offset": "",
        }
    })
}

pub fn callback_query_update(username: &str, data: &str) -> Value {
    json!({
        "update_id": 1003,
        "callback_query": {
            "id": "callback-1",
            "from": { "id": 7, "is_bot": false, "username": username },
            "data": data,
            "inline_message_id": "inline-msg-1",
        }
    })
}

/// Minimal successful completion response body.
pub fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
            }
        ],
    })
    .to_string()
}
