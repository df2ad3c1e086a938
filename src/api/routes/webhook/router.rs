//! Router for the Telegram webhook, the relay's single entry point.
//!
//! One POST handler authenticates the request, classifies the update,
//! applies command semantics and the context window, drives the
//! completion call, and replies through the webhook response body
//! wherever the platform allows it.

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::context::{
    COMMAND_MARKER, clear_context, inject_replied_message, load_context, save_context,
    truncate_to_window,
};
use crate::core::AppConfig;
use crate::jobs::spawn_detached;
use crate::openai::{Message, Role, complete};
use crate::telegram::{
    CallbackQuery, ChatMessage, Inbound, Update, answer_callback_query_response,
    answer_inline_query_response, edit_inline_message_text, empty_inline_menu_response,
    send_message_response,
};

type SharedState = Arc<RwLock<AppState>>;

/// Header Telegram echoes the configured webhook secret in.
const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Handle one Telegram update delivered to the webhook
async fn telegram_webhook(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> Result<Response, ApiError> {
    let config = state
        .read()
        .expect("Unable to read shared state")
        .config
        .clone();

    // Authenticity gate: the bot token is a shared secret embedded in
    // the webhook URL, doubled by the secret-token header when one is
    // configured. Both must hold before the update is even looked at.
    if token != config.telegram_bot_token || !secret_header_matches(&headers, &config) {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    }

    let Some(inbound) = update.classify() else {
        return Ok(no_action());
    };

    if !is_whitelisted(&config, inbound.username()) {
        tracing::debug!("Dropping update from non-whitelisted sender");
        return Ok(no_action());
    }

    let username = inbound.username().unwrap_or_default().to_string();

    match inbound {
        Inbound::Inline(query) => {
            if query.query.trim().is_empty() {
                return Ok(Json(empty_inline_menu_response(&query.id)).into_response());
            }
            Ok(Json(answer_inline_query_response(&query.id, &query.query)).into_response())
        }
        Inbound::Callback(callback) => handle_callback(config, username, callback).await,
        Inbound::Plain(message) => handle_message(state, config, username, message).await,
    }
}

/// Empty-success response: the update is acknowledged and dropped.
fn no_action() -> Response {
    StatusCode::OK.into_response()
}

fn secret_header_matches(headers: &HeaderMap, config: &AppConfig) -> bool {
    if config.telegram_webhook_secret.is_empty() {
        return true;
    }
    headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        == Some(config.telegram_webhook_secret.as_str())
}

fn is_whitelisted(config: &AppConfig, username: Option<&str>) -> bool {
    let whitelist = config.telegram_username_whitelist.trim();
    if whitelist.is_empty() {
        return true;
    }
    match username {
        Some(name) => whitelist.split_whitespace().any(|allowed| allowed == name),
        None => false,
    }
}

/// The plain-message path: command interception, context assembly,
/// completion, persist, and a reply in the response body.
async fn handle_message(
    state: SharedState,
    config: AppConfig,
    username: String,
    message: ChatMessage,
) -> Result<Response, ApiError> {
    let Some(text) = message.text.clone() else {
        return Ok(no_action());
    };
    let chat_id = message.chat.id;

    if text.starts_with("/start") || text.starts_with("/chatgpt") {
        let greeting = format!(
            "{} Hi @{}! I'm a chatbot powered by OpenAI! Reply your query to this message!",
            COMMAND_MARKER, username,
        );
        let extra = json!({
            "reply_markup": {
                "force_reply": true,
                "input_field_placeholder": "Ask me anything!",
                "selective": true,
            }
        });
        return Ok(Json(send_message_response(chat_id, &greeting, Some(extra))).into_response());
    }

    let context_enabled = config.context_window > 0;
    let db = state
        .read()
        .expect("Unable to read shared state")
        .db
        .clone();

    if text.starts_with("/clear") {
        if context_enabled {
            // Store trouble degrades rather than failing the turn; the
            // confirmation already hedges with "if it existed".
            if let Err(err) = clear_context(&db, chat_id).await {
                tracing::warn!("Context clear failed for chat {}: {}", chat_id, err);
            }
        }
        let confirmation = format!(
            "{} Context for the current chat (if it existed) has been cleared.",
            COMMAND_MARKER,
        );
        let extra = json!({ "reply_markup": { "remove_keyboard": true } });
        return Ok(
            Json(send_message_response(chat_id, &confirmation, Some(extra))).into_response(),
        );
    }

    // Assemble the window for this turn. A load failure disables the
    // context feature for the turn: the completion runs with an empty
    // window and nothing is persisted afterwards.
    let mut context: Vec<Message> = Vec::new();
    let mut persist = context_enabled;
    if context_enabled {
        match load_context(&db, chat_id).await {
            Ok(stored) => context = stored,
            Err(err) => {
                tracing::warn!("Context load failed for chat {}: {}", chat_id, err);
                persist = false;
            }
        }
        if let Some(replied) = message.reply_to_message.as_deref() {
            inject_replied_message(&mut context, replied);
        }
        truncate_to_window(&mut context, config.context_window);
    }

    if text.starts_with("/context") {
        let reply = if context.is_empty() {
            format!("{} Context is empty or not available.", COMMAND_MARKER)
        } else {
            format!("{} {}", COMMAND_MARKER, serde_json::to_string(&context)?)
        };
        return Ok(Json(send_message_response(chat_id, &reply, None)).into_response());
    }

    context.push(Message::new(Role::User, &text));
    if context_enabled {
        truncate_to_window(&mut context, config.context_window);
    }

    let user_tag = format!("tg_{}", username);
    let content = match complete(&config, &user_tag, context.clone()).await {
        Ok(content) => content,
        Err(err) => {
            tracing::error!("Completion failed for chat {}: {}", chat_id, err);
            let reply = format!(
                "{} The completion service did not return a reply. Please try again.",
                COMMAND_MARKER,
            );
            return Ok(Json(send_message_response(chat_id, &reply, None)).into_response());
        }
    };

    if persist {
        context.push(Message::new(Role::Assistant, &content));
        truncate_to_window(&mut context, config.context_window);
        if let Err(err) = save_context(&db, chat_id, &context).await {
            tracing::warn!("Context save failed for chat {}: {}", chat_id, err);
        }
    }

    let extra = json!({
        "reply_to_message_id": message.message_id,
        "reply_markup": { "remove_keyboard": true },
    });
    Ok(Json(send_message_response(chat_id, &content, Some(extra))).into_response())
}

/// The callback-query path: acknowledge fast, answer slow. The
/// completion and the final edit run as a detached task so the
/// response body only carries the `answerCallbackQuery` ack.
async fn handle_callback(
    config: AppConfig,
    username: String,
    callback: CallbackQuery,
) -> Result<Response, ApiError> {
    let Some(query) = callback.data.clone().filter(|data| !data.trim().is_empty()) else {
        return Ok(no_action());
    };
    let Some(inline_message_id) = callback.inline_message_id.clone() else {
        return Ok(no_action());
    };

    // Immediate feedback while the completion runs, best effort.
    if let Err(err) = edit_inline_message_text(
        &config.telegram_api_hostname,
        &config.telegram_bot_token,
        &inline_message_id,
        &query,
        "(Processing...)",
    )
    .await
    {
        tracing::warn!("Processing edit failed: {}", err);
    }

    spawn_detached("callback-completion", async move {
        let user_tag = format!("tg_{}", username);
        // Deferred queries run on a fresh single-turn window; the
        // stored context is not consulted or updated here.
        let context = vec![Message::new(Role::User, &query)];
        match complete(&config, &user_tag, context).await {
            Ok(content) => {
                edit_inline_message_text(
                    &config.telegram_api_hostname,
                    &config.telegram_bot_token,
                    &inline_message_id,
                    &query,
                    &content,
                )
                .await
            }
            Err(err) => {
                edit_inline_message_text(
                    &config.telegram_api_hostname,
                    &config.telegram_bot_token,
                    &inline_message_id,
                    &query,
                    "Something went wrong fetching the reply. Please try again.",
                )
                .await?;
                Err(err)
            }
        }
    });

    Ok(Json(answer_callback_query_response(&callback.id, None)).into_response())
}

/// Create the webhook router
pub fn router() -> Router<SharedState> {
    Router::new().route("/telegram/{token}", post(telegram_webhook))
}
