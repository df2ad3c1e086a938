//! The Telegram Bot API subset this relay consumes and produces.
//!
//! Inbound updates arrive as webhook JSON; replies to the current
//! update are returned directly as the webhook response body (a
//! supported shortcut of the Bot API that saves a second outbound
//! call). Only `editMessageText` goes out as an active HTTP call,
//! because it targets a message from an earlier interaction.

use std::time::Duration;

use anyhow::{Result, bail};
use serde::Deserialize;
use serde_json::{Value, json};

use super::markdown::sanitize;

/// The Bot API caps `callback_data` at 64 bytes. Anything longer is
/// clipped before it is echoed into a button payload, and the data is
/// treated as untrusted input when it comes back.
const CALLBACK_DATA_LIMIT: usize = 64;

/// Bound on outbound Bot API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<ChatMessage>,
    pub inline_query: Option<InlineQuery>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub message_id: i64,
    pub from: User,
    pub chat: Chat,
    pub text: Option<String>,
    pub reply_to_message: Option<Box<ChatMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub data: Option<String>,
    pub inline_message_id: Option<String>,
}

/// The three interaction modes, exactly one of which is present in a
/// well-formed update.
#[derive(Debug)]
pub enum Inbound {
    Plain(ChatMessage),
    Inline(InlineQuery),
    Callback(CallbackQuery),
}

impl Update {
    /// Collapse the optional variant fields into a single tagged value.
    /// Returns None for updates this relay does not act on.
    pub fn classify(self) -> Option<Inbound> {
        match (self.message, self.inline_query, self.callback_query) {
            (Some(message), None, None) => Some(Inbound::Plain(message)),
            (None, Some(query), None) => Some(Inbound::Inline(query)),
            (None, None, Some(callback)) => Some(Inbound::Callback(callback)),
            _ => None,
        }
    }
}

impl Inbound {
    /// Sender username, whichever variant carries it.
    pub fn username(&self) -> Option<&str> {
        let from = match self {
            Inbound::Plain(message) => &message.from,
            Inbound::Inline(query) => &query.from,
            Inbound::Callback(callback) => &callback.from,
        };
        from.username.as_deref()
    }
}

/// Build a `sendMessage` payload to return as the webhook response
/// body. Text is sanitized for the Markdown parse mode; `extra` merges
/// additional directives (reply keyboards, reply targets) into the
/// payload.
pub fn send_message_response(chat_id: i64, text: &str, extra: Option<Value>) -> Value {
    let mut payload = json!({
        "method": "sendMessage",
        "chat_id": chat_id,
        "parse_mode": "Markdown",
        "text": sanitize(text),
    });
    if let (Some(object), Some(Value::Object(extra))) = (payload.as_object_mut(), extra) {
        for (key, value) in extra {
            object.insert(key, value);
        }
    }
    payload
}

/// Confirmation suggestion for a non-empty inline query: one article
/// echoing the query, with a button whose callback payload is the query
/// text itself.
pub fn answer_inline_query_response(inline_query_id: &str, query: &str) -> Value {
    json!({
        "method": "answerInlineQuery",
        "inline_query_id": inline_query_id,
        "results": [{
            "type": "article",
            "id": "confirm",
            "title": "Ask the chatbot",
            "description": query,
            "input_message_content": { "message_text": query },
            "reply_markup": {
                "inline_keyboard": [[{
                    "text": "Get answer",
                    "callback_data": truncate_callback_data(query),
                }]],
            },
        }],
    })
}

/// Suggestion menu for an empty inline query. Picking an entry posts
/// the command as a regular chat message, so it flows through the
/// normal command interception.
pub fn empty_inline_menu_response(inline_query_id: &str) -> Value {
    json!({
        "method": "answerInlineQuery",
        "inline_query_id": inline_query_id,
        "results": [
            {
                "type": "article",
                "id": "clear",
                "title": "/clear",
                "description": "Clear the conversation context",
                "input_message_content": { "message_text": "/clear" },
            },
            {
                "type": "article",
                "id": "context",
                "title": "/context",
                "description": "Show the conversation context",
                "input_message_content": { "message_text": "/context" },
            },
        ],
    })
}

/// Acknowledge a callback query in the webhook response body.
pub fn answer_callback_query_response(callback_query_id: &str, text: Option<&str>) -> Value {
    let mut payload = json!({
        "method": "answerCallbackQuery",
        "callback_query_id": callback_query_id,
    });
    if let (Some(object), Some(text)) = (payload.as_object_mut(), text) {
        object.insert("text".to_string(), json!(text));
    }
    payload
}

/// Edit an inline message in place: the query the user confirmed on
/// top, the reply (or a status line) underneath.
pub async fn edit_inline_message_text(
    api_hostname: &str,
    token: &str,
    inline_message_id: &str,
    query: &str,
    text: &str,
) -> Result<()> {
    let url = format!(
        "{}/bot{}/editMessageText",
        api_hostname.trim_end_matches('/'),
        token,
    );
    let payload = json!({
        "inline_message_id": inline_message_id,
        "parse_mode": "Markdown",
        "text": format!("{}\n\n{}", sanitize(query), sanitize(text)),
    });
    let response = reqwest::Client::new()
        .post(url)
        .header("Content-Type", "application/json")
        .timeout(REQUEST_TIMEOUT)
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        bail!("editMessageText failed with status {}", response.status());
    }
    Ok(())
}

fn truncate_callback_data(query: &str) -> &str {
    if query.len() <= CALLBACK_DATA_LIMIT {
        return query;
    }
    // Back off to a char boundary so the clip never splits a code point
    let mut end = CALLBACK_DATA_LIMIT;
    while !query.is_char_boundary(end) {
        end -= 1;
    }
    &query[..end]
}
