//! Chat-completion client for the OpenAI-compatible backends.
//!
//! Two deployment styles share the same message schema: the public
//! OpenAI API (bearer credential) and Azure OpenAI (deployment-scoped
//! URL with an `api-key` header). Which one a request goes to is fixed
//! by configuration, never by update data.

use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::core::AppConfig;

/// Explicit bound on the completion round trip. Expiry surfaces as an
/// ordinary completion failure.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Which completion backend to call. A static configuration value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    AzureOpenAi,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// One-way hash of the per-user correlation tag. The raw identifier
/// never leaves the process.
pub fn user_token(user: &str) -> String {
    hex::encode(Sha256::digest(user.as_bytes()))
}

/// Run one completion over the given window. A non-empty behavior
/// prompt is injected as a leading system message; callers that still
/// need the unmodified window pass a clone.
pub async fn complete(
    config: &AppConfig,
    user: &str,
    mut messages: Vec<Message>,
) -> Result<String, Error> {
    if !config.chatgpt_behavior.trim().is_empty() {
        messages.insert(0, Message::new(Role::System, &config.chatgpt_behavior));
    }

    match config.provider {
        Provider::OpenAi => {
            oai_complete(
                &config.openai_api_hostname,
                &config.openai_api_key,
                &config.openai_model,
                user,
                &messages,
            )
            .await
        }
        Provider::AzureOpenAi => {
            aoai_complete(
                &config.azure_api_hostname,
                &config.azure_api_key,
                &config.azure_deployment,
                &config.azure_api_version,
                user,
                &messages,
            )
            .await
        }
    }
}

async fn oai_complete(
    api_hostname: &str,
    api_key: &str,
    model: &str,
    user: &str,
    messages: &[Message],
) -> Result<String, Error> {
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches('/'));
    let payload = json!({
        "model": model,
        "user": user_token(user),
        "messages": messages,
    });
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(COMPLETION_TIMEOUT)
        .json(&payload)
        .send()
        .await?
        .json()
        .await?;

    reply_content(&response)
}

async fn aoai_complete(
    api_hostname: &str,
    api_key: &str,
    deployment: &str,
    api_version: &str,
    user: &str,
    messages: &[Message],
) -> Result<String, Error> {
    let url = format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        api_hostname.trim_end_matches('/'),
        deployment,
        api_version,
    );
    let payload = json!({
        "user": user_token(user),
        "messages": messages,
    });
    let response = reqwest::Client::new()
        .post(url)
        .header("api-key", api_key)
        .header("Content-Type", "application/json")
        .timeout(COMPLETION_TIMEOUT)
        .json(&payload)
        .send()
        .await?
        .json()
        .await?;

    reply_content(&response)
}

/// Pull the first choice's message content out of a completion
/// response. Anything missing makes the reply malformed and the whole
/// turn fails.
fn reply_content(response: &Value) -> Result<String, Error> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| anyhow!("Completion response missing content: {}", response))
}
