use std::env;

use crate::openai::Provider;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub telegram_api_hostname: String,
    pub telegram_bot_token: String,
    pub telegram_webhook_secret: String,
    pub telegram_username_whitelist: String,
    pub chatgpt_behavior: String,
    pub context_window: u32,
    pub provider: Provider,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub azure_api_hostname: String,
    pub azure_api_key: String,
    pub azure_deployment: String,
    pub azure_api_version: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let db_path = env::var("RELAY_STORAGE_PATH").unwrap_or("./".to_string());
        let telegram_api_hostname = env::var("TELEGRAM_API_HOSTNAME")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string());
        let telegram_bot_token =
            env::var("TELEGRAM_BOT_TOKEN").expect("Missing env var TELEGRAM_BOT_TOKEN");
        let telegram_webhook_secret = env::var("TELEGRAM_WEBHOOK_SECRET").unwrap_or_default();
        let telegram_username_whitelist =
            env::var("TELEGRAM_USERNAME_WHITELIST").unwrap_or_default();
        let chatgpt_behavior = env::var("CHATGPT_BEHAVIOR").unwrap_or_default();
        // 0 or unparseable disables the context feature entirely
        let context_window = env::var("CONTEXT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        let provider = match env::var("COMPLETION_PROVIDER")
            .unwrap_or_else(|_| "openai".to_string())
            .as_str()
        {
            "openai" => Provider::OpenAi,
            "azure" => Provider::AzureOpenAi,
            other => panic!("Unknown COMPLETION_PROVIDER: {}", other),
        };
        let openai_api_hostname = env::var("OPENAI_API_HOSTNAME")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let azure_resource = env::var("AZURE_OPENAI_RESOURCE").unwrap_or_default();
        let azure_api_hostname = env::var("AZURE_OPENAI_API_HOSTNAME")
            .unwrap_or_else(|_| format!("https://{}.openai.azure.com", azure_resource));
        let azure_api_key = env::var("AZURE_OPENAI_API_KEY").unwrap_or_default();
        let azure_deployment = env::var("AZURE_OPENAI_DEPLOYMENT").unwrap_or_default();
        let azure_api_version =
            env::var("AZURE_OPENAI_API_VERSION").unwrap_or_else(|_| "2023-05-15".to_string());

        Self {
            db_path,
            telegram_api_hostname,
            telegram_bot_token,
            telegram_webhook_secret,
            telegram_username_whitelist,
            chatgpt_behavior,
            context_window,
            provider,
            openai_api_hostname,
            openai_api_key,
            openai_model,
            azure_api_hostname,
            azure_api_key,
            azure_deployment,
            azure_api_version,
        }
    }
}
