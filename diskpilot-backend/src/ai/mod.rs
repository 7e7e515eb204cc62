//! AI provider clients for plan generation
//!
//! Providers are a closed set, so dispatch is an enum rather than a
//! trait object. Any provider failure falls back to the rule-based
//! generator upstream; errors here are strings with enough context to
//! log, never surfaced raw to the API caller.

pub mod claude;
pub mod openai;
pub mod prompts;

pub use claude::ClaudeClient;
pub use openai::OpenAiClient;

use crate::config::Config;
use crate::models::{Plan, UserSettings};

/// Unified AI client over the configured provider
#[derive(Debug)]
pub enum AiClient {
    Claude(ClaudeClient),
    OpenAi(OpenAiClient),
}

impl AiClient {
    /// Build a client from user settings, falling back to the server's
    /// environment keys when the user has not stored one.
    pub fn from_settings(settings: &UserSettings, config: &Config) -> Result<Self, String> {
        match settings.ai_provider.as_str() {
            "anthropic" => {
                let key = pick_key(&settings.api_key, &config.anthropic_api_key)
                    .ok_or_else(|| "No Anthropic API key configured".to_string())?;
                Ok(AiClient::Claude(ClaudeClient::new(key)?))
            }
            "openai" => {
                let key = pick_key(&settings.api_key, &config.openai_api_key)
                    .ok_or_else(|| "No OpenAI API key configured".to_string())?;
                Ok(AiClient::OpenAi(OpenAiClient::new(key)?))
            }
            other => Err(format!("Unknown provider: {}", other)),
        }
    }

    pub async fn generate_plans(&self, prompt: &str) -> Result<Vec<Plan>, String> {
        match self {
            AiClient::Claude(client) => client.generate_plans(prompt).await,
            AiClient::OpenAi(client) => client.generate_plans(prompt).await,
        }
    }
}

fn pick_key<'a>(user_key: &'a str, env_key: &'a str) -> Option<&'a str> {
    if !user_key.is_empty() {
        Some(user_key)
    } else if !env_key.is_empty() {
        Some(env_key)
    } else {
        None
    }
}

/// Parse a provider's text reply into plans, tolerating markdown fences
pub(crate) fn parse_plan_json(text: &str) -> Result<Vec<Plan>, String> {
    let trimmed = text.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    let plans: Vec<Plan> = serde_json::from_str(stripped)
        .map_err(|e| format!("Provider returned invalid plan JSON: {}", e))?;
    if plans.is_empty() {
        return Err("Provider returned an empty plan list".to_string());
    }
    Ok(plans)
}
