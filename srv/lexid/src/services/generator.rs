use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{GameConfig, WordOrigin};
use crate::services::word_source::{GeneratedWords, GenerationError, WordSource};
use crate::utils::{has_length, uses_only_letters};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

/// Connection settings for the chat-completion service
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Asks a chat-completion model for candidate words
pub struct LlmWordGenerator {
    client: reqwest::Client,
    settings: GeneratorSettings,
}

impl LlmWordGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response: ChatResponse = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl WordSource for LlmWordGenerator {
    async fn generate(&self, config: &GameConfig) -> Result<GeneratedWords, GenerationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)?;

        let prompt = build_prompt(config);
        debug!("Sending prompt to word generator: {}", prompt);

        let raw = self.complete(api_key, &prompt).await.map_err(|e| {
            error!("Word generator call failed: {}", e);
            e
        })?;
        debug!("Word generator replied: {}", raw);

        let words = extract_words(&raw, config);
        debug!("Extracted {} valid words: {:?}", words.len(), words);

        if words.is_empty() {
            return Err(GenerationError::NoValidWords);
        }

        Ok(GeneratedWords {
            words,
            origin: WordOrigin::Generated,
        })
    }
}

/// Build the instruction sent to the model
pub fn build_prompt(config: &GameConfig) -> String {
    let allowed: String = config.allowed_letters().into_iter().collect();
    format!(
        "Generate a list of {} words that:\n\
         1. Are exactly {} letters long\n\
         2. Only use these letters: {}\n\
         3. Are common, well-known words\n\
         4. Are separated by commas\n\
         Return only the words, no explanations.",
        config.locale.language(),
        config.word_length,
        allowed
    )
}

/// Pull usable words out of a model reply
///
/// Accepts plain text as well as a JSON array or a `{"words": [...]}` object.
/// Tokens are uppercased and kept only if they have the configured length and
/// use allowed letters only.
pub fn extract_words(raw: &str, config: &GameConfig) -> Vec<String> {
    let text = flatten_json(raw).unwrap_or_else(|| raw.to_string());
    let allowed = config.allowed_letters();

    text.split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| token.trim().to_uppercase())
        .filter(|word| has_length(word, config.word_length) && uses_only_letters(word, &allowed))
        .collect()
}

fn flatten_json(raw: &str) -> Option<String> {
    match serde_json::from_str::<Value>(raw.trim()).ok()? {
        Value::Array(items) => Some(join_values(&items)),
        Value::Object(map) => match map.get("words")? {
            Value::Array(items) => Some(join_values(items)),
            other => Some(value_text(other)),
        },
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn join_values(items: &[Value]) -> String {
    items.iter().map(value_text).collect::<Vec<_>>().join(",")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
