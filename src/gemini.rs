//! Gemini implementation of the [`Generator`] trait.
//!
//! Provides:
//! - **[`GeminiGenerator`]** calls the `generateContent` REST endpoint with
//!   retry and backoff, and lists the models available to the key.
//! - **[`DisabledGenerator`]** fails every call; used when
//!   `generator.provider = "disabled"`.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors and timeouts → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! The API key comes from the `api_key` setting, then from the
//! `GEMINI_API_KEY` environment variable. It travels in the
//! `x-goog-api-key` header, never in the URL, so transport errors cannot
//! echo it.

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use solace_core::error::GenerationError;
use solace_core::generator::{transcript_text, Generator};
use solace_core::models::{Role, Turn};
use solace_core::settings::Settings;

use crate::config::GeneratorConfig;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const API_KEY_HEADER: &str = "x-goog-api-key";

const FRIEND_PERSONA: &str = "You are a close friend who genuinely cares and listens without judgment. \
Your goal is to help me open up about my day, my feelings, and what's really on my mind through thoughtful questions.

Guidelines:
- Ask questions that make me think and reflect deeper about my experiences and emotions
- Be warm, understanding, and curious, like a friend who truly wants to know how I'm doing
- When I share something, gently probe: \"What made you feel that way?\" \"How did that sit with you?\" \"What's been on your mind about it?\"
- Keep responses under 50 words, brief but genuine
- Never give advice, therapy, or try to fix things; just listen and ask
- Don't be overly cheerful, dramatic, or use therapy-speak
- If I'm vague, ask for specifics. If I mention something in passing, show interest

At the end of each response, provide exactly 3 natural reply suggestions separated by pipes, starting with a pipe. \
Make them feel like things I might actually say, like: |Yeah, exactly|Not really|Let me think about that|";

const DIARY_INSTRUCTIONS: &str = "Write a personal journal entry from my perspective based on what I talked about. \
This should read like a page from my diary. Write as if I'm reflecting on my day, my thoughts, and my feelings.

Important:
- Write in first person as ME, not about a conversation
- Do NOT mention \"the AI\", \"the conversation\", \"talking with\", or \"chatting\"
- Focus on the actual events, thoughts, and emotions I described
- Write naturally, like I'm processing my day in my diary
- Include specific details I mentioned (people, situations, feelings)
- Weave in the emotional tone naturally; don't state \"my mood was X\"
- Keep it under 300 words
- Use natural, personal language (contractions, incomplete thoughts, honest reflection)";

/// A model that supports `generateContent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Model id without the `models/` prefix.
    pub name: String,
    pub display_name: String,
}

pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    max_retries: u32,
    settings: Settings,
}

impl GeminiGenerator {
    pub fn new(config: &GeneratorConfig, settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            settings,
        })
    }

    fn api_key(&self) -> Result<String, GenerationError> {
        let from_settings = self
            .settings
            .api_key()
            .map_err(|e| GenerationError::new(e.to_string()))?;
        from_settings
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
            .ok_or_else(|| GenerationError::new("API Key missing"))
    }

    /// Models usable for chat, sorted by name.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        let key = self.api_key()?;
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &key)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::new(format!("Failed to read Gemini response: {}", e)))?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let parsed: ModelList = serde_json::from_str(&body)
            .map_err(|e| GenerationError::new(format!("Failed to parse model list: {}", e)))?;
        Ok(generative_models(parsed))
    }

    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> Result<String, GenerationError> {
        let key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, delay_secs = delay.as_secs(), "retrying Gemini request");
                tokio::time::sleep(delay).await;
            }

            let sent = self
                .client
                .post(&url)
                .header(API_KEY_HEADER, &key)
                .json(request)
                .send()
                .await;
            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    let err = request_failed(e);
                    warn!(attempt, error = %err.message, "Gemini request failed");
                    last_err = Some(err);
                    continue;
                }
            };

            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.is_success() {
                return extract_text(&body);
            }

            let err = error_from_body(status, &body);
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(attempt, %status, "Gemini returned a retryable error");
                last_err = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(last_err.unwrap_or_else(|| GenerationError::new("Gemini request failed after retries")))
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate_reply(
        &self,
        model: &str,
        prompt: &str,
        history: &[Turn],
    ) -> Result<String, GenerationError> {
        self.generate(model, &reply_request(prompt, history)).await
    }

    async fn generate_summary(
        &self,
        history: &[Turn],
        mood: Option<&str>,
        model: &str,
    ) -> Result<String, GenerationError> {
        self.generate(model, &summary_request(history, mood)).await
    }
}

fn request_failed(e: reqwest::Error) -> GenerationError {
    GenerationError::new(format!("Gemini API request failed: {}", e.without_url()))
}

/// Fails every request.
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    async fn generate_reply(
        &self,
        _model: &str,
        _prompt: &str,
        _history: &[Turn],
    ) -> Result<String, GenerationError> {
        Err(GenerationError::new("Generator is disabled"))
    }

    async fn generate_summary(
        &self,
        _history: &[Turn],
        _mood: Option<&str>,
        _model: &str,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::new("Generator is disabled"))
    }
}

/// Create the configured [`Generator`].
///
/// | Config Value | Generator |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledGenerator`] |
/// | `"gemini"` | [`GeminiGenerator`] |
pub fn create_generator(config: &GeneratorConfig, settings: Settings) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        "gemini" => Ok(Arc::new(GeminiGenerator::new(config, settings)?)),
        other => bail!("Unknown generator provider: {}", other),
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

impl Content {
    fn text(role: Option<&'static str>, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

fn api_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Ai => "model",
    }
}

fn reply_request(prompt: &str, history: &[Turn]) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|t| Content::text(Some(api_role(t.role)), t.text.clone()))
        .collect();

    let already_sent = history
        .last()
        .map(|t| t.role == Role::User && t.text == prompt)
        .unwrap_or(false);
    if !already_sent {
        contents.push(Content::text(Some("user"), prompt));
    }

    GenerateContentRequest {
        contents,
        system_instruction: Some(Content::text(None, FRIEND_PERSONA)),
    }
}

fn summary_prompt(history: &[Turn], mood: Option<&str>) -> String {
    format!(
        "{}\n\nMy emotional state: {}\n\nWhat I talked about:\n{}\n\nJournal entry:",
        DIARY_INSTRUCTIONS,
        mood.filter(|m| !m.trim().is_empty()).unwrap_or("not specified"),
        transcript_text(history)
    )
}

fn summary_request(history: &[Turn], mood: Option<&str>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(Some("user"), summary_prompt(history, mood))],
        system_instruction: None,
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::new(format!("Failed to parse Gemini response: {}", e)))?;

    if let Some(message) = parsed.error.and_then(|e| e.message) {
        return Err(GenerationError::new(message));
    }

    parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| GenerationError::new("Gemini API returned no text in the response"))
}

fn error_from_body(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|w| w.error.message)
        .unwrap_or_else(|| format!("Gemini API error {}", status));
    GenerationError::new(message)
}

fn generative_models(list: ModelList) -> Vec<ModelInfo> {
    let mut models: Vec<ModelInfo> = list
        .models
        .into_iter()
        .filter(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
        })
        .map(|m| {
            let name = m
                .name
                .strip_prefix("models/")
                .unwrap_or(&m.name)
                .to_string();
            ModelInfo {
                display_name: m.display_name.unwrap_or_else(|| name.clone()),
                name,
            }
        })
        .collect();
    models.sort_by(|a, b| a.name.cmp(&b.name));
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_request_maps_roles_and_skips_duplicate_prompt() {
        let history = vec![Turn::ai("How was your day?"), Turn::user("Long")];
        let json = serde_json::to_value(reply_request("Long", &history)).unwrap();

        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[1]["role"], "user");
        assert_eq!(contents[1]["parts"][0]["text"], "Long");
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("separated by pipes"));
    }

    #[test]
    fn test_reply_request_appends_prompt_when_missing() {
        let history = vec![Turn::ai("Hi")];
        let json = serde_json::to_value(reply_request("Hello", &history)).unwrap();
        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1]["parts"][0]["text"], "Hello");
    }

    #[test]
    fn test_summary_prompt_includes_mood_and_transcript() {
        let history = vec![Turn::ai("How was your day?"), Turn::user("Tiring")];
        let prompt = summary_prompt(&history, Some("sad"));
        assert!(prompt.contains("My emotional state: sad"));
        assert!(prompt.contains("What I talked about:\nSolace: How was your day?\nMe: Tiring"));
        assert!(prompt.ends_with("Journal entry:"));

        let prompt = summary_prompt(&history, None);
        assert!(prompt.contains("My emotional state: not specified"));
    }

    #[test]
    fn test_extract_text_and_errors() {
        let ok = r#"{"candidates":[{"content":{"parts":[{"text":"Hey|A|B|C"}]}}]}"#;
        assert_eq!(extract_text(ok).unwrap(), "Hey|A|B|C");

        let err = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        assert_eq!(extract_text(err).unwrap_err().message, "API key not valid");
        assert_eq!(
            error_from_body(StatusCode::BAD_REQUEST, err).message,
            "API key not valid"
        );
        assert_eq!(
            error_from_body(StatusCode::BAD_GATEWAY, "<html>").message,
            "Gemini API error 502 Bad Gateway"
        );
        assert!(extract_text(r#"{"candidates":[]}"#).is_err());
    }

    #[test]
    fn test_model_list_filters_generate_content() {
        let list: ModelList = serde_json::from_str(
            r#"{"models":[
                {"name":"models/gemini-flash-latest","displayName":"Gemini Flash","supportedGenerationMethods":["generateContent","countTokens"]},
                {"name":"models/embedding-001","supportedGenerationMethods":["embedContent"]},
                {"name":"models/aqa"}
            ]}"#,
        )
        .unwrap();
        let models = generative_models(list);
        assert_eq!(
            models,
            vec![ModelInfo {
                name: "gemini-flash-latest".into(),
                display_name: "Gemini Flash".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        let store = Arc::new(solace_core::store::memory::MemorySettings::new());
        let settings = Settings::new(store);
        settings.set("api_key", "SECRETKEY123").unwrap();
        let config = GeneratorConfig {
            base_url: "http://127.0.0.1:9".into(),
            max_retries: 0,
            ..GeneratorConfig::default()
        };
        let generator = GeminiGenerator::new(&config, settings).unwrap();

        let err = generator
            .generate_reply("m", "Hello", &[Turn::user("Hello")])
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Gemini API request failed"));
        assert!(!err.message.contains("SECRETKEY123"));

        let err = generator.list_models().await.unwrap_err();
        assert!(!err.message.contains("SECRETKEY123"));
    }

    #[tokio::test]
    async fn test_disabled_generator_fails() {
        let err = DisabledGenerator
            .generate_summary(&[], None, "m")
            .await
            .unwrap_err();
        assert_eq!(err.message, "Generator is disabled");
    }
}
