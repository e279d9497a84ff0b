//! Generative-text provider abstraction and implementations.
//!
//! Defines the [`TextGenerator`] trait and two implementations:
//! - **[`GeminiGenerator`]**: calls the Gemini `generateContent` REST endpoint
//!   with retry and backoff.
//! - **[`ScriptedGenerator`]**: replays canned responses; used to re-parse a
//!   saved response (`seeker generate --response-file`) and in tests.
//!
//! # Model Selection
//!
//! [`select_model`] applies a fixed policy to the listed models: the first
//! whose name contains the preferred version, else the first containing the
//! family name, else the fallback identifier.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::{credential, SeekerError, Service};

/// A service that turns one prompt into one text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model identifier (e.g. `"models/gemini-2.0-flash"`).
    fn model_name(&self) -> &str;

    /// Send `prompt` and return the completion text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Ensure a model identifier carries the `models/` resource prefix.
pub fn normalize_model_name(name: &str) -> String {
    if name.starts_with("models/") {
        name.to_string()
    } else {
        format!("models/{}", name)
    }
}

/// Pick a model from the listed names.
pub fn select_model(available: &[String], preferred: &str, family: &str, fallback: &str) -> String {
    available
        .iter()
        .find(|name| name.contains(preferred))
        .or_else(|| available.iter().find(|name| name.contains(family)))
        .map(|name| normalize_model_name(name))
        .unwrap_or_else(|| normalize_model_name(fallback))
}

// ============ Gemini ============

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback", default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Text generator backed by the Gemini REST API.
///
/// Requires the environment variable named by `generation.api_key_env`
/// (default `GEMINI_API_KEY`).
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl GeminiGenerator {
    /// Read the credential, list models, and select one.
    ///
    /// A failed model listing is not fatal; the fallback model is used.
    pub async fn connect(config: &GenerationConfig) -> Result<Self> {
        let api_key = credential(Service::Gemini, &config.api_key_env)?;
        Self::connect_with_key(config, api_key).await
    }

    pub async fn connect_with_key(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let model = match list_models(&client, &base_url, &api_key).await {
            Ok(names) => select_model(
                &names,
                &config.preferred_model,
                &config.model_family,
                &config.fallback_model,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "could not list models; using fallback");
                normalize_model_name(&config.fallback_model)
            }
        };
        tracing::info!(model = %model, "selected generation model");

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
            max_retries: config.max_retries,
        })
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, SeekerError> {
        let url = format!("{}/v1beta/{}:generateContent", self.base_url, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SeekerError::transport(Service::Gemini, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SeekerError::Api {
                service: Service::Gemini,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SeekerError::transport(Service::Gemini, e))?;
        completion_text(parsed)
    }
}

async fn list_models(client: &reqwest::Client, base_url: &str, api_key: &str) -> Result<Vec<String>> {
    let response = client
        .get(format!("{}/v1beta/models", base_url))
        .query(&[("key", api_key)])
        .send()
        .await
        .map_err(|e| SeekerError::transport(Service::Gemini, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SeekerError::Api {
            service: Service::Gemini,
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let list: ModelList = response.json().await?;
    Ok(list.models.into_iter().map(|m| m.name).collect())
}

/// Concatenate the text parts of the first candidate.
fn completion_text(response: GenerateResponse) -> Result<String, SeekerError> {
    let text: Option<String> = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        });

    match text {
        Some(t) => Ok(t),
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            Err(SeekerError::Payload {
                service: Service::Gemini,
                detail: format!("empty completion ({})", reason),
            })
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            match self.generate_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(attempt, error = %e, "generation failed; retrying");
                    last_err = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow::anyhow!("Generation failed after retries")))
    }
}

// ============ Scripted ============

/// Replays queued responses in order and records every prompt it receives.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose first call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(message.to_string())])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let next = self
            .responses
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted generator poisoned"))?
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no scripted response left")),
        }
    }
}
