//! Chat-completion providers.
//!
//! A [`ChatModel`] takes one fully composed prompt and returns the model's
//! text. Providers mirror the embedding side:
//! - **[`OpenAIChat`]** — `POST {url}/chat/completions` (OpenAI or compatible).
//! - **[`GeminiChat`]** — `POST {url}/models/{model}:generateContent`.
//! - **[`OllamaChat`]** — `POST {url}/api/chat` with streaming off.
//!
//! Generation is not retried: a failed call surfaces to the caller
//! immediately with the provider's status and body attached.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::embedding::{http_client, require_api_key};

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1";
const GEMINI_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    /// Send `prompt` as a single user message and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Create the [`ChatModel`] named by `config.provider`.
pub fn create_chat_model(config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIChat::new(config)?)),
        "gemini" => Ok(Arc::new(GeminiChat::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaChat::new(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}

async fn post_json(label: &str, request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request
        .send()
        .await
        .with_context(|| format!("{} request failed", label))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        bail!("{} API error {}: {}", label, status, body_text);
    }

    response
        .json::<Value>()
        .await
        .with_context(|| format!("{} returned a non-JSON body", label))
}

// ============ OpenAI ============

pub struct OpenAIChat {
    model: String,
    url: String,
    api_key: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OpenAIChat {
    /// # Errors
    ///
    /// Returns an error if the API key environment variable is not set.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = require_api_key(config.api_key_var(), "openai")?;
        Ok(Self {
            model: config.model.clone(),
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string()),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/chat/completions", self.url.trim_end_matches('/'));
        let mut body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "stream": false,
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let request = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        let json = post_json("OpenAI", request).await?;
        parse_openai_completion(&json)
    }
}

fn parse_openai_completion(json: &Value) -> Result<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing choices[0].message.content"))
}

// ============ Gemini ============

pub struct GeminiChat {
    model: String,
    url: String,
    api_key: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl GeminiChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = require_api_key(config.api_key_var(), "gemini")?;
        Ok(Self {
            model: config.model.clone(),
            url: config
                .url
                .clone()
                .unwrap_or_else(|| GEMINI_DEFAULT_URL.to_string()),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let model = self.model.trim_start_matches("models/");
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.url.trim_end_matches('/'),
            model
        );

        let mut generation_config = json!({ "temperature": self.temperature });
        if let Some(max_tokens) = self.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        });

        let request = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body);
        let json = post_json("Gemini", request).await?;
        parse_gemini_completion(&json)
    }
}

/// Concatenate every text part of the first candidate.
fn parse_gemini_completion(json: &Value) -> Result<String> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow!("Invalid Gemini response: missing candidates[0].content.parts"))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        bail!("Invalid Gemini response: candidate has no text");
    }
    Ok(text)
}

// ============ Ollama ============

pub struct OllamaChat {
    model: String,
    url: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OllamaChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            model: config.model.clone(),
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OLLAMA_DEFAULT_URL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let mut options = json!({ "temperature": self.temperature });
        if let Some(max_tokens) = self.max_tokens {
            options["num_predict"] = json!(max_tokens);
        }
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
            "options": options,
        });

        let request = self.client.post(&endpoint).json(&body);
        let json = post_json("Ollama", request)
            .await
            .with_context(|| format!("is Ollama running at {}?", self.url))?;

        json["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Invalid Ollama response: missing message.content"))
    }
}
