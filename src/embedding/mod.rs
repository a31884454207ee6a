//! Embedding provider abstraction and implementations.
//!
//! Defines the [`Embedder`] trait and concrete implementations:
//! - **[`OpenAIEmbedder`]** — OpenAI (or any OpenAI-compatible gateway) `/embeddings`.
//! - **[`GeminiEmbedder`]** — Google Generative Language `batchEmbedContents`.
//! - **[`OllamaEmbedder`]** — a local Ollama instance's `/api/embed` endpoint.
//! - **`LocalEmbedder`** — fastembed, offline after the first model download
//!   (feature `local-embeddings-fastembed`).
//!
//! Also provides [`cosine_similarity`], the scoring function used by the
//! in-memory vector store.
//!
//! # Provider Selection
//!
//! Use [`create_embedder`] to instantiate the provider named in
//! `[embedding].provider`. Construction fails immediately when the provider
//! needs an API key and the environment does not have one.
//!
//! # Retry Strategy
//!
//! [`Embedder::embed_texts`] is the index-build path. The HTTP providers
//! retry it with exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! [`Embedder::embed_query`] runs while a caller waits for an answer and
//! makes exactly one attempt.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::EmbeddingConfig;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1";
const GEMINI_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Turns text into vectors.
///
/// Implementations must return exactly one vector per input text, in input
/// order, all produced by the same model so they are comparable.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Expected vector dimensionality, when known up front.
    fn dims(&self) -> Option<usize>;

    /// Embed a batch of texts while building the index. May retry.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    ///
    /// Must not retry. The default forwards to [`embed_texts`](Self::embed_texts),
    /// so implementations that retry there override this.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_texts(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty embedding response"))
    }
}

/// Create the [`Embedder`] named by `config.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"openai"` | [`OpenAIEmbedder`] |
/// | `"gemini"` | [`GeminiEmbedder`] |
/// | `"ollama"` | [`OllamaEmbedder`] |
/// | `"local"` | `LocalEmbedder` (feature `local-embeddings-fastembed`) |
///
/// # Errors
///
/// Unknown provider names, a missing API key, or a `local` provider in a
/// build without the fastembed feature.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIEmbedder::new(config)?)),
        "gemini" => Ok(Arc::new(GeminiEmbedder::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => Ok(Arc::new(LocalEmbedder::new(config)?)),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => bail!(
            "Local embedding provider requires building with --features local-embeddings-fastembed"
        ),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

/// Read the API key from the environment variable named in config.
pub(crate) fn require_api_key(var: Option<String>, provider: &str) -> Result<String> {
    let var = var.ok_or_else(|| anyhow!("no API key variable configured for {}", provider))?;
    match std::env::var(&var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => bail!("{} environment variable not set (required by the {} provider)", var, provider),
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Delay before retry number `attempt` (1-based): 1s doubling up to 32s.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(5))
}

/// Send a request, retrying rate limits, server errors, and network errors.
///
/// `build` is called once per attempt since a `RequestBuilder` is consumed by `send`.
async fn send_with_retry<F>(label: &str, max_retries: u32, build: F) -> Result<Value>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            tracing::warn!(
                provider = label,
                attempt,
                delay_secs = delay.as_secs(),
                "retrying embedding request"
            );
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response
                        .json::<Value>()
                        .await
                        .with_context(|| format!("{} returned a non-JSON body", label));
                }

                // Rate limited or server error, retry
                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow!("{} API error {}: {}", label, status, body_text));
                    continue;
                }

                // Client error (not 429), fail now
                let body_text = response.text().await.unwrap_or_default();
                bail!("{} API error {}: {}", label, status, body_text);
            }
            Err(e) => {
                last_err = Some(anyhow!("{} connection error: {}", label, e));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{} embedding failed after retries", label)))
}

/// Check the provider returned one vector per input with the configured width.
fn check_shape(vectors: &[Vec<f32>], expected_len: usize, dims: Option<usize>) -> Result<()> {
    if vectors.len() != expected_len {
        bail!(
            "Embedding response has {} vectors for {} inputs",
            vectors.len(),
            expected_len
        );
    }
    if let Some(dims) = dims {
        if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
            bail!(
                "Embedding dimension mismatch: expected {}, got {}",
                dims,
                bad.len()
            );
        }
    }
    Ok(())
}

/// First vector of a single-text response.
fn single(vectors: Vec<Vec<f32>>) -> Result<Vec<f32>> {
    vectors
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Empty embedding response"))
}

fn floats(values: &[Value]) -> Vec<f32> {
    values
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect()
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API or a compatible gateway.
///
/// Calls `POST {url}/embeddings` with bearer authentication.
pub struct OpenAIEmbedder {
    model: String,
    dims: Option<usize>,
    url: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIEmbedder {
    /// # Errors
    ///
    /// Returns an error if the API key environment variable is not set.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = require_api_key(config.api_key_var(), "openai")?;
        Ok(Self {
            model: config.model.clone(),
            dims: config.dims,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string()),
            api_key,
            max_retries: config.max_retries,
            client: http_client(config.timeout_secs)?,
        })
    }

    async fn embed(&self, texts: &[String], max_retries: u32) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = format!("{}/embeddings", self.url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let json = send_with_retry("OpenAI", max_retries, || {
            self.client
                .post(&endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let vectors = parse_openai_response(&json)?;
        check_shape(&vectors, texts.len(), self.dims)?;
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        self.dims
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed(texts, self.max_retries).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        single(self.embed(&[text.to_string()], 0).await?)
    }
}

/// Parse the OpenAI embeddings response, ordering by each item's `index`.
fn parse_openai_response(json: &Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing data array"))?;

    let mut indexed = Vec::with_capacity(data.len());

    for (position, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow!("Invalid OpenAI response: missing embedding"))?;
        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(position);
        indexed.push((index, floats(embedding)));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

// ============ Gemini Provider ============

/// Embedding provider using the Google Generative Language API.
///
/// Calls `POST {url}/models/{model}:batchEmbedContents` with the key in the
/// `x-goog-api-key` header.
pub struct GeminiEmbedder {
    model: String,
    dims: Option<usize>,
    url: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl GeminiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = require_api_key(config.api_key_var(), "gemini")?;
        Ok(Self {
            model: config.model.clone(),
            dims: config.dims,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| GEMINI_DEFAULT_URL.to_string()),
            api_key,
            max_retries: config.max_retries,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    async fn embed(&self, texts: &[String], max_retries: u32) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model_path = self.model_path();
        let endpoint = format!(
            "{}/{}:batchEmbedContents",
            self.url.trim_end_matches('/'),
            model_path
        );
        let requests: Vec<Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": model_path,
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();
        let body = json!({ "requests": requests });

        let json = send_with_retry("Gemini", max_retries, || {
            self.client
                .post(&endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
        })
        .await?;

        let vectors = parse_gemini_response(&json)?;
        check_shape(&vectors, texts.len(), self.dims)?;
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        self.dims
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed(texts, self.max_retries).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        single(self.embed(&[text.to_string()], 0).await?)
    }
}

fn parse_gemini_response(json: &Value) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow!("Invalid Gemini response: missing embeddings array"))?;

    embeddings
        .iter()
        .map(|item| {
            item.get("values")
                .and_then(|v| v.as_array())
                .map(|values| floats(values))
                .ok_or_else(|| anyhow!("Invalid Gemini response: missing values"))
        })
        .collect()
}

// ============ Ollama Provider ============

/// Embedding provider using a local Ollama instance.
///
/// Calls `POST /api/embed` on the configured URL (default: `http://localhost:11434`).
/// Requires Ollama to be running with an embedding model pulled
/// (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaEmbedder {
    model: String,
    dims: Option<usize>,
    url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            model: config.model.clone(),
            dims: config.dims,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OLLAMA_DEFAULT_URL.to_string()),
            max_retries: config.max_retries,
            client: http_client(config.timeout_secs)?,
        })
    }

    async fn embed(&self, texts: &[String], max_retries: u32) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = format!("{}/api/embed", self.url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let json = send_with_retry("Ollama", max_retries, || {
            self.client.post(&endpoint).json(&body)
        })
        .await
        .with_context(|| format!("is Ollama running at {}?", self.url))?;

        let vectors = parse_ollama_response(&json)?;
        check_shape(&vectors, texts.len(), self.dims)?;
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        self.dims
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed(texts, self.max_retries).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        single(self.embed(&[text.to_string()], 0).await?)
    }
}

fn parse_ollama_response(json: &Value) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing embeddings array"))?;

    let mut result = Vec::with_capacity(embeddings.len());

    for embedding in embeddings {
        let values = embedding
            .as_array()
            .ok_or_else(|| anyhow!("Invalid Ollama response: embedding is not an array"))?;
        result.push(floats(values));
    }

    Ok(result)
}

// ============ Local Provider (fastembed) ============

/// Embedding provider for local inference via fastembed.
///
/// Models are downloaded on first use from Hugging Face and cached.
/// The model is loaded once and shared behind a mutex since inference
/// needs `&mut`.
#[cfg(feature = "local-embeddings-fastembed")]
pub struct LocalEmbedder {
    model_name: String,
    dims: Option<usize>,
    batch_size: usize,
    model: Arc<std::sync::Mutex<fastembed::TextEmbedding>>,
}

#[cfg(feature = "local-embeddings-fastembed")]
impl LocalEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let fastembed_model = config_to_fastembed_model(&config.model)?;
        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed_model).with_show_download_progress(true),
        )
        .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))?;

        Ok(Self {
            model_name: config.model.clone(),
            dims: config.dims,
            batch_size: config.batch_size,
            model: Arc::new(std::sync::Mutex::new(model)),
        })
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "multilingual-e5-small" => Ok(fastembed::EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-base" => Ok(fastembed::EmbeddingModel::MultilingualE5Base),
        "multilingual-e5-large" => Ok(fastembed::EmbeddingModel::MultilingualE5Large),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, \
             multilingual-e5-small, multilingual-e5-base, multilingual-e5-large",
            other
        ),
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> Option<usize> {
        self.dims
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.model.clone();
        let batch_size = self.batch_size;
        let texts = texts.to_vec();
        let expected = texts.len();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| anyhow!("local embedding model lock poisoned"))?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| anyhow!("Local embedding failed: {}", e))
        })
        .await??;

        check_shape(&vectors, expected, self.dims)?;
        Ok(vectors)
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or a
/// zero-norm vector.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
