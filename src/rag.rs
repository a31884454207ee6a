//! Question-answering pipeline: retrieve → compose prompt → generate.
//!
//! [`RagService`] owns the embedding and chat providers plus the vector
//! store. The store is built once by [`RagService::initialize`]; until then
//! every query fails with [`RagError::NotInitialized`]. After that the store
//! is read-only and shared by all requests.
//!
//! Provider failures are logged here and returned with a short description
//! of the failed step attached. Nothing at this layer retries or returns a
//! partial answer.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::dataset;
use crate::embedding::{self, Embedder};
use crate::error::RagError;
use crate::llm::{self, ChatModel};
use crate::models::{AskResponse, Document, ScoredDocument};
use crate::prompt;
use crate::sources;
use crate::store::VectorStore;

/// Retrieval tuning, decoupled from the full application config.
#[derive(Debug, Clone)]
pub struct RagSettings {
    /// Number of documents retrieved per question.
    pub top_k: usize,
    /// Number of texts per embedding request while indexing.
    pub batch_size: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            batch_size: 64,
        }
    }
}

impl RagSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            batch_size: config.embedding.batch_size,
        }
    }
}

pub struct RagService {
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    settings: RagSettings,
    store: OnceCell<VectorStore>,
    /// Held for the whole check-and-build in `initialize`.
    init_lock: Mutex<()>,
}

impl RagService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
        settings: RagSettings,
    ) -> Self {
        Self {
            embedder,
            chat,
            settings,
            store: OnceCell::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Build both providers from config.
    ///
    /// # Errors
    ///
    /// Fails immediately when a provider's API key is missing, before any
    /// dataset work happens.
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = embedding::create_embedder(&config.embedding)
            .context("Failed to create embedding provider")?;
        let chat =
            llm::create_chat_model(&config.llm).context("Failed to create chat provider")?;
        Ok(Self::new(embedder, chat, RagSettings::from_config(config)))
    }

    pub fn is_initialized(&self) -> bool {
        self.store.initialized()
    }

    /// Number of indexed documents; `0` before initialization.
    pub fn document_count(&self) -> usize {
        self.store.get().map(VectorStore::len).unwrap_or(0)
    }

    /// Embed `documents` and make the service ready to answer.
    ///
    /// Can only succeed once per service. Concurrent callers wait for the
    /// first build and then get [`RagError::AlreadyInitialized`] without
    /// embedding anything.
    pub async fn initialize(&self, documents: Vec<Document>) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return Err(RagError::AlreadyInitialized.into());
        }

        let started = Instant::now();
        let count = documents.len();
        info!(
            documents = count,
            model = self.embedder.model_name(),
            "building vector store"
        );

        let store =
            VectorStore::from_documents(self.embedder.as_ref(), documents, self.settings.batch_size)
                .await
                .map_err(|e| {
                    error!(error = %format!("{:#}", e), "failed to build vector store");
                    e.context("failed to initialize RAG service")
                })?;

        self.store
            .set(store)
            .map_err(|_| RagError::AlreadyInitialized)?;

        info!(
            documents = count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "vector store ready"
        );
        Ok(())
    }

    /// Load the dataset file, build its documents, and [`initialize`](Self::initialize).
    pub async fn initialize_from_dataset(&self, path: &Path, source_label: &str) -> Result<()> {
        let records = dataset::load_records(path)?;
        info!(path = %path.display(), records = records.len(), "loaded dataset");
        let documents = dataset::build_documents(&records, source_label);
        self.initialize(documents).await
    }

    /// Return the `top_k` documents most similar to `question`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredDocument>> {
        let store = self.store.get().ok_or(RagError::NotInitialized)?;

        let query_vec = self.embedder.embed_query(question).await.map_err(|e| {
            error!(error = %format!("{:#}", e), "query embedding failed");
            e.context("failed to retrieve documents")
        })?;

        let hits = store.similarity_search(&query_vec, self.settings.top_k);
        debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score).unwrap_or(0.0),
            "retrieved documents"
        );
        Ok(hits)
    }

    /// Answer `question` from the retrieved context and list its sources.
    ///
    /// Blank questions are rejected; otherwise the question is used as given.
    pub async fn ask_question(&self, question: &str) -> Result<AskResponse> {
        if question.trim().is_empty() {
            return Err(RagError::EmptyQuestion.into());
        }
        if !self.is_initialized() {
            return Err(RagError::NotInitialized.into());
        }

        let started = Instant::now();
        let hits = self.retrieve(question).await?;

        let context = prompt::build_context(&hits);
        let full_prompt = prompt::build_prompt(&context, question);

        let answer = self.chat.complete(&full_prompt).await.map_err(|e| {
            error!(
                error = %format!("{:#}", e),
                model = self.chat.model_name(),
                "answer generation failed"
            );
            e.context("failed to generate answer")
        })?;

        let sources = sources::format_sources(&hits);
        info!(
            retrieved = hits.len(),
            sources = sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answered question"
        );

        Ok(AskResponse { answer, sources })
    }

    /// Run the fixed insights request through [`ask_question`](Self::ask_question).
    pub async fn generate_insights(&self) -> Result<AskResponse> {
        self.ask_question(prompt::INSIGHTS_QUESTION).await
    }
}
