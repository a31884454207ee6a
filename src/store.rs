//! Flat in-memory vector store.
//!
//! Holds `(vector, document)` pairs in insertion order. Search is
//! brute-force cosine similarity over every stored vector, which is exact
//! and fast enough for a dataset of a few thousand records. The store is
//! built once at startup and only read afterwards, so it carries no locks.

use anyhow::{bail, Context, Result};

use crate::embedding::{cosine_similarity, Embedder};
use crate::models::{Document, ScoredDocument};

struct StoredVector {
    vector: Vec<f32>,
    document: Document,
}

#[derive(Default)]
pub struct VectorStore {
    entries: Vec<StoredVector>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed every document's text in batches and store the results in
    /// document order.
    ///
    /// Fails on the first batch error; a partially built store is discarded.
    pub async fn from_documents(
        embedder: &dyn Embedder,
        documents: Vec<Document>,
        batch_size: usize,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let total = documents.len();
        let mut store = Self {
            entries: Vec::with_capacity(total),
        };

        let mut pending = documents.into_iter().peekable();
        let mut done = 0usize;
        while pending.peek().is_some() {
            let batch: Vec<Document> = pending.by_ref().take(batch_size).collect();
            let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();

            let vectors = embedder.embed_texts(&texts).await.with_context(|| {
                format!(
                    "Failed to embed documents {}..{} of {}",
                    done,
                    done + batch.len(),
                    total
                )
            })?;
            if vectors.len() != batch.len() {
                bail!(
                    "Embedder returned {} vectors for a batch of {} documents",
                    vectors.len(),
                    batch.len()
                );
            }

            for (vector, document) in vectors.into_iter().zip(batch) {
                store.add(vector, document);
            }
            done = store.len();
            tracing::debug!(embedded = done, total, "embedded document batch");
        }

        Ok(store)
    }

    pub fn add(&mut self, vector: Vec<f32>, document: Document) {
        self.entries.push(StoredVector { vector, document });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().map(|e| &e.document)
    }

    /// Return the `k` documents most similar to `query_vec`, best first.
    ///
    /// The sort is stable, so equal scores keep insertion order.
    pub fn similarity_search(&self, query_vec: &[f32], k: usize) -> Vec<ScoredDocument> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query_vec, &e.vector)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredDocument {
                score,
                document: self.entries[i].document.clone(),
            })
            .collect()
    }
}
