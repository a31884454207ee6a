//! Core data models used throughout the service.
//!
//! These types represent the documents, retrieval hits, and answers that
//! flow through the indexing and question-answering pipeline.

use serde::Serialize;
use serde_json::{Map, Value};

/// A searchable text unit built from one dataset record.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Text that gets embedded and shown to the model as context.
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Provenance attached to every [`Document`].
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    /// Constant dataset label (e.g. `"UMKM Dataset"`).
    pub source: String,
    /// Position of the record in the dataset file.
    pub index: usize,
    /// Copies of the record's identifying fields (`id`, `category`, `city`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A document returned from similarity search, with its cosine score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub score: f32,
    #[serde(flatten)]
    pub document: Document,
}

/// Answer to a question plus the formatted source references it was grounded on.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<String>,
}
