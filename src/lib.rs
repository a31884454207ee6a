//! # UMKM RAG
//!
//! Retrieval-augmented question answering over a static UMKM (micro, small,
//! and medium enterprise) dataset.
//!
//! Every JSON record in the dataset becomes a short text document. On start
//! the documents are embedded and kept in a flat in-memory list. A question
//! is embedded with the same model, the closest documents are found by
//! cosine similarity, and a chat model writes the answer from those
//! documents alone. The answer is returned together with the documents it
//! drew on.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌─────────────┐
//! │ JSON     │──▶│ Documents │──▶│ Embedder │──▶│ VectorStore │
//! │ dataset  │   │ (fields)  │   │          │   │ (in memory) │
//! └──────────┘   └───────────┘   └──────────┘   └──────┬──────┘
//!                                                      │ top-k
//!                      ┌───────────┐   ┌──────────┐    ▼
//!   answer + sources ◀─│ ChatModel │◀──│  Prompt  │◀── context
//!                      └───────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=...
//! umkm-rag documents                       # inspect the built documents
//! umkm-rag ask "UMKM kuliner apa saja yang ada di Malang?"
//! umkm-rag serve                           # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`dataset`] | Dataset loading and record-to-document conversion |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | In-memory vector store |
//! | [`llm`] | Chat-completion providers |
//! | [`prompt`] | Grounded prompt templates |
//! | [`sources`] | Source reference formatting |
//! | [`rag`] | Retrieval + generation pipeline |
//! | [`server`] | HTTP API |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod rag;
pub mod server;
pub mod sources;
pub mod store;
