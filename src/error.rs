//! Typed errors for the states callers need to branch on.
//!
//! Everything else flows through [`anyhow::Error`] with context attached.
//! The HTTP layer downcasts to [`RagError`] to choose a status code.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RagError {
    /// Retrieval or generation was called before the vector store was built.
    #[error("RAG service is not initialized: the vector store has not been built yet")]
    NotInitialized,

    #[error("RAG service is already initialized")]
    AlreadyInitialized,

    #[error("question must not be empty")]
    EmptyQuestion,
}
