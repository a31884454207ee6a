use std::collections::HashSet;

use crate::models::{Document, ScoredDocument};

/// `"<source-label> (Document <index>)"`.
pub fn format_source(document: &Document) -> String {
    format!(
        "{} (Document {})",
        document.metadata.source, document.metadata.index
    )
}

/// Format and de-duplicate source references, keeping first-seen order.
pub fn format_sources(documents: &[ScoredDocument]) -> Vec<String> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .map(|d| format_source(&d.document))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
