//! Prompt templates for grounded generation.
//!
//! The model is instructed to act as a UMKM assistant and answer only from
//! the retrieved records. Grounding is by instruction only; nothing checks
//! the answer against the context afterwards.

use crate::models::ScoredDocument;

/// Instructional template. `{context}` and `{question}` are substituted verbatim.
pub const ANSWER_TEMPLATE: &str = "\
Anda adalah asisten AI yang membantu pelaku dan pemerhati UMKM (Usaha Mikro, Kecil, dan Menengah) di Indonesia.
Jawablah pertanyaan hanya berdasarkan konteks data UMKM di bawah ini.
Jika informasi yang dibutuhkan tidak ada di dalam konteks, katakan dengan jujur bahwa Anda tidak mengetahuinya dan jangan mengarang jawaban.
Gunakan bahasa yang sama dengan pertanyaan, jelas, dan ringkas.

Konteks:
{context}

Pertanyaan: {question}

Jawaban:";

/// Hard-coded analysis request served by the insights endpoint.
pub const INSIGHTS_QUESTION: &str = "\
Berdasarkan data UMKM yang tersedia, berikan analisis dan insight bisnis yang komprehensif, meliputi:
1. Gambaran umum: jenis usaha dan kategori apa saja yang paling banyak muncul.
2. Sebaran lokasi: kota atau provinsi mana yang memiliki konsentrasi UMKM tertinggi.
3. Produk dan layanan unggulan: produk atau jasa yang menonjol beserta keunikannya.
4. Tren dan pola: kesamaan atau perbedaan menarik antar UMKM dalam data.
5. Peluang dan tantangan: peluang pengembangan serta tantangan yang mungkin dihadapi.
6. Rekomendasi: langkah konkret untuk meningkatkan daya saing UMKM, seperti digitalisasi, pemasaran, dan akses permodalan.
Sajikan jawaban dalam poin-poin yang terstruktur dan sebutkan nama UMKM sebagai contoh bila relevan.";

/// Join retrieved document texts into one context block.
pub fn build_context(documents: &[ScoredDocument]) -> String {
    documents
        .iter()
        .map(|d| d.document.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    // Single pass so a `{question}` inside the dataset text is left alone.
    let mut out = String::with_capacity(ANSWER_TEMPLATE.len() + context.len() + question.len());
    let mut rest = ANSWER_TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{question}") {
            out.push_str(question);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, DocumentMetadata};
    use serde_json::Map;

    fn scored(text: &str) -> ScoredDocument {
        ScoredDocument {
            score: 0.9,
            document: Document {
                text: text.to_string(),
                metadata: DocumentMetadata {
                    source: "UMKM Dataset".to_string(),
                    index: 0,
                    fields: Map::new(),
                },
            },
        }
    }

    #[test]
    fn test_context_joins_with_blank_line() {
        let docs = vec![scored("name: A"), scored("name: B")];
        assert_eq!(build_context(&docs), "name: A\n\nname: B");
    }

    #[test]
    fn test_context_empty() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_prompt_substitutes_both_slots() {
        let prompt = build_prompt("name: Warung Bu Sri", "Apa menu Warung Bu Sri?");
        assert!(prompt.contains("Konteks:\nname: Warung Bu Sri\n"));
        assert!(prompt.contains("Pertanyaan: Apa menu Warung Bu Sri?"));
        assert!(prompt.contains("UMKM"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
        assert!(prompt.ends_with("Jawaban:"));
    }

    #[test]
    fn test_prompt_does_not_expand_placeholders_in_context() {
        let prompt = build_prompt("notes: {question} literally", "Q?");
        assert!(prompt.contains("notes: {question} literally"));
        assert_eq!(prompt.matches("Q?").count(), 1);
    }
}
