use crate::corpus::ReferenceExemplar;
use crate::models::EligibilityStatus;
use std::collections::HashMap;

/// Tokens shorter than this are noise (particles, page numbers).
const MIN_TOKEN_LEN: usize = 3;
/// Tokens longer than this are extraction artifacts (run-together words).
const MAX_TOKEN_LEN: usize = 30;

/// Accepted nearest-neighbor proposal, kept for the rationale text.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    /// Label of the winning exemplar.
    pub status: EligibilityStatus,
    /// Cosine score of the winning exemplar.
    pub score: f64,
    /// File the exemplar was loaded from.
    pub source: String,
}

/// Builds a raw term-frequency vector. No IDF weighting, no stemming:
/// exemplars and uploads are short and domain-homogeneous enough that plain
/// counts separate the categories.
pub fn term_vector(text: &str) -> HashMap<String, f64> {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_alphabetic() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut counts = HashMap::new();
    for token in cleaned.split_whitespace() {
        let len = token.chars().count();
        if (MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&len) {
            *counts.entry(token.to_string()).or_insert(0.0) += 1.0;
        }
    }
    counts
}

/// Cosine similarity between two term vectors. Defined as 0 when either
/// vector has zero norm.
pub fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .filter_map(|(token, av)| b.get(token).map(|bv| av * bv))
        .sum();
    let norm_a = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = b.values().map(|v| v * v).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Nearest-neighbor proposal against the reference corpus.
///
/// The strictly highest cosine score wins (ties keep the first-seen
/// maximum). Below `threshold` the classifier abstains, a valid
/// "insufficient evidence" outcome rather than an error. An empty corpus
/// trivially abstains.
pub fn best_match(
    text: &str,
    corpus: &[ReferenceExemplar],
    threshold: f64,
) -> Option<SimilarityMatch> {
    if corpus.is_empty() {
        return None;
    }

    let document = term_vector(text);
    let mut best: Option<SimilarityMatch> = None;

    for exemplar in corpus {
        let score = cosine_similarity(&document, &term_vector(&exemplar.text));
        tracing::debug!(
            "Similarity vs {} ({}): {:.4}",
            exemplar.source,
            exemplar.status,
            score
        );
        if best.as_ref().map_or(true, |current| score > current.score) {
            best = Some(SimilarityMatch {
                status: exemplar.status,
                score,
                source: exemplar.source.clone(),
            });
        }
    }

    best.filter(|matched| matched.score >= threshold)
}
