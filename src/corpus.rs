use crate::cache_validator::ValidatedCacheEntry;
use crate::errors::AppError;
use crate::extractor;
use crate::handlers::AppState;
use crate::models::EligibilityStatus;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;

/// Well-known exemplar file names, one per verdict category.
///
/// These are static deployment artifacts under `Config.reference_dir`. Any
/// subset may be absent; a missing category simply shrinks the comparison
/// corpus.
pub const REFERENCE_FILES: [(EligibilityStatus, &str); 3] = [
    (EligibilityStatus::Layak, "layak.pdf"),
    (EligibilityStatus::TidakLayak, "tidak_layak.pdf"),
    (EligibilityStatus::Perhatian, "perhatian.pdf"),
];

/// A labeled reference document used by the similarity classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceExemplar {
    /// Pre-classified verdict of this exemplar.
    pub status: EligibilityStatus,
    /// File name the exemplar was loaded from.
    pub source: String,
    /// Normalized, lower-cased document text.
    pub text: String,
}

/// Loads the reference corpus, memoized through the application cache.
///
/// Returns only the categories whose file exists and whose extraction yields
/// non-empty text; callers must handle zero to three exemplars. A missing
/// file is expected (debug log, skip); any other I/O failure is an
/// unexpected fault and surfaces as an internal error.
pub async fn load_reference_corpus(state: &AppState) -> Result<Vec<ReferenceExemplar>, AppError> {
    let cache_key = format!("corpus:{}", state.config.reference_dir.display());

    // Check cache first with integrity validation
    if let Some(cached) = state.corpus_cache.get(&cache_key).await {
        if let Some(valid_data) = ValidatedCacheEntry::from_cache_value(&cached) {
            if let Ok(corpus) = serde_json::from_str::<Vec<ReferenceExemplar>>(&valid_data) {
                tracing::debug!(
                    "Reference corpus cache HIT (validated, {} exemplar)",
                    corpus.len()
                );
                return Ok(corpus);
            }
        } else {
            tracing::warn!("Reference corpus cache entry failed validation, re-reading from disk");
        }
    }

    tracing::info!(
        "Reference corpus cache MISS - loading from {}",
        state.config.reference_dir.display()
    );
    let corpus = read_corpus_from_disk(state).await?;

    // Cache the loaded corpus with checksum validation
    if let Ok(json) = serde_json::to_string(&corpus) {
        state
            .corpus_cache
            .insert(cache_key, ValidatedCacheEntry::new(json).into_cache_value())
            .await;
    }

    Ok(corpus)
}

async fn read_corpus_from_disk(state: &AppState) -> Result<Vec<ReferenceExemplar>, AppError> {
    let mut corpus = Vec::new();

    for (status, file_name) in REFERENCE_FILES {
        let path = state.config.reference_dir.join(file_name);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Reference exemplar {} not present, skipping", path.display());
                continue;
            }
            Err(e) => {
                return Err(AppError::InternalError(format!(
                    "Failed to read reference exemplar {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let text = extractor::extract_normalized(&bytes);
        if text.is_empty() {
            tracing::warn!(
                "Reference exemplar {} yielded no text, excluding from corpus",
                path.display()
            );
            continue;
        }

        tracing::debug!(
            "Loaded reference exemplar {} ({} chars, {})",
            file_name,
            text.lower.len(),
            status
        );
        corpus.push(ReferenceExemplar {
            status,
            source: file_name.to_string(),
            text: text.lower,
        });
    }

    tracing::info!("Reference corpus loaded: {} of 3 exemplar present", corpus.len());
    Ok(corpus)
}
