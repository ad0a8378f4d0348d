//! BI-Checking analysis pipeline.
//!
//! Single-pass flow invoked once per request:
//! 1. Extract and normalize the uploaded document's text.
//! 2. Load the labeled reference corpus (memoized on the app state).
//! 3. Scan lexical signals and score similarity against the corpus.
//! 4. Run the decision cascade and compose the rationale.
//!
//! The core (`analyze_text`) is a pure, total function over its inputs so
//! tests can drive it with synthetic text and corpora, no filesystem or
//! HTTP involved.

use crate::corpus::{self, ReferenceExemplar};
use crate::decision::{self, DecisionConfig};
use crate::errors::{AppError, ResultExt};
use crate::extractor::{self, NormalizedText};
use crate::handlers::AppState;
use crate::models::{BiCheckingResult, EligibilityStatus, ManualOverrides};
use crate::signals::SignalExtractor;
use crate::similarity;
use chrono::Utc;
use std::sync::Arc;

/// Complete analysis workflow for an uploaded document.
pub async fn analyze_upload(
    state: &Arc<AppState>,
    bytes: &[u8],
    overrides: &ManualOverrides,
) -> Result<BiCheckingResult, AppError> {
    tracing::info!("Step 1: Extracting document text ({} bytes)", bytes.len());
    let text = extractor::extract_normalized(bytes);
    if text.is_empty() {
        tracing::warn!("No text could be extracted from the uploaded document");
    }

    tracing::info!("Step 2: Loading reference corpus");
    let reference_corpus = corpus::load_reference_corpus(state)
        .await
        .context("Failed to load reference corpus")?;

    tracing::info!(
        "Step 3: Scoring document against {} exemplar",
        reference_corpus.len()
    );
    let config = DecisionConfig::from_config(&state.config);
    let result = analyze_text(&text, overrides, &reference_corpus, &config, bytes.len());

    tracing::info!(
        "✓ Analysis complete: status={}, eligible={}",
        result.status,
        result.is_eligible
    );
    Ok(result)
}

/// Pure analysis core. Total over all inputs, including empty text and an
/// empty corpus.
pub fn analyze_text(
    text: &NormalizedText,
    overrides: &ManualOverrides,
    reference_corpus: &[ReferenceExemplar],
    config: &DecisionConfig,
    file_size: usize,
) -> BiCheckingResult {
    let signals = SignalExtractor::new().extract(text, overrides);
    tracing::debug!(
        "Signals: grade={:?}, score={:?}, dsr={:?}, dti={:?}, severe={}, strong={}, weight={}, positive_ctx={}, aging_total={}",
        signals.kolektibilitas,
        signals.bi_score,
        signals.dsr,
        signals.dti,
        signals.severe_negative,
        signals.strong_positive,
        signals.moderate_weight,
        signals.positive_context_hits,
        signals.aging.total()
    );

    let best = similarity::best_match(&text.lower, reference_corpus, config.similarity_threshold);
    let status = decision::decide(&signals, best.as_ref(), config);
    let analysis =
        decision::compose_rationale(status, &signals, best.as_ref(), text.is_empty(), file_size);

    BiCheckingResult {
        analysis,
        is_eligible: status.is_eligible(),
        status,
        kolektibilitas: signals.kolektibilitas,
        bi_score: signals.bi_score,
        dsr: signals.dsr,
        dti: signals.dti,
        aging_ok: signals.aging.ok,
        aging_1_89: signals.aging.late_1_89,
        aging_90_119: signals.aging.late_90_119,
        aging_120_plus: signals.aging.late_120_plus,
        analyzed_at: Utc::now(),
    }
}

/// Fixed verdict returned when the request carries no document at all.
///
/// Deliberately default-safe: no data means manual verification, not
/// rejection and not an error.
pub fn no_document_verdict() -> BiCheckingResult {
    let analysis = [
        EligibilityStatus::Perhatian.headline(),
        "",
        "Belum ada data BI Checking yang diunggah untuk pemohon ini.",
        "Unggah dokumen BI Checking (iDeb SLIK OJK) agar analisis otomatis dapat dijalankan.",
        "",
        EligibilityStatus::Perhatian.recommendation(),
    ]
    .join("\n");

    BiCheckingResult {
        analysis,
        is_eligible: false,
        status: EligibilityStatus::Perhatian,
        kolektibilitas: None,
        bi_score: None,
        dsr: None,
        dti: None,
        aging_ok: 0,
        aging_1_89: 0,
        aging_90_119: 0,
        aging_120_plus: 0,
        analyzed_at: Utc::now(),
    }
}
