use crate::analyzer;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{BiCheckingResult, ManualOverrides};
use crate::signals::parse_flexible_number;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Reference corpus cache (1 hour TTL). The exemplar files are static
    /// deployment artifacts, so the TTL only bounds how long a redeployed
    /// exemplar set takes to be picked up. Values are checksum-validated
    /// `ValidatedCacheEntry` payloads.
    pub corpus_cache: Cache<String, String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let corpus_cache = Cache::builder()
            .time_to_live(Duration::from_secs(3600))
            .max_capacity(8)
            .build();
        Self {
            config,
            corpus_cache,
        }
    }
}

/// API routes. The binary wraps this router with its middleware stack;
/// tests drive it directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/bi-checking/analyze", post(analyze_bi_checking))
        .with_state(state)
}

/// Health check endpoint.
///
/// Returns the service status and version information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "bi-checking-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/bi-checking/analyze
///
/// Multipart payload: an optional `file` part (the BI-Checking document) and
/// optional `dsr` / `dti` / `bi_score` string parts that override any value
/// extracted from the document text.
///
/// Input contract:
/// - no `file` part at all → HTTP 200 with the fixed PERHATIAN verdict;
/// - `file` present but zero bytes → HTTP 400 (the caller asked for analysis
///   of nothing);
/// - otherwise → HTTP 200 with the full analysis result.
pub async fn analyze_bi_checking(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BiCheckingResult>, AppError> {
    tracing::info!("POST /api/v1/bi-checking/analyze");

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name = String::from("dokumen");
    let mut overrides = ManualOverrides::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Form multipart tidak valid: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if let Some(original) = field.file_name() {
                    file_name = original.to_string();
                }
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Gagal membaca berkas unggahan: {}", e))
                })?;
                file_bytes = Some(bytes.to_vec());
            }
            "dsr" => {
                overrides.dsr = field.text().await.ok().as_deref().and_then(parse_flexible_number);
            }
            "dti" => {
                overrides.dti = field.text().await.ok().as_deref().and_then(parse_flexible_number);
            }
            "bi_score" | "biScore" => {
                overrides.bi_score = field
                    .text()
                    .await
                    .ok()
                    .as_deref()
                    .and_then(parse_flexible_number)
                    .map(|v| v.round() as i64);
            }
            other => {
                tracing::debug!("Ignoring unexpected form field '{}'", other);
            }
        }
    }

    let Some(bytes) = file_bytes else {
        tracing::info!("No document attached, returning default PERHATIAN verdict");
        return Ok(Json(analyzer::no_document_verdict()));
    };

    if bytes.is_empty() {
        return Err(AppError::BadRequest(
            "File BI Checking kosong atau tidak terbaca.".to_string(),
        ));
    }

    tracing::info!(
        "Analyzing document '{}' ({} bytes, manual overrides: {})",
        file_name,
        bytes.len(),
        !overrides.is_empty()
    );
    let result = analyzer::analyze_upload(&state, &bytes, &overrides).await?;

    Ok(Json(result))
}
