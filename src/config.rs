use serde::Deserialize;
use std::path::PathBuf;

/// Default cosine-similarity acceptance threshold for the reference-document
/// classifier. Below this the classifier abstains.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.08;

/// Default minimum number of aging-grid tokens before the aging override is
/// trusted. Smaller samples leave the rule-based verdict untouched.
pub const DEFAULT_AGING_MIN_SAMPLES: u32 = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Directory holding the labeled reference exemplar documents.
    pub reference_dir: PathBuf,
    /// Similarity-classifier acceptance threshold (tunable, default 0.08).
    pub similarity_threshold: f64,
    /// Minimum aging-token sample before the aging override applies (default 6).
    pub aging_min_samples: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            reference_dir: std::env::var("BI_REFERENCE_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("referensi")),
            similarity_threshold: std::env::var("BI_SIMILARITY_THRESHOLD")
                .unwrap_or_else(|_| DEFAULT_SIMILARITY_THRESHOLD.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("BI_SIMILARITY_THRESHOLD must be a number"))
                .and_then(|t: f64| {
                    if !(0.0..=1.0).contains(&t) {
                        anyhow::bail!("BI_SIMILARITY_THRESHOLD must be between 0.0 and 1.0");
                    }
                    Ok(t)
                })?,
            aging_min_samples: std::env::var("BI_AGING_MIN_SAMPLES")
                .unwrap_or_else(|_| DEFAULT_AGING_MIN_SAMPLES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("BI_AGING_MIN_SAMPLES must be a whole number"))?,
        };

        // Log successful configuration load
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Reference directory: {}", config.reference_dir.display());
        tracing::debug!("Similarity threshold: {}", config.similarity_threshold);
        tracing::debug!("Aging minimum samples: {}", config.aging_min_samples);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Configuration with defaults and an explicit reference directory.
    /// Used by tests and embedders that bypass the environment.
    pub fn with_reference_dir(reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 3000,
            reference_dir: reference_dir.into(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            aging_min_samples: DEFAULT_AGING_MIN_SAMPLES,
        }
    }
}
