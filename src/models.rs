use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Domain Types ============

/// Final eligibility verdict of a BI-Checking analysis.
///
/// The decision cascade is total: every analysis resolves to exactly one of
/// these three labels, including documents with no recognizable signals.
/// Wire representation uses the back-office decision tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityStatus {
    /// Applicant may proceed to the next analysis stage.
    #[serde(rename = "LAYAK")]
    Layak,
    /// Application should be rejected or escalated.
    #[serde(rename = "TIDAK_LAYAK")]
    TidakLayak,
    /// Manual verification by an analyst is required.
    #[serde(rename = "PERHATIAN")]
    Perhatian,
}

impl EligibilityStatus {
    /// Wire/decision token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityStatus::Layak => "LAYAK",
            EligibilityStatus::TidakLayak => "TIDAK_LAYAK",
            EligibilityStatus::Perhatian => "PERHATIAN",
        }
    }

    /// Convenience flag: true only for `Layak`.
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityStatus::Layak)
    }

    /// Headline line used at the top of the rationale text.
    pub fn headline(&self) -> &'static str {
        match self {
            EligibilityStatus::Layak => "✅ HASIL ANALISIS BI CHECKING: LAYAK",
            EligibilityStatus::TidakLayak => "❌ HASIL ANALISIS BI CHECKING: TIDAK LAYAK",
            EligibilityStatus::Perhatian => "⚠️ HASIL ANALISIS BI CHECKING: PERHATIAN",
        }
    }

    /// Fixed recommendation sentence keyed by the final label.
    pub fn recommendation(&self) -> &'static str {
        match self {
            EligibilityStatus::Layak => {
                "Rekomendasi: pemohon layak dilanjutkan ke tahap analisis berikutnya."
            }
            EligibilityStatus::TidakLayak => {
                "Rekomendasi: pengajuan sebaiknya ditolak atau diminta klarifikasi tambahan sebelum diproses."
            }
            EligibilityStatus::Perhatian => {
                "Rekomendasi: perlu verifikasi manual oleh analis sebelum keputusan akhir."
            }
        }
    }
}

impl fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manual override fields supplied alongside the uploaded document.
///
/// Override semantics: caller input wins unconditionally over any value
/// extracted from the document text. A field left `None` defers to
/// extraction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ManualOverrides {
    /// Debt-service-ratio override, percent.
    pub dsr: Option<f64>,
    /// Debt-to-income-ratio override, percent.
    pub dti: Option<f64>,
    /// Credit-bureau summary score override (1..=5 in practice).
    pub bi_score: Option<i64>,
}

impl ManualOverrides {
    pub fn is_empty(&self) -> bool {
        self.dsr.is_none() && self.dti.is_none() && self.bi_score.is_none()
    }
}

// ============ API Response ============

/// Structured result of one BI-Checking analysis request.
///
/// Numeric fields are independently optional: `None` means "not found in the
/// document and not overridden by the caller", never zero. Aging counts are
/// plain occurrence counts (zero when the document carried no aging grid).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiCheckingResult {
    /// Multi-line human-readable rationale for the verdict.
    pub analysis: String,
    /// True iff `status` is `LAYAK`.
    #[serde(rename = "isEligible")]
    pub is_eligible: bool,
    /// Final verdict label.
    pub status: EligibilityStatus,
    /// Resolved collectability grade (1..=5), if found.
    pub kolektibilitas: Option<i64>,
    /// Resolved bureau score, if found.
    #[serde(rename = "biScore")]
    pub bi_score: Option<i64>,
    /// Resolved debt-service-ratio percent, if found.
    pub dsr: Option<f64>,
    /// Resolved debt-to-income-ratio percent, if found.
    pub dti: Option<f64>,
    /// Count of on-time ("OK") aging tokens.
    #[serde(rename = "agingOk")]
    pub aging_ok: u32,
    /// Count of 1-89 days past due markers.
    #[serde(rename = "aging1to89")]
    pub aging_1_89: u32,
    /// Count of 90-119 days past due markers.
    #[serde(rename = "aging90to119")]
    pub aging_90_119: u32,
    /// Count of 120+/180+ days past due markers.
    #[serde(rename = "aging120plus")]
    pub aging_120_plus: u32,
    /// Timestamp of the analysis.
    #[serde(rename = "analyzedAt")]
    pub analyzed_at: DateTime<Utc>,
}
