use crate::config::{Config, DEFAULT_AGING_MIN_SAMPLES, DEFAULT_SIMILARITY_THRESHOLD};
use crate::models::EligibilityStatus;
use crate::signals::{AgingBuckets, ExtractedSignals};
use crate::similarity::SimilarityMatch;

/// Tunable decision thresholds.
///
/// The defaults mirror the values the rules were calibrated with; deployments
/// override them through `Config`, never through this module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionConfig {
    /// Cosine score at or above which the similarity classifier's proposal
    /// is accepted.
    pub similarity_threshold: f64,
    /// Minimum aging-token sample before the aging override is trusted.
    pub aging_min_samples: u32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            aging_min_samples: DEFAULT_AGING_MIN_SAMPLES,
        }
    }
}

impl DecisionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            aging_min_samples: config.aging_min_samples,
        }
    }
}

/// Single-pass prioritized rule cascade. Total over all inputs: a document
/// with no recognizable signals still resolves to a verdict.
///
/// Order matters and later stages may override earlier ones:
/// 1. base rule verdict (always computed),
/// 2. similarity-classifier proposal (a confident nearest-neighbor match to
///    a real labeled exemplar outranks synthetic rule matching),
/// 3. aging-bucket override (applied last, only on a large enough sample).
pub fn decide(
    signals: &ExtractedSignals,
    similarity: Option<&SimilarityMatch>,
    config: &DecisionConfig,
) -> EligibilityStatus {
    let mut verdict = base_verdict(signals);

    if let Some(matched) = similarity {
        tracing::debug!(
            "Similarity override: {} (score {:.3}) replaces base verdict {}",
            matched.status,
            matched.score,
            verdict
        );
        verdict = matched.status;
    }

    apply_aging_override(verdict, &signals.aging, config.aging_min_samples)
}

/// Base rule-based verdict. Branches are evaluated in order; the first match
/// wins and the final branch guarantees totality.
pub fn base_verdict(signals: &ExtractedSignals) -> EligibilityStatus {
    let grade = signals.kolektibilitas;
    let score = signals.bi_score;

    if signals.severe_negative
        || signals.hard_negative_context
        || grade.map_or(false, |g| g >= 3)
        || score.map_or(false, |s| s >= 4)
        || signals.dsr.map_or(false, |v| v > 40.0)
        || signals.dti.map_or(false, |v| v > 45.0)
    {
        return EligibilityStatus::TidakLayak;
    }

    if grade == Some(1)
        && score.map_or(true, |s| (1..=2).contains(&s))
        && signals.dsr.map_or(true, |v| v <= 30.0)
        && signals.dti.map_or(true, |v| v <= 35.0)
        && signals.positive_context_hits >= 3
    {
        return EligibilityStatus::Layak;
    }

    if grade.map_or(false, |g| g == 1 || g == 2)
        && score.map_or(true, |s| (2..=3).contains(&s))
        && signals.dsr.map_or(true, |v| v <= 40.0)
        && signals.dti.map_or(true, |v| v <= 45.0)
    {
        return EligibilityStatus::Perhatian;
    }

    if signals.strong_positive || grade == Some(1) {
        return EligibilityStatus::Layak;
    }

    EligibilityStatus::TidakLayak
}

/// Aging-bucket override. Below `min_samples` total tokens the sample is too
/// small to trust and the prior verdict stands.
fn apply_aging_override(
    current: EligibilityStatus,
    aging: &AgingBuckets,
    min_samples: u32,
) -> EligibilityStatus {
    let total = aging.total();
    if total < min_samples {
        return current;
    }

    let total = f64::from(total);
    let red_ratio = f64::from(aging.late_120_plus) / total;
    let risk_ratio = f64::from(aging.late_90_119 + aging.late_120_plus) / total;
    let ok_ratio = f64::from(aging.ok) / total;
    let yellow_ratio = f64::from(aging.late_1_89) / total;

    if red_ratio >= 0.3 || risk_ratio >= 0.5 {
        return EligibilityStatus::TidakLayak;
    }

    if ok_ratio >= 0.6 && aging.late_120_plus == 0 {
        return EligibilityStatus::Layak;
    }

    if yellow_ratio >= 0.3 && red_ratio < 0.2 {
        // An existing LAYAK survives a yellow-heavy grid; anything else is
        // pulled to PERHATIAN.
        if current == EligibilityStatus::Layak {
            return EligibilityStatus::Layak;
        }
        return EligibilityStatus::Perhatian;
    }

    current
}

const ABSENT: &str = "tidak ditemukan";

/// Assembles the human-readable rationale after the final label is fixed.
///
/// Section order is fixed: headline, signal summary, itemized detail block,
/// aging counts, hit-tags, recommendation, file-size note. Absent numeric
/// fields are rendered explicitly as "tidak ditemukan", never omitted, so
/// consumers can tell "checked and clear" from "not checked".
pub fn compose_rationale(
    status: EligibilityStatus,
    signals: &ExtractedSignals,
    similarity: Option<&SimilarityMatch>,
    no_text: bool,
    file_size: usize,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(status.headline().to_string());
    lines.push(String::new());

    if no_text {
        lines.push(
            "Tidak ada teks yang dapat diekstrak dari berkas; analisis memakai jalur standar tanpa data."
                .to_string(),
        );
        lines.push(String::new());
    }

    let summary = summarize_signals(signals, similarity);
    if !summary.is_empty() {
        lines.push(format!("Ringkasan: {}.", summary.join("; ")));
        lines.push(String::new());
    }

    lines.push("Rincian temuan:".to_string());
    lines.push(format!(
        "- Kolektibilitas: {}",
        signals
            .kolektibilitas
            .map_or_else(|| ABSENT.to_string(), |v| v.to_string())
    ));
    lines.push(format!(
        "- Skor BI Checking: {}",
        signals
            .bi_score
            .map_or_else(|| ABSENT.to_string(), |v| v.to_string())
    ));
    lines.push(format!("- DSR: {}", format_percent(signals.dsr)));
    lines.push(format!("- DTI: {}", format_percent(signals.dti)));

    if signals.aging.total() > 0 {
        lines.push(format!(
            "- Riwayat angsuran: {}x OK, {}x telat 1-89 hari, {}x telat 90-119 hari, {}x telat 120/180+ hari",
            signals.aging.ok,
            signals.aging.late_1_89,
            signals.aging.late_90_119,
            signals.aging.late_120_plus
        ));
    }

    if !signals.hit_tags.is_empty() {
        lines.push(String::new());
        lines.push("Indikasi terdeteksi:".to_string());
        for tag in signals.hit_tags.iter().take(8) {
            lines.push(format!("- {}", tag));
        }
    }

    lines.push(String::new());
    lines.push(status.recommendation().to_string());
    lines.push(format!("Ukuran berkas: {} byte.", file_size));

    lines.join("\n")
}

fn summarize_signals(
    signals: &ExtractedSignals,
    similarity: Option<&SimilarityMatch>,
) -> Vec<String> {
    let mut summary = Vec::new();

    if let Some(grade) = signals.kolektibilitas {
        summary.push(format!("kolektibilitas {}", grade));
    }
    if let Some(score) = signals.bi_score {
        summary.push(format!("skor BI {}", score));
    }
    if let Some(dsr) = signals.dsr {
        summary.push(format!("DSR {}%", dsr));
    }
    if let Some(dti) = signals.dti {
        summary.push(format!("DTI {}%", dti));
    }

    let top_tags: Vec<&str> = signals.hit_tags.iter().take(4).map(String::as_str).collect();
    if !top_tags.is_empty() {
        summary.push(format!("indikasi: {}", top_tags.join(", ")));
    }

    if let Some(matched) = similarity {
        summary.push(format!(
            "kemiripan {:.0}% dengan dokumen referensi {}",
            matched.score * 100.0,
            matched.status
        ));
    }

    summary
}

fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{}%", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EligibilityStatus::{Layak, Perhatian, TidakLayak};

    fn aging(ok: u32, yellow: u32, orange: u32, red: u32) -> AgingBuckets {
        AgingBuckets {
            ok,
            late_1_89: yellow,
            late_90_119: orange,
            late_120_plus: red,
        }
    }

    #[test]
    fn small_aging_sample_is_ignored() {
        // 5 tokens, all red: below the minimum sample the verdict stands.
        assert_eq!(apply_aging_override(Layak, &aging(0, 0, 0, 5), 6), Layak);
        assert_eq!(apply_aging_override(Layak, &aging(0, 0, 0, 6), 6), TidakLayak);
    }

    #[test]
    fn red_ratio_forces_ineligible() {
        // 3 of 10 red = 0.3
        assert_eq!(
            apply_aging_override(Layak, &aging(7, 0, 0, 3), 6),
            TidakLayak
        );
    }

    #[test]
    fn risk_ratio_forces_ineligible() {
        // orange + red = 5 of 10
        assert_eq!(
            apply_aging_override(Perhatian, &aging(5, 0, 4, 1), 6),
            TidakLayak
        );
    }

    #[test]
    fn clean_grid_forces_eligible() {
        assert_eq!(
            apply_aging_override(TidakLayak, &aging(9, 1, 0, 0), 6),
            Layak
        );
    }

    #[test]
    fn clean_ratio_with_any_red_does_not_force_eligible() {
        // ok ratio 0.7 but one red token: the green branch requires zero red.
        assert_eq!(
            apply_aging_override(Perhatian, &aging(7, 2, 0, 1), 6),
            Perhatian
        );
    }

    #[test]
    fn yellow_grid_pulls_to_caution_but_keeps_eligible() {
        let grid = aging(4, 6, 0, 0);
        assert_eq!(apply_aging_override(TidakLayak, &grid, 6), Perhatian);
        assert_eq!(apply_aging_override(Layak, &grid, 6), Layak);
    }

    #[test]
    fn default_verdict_is_ineligible_for_empty_signals() {
        assert_eq!(base_verdict(&ExtractedSignals::default()), TidakLayak);
    }

    #[test]
    fn grade_one_alone_lands_on_caution_tier() {
        let signals = ExtractedSignals {
            kolektibilitas: Some(1),
            ..ExtractedSignals::default()
        };
        // positive context < 3 skips the strict LAYAK branch and the
        // mid-tier guard accepts grade 1 with everything else absent.
        assert_eq!(base_verdict(&signals), Perhatian);
    }

    #[test]
    fn grade_one_with_low_score_reaches_late_eligible_branch() {
        let signals = ExtractedSignals {
            kolektibilitas: Some(1),
            bi_score: Some(1),
            ..ExtractedSignals::default()
        };
        // score 1 fails the mid-tier guard (wants 2..=3), so the cascade
        // falls through to the grade-1 LAYAK branch.
        assert_eq!(base_verdict(&signals), Layak);
    }

    #[test]
    fn strong_positive_without_grade_is_eligible() {
        let signals = ExtractedSignals {
            strong_positive: true,
            ..ExtractedSignals::default()
        };
        assert_eq!(base_verdict(&signals), Layak);
    }
}
