/// Unit tests for the BI-Checking analysis core
/// Tests the decision cascade, override precedence, and rationale rendering
use bi_checking_api::analyzer::{analyze_text, no_document_verdict};
use bi_checking_api::corpus::ReferenceExemplar;
use bi_checking_api::decision::DecisionConfig;
use bi_checking_api::extractor::NormalizedText;
use bi_checking_api::models::{BiCheckingResult, EligibilityStatus, ManualOverrides};

fn analyze(text: &str) -> BiCheckingResult {
    analyze_full(text, ManualOverrides::default(), &[])
}

fn analyze_full(
    text: &str,
    overrides: ManualOverrides,
    corpus: &[ReferenceExemplar],
) -> BiCheckingResult {
    analyze_text(
        &NormalizedText::from_text(text),
        &overrides,
        corpus,
        &DecisionConfig::default(),
        text.len(),
    )
}

fn exemplar(status: EligibilityStatus, source: &str, text: &str) -> ReferenceExemplar {
    ReferenceExemplar {
        status,
        source: source.to_string(),
        text: text.to_string(),
    }
}

const CLEAN_TEXT: &str =
    "kolektibilitas 1 skor bi 1 DSR 20% DTI 25% Pembayaran Lancar Lancar dan Tepat Waktu";

#[cfg(test)]
mod verdict_scenarios {
    use super::*;

    #[test]
    fn clean_document_is_eligible() {
        let result = analyze(CLEAN_TEXT);

        assert_eq!(result.status, EligibilityStatus::Layak);
        assert!(result.is_eligible);
        assert_eq!(result.kolektibilitas, Some(1));
        assert_eq!(result.bi_score, Some(1));
        assert_eq!(result.dsr, Some(20.0));
        assert_eq!(result.dti, Some(25.0));
    }

    #[test]
    fn severe_negative_keyword_is_ineligible_regardless_of_fields() {
        let result = analyze("kolektibilitas 1 skor bi 1 DSR 20% status kredit macet");

        assert_eq!(result.status, EligibilityStatus::TidakLayak);
        assert!(!result.is_eligible);
    }

    #[test]
    fn hard_negative_context_is_ineligible() {
        let result = analyze("debitur tercantum dalam DAFTAR HITAM nasional");
        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn high_dsr_is_ineligible() {
        let result = analyze("kolektibilitas 1 DSR 41%");
        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn mid_tier_document_is_caution() {
        // grade 2, score 3, ratios inside the caution band
        let result = analyze("kolektibilitas 2 skor bi 3 DSR 38% DTI 44%");
        assert_eq!(result.status, EligibilityStatus::Perhatian);
    }

    #[test]
    fn no_recognizable_signals_defaults_to_ineligible() {
        let result = analyze("dokumen tanpa sinyal apapun");
        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn verdict_is_total_over_garbage_input() {
        for text in ["", "%%%###@@@", "1234567890", "\u{fffd}\u{fffd}"] {
            let result = analyze(text);
            assert!(matches!(
                result.status,
                EligibilityStatus::Layak
                    | EligibilityStatus::TidakLayak
                    | EligibilityStatus::Perhatian
            ));
        }
    }
}

#[cfg(test)]
mod aging_override_tests {
    use super::*;

    #[test]
    fn aging_dominance_forces_ineligible() {
        // 10 red markers and nothing else recognizable: redRatio = 1.0
        let text = "150 hari ".repeat(10);
        let result = analyze(&text);

        assert_eq!(result.aging_120_plus, 10);
        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn aging_override_beats_eligible_base_verdict() {
        // Base rules say LAYAK, but 3 of 10 aging tokens are red (>= 0.3).
        let text = format!("{} OK OK OK OK OK OK OK 150 hari 150 hari 150 hari", CLEAN_TEXT);
        let result = analyze(&text);

        assert_eq!(result.aging_ok, 7);
        assert_eq!(result.aging_120_plus, 3);
        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn small_aging_sample_leaves_verdict_alone() {
        // Only 5 tokens: below the minimum sample, base LAYAK survives.
        let text = format!("{} 150 hari 150 hari 150 hari 150 hari 150 hari", CLEAN_TEXT);
        let result = analyze(&text);

        assert_eq!(result.aging_120_plus, 5);
        assert_eq!(result.status, EligibilityStatus::Layak);
    }

    #[test]
    fn clean_aging_grid_confirms_eligible() {
        // No other signals: base path defaults INELIGIBLE, but a clean grid
        // (>= 60% OK, zero red) forces LAYAK.
        let text = "OK OK OK OK OK OK OK 30 hari";
        let result = analyze(text);

        assert_eq!(result.aging_ok, 7);
        assert_eq!(result.status, EligibilityStatus::Layak);
    }

    #[test]
    fn yellow_heavy_grid_pulls_to_caution() {
        let text = "OK OK 30 hari 45 hari 60 hari 75 hari";
        let result = analyze(text);

        assert_eq!(result.aging_1_89, 4);
        assert_eq!(result.status, EligibilityStatus::Perhatian);
    }
}

#[cfg(test)]
mod similarity_override_tests {
    use super::*;

    const UPLOAD: &str =
        "laporan bi checking nasabah koperasi kredit macet riwayat pembayaran dokumen";

    fn layak_exemplar() -> ReferenceExemplar {
        exemplar(
            EligibilityStatus::Layak,
            "layak.pdf",
            "laporan bi checking nasabah koperasi riwayat pembayaran dokumen referensi",
        )
    }

    #[test]
    fn confident_exemplar_match_overrides_base_verdict() {
        // "macet" makes the base verdict INELIGIBLE, but the upload is
        // near-identical to the LAYAK exemplar.
        let result = analyze_full(UPLOAD, ManualOverrides::default(), &[layak_exemplar()]);

        assert_eq!(result.status, EligibilityStatus::Layak);
        assert!(result.is_eligible);
        assert!(result.analysis.contains("kemiripan"));
    }

    #[test]
    fn aging_override_beats_similarity_proposal() {
        let text = format!("{} 150 hari 150 hari 150 hari 150 hari 150 hari 150 hari", UPLOAD);
        let result = analyze_full(&text, ManualOverrides::default(), &[layak_exemplar()]);

        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn dissimilar_corpus_leaves_base_verdict() {
        let corpus = vec![exemplar(
            EligibilityStatus::Layak,
            "layak.pdf",
            "konten sama sekali berbeda tentang topik lain seluruhnya",
        )];
        let result = analyze_full("kredit macet", ManualOverrides::default(), &corpus);

        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }
}

#[cfg(test)]
mod override_precedence_tests {
    use super::*;

    #[test]
    fn manual_dsr_override_beats_extracted_value() {
        let overrides = ManualOverrides {
            dsr: Some(55.0),
            ..ManualOverrides::default()
        };
        let result = analyze_full(CLEAN_TEXT, overrides, &[]);

        // text says DSR 20%, override says 55 -> over the 40% ceiling
        assert_eq!(result.dsr, Some(55.0));
        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn manual_score_override_beats_extracted_value() {
        let overrides = ManualOverrides {
            bi_score: Some(5),
            ..ManualOverrides::default()
        };
        let result = analyze_full(CLEAN_TEXT, overrides, &[]);

        assert_eq!(result.bi_score, Some(5));
        assert_eq!(result.status, EligibilityStatus::TidakLayak);
    }

    #[test]
    fn override_applies_even_when_text_has_no_value() {
        let overrides = ManualOverrides {
            dti: Some(30.0),
            ..ManualOverrides::default()
        };
        let result = analyze_full("dokumen tanpa rasio", overrides, &[]);

        assert_eq!(result.dti, Some(30.0));
    }
}

#[cfg(test)]
mod rationale_tests {
    use super::*;

    #[test]
    fn absent_fields_are_rendered_explicitly() {
        let result = analyze("dokumen tanpa sinyal apapun");

        assert!(result.analysis.contains("- Kolektibilitas: tidak ditemukan"));
        assert!(result.analysis.contains("- Skor BI Checking: tidak ditemukan"));
        assert!(result.analysis.contains("- DSR: tidak ditemukan"));
        assert!(result.analysis.contains("- DTI: tidak ditemukan"));
    }

    #[test]
    fn present_fields_are_rendered_with_values() {
        let result = analyze(CLEAN_TEXT);

        assert!(result.analysis.contains("- Kolektibilitas: 1"));
        assert!(result.analysis.contains("- Skor BI Checking: 1"));
        assert!(result.analysis.contains("- DSR: 20%"));
        assert!(result.analysis.contains("- DTI: 25%"));
        assert!(result.analysis.contains("Ringkasan:"));
    }

    #[test]
    fn empty_text_adds_no_data_note() {
        let result = analyze("");
        assert!(result.analysis.contains("Tidak ada teks yang dapat diekstrak"));
    }

    #[test]
    fn aging_counts_appear_when_found() {
        let result = analyze("OK OK 30 hari 150 hari OK OK");
        assert!(result.analysis.contains("Riwayat angsuran"));
    }

    #[test]
    fn recommendation_matches_final_label() {
        assert!(analyze(CLEAN_TEXT)
            .analysis
            .contains("layak dilanjutkan ke tahap analisis berikutnya"));
        assert!(analyze("kredit macet")
            .analysis
            .contains("sebaiknya ditolak"));
    }

    #[test]
    fn file_size_note_is_appended() {
        let result = analyze(CLEAN_TEXT);
        assert!(result
            .analysis
            .contains(&format!("Ukuran berkas: {} byte.", CLEAN_TEXT.len())));
    }

    #[test]
    fn hit_tags_are_listed() {
        let result = analyze("kredit macet dan pernah terlambat membayar");
        assert!(result.analysis.contains("Indikasi terdeteksi:"));
        assert!(result.analysis.contains("kolektibilitas 5/macet"));
    }
}

#[cfg(test)]
mod no_document_tests {
    use super::*;

    #[test]
    fn missing_upload_resolves_to_fixed_caution_verdict() {
        let result = no_document_verdict();

        assert_eq!(result.status, EligibilityStatus::Perhatian);
        assert!(!result.is_eligible);
        assert!(result.analysis.contains("Belum ada data BI Checking"));
        assert_eq!(result.kolektibilitas, None);
        assert_eq!(result.bi_score, None);
        assert_eq!(result.dsr, None);
        assert_eq!(result.dti, None);
    }
}
