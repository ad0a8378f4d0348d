use crate::extractor::NormalizedText;
use crate::models::ManualOverrides;
use regex::Regex;

/// Occurrence counts of aging-grid markers, bucketed by days past due.
///
/// These are frequency counts of every occurrence in the document, not
/// distinct matches. Source documents render the grid with color coding;
/// the buckets mirror green ("OK"), yellow (1-89), orange (90-119), and
/// red (120+/180+).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AgingBuckets {
    /// On-time "OK" tokens.
    pub ok: u32,
    /// 1-89 days past due markers.
    pub late_1_89: u32,
    /// 90-119 days past due markers.
    pub late_90_119: u32,
    /// 120+/180+ days past due markers.
    pub late_120_plus: u32,
}

impl AgingBuckets {
    pub fn total(&self) -> u32 {
        self.ok + self.late_1_89 + self.late_90_119 + self.late_120_plus
    }
}

/// Structured result of the lexical scan.
///
/// Every field is independently optional or zero-able; no field depends on
/// another being present. Absence means "not found", never zero.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractedSignals {
    /// Collectability grade 1 (current) through 5 (loss), if found.
    pub kolektibilitas: Option<i64>,
    /// Credit-bureau summary score, if found.
    pub bi_score: Option<i64>,
    /// Debt-service-ratio percent, if found.
    pub dsr: Option<f64>,
    /// Debt-to-income-ratio percent, if found.
    pub dti: Option<f64>,
    /// Distinct qualitative hit-tags, in detection order.
    pub hit_tags: Vec<String>,
    /// Any severe-negative pattern matched.
    pub severe_negative: bool,
    /// Any strong-positive pattern matched.
    pub strong_positive: bool,
    /// Accumulated signed weight of the moderate pattern group.
    pub moderate_weight: i32,
    /// Total occurrences of positive-context phrases (case-preserved scan).
    pub positive_context_hits: u32,
    /// Any hard-negative phrase matched (case-preserved scan).
    pub hard_negative_context: bool,
    /// Aging-grid occurrence counts.
    pub aging: AgingBuckets,
}

/// Tolerant numeric parsing shared by field extraction and the manual
/// override form fields. Strips everything but digits and separators,
/// accepts both comma and dot decimals. A value that does not parse to a
/// finite number is absent, not zero.
pub fn parse_flexible_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

enum GradeValue {
    /// Grade is capture group 1 of the pattern.
    Captured,
    /// Qualitative keyword mapped to a fixed grade.
    Fixed(i64),
}

struct GradeRule {
    pattern: Regex,
    value: GradeValue,
}

struct TaggedRule {
    pattern: Regex,
    tag: &'static str,
}

struct WeightedRule {
    pattern: Regex,
    weight: i32,
    tag: &'static str,
}

/// Deterministic, order-independent scan of normalized text against fixed
/// rule tables. Rule tables are data: the cascade/accumulate control flow
/// below never mentions individual patterns.
pub struct SignalExtractor {
    grade_rules: Vec<GradeRule>,
    score_rules: Vec<Regex>,
    dsr_rules: Vec<Regex>,
    /// Case-sensitive DTI field labels, matched against the raw variant.
    dti_raw_rules: Vec<Regex>,
    dti_lower_rules: Vec<Regex>,
    severe_rules: Vec<TaggedRule>,
    strong_positive_rules: Vec<Regex>,
    moderate_rules: Vec<WeightedRule>,
    /// Counted (not boolean) against the case-preserved text.
    positive_context_rules: Vec<Regex>,
    /// Boolean against the case-preserved text.
    hard_negative_rules: Vec<Regex>,
    aging_ok: Regex,
    aging_1_89: Regex,
    aging_90_119: Regex,
    aging_120_plus: Regex,
}

fn re(pattern: &str) -> Regex {
    // Patterns are fixed program data; compilation cannot fail at runtime.
    Regex::new(pattern).unwrap()
}

impl SignalExtractor {
    pub fn new() -> Self {
        Self {
            // First-match-wins cascade: explicit grade statements before
            // qualitative keyword fallbacks, fallbacks in priority order.
            grade_rules: vec![
                GradeRule {
                    pattern: re(r"kolektibilitas\s*[:\-]?\s*([1-5])\b"),
                    value: GradeValue::Captured,
                },
                GradeRule {
                    pattern: re(r"\bkol\s*\.?\s*[:\-]?\s*([1-5])\b"),
                    value: GradeValue::Captured,
                },
                GradeRule {
                    pattern: re(r"\blancar\b"),
                    value: GradeValue::Fixed(1),
                },
                GradeRule {
                    pattern: re(r"dalam\s+perhatian\s+khusus"),
                    value: GradeValue::Fixed(2),
                },
                GradeRule {
                    pattern: re(r"kurang\s+lancar"),
                    value: GradeValue::Fixed(3),
                },
                GradeRule {
                    pattern: re(r"\bdiragukan\b"),
                    value: GradeValue::Fixed(4),
                },
                GradeRule {
                    pattern: re(r"\bmacet\b"),
                    value: GradeValue::Fixed(5),
                },
            ],
            score_rules: vec![
                re(r"skor\s*bi(?:[\s\-]*checking)?\s*[:\-]?\s*([1-5])\b"),
                re(r"bi[\s\-]*checking\s*(?:skor|score)\s*[:\-]?\s*([1-5])\b"),
            ],
            dsr_rules: vec![
                re(r"\bdsr\s*[:\-]?\s*([0-9]+(?:[.,][0-9]+)?)\s*%?"),
                re(r"debt\s*service\s*ratio\s*[:\-]?\s*([0-9]+(?:[.,][0-9]+)?)\s*%?"),
            ],
            dti_raw_rules: vec![
                // Field label appears as DTI or DHTI, uppercase only.
                re(r"\bDH?TI\b\s*[:\-]?\s*([0-9]+(?:[.,][0-9]+)?)\s*%?"),
            ],
            dti_lower_rules: vec![
                re(r"debt\s*to\s*income(?:\s*ratio)?\s*[:\-]?\s*([0-9]+(?:[.,][0-9]+)?)\s*%?"),
            ],
            severe_rules: vec![
                TaggedRule {
                    pattern: re(r"kredit\s+macet|\bmacet\b"),
                    tag: "kolektibilitas 5/macet",
                },
                TaggedRule {
                    pattern: re(r"\bwanprestasi\b"),
                    tag: "wanprestasi",
                },
                TaggedRule {
                    pattern: re(r"hapus\s+buku|write[\s\-]?off"),
                    tag: "hapus buku/write-off",
                },
                TaggedRule {
                    pattern: re(r"daftar\s+hitam|\bblacklist\b"),
                    tag: "daftar hitam bank",
                },
            ],
            strong_positive_rules: vec![
                re(r"tidak\s+pernah\s+menunggak"),
                re(r"selalu\s+tepat\s+waktu"),
                re(r"riwayat\s+kredit\s+(?:sangat\s+)?baik"),
                re(r"tidak\s+ada\s+tunggakan"),
            ],
            moderate_rules: vec![
                WeightedRule {
                    pattern: re(r"kurang\s+lancar"),
                    weight: -2,
                    tag: "kolektibilitas 3/kurang lancar",
                },
                WeightedRule {
                    pattern: re(r"dalam\s+perhatian\s+khusus"),
                    weight: -1,
                    tag: "kolektibilitas 2/dalam perhatian khusus",
                },
                WeightedRule {
                    pattern: re(r"\bdiragukan\b"),
                    weight: -2,
                    tag: "kolektibilitas 4/diragukan",
                },
                WeightedRule {
                    pattern: re(r"keterlambatan|pernah\s+terlambat"),
                    weight: -1,
                    tag: "riwayat keterlambatan pembayaran",
                },
                WeightedRule {
                    pattern: re(r"restrukturisasi"),
                    weight: -1,
                    tag: "kredit direstrukturisasi",
                },
                WeightedRule {
                    pattern: re(r"\blunas\b"),
                    weight: 1,
                    tag: "kredit lunas",
                },
                WeightedRule {
                    pattern: re(r"tepat\s+waktu"),
                    weight: 1,
                    tag: "pembayaran tepat waktu",
                },
            ],
            positive_context_rules: vec![
                re(r"\b[Ll]ancar\b"),
                re(r"[Tt]epat\s+[Ww]aktu"),
                re(r"[Tt]idak\s+ada\s+tunggakan"),
                re(r"[Rr]iwayat\s+(?:kredit\s+)?baik"),
                re(r"\bBAIK\b"),
            ],
            hard_negative_rules: vec![
                re(r"\bFRAUD\b|[Pp]enipuan"),
                re(r"DAFTAR\s+HITAM|BLACKLIST"),
                re(r"\bPAILIT\b|[Dd]ipailitkan"),
            ],
            aging_ok: re(r"\bOK\b"),
            aging_1_89: re(r"\b(?:[1-9]|[1-8][0-9])\s*[Hh]ari\b"),
            aging_90_119: re(r"\b(?:9[0-9]|1[01][0-9])\s*[Hh]ari\b"),
            aging_120_plus: re(r"\b(?:1[2-9][0-9]|[2-9][0-9]{2})\s*[Hh]ari\b|\b180\+"),
        }
    }

    /// Runs every rule group over the normalized text and applies manual
    /// overrides. Pure function of its inputs.
    pub fn extract(&self, text: &NormalizedText, overrides: &ManualOverrides) -> ExtractedSignals {
        let mut signals = ExtractedSignals {
            kolektibilitas: self.extract_grade(&text.lower),
            bi_score: self.extract_captured_int(&self.score_rules, &text.lower),
            dsr: self.extract_captured_number(&self.dsr_rules, &text.lower),
            dti: self
                .extract_captured_number(&self.dti_raw_rules, &text.raw)
                .or_else(|| self.extract_captured_number(&self.dti_lower_rules, &text.lower)),
            ..ExtractedSignals::default()
        };

        // Manual overrides unconditionally replace extracted values.
        if overrides.dsr.is_some() {
            signals.dsr = overrides.dsr;
        }
        if overrides.dti.is_some() {
            signals.dti = overrides.dti;
        }
        if overrides.bi_score.is_some() {
            signals.bi_score = overrides.bi_score;
        }

        for rule in &self.severe_rules {
            if rule.pattern.is_match(&text.lower) {
                signals.severe_negative = true;
                push_distinct(&mut signals.hit_tags, rule.tag);
            }
        }

        signals.strong_positive = self
            .strong_positive_rules
            .iter()
            .any(|pattern| pattern.is_match(&text.lower));

        // Moderate weights accumulate; they never short-circuit.
        for rule in &self.moderate_rules {
            if rule.pattern.is_match(&text.lower) {
                signals.moderate_weight += rule.weight;
                push_distinct(&mut signals.hit_tags, rule.tag);
            }
        }

        signals.positive_context_hits = self
            .positive_context_rules
            .iter()
            .map(|pattern| pattern.find_iter(&text.raw).count() as u32)
            .sum();

        signals.hard_negative_context = self
            .hard_negative_rules
            .iter()
            .any(|pattern| pattern.is_match(&text.raw));

        signals.aging = AgingBuckets {
            ok: self.aging_ok.find_iter(&text.raw).count() as u32,
            late_1_89: self.aging_1_89.find_iter(&text.raw).count() as u32,
            late_90_119: self.aging_90_119.find_iter(&text.raw).count() as u32,
            late_120_plus: self.aging_120_plus.find_iter(&text.raw).count() as u32,
        };

        signals
    }

    /// First-match-wins grade cascade; later rules are not consulted once
    /// one matches.
    fn extract_grade(&self, lower: &str) -> Option<i64> {
        for rule in &self.grade_rules {
            match &rule.value {
                GradeValue::Captured => {
                    if let Some(caps) = rule.pattern.captures(lower) {
                        return caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok());
                    }
                }
                GradeValue::Fixed(grade) => {
                    if rule.pattern.is_match(lower) {
                        return Some(*grade);
                    }
                }
            }
        }
        None
    }

    fn extract_captured_int(&self, rules: &[Regex], haystack: &str) -> Option<i64> {
        for pattern in rules {
            if let Some(caps) = pattern.captures(haystack) {
                return caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok());
            }
        }
        None
    }

    fn extract_captured_number(&self, rules: &[Regex], haystack: &str) -> Option<f64> {
        for pattern in rules {
            if let Some(caps) = pattern.captures(haystack) {
                // Matched but unparseable still ends the cascade: the field
                // is absent, not zero.
                return caps.get(1).and_then(|m| parse_flexible_number(m.as_str()));
            }
        }
        None
    }
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn push_distinct(tags: &mut Vec<String>, tag: &str) {
    if !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_string());
    }
}
