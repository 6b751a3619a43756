//! Smart score aggregation.
//!
//! Weighted sum of the four sub-scores, minus finding penalties, rounded and
//! clamped to `0..=100`, then bucketed into a grade. Suggestions accumulate
//! in a fixed order: penalty-triggered ones first, then one per sub-score
//! below its threshold. The thresholds are independent of the penalties, so a
//! single run can produce overlapping advice.

use crate::audit::types::{AccessibilityFindings, Grade, SubScores};

const WEIGHT_PERFORMANCE: f64 = 0.35;
const WEIGHT_SEO: f64 = 0.25;
const WEIGHT_SECURITY: f64 = 0.25;
const WEIGHT_ACCESSIBILITY: f64 = 0.15;

/// Flat penalty when any header finding exists.
pub const HEADER_PENALTY: u32 = 5;
/// Penalty per accessibility violation.
pub const VIOLATION_PENALTY: u32 = 2;
/// Upper bound of the accessibility violation penalty.
pub const VIOLATION_PENALTY_CAP: u32 = 15;

const PERFORMANCE_THRESHOLD: u32 = 50;
const SEO_THRESHOLD: u32 = 70;
const ACCESSIBILITY_THRESHOLD: u32 = 70;
const SECURITY_THRESHOLD: u32 = 70;

pub const SUGGEST_HEADERS: &str =
    "Add the missing security headers (CSP, HSTS, X-Frame-Options, X-Content-Type-Options).";
pub const SUGGEST_VIOLATIONS: &str = "Fix the accessibility violations reported by the axe scan.";
pub const SUGGEST_PERFORMANCE: &str =
    "Improve performance: compress images, defer unused JavaScript and enable caching.";
pub const SUGGEST_SEO: &str =
    "Improve SEO: add descriptive titles, meta descriptions and crawlable links.";
pub const SUGGEST_ACCESSIBILITY: &str =
    "Improve accessibility: add alt text, form labels and sufficient color contrast.";
pub const SUGGEST_SECURITY: &str =
    "Harden security: serve over HTTPS and configure security headers.";

/// Everything the aggregator looks at.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub scores: SubScores,
    pub header_findings: &'a [String],
    pub accessibility: &'a AccessibilityFindings,
}

/// Outcome of [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub final_score: u32,
    pub grade: Grade,
    pub label: &'static str,
    pub penalties: u32,
    pub suggestions: Vec<String>,
}

/// Weighted base score before penalties.
pub fn weighted_base(scores: &SubScores) -> f64 {
    WEIGHT_PERFORMANCE * scores.performance as f64
        + WEIGHT_SEO * scores.seo as f64
        + WEIGHT_SECURITY * scores.security as f64
        + WEIGHT_ACCESSIBILITY * scores.accessibility as f64
}

/// Penalty contributed by `count` accessibility violations.
pub fn violation_penalty(count: usize) -> u32 {
    let raw = u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(VIOLATION_PENALTY);
    raw.min(VIOLATION_PENALTY_CAP)
}

/// Grade bucket for a final score.
pub fn grade_for(score: u32) -> Grade {
    match score {
        90.. => Grade::APlus,
        80..=89 => Grade::A,
        70..=79 => Grade::B,
        60..=69 => Grade::C,
        _ => Grade::D,
    }
}

/// Turn sub-scores and findings into the final score card.
pub fn aggregate(input: ScoreInput<'_>) -> ScoreCard {
    let scores = &input.scores;
    let base = weighted_base(scores);

    let mut penalties = 0;
    let mut suggestions = Vec::new();

    if !input.header_findings.is_empty() {
        penalties += HEADER_PENALTY;
        suggestions.push(SUGGEST_HEADERS.to_string());
    }

    let violations = input.accessibility.violation_count();
    if violations > 0 {
        penalties += violation_penalty(violations);
        suggestions.push(SUGGEST_VIOLATIONS.to_string());
    }

    let thresholds = [
        (scores.performance, PERFORMANCE_THRESHOLD, SUGGEST_PERFORMANCE),
        (scores.seo, SEO_THRESHOLD, SUGGEST_SEO),
        (scores.accessibility, ACCESSIBILITY_THRESHOLD, SUGGEST_ACCESSIBILITY),
        (scores.security, SECURITY_THRESHOLD, SUGGEST_SECURITY),
    ];
    for (value, threshold, suggestion) in thresholds {
        if value < threshold {
            suggestions.push(suggestion.to_string());
        }
    }

    let final_score = (base - penalties as f64).round().clamp(0.0, 100.0) as u32;
    let grade = grade_for(final_score);

    ScoreCard {
        final_score,
        grade,
        label: grade.label(),
        penalties,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn scores(performance: u32, seo: u32, security: u32, accessibility: u32) -> SubScores {
        SubScores {
            performance,
            seo,
            security,
            accessibility,
        }
    }

    fn violations(n: usize) -> AccessibilityFindings {
        AccessibilityFindings {
            violations: (0..n).map(|i| json!({ "id": format!("rule-{i}") })).collect(),
        }
    }

    #[test]
    fn test_poor_site_without_findings() {
        let axe = AccessibilityFindings::default();
        let card = aggregate(ScoreInput {
            scores: scores(40, 60, 70, 65),
            header_findings: &[],
            accessibility: &axe,
        });

        assert!((weighted_base(&scores(40, 60, 70, 65)) - 56.25).abs() < 1e-9);
        assert_eq!(card.final_score, 56);
        assert_eq!(card.grade, Grade::D);
        assert_eq!(card.label, "Poor");
        assert_eq!(card.penalties, 0);
        assert_eq!(card.suggestions, vec![SUGGEST_PERFORMANCE, SUGGEST_SEO, SUGGEST_ACCESSIBILITY]);
    }

    #[test]
    fn test_excellent_site() {
        let axe = AccessibilityFindings::default();
        let card = aggregate(ScoreInput {
            scores: scores(95, 95, 90, 95),
            header_findings: &[],
            accessibility: &axe,
        });

        assert_eq!(card.final_score, 94);
        assert_eq!(card.grade, Grade::APlus);
        assert_eq!(card.label, "Excellent");
        assert!(card.suggestions.is_empty());
    }

    #[test]
    fn test_penalties_and_suggestion_order() {
        let findings = vec!["Missing CSP".to_string()];
        let axe = violations(3);
        let card = aggregate(ScoreInput {
            scores: scores(90, 90, 70, 90),
            header_findings: &findings,
            accessibility: &axe,
        });

        // base = 31.5 + 22.5 + 17.5 + 13.5 = 85; penalties = 5 + 6
        assert_eq!(card.penalties, 11);
        assert_eq!(card.final_score, 74);
        assert_eq!(card.grade, Grade::B);
        assert_eq!(card.suggestions, vec![SUGGEST_HEADERS, SUGGEST_VIOLATIONS]);
    }

    #[test]
    fn test_violation_penalty_is_capped() {
        assert_eq!(violation_penalty(0), 0);
        assert_eq!(violation_penalty(7), 14);
        assert_eq!(violation_penalty(8), 15);
        assert_eq!(violation_penalty(10), 15);
        assert_eq!(violation_penalty(usize::MAX), 15);

        let axe = violations(10);
        let card = aggregate(ScoreInput {
            scores: scores(100, 100, 100, 100),
            header_findings: &[],
            accessibility: &axe,
        });
        assert_eq!(card.penalties, 15);
        assert_eq!(card.final_score, 85);
    }

    #[test]
    fn test_grade_boundaries() {
        let expected = [
            (100, Grade::APlus),
            (90, Grade::APlus),
            (89, Grade::A),
            (80, Grade::A),
            (79, Grade::B),
            (70, Grade::B),
            (69, Grade::C),
            (60, Grade::C),
            (59, Grade::D),
            (0, Grade::D),
        ];
        for (score, grade) in expected {
            assert_eq!(grade_for(score), grade, "score {score}");
        }
    }

    #[test]
    fn test_clamps_at_zero() {
        let findings = vec!["Missing CSP".to_string(), "Missing HSTS".to_string()];
        let axe = violations(30);
        let card = aggregate(ScoreInput {
            scores: scores(0, 0, 0, 0),
            header_findings: &findings,
            accessibility: &axe,
        });
        assert_eq!(card.penalties, 20);
        assert_eq!(card.final_score, 0);
        assert_eq!(card.grade, Grade::D);
        assert_eq!(card.suggestions.len(), 6);
    }

    #[test]
    fn test_rounds_half_up() {
        // base = 0.35 * 50 + 0.25 * 50 + 0.25 * 50 + 0.15 * 60 = 51.5
        let axe = AccessibilityFindings::default();
        let card = aggregate(ScoreInput {
            scores: scores(50, 50, 50, 60),
            header_findings: &[],
            accessibility: &axe,
        });
        assert_eq!(card.final_score, 52);
    }

    proptest! {
        #[test]
        fn prop_final_score_in_range(
            p in 0u32..=100, s in 0u32..=100, sec in 0u32..=100, a in 0u32..=100,
            missing in 0usize..=4, n in 0usize..40,
        ) {
            let findings: Vec<String> = (0..missing).map(|i| format!("Missing {i}")).collect();
            let axe = violations(n);
            let card = aggregate(ScoreInput {
                scores: scores(p, s, sec, a),
                header_findings: &findings,
                accessibility: &axe,
            });
            prop_assert!(card.final_score <= 100);
            prop_assert!(card.penalties <= HEADER_PENALTY + VIOLATION_PENALTY_CAP);
            prop_assert_eq!(card.grade, grade_for(card.final_score));
            prop_assert_eq!(card.label, card.grade.label());
        }

        #[test]
        fn prop_is_deterministic(p in 0u32..=100, s in 0u32..=100, sec in 0u32..=100, a in 0u32..=100) {
            let axe = AccessibilityFindings::default();
            let input = ScoreInput { scores: scores(p, s, sec, a), header_findings: &[], accessibility: &axe };
            prop_assert_eq!(aggregate(input), aggregate(input));
        }

        #[test]
        fn prop_penalties_never_raise_score(p in 0u32..=100, s in 0u32..=100, sec in 0u32..=100, a in 0u32..=100, n in 1usize..20) {
            let clean = AccessibilityFindings::default();
            let dirty = violations(n);
            let findings = vec!["Missing CSP".to_string()];
            let base = aggregate(ScoreInput { scores: scores(p, s, sec, a), header_findings: &[], accessibility: &clean });
            let penalised = aggregate(ScoreInput { scores: scores(p, s, sec, a), header_findings: &findings, accessibility: &dirty });
            prop_assert!(penalised.final_score <= base.final_score);
        }
    }
}
