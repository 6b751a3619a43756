//! Audit data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::target::AuditTarget;

/// Security score before header findings are considered.
pub const SECURITY_BASELINE: u32 = 80;
/// Deduction applied to the security score when any header is missing.
pub const SECURITY_HEADER_PENALTY: u32 = 10;

/// The four sub-scores feeding the smart score, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub performance: u32,
    pub seo: u32,
    pub security: u32,
    pub accessibility: u32,
}

impl SubScores {
    /// Security is not measured; it is the baseline minus a flat deduction
    /// when any header finding exists.
    pub fn derive_security(header_findings: &[String]) -> u32 {
        if header_findings.is_empty() {
            SECURITY_BASELINE
        } else {
            SECURITY_BASELINE - SECURITY_HEADER_PENALTY
        }
    }
}

/// Output of the accessibility scan. Violation details are opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityFindings {
    #[serde(default)]
    pub violations: Vec<Value>,
}

impl AccessibilityFindings {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Accessibility block of a serialized result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxeSummary {
    /// Violation count rendered as a string.
    pub violations: String,
    pub details: Vec<Value>,
}

/// One axis of the radar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub metric: String,
    pub value: u32,
}

/// Letter grade bucket of a smart score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "Excellent",
            Grade::A => "Great",
            Grade::B => "Good",
            Grade::C => "Fair",
            Grade::D => "Poor",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate record of one completed audit. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub url: AuditTarget,
    pub timestamp: DateTime<Utc>,
    pub scores: SubScores,
    pub header_checks: Vec<String>,
    pub axe: AxeSummary,
    pub smart_score: u32,
    pub grade: Grade,
    pub label: String,
    pub penalties: u32,
    pub suggestions: Vec<String>,
    pub radar: Vec<RadarPoint>,
}

impl AuditResult {
    /// Radar projection of the sub-scores, in display order.
    pub fn radar_for(scores: &SubScores) -> Vec<RadarPoint> {
        [
            ("Performance", scores.performance),
            ("SEO", scores.seo),
            ("Security", scores.security),
            ("Accessibility", scores.accessibility),
        ]
        .into_iter()
        .map(|(metric, value)| RadarPoint {
            metric: metric.to_string(),
            value,
        })
        .collect()
    }
}
