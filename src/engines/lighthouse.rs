//! Lighthouse CLI adapter.
//!
//! Runs `lighthouse <url> --output=json --output-path=stdout` and reads the
//! category scores out of the JSON report. Scores arrive in `[0, 1]` or as
//! `null`; they are scaled to `0..=100` with absent scores counting as zero.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use crate::engines::{EngineError, PerformanceAuditor};

/// Stderr lines kept in an error message.
const STDERR_TAIL_LINES: usize = 5;

/// The subset of a Lighthouse report the audit consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LighthouseReport {
    #[serde(default)]
    pub categories: Categories,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub performance: Option<Category>,
    #[serde(default)]
    pub accessibility: Option<Category>,
    #[serde(default)]
    pub seo: Option<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub score: Option<f64>,
}

impl LighthouseReport {
    /// Build a report from raw `[0, 1]` scores. Mostly useful for tests.
    pub fn from_scores(performance: Option<f64>, accessibility: Option<f64>, seo: Option<f64>) -> Self {
        let category = |score| Some(Category { score });
        Self {
            categories: Categories {
                performance: category(performance),
                accessibility: category(accessibility),
                seo: category(seo),
            },
        }
    }

    pub fn performance(&self) -> u32 {
        to_percent(self.categories.performance.as_ref())
    }

    pub fn accessibility(&self) -> u32 {
        to_percent(self.categories.accessibility.as_ref())
    }

    pub fn seo(&self) -> u32 {
        to_percent(self.categories.seo.as_ref())
    }
}

fn to_percent(category: Option<&Category>) -> u32 {
    match category.and_then(|c| c.score) {
        Some(score) if score.is_finite() => (score * 100.0).round().clamp(0.0, 100.0) as u32,
        _ => 0,
    }
}

/// Parse Lighthouse JSON output.
pub fn parse_report(stdout: &[u8]) -> Result<LighthouseReport, EngineError> {
    serde_json::from_slice(stdout).map_err(|e| EngineError::Malformed(format!("lighthouse report: {}", e)))
}

/// Runs the Lighthouse command line tool as a child process.
#[derive(Debug, Clone)]
pub struct LighthouseCli {
    bin: String,
    chrome_flags: String,
}

impl LighthouseCli {
    pub fn new(bin: &str, chrome_flags: &str) -> Self {
        Self {
            bin: bin.to_string(),
            chrome_flags: chrome_flags.to_string(),
        }
    }

    fn command(&self, url: &str) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .arg(url)
            .arg("--output=json")
            .arg("--output-path=stdout")
            .arg("--quiet")
            .arg("--only-categories=performance,accessibility,seo")
            .arg(format!("--chrome-flags={}", self.chrome_flags))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl PerformanceAuditor for LighthouseCli {
    async fn audit(&self, url: &str) -> Result<LighthouseReport, EngineError> {
        let start = Instant::now();
        tracing::debug!(target_url = %url, bin = %self.bin, "Running lighthouse");

        let output = self
            .command(url)
            .output()
            .await
            .map_err(|e| EngineError::Lighthouse(format!("could not run '{}': {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(STDERR_TAIL_LINES).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(EngineError::Lighthouse(format!(
                "exited with {}: {}",
                output.status,
                tail.join(" | ")
            )));
        }

        let report = parse_report(&output.stdout)?;
        tracing::debug!(
            target_url = %url,
            performance = report.performance(),
            seo = report.seo(),
            accessibility = report.accessibility(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Lighthouse finished"
        );
        Ok(report)
    }
}
