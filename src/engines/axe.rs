//! axe-core accessibility scan.
//!
//! Loads the target in headless Chromium, injects the axe-core bundle from
//! disk and evaluates `axe.run()`. Only the `violations` array is kept.

use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use std::path::PathBuf;
use std::time::Duration;

use crate::audit::types::AccessibilityFindings;
use crate::engines::browser::HeadlessBrowser;
use crate::engines::{AccessibilityScanner, EngineError};

const RUN_AXE: &str = "axe.run(document).then(results => ({ violations: results.violations }))";

/// Scans pages with axe-core inside a fresh headless browser.
#[derive(Debug, Clone)]
pub struct AxeScanner {
    script_path: PathBuf,
    chrome_executable: Option<String>,
    navigation_timeout: Duration,
}

impl AxeScanner {
    pub fn new(script_path: &str, chrome_executable: Option<String>, navigation_timeout: Duration) -> Self {
        Self {
            script_path: PathBuf::from(script_path),
            chrome_executable,
            navigation_timeout,
        }
    }

    async fn load_script(&self) -> Result<String, EngineError> {
        tokio::fs::read_to_string(&self.script_path).await.map_err(|e| {
            EngineError::Scan(format!("cannot read axe-core bundle {}: {}", self.script_path.display(), e))
        })
    }

    async fn run_on(&self, page: &Page, script: String) -> Result<AccessibilityFindings, EngineError> {
        page.evaluate_expression(EvaluateParams::new(script))
            .await
            .map_err(|e| EngineError::Scan(format!("axe-core injection failed: {}", e)))?;

        let params = EvaluateParams::builder()
            .expression(RUN_AXE)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(EngineError::Scan)?;

        let evaluation = page
            .evaluate_expression(params)
            .await
            .map_err(|e| EngineError::Scan(format!("axe.run failed: {}", e)))?;

        evaluation
            .into_value::<AccessibilityFindings>()
            .map_err(|e| EngineError::Malformed(format!("axe results: {}", e)))
    }
}

#[async_trait]
impl AccessibilityScanner for AxeScanner {
    async fn scan(&self, url: &str) -> Result<AccessibilityFindings, EngineError> {
        let script = self.load_script().await?;
        let browser = HeadlessBrowser::launch(self.chrome_executable.as_deref()).await?;

        let outcome = match browser.open(url, self.navigation_timeout).await {
            Ok(page) => self.run_on(&page, script).await,
            Err(e) => Err(e),
        };
        browser.close().await;

        if let Ok(findings) = &outcome {
            tracing::debug!(target_url = %url, violations = findings.violation_count(), "axe scan finished");
        }
        outcome
    }
}
