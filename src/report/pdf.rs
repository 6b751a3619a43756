//! PDF printing through headless Chromium.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use std::time::Instant;

use crate::audit::types::AuditResult;
use crate::engines::browser::HeadlessBrowser;
use crate::engines::EngineError;
use crate::report::html::render_html;
use crate::report::ReportRenderer;

/// Prints the HTML report to PDF in a fresh headless browser.
#[derive(Debug, Clone, Default)]
pub struct ChromiumPdfRenderer {
    chrome_executable: Option<String>,
}

impl ChromiumPdfRenderer {
    pub fn new(chrome_executable: Option<String>) -> Self {
        Self { chrome_executable }
    }
}

#[async_trait]
impl ReportRenderer for ChromiumPdfRenderer {
    async fn render(&self, result: Option<&AuditResult>) -> Result<Vec<u8>, EngineError> {
        let start = Instant::now();
        let html = render_html(result);
        let browser = HeadlessBrowser::launch(self.chrome_executable.as_deref()).await?;

        let printed = async {
            let page = browser.blank_page().await?;
            page.set_content(html)
                .await
                .map_err(|e| EngineError::Render(e.to_string()))?;
            let params = PrintToPdfParams {
                print_background: Some(true),
                ..Default::default()
            };
            page.pdf(params).await.map_err(|e| EngineError::Render(e.to_string()))
        }
        .await;
        browser.close().await;

        if let Ok(bytes) = &printed {
            tracing::debug!(bytes = bytes.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Report printed");
        }
        printed
    }
}
