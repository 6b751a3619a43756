//! Headless Chromium sessions.
//!
//! One browser per use: the accessibility scan and the PDF renderer each
//! launch, use and close their own instance. Audits are serialized by the
//! scheduler, so at most one scan browser is alive at a time.

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::engines::EngineError;

/// A launched browser plus the task driving its CDP event loop.
pub struct HeadlessBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl HeadlessBrowser {
    /// Launch a new headless instance.
    pub async fn launch(chrome_executable: Option<&str>) -> Result<Self, EngineError> {
        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .no_sandbox()
            .args(vec!["--disable-gpu", "--disable-dev-shm-usage"]);
        if let Some(path) = chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(EngineError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| EngineError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::debug!("Headless browser launched");
        Ok(Self { browser, handler })
    }

    /// Open a blank page.
    pub async fn blank_page(&self) -> Result<Page, EngineError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Launch(format!("could not open page: {}", e)))
    }

    /// Open a page and navigate it to `url`, giving up after `timeout`.
    pub async fn open(&self, url: &str, timeout: Duration) -> Result<Page, EngineError> {
        let page = self.blank_page().await?;
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(page),
            Ok(Err(e)) => Err(EngineError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(EngineError::Timeout {
                stage: "Navigation",
                secs: timeout.as_secs(),
            }),
        }
    }

    /// Close the browser and stop its event loop.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "Failed to close browser cleanly");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "Failed to reap browser process");
        }
        self.handler.abort();
    }
}
