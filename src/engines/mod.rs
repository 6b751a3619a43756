//! External audit engines.
//!
//! # Data Flow
//! ```text
//! AuditTarget
//!     → lighthouse.rs (performance / SEO / accessibility category scores)
//!     → axe.rs        (accessibility violations, via browser.rs)
//!     → fetch.rs      (response headers for the compliance check)
//! ```
//!
//! # Design Decisions
//! - Each engine is a capability trait so the orchestrator can run against test doubles
//! - Engines never retry; a failure is reported once
//! - Errors carry strings only so they can be cloned to coalesced waiters

pub mod axe;
pub mod browser;
pub mod fetch;
pub mod lighthouse;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::audit::types::AccessibilityFindings;
use crate::config::AuditConfig;

pub use axe::AxeScanner;
pub use fetch::ReqwestHeaderFetcher;
pub use lighthouse::{LighthouseCli, LighthouseReport};

/// Errors that can occur while running an external engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Headless browser could not be started.
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Browser could not load the target.
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// A bounded step did not finish in time.
    #[error("{stage} timed out after {secs} seconds")]
    Timeout { stage: &'static str, secs: u64 },

    /// The Lighthouse process could not run or exited unsuccessfully.
    #[error("Lighthouse failed: {0}")]
    Lighthouse(String),

    /// axe-core could not be injected or evaluated.
    #[error("Accessibility scan failed: {0}")]
    Scan(String),

    /// An engine produced output that does not match its contract.
    #[error("Malformed engine output: {0}")]
    Malformed(String),

    /// Plain HTTP request to the target failed.
    #[error("HTTP fetch failed: {0}")]
    Fetch(String),

    /// PDF rendering failed.
    #[error("Report rendering failed: {0}")]
    Render(String),
}

/// Performance / SEO / accessibility category scorer.
#[async_trait]
pub trait PerformanceAuditor: Send + Sync {
    async fn audit(&self, url: &str) -> Result<LighthouseReport, EngineError>;
}

/// Accessibility violation scanner.
#[async_trait]
pub trait AccessibilityScanner: Send + Sync {
    async fn scan(&self, url: &str) -> Result<AccessibilityFindings, EngineError>;
}

/// Fetches the target and returns its response headers, names lower-cased.
#[async_trait]
pub trait HeaderFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<HashMap<String, String>, EngineError>;
}

/// The set of engines one audit pipeline runs.
#[derive(Clone)]
pub struct Engines {
    pub performance: Arc<dyn PerformanceAuditor>,
    pub accessibility: Arc<dyn AccessibilityScanner>,
    pub headers: Arc<dyn HeaderFetcher>,
}

impl Engines {
    /// Production engines: Lighthouse CLI, axe-core in headless Chromium, reqwest.
    pub fn from_config(config: &AuditConfig) -> Result<Self, EngineError> {
        let engines = &config.engines;
        let navigation_timeout = Duration::from_secs(config.timeouts.navigation_secs);

        let performance = LighthouseCli::new(&engines.lighthouse_bin, &engines.lighthouse_chrome_flags);
        let accessibility = AxeScanner::new(
            &engines.axe_script_path,
            engines.chrome_executable.clone(),
            navigation_timeout,
        );
        let headers = ReqwestHeaderFetcher::new(
            Duration::from_secs(config.timeouts.header_fetch_secs),
            &engines.user_agent,
        )?;

        Ok(Self {
            performance: Arc::new(performance),
            accessibility: Arc::new(accessibility),
            headers: Arc::new(headers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::Timeout {
            stage: "Navigation",
            secs: 30,
        };
        assert_eq!(err.to_string(), "Navigation timed out after 30 seconds");

        let err = EngineError::Navigation {
            url: "https://example.com/".into(),
            message: "net::ERR_NAME_NOT_RESOLVED".into(),
        };
        assert!(err.to_string().contains("https://example.com/"));
    }

    #[test]
    fn test_production_engines_build_from_defaults() {
        let engines = Engines::from_config(&AuditConfig::default());
        assert!(engines.is_ok());
    }
}
