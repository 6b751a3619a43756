//! Report rendering.
//!
//! `html.rs` turns a cached result into a page; `pdf.rs` prints that page
//! with headless Chromium. The HTTP layer only sees [`ReportRenderer`].

pub mod html;
pub mod pdf;

use async_trait::async_trait;

use crate::audit::types::AuditResult;
use crate::engines::EngineError;

pub use pdf::ChromiumPdfRenderer;

/// Turns an audit result (or its absence) into a PDF document.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(&self, result: Option<&AuditResult>) -> Result<Vec<u8>, EngineError>;
}
