//! Audit core.
//!
//! # Data Flow
//! ```text
//! raw url
//!     → target.rs (normalize → AuditTarget)
//!     → orchestrator.rs (cache check, coalescing, queueing)
//!     → engines (lighthouse, axe, header fetch)
//!     → headers.rs (missing security headers)
//!     → scoring.rs (smart score, grade, suggestions)
//!     → AuditResult (types.rs), stored in the cache
//! ```
//!
//! # Design Decisions
//! - Normalization, header checks and scoring are pure functions
//! - The orchestrator owns no results; the cache does
//! - Header fetch failures degrade, engine failures fail the audit

pub mod error;
pub mod headers;
pub mod inflight;
pub mod orchestrator;
pub mod scoring;
pub mod target;
pub mod types;

pub use error::AuditError;
pub use orchestrator::{AuditOutcome, AuditService};
pub use target::AuditTarget;
pub use types::{AccessibilityFindings, AuditResult, Grade, SubScores};
