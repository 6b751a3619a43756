//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-IP window on /audit and /report)
//!     → handler
//! Outgoing response:
//!     → headers.rs (CSP, HSTS, X-Frame-Options, X-Content-Type-Options, Referrer-Policy)
//! ```
//!
//! # Design Decisions
//! - Limits are per client IP; no trust in forwarded headers
//! - Rejections are JSON like every other error response

pub mod headers;
pub mod rate_limit;
