//! Audit scheduling subsystem.
//!
//! # Data Flow
//! ```text
//! orchestrator → submit(job)
//!     → queue.rs (FIFO channel)
//!     → dispatcher admits when a worker permit is free
//!     → job runs on its own task
//!     → output returned to the submitter
//! ```
//!
//! # Design Decisions
//! - Default concurrency is one: every audit pipeline is globally serialized
//! - No priority, cancellation or deduplication at this level
//! - A panicking job releases its permit; the queue keeps going

pub mod queue;

pub use queue::{AuditScheduler, SchedulerError};
