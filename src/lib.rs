//! Website audit service library.

pub mod audit;
pub mod cache;
pub mod config;
pub mod engines;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod report;
pub mod scheduler;
pub mod security;

pub use audit::AuditService;
pub use config::schema::AuditConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
