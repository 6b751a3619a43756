//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the audit service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the audit service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Result cache sizing and expiry.
    pub cache: CacheConfig,

    /// Audit queue settings.
    pub scheduler: SchedulerConfig,

    /// Orchestration behaviour.
    pub audit: PipelineConfig,

    /// External engine invocation.
    pub engines: EngineConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Security hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout for the HTTP surface in seconds.
    ///
    /// Audits are slow; this bounds how long a client waits, not the job itself.
    pub request_secs: u64,

    /// Header fetch timeout in seconds.
    pub header_fetch_secs: u64,

    /// Page navigation timeout for browser sessions in seconds.
    pub navigation_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 180,
            header_fetch_secs: 30,
            navigation_secs: 30,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached audit results.
    pub capacity: usize,

    /// Time-to-live of a cached result in seconds.
    pub ttl_secs: u64,

    /// Interval of the background sweep that drops expired entries.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 200,
            ttl_secs: 15 * 60,
            sweep_interval_secs: 60,
        }
    }
}

/// Audit queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of audit jobs allowed to run at once.
    pub concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Share one pipeline between concurrent requests for the same target.
    pub coalesce_in_flight: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            coalesce_in_flight: true,
        }
    }
}

/// External engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lighthouse executable (resolved through PATH when not absolute).
    pub lighthouse_bin: String,

    /// Flags passed to the Chrome instance Lighthouse launches.
    pub lighthouse_chrome_flags: String,

    /// Path to the axe-core bundle injected into scanned pages.
    pub axe_script_path: String,

    /// Explicit Chromium executable; auto-detected when unset.
    pub chrome_executable: Option<String>,

    /// User agent sent by the header fetch.
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lighthouse_bin: "lighthouse".to_string(),
            lighthouse_chrome_flags: "--headless=new --no-sandbox --disable-gpu".to_string(),
            axe_script_path: "node_modules/axe-core/axe.min.js".to_string(),
            chrome_executable: None,
            user_agent: concat!("site-audit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting on the audit and report routes.
    pub enabled: bool,

    /// Requests allowed per client within one window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 6,
            window_secs: 60,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
