//! Shared utilities for integration testing.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use site_audit::audit::{AccessibilityFindings, AuditResult, AuditService};
use site_audit::cache::ResultCache;
use site_audit::config::AuditConfig;
use site_audit::engines::{
    AccessibilityScanner, EngineError, Engines, HeaderFetcher, LighthouseReport, PerformanceAuditor,
};
use site_audit::http::HttpServer;
use site_audit::lifecycle::Shutdown;
use site_audit::report::ReportRenderer;
use site_audit::scheduler::AuditScheduler;

/// Every security header the checker looks for.
pub fn compliant_headers() -> HashMap<String, String> {
    [
        ("content-security-policy", "default-src 'self'"),
        ("strict-transport-security", "max-age=31536000"),
        ("x-frame-options", "DENY"),
        ("x-content-type-options", "nosniff"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Performance engine returning fixed category scores.
pub struct StubPerformance {
    pub report: LighthouseReport,
    pub delay: Duration,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubPerformance {
    pub fn scoring(performance: f64, accessibility: f64, seo: f64) -> Self {
        Self {
            report: LighthouseReport::from_scores(Some(performance), Some(accessibility), Some(seo)),
            delay: Duration::ZERO,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing() -> Self {
        let mut stub = Self::scoring(0.0, 0.0, 0.0);
        stub.fail = true;
        stub
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PerformanceAuditor for StubPerformance {
    async fn audit(&self, _url: &str) -> Result<LighthouseReport, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(EngineError::Lighthouse("exit status 1".into()));
        }
        Ok(self.report.clone())
    }
}

/// Accessibility engine returning a fixed number of violations, or failing.
pub struct StubAccessibility {
    pub violations: usize,
    pub fail: bool,
}

#[async_trait]
impl AccessibilityScanner for StubAccessibility {
    async fn scan(&self, url: &str) -> Result<AccessibilityFindings, EngineError> {
        if self.fail {
            return Err(EngineError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".into(),
            });
        }
        Ok(AccessibilityFindings {
            violations: (0..self.violations)
                .map(|i| serde_json::json!({ "id": format!("rule-{}", i), "help": "Fix it" }))
                .collect(),
        })
    }
}

/// Header fetcher returning a fixed map, or failing.
pub struct StubHeaders {
    pub headers: Option<HashMap<String, String>>,
}

#[async_trait]
impl HeaderFetcher for StubHeaders {
    async fn fetch(&self, url: &str) -> Result<HashMap<String, String>, EngineError> {
        self.headers.clone().ok_or_else(|| EngineError::Fetch(format!("connection refused: {}", url)))
    }
}

/// Renderer echoing the audited URL instead of printing a real PDF.
pub struct StubRenderer;

#[async_trait]
impl ReportRenderer for StubRenderer {
    async fn render(&self, result: Option<&AuditResult>) -> Result<Vec<u8>, EngineError> {
        let mut pdf = b"%PDF-1.4\n".to_vec();
        if let Some(result) = result {
            pdf.extend_from_slice(result.url.as_str().as_bytes());
        }
        Ok(pdf)
    }
}

/// Records how many engine calls are running at once.
#[derive(Default)]
pub struct ActivityTracker {
    active: AtomicUsize,
    peak: AtomicUsize,
    pub calls: AtomicUsize,
}

impl ActivityTracker {
    async fn enter(&self, hold: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(hold).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// One stub standing in for every engine, reporting into a shared tracker.
pub struct TrackedEngine {
    pub tracker: Arc<ActivityTracker>,
    pub hold: Duration,
}

#[async_trait]
impl PerformanceAuditor for TrackedEngine {
    async fn audit(&self, _url: &str) -> Result<LighthouseReport, EngineError> {
        self.tracker.enter(self.hold).await;
        Ok(LighthouseReport::from_scores(Some(1.0), Some(1.0), Some(1.0)))
    }
}

#[async_trait]
impl AccessibilityScanner for TrackedEngine {
    async fn scan(&self, _url: &str) -> Result<AccessibilityFindings, EngineError> {
        self.tracker.enter(self.hold).await;
        Ok(AccessibilityFindings::default())
    }
}

#[async_trait]
impl HeaderFetcher for TrackedEngine {
    async fn fetch(&self, _url: &str) -> Result<HashMap<String, String>, EngineError> {
        self.tracker.enter(self.hold).await;
        Ok(compliant_headers())
    }
}

/// Audit service over stub engines with the default cache and scheduler.
pub fn stub_service(
    performance: Arc<StubPerformance>,
    violations: usize,
    headers: Option<HashMap<String, String>>,
    coalesce: bool,
) -> Arc<AuditService> {
    service_with_engines(
        Engines {
            performance,
            accessibility: Arc::new(StubAccessibility { violations, fail: false }),
            headers: Arc::new(StubHeaders { headers }),
        },
        coalesce,
    )
}

/// Audit service over the given engines with the default cache and scheduler.
pub fn service_with_engines(engines: Engines, coalesce: bool) -> Arc<AuditService> {
    let config = AuditConfig::default();
    Arc::new(AuditService::new(
        Arc::new(ResultCache::new(config.cache.capacity, Duration::from_secs(config.cache.ttl_secs))),
        Arc::new(AuditScheduler::new(config.scheduler.concurrency)),
        engines,
        coalesce,
    ))
}

/// Bind the HTTP server on an ephemeral port and serve until `shutdown` fires.
pub async fn spawn_server(config: AuditConfig, audits: Arc<AuditService>, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, audits, Arc::new(StubRenderer));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    addr
}

/// Client without connection pooling or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a programmable mock backend with async support.
///
/// The closure returns status, extra response headers and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Vec<(&'static str, &'static str)>, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request line and headers before replying.
                        let mut buf = [0u8; 4096];
                        let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;

                        let (status, headers, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            301 => "301 Moved Permanently",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let extra: String = headers
                            .iter()
                            .map(|(name, value)| format!("{}: {}\r\n", name, value))
                            .collect();

                        let response_str = format!(
                            "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            extra,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
