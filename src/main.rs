//! Website audit service (v1)
//!
//! Audits a website for performance, SEO, accessibility and security-header
//! compliance and serves a graded summary over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────────┐
//!                          │                   SITE AUDIT                       │
//!                          │                                                    │
//!   GET /audit?url=        │  ┌────────┐   ┌───────────┐   ┌──────────────┐    │
//!   ───────────────────────┼─▶│  http  │──▶│  audit    │──▶│    cache     │    │
//!                          │  │ server │   │ normalize │   │  LRU + TTL   │    │
//!                          │  └────────┘   └─────┬─────┘   └──────────────┘    │
//!                          │                     │ miss                        │
//!                          │                     ▼                             │
//!                          │              ┌─────────────┐   ┌─────────────┐    │
//!                          │              │  in-flight  │──▶│  scheduler  │    │
//!                          │              │  registry   │   │ (one at a   │    │
//!                          │              └─────────────┘   │    time)    │    │
//!                          │                                └──────┬──────┘    │
//!                          │                                       ▼           │
//!   JSON / PDF             │  ┌────────┐   ┌───────────┐   ┌─────────────┐    │
//!   ◀──────────────────────┼──│ report │◀──│  scoring  │◀──│   engines   │◀───┼── Lighthouse,
//!                          │  └────────┘   └───────────┘   └─────────────┘    │   Chromium + axe,
//!                          │                                                    │   target headers
//!                          │   config · observability · security · lifecycle    │
//!                          └───────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use site_audit::audit::AuditService;
use site_audit::cache;
use site_audit::config::load_or_default;
use site_audit::http::HttpServer;
use site_audit::lifecycle::{signals, Shutdown};
use site_audit::observability::{logging, metrics};
use site_audit::report::ChromiumPdfRenderer;

#[derive(Parser)]
#[command(name = "site-audit")]
#[command(about = "Website audit service", long_about = None)]
struct Args {
    /// Path to a TOML config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("site-audit v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_capacity = config.cache.capacity,
        cache_ttl_secs = config.cache.ttl_secs,
        concurrency = config.scheduler.concurrency,
        coalesce = config.audit.coalesce_in_flight,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let audits = Arc::new(AuditService::from_config(&config)?);
    let sweeper = cache::spawn_sweeper(
        audits.cache().clone(),
        Duration::from_secs(config.cache.sweep_interval_secs),
        shutdown.subscribe(),
    );
    let renderer = Arc::new(ChromiumPdfRenderer::new(config.engines.chrome_executable.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    signals::trigger_on_signal(shutdown.clone());

    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, audits, renderer);
    server.run(listener, server_shutdown).await?;

    let _ = sweeper.await;
    tracing::info!("Shutdown complete");
    Ok(())
}
