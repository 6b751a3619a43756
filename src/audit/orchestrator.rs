//! Audit orchestration.
//!
//! ```text
//! NORMALIZE → CACHE_CHECK ─ hit ─────────────────────────────────────→ return (cached)
//!                └─ miss → COALESCE → ENQUEUE → RUN_ENGINES → DERIVE_SECURITY
//!                                           → AGGREGATE_SCORE → STORE → return
//! ```
//!
//! Everything from RUN_ENGINES to STORE runs inside a single scheduler job.

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Instant;

use crate::audit::error::AuditError;
use crate::audit::headers::check_headers;
use crate::audit::inflight::{InFlight, PipelineOutput, Role};
use crate::audit::scoring::{aggregate, ScoreInput};
use crate::audit::target::AuditTarget;
use crate::audit::types::{AccessibilityFindings, AuditResult, AxeSummary, SubScores};
use crate::cache::{self, ResultCache};
use crate::config::AuditConfig;
use crate::engines::{EngineError, Engines, LighthouseReport};
use crate::observability::metrics;
use crate::scheduler::AuditScheduler;

/// An audit result plus where it came from.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub result: Arc<AuditResult>,
    /// Served from the result cache without running the pipeline.
    pub cached: bool,
}

/// Coordinates cache, queue and engines for each audit request.
///
/// Holds only shared handles; every call is independent apart from its
/// effect on the cache, the queue and the in-flight registry.
pub struct AuditService {
    cache: Arc<ResultCache>,
    scheduler: Arc<AuditScheduler>,
    engines: Engines,
    in_flight: Option<Arc<InFlight>>,
}

impl AuditService {
    pub fn new(
        cache: Arc<ResultCache>,
        scheduler: Arc<AuditScheduler>,
        engines: Engines,
        coalesce_in_flight: bool,
    ) -> Self {
        Self {
            cache,
            scheduler,
            engines,
            in_flight: coalesce_in_flight.then(|| Arc::new(InFlight::new())),
        }
    }

    /// Build the service with production engines. Spawns the queue dispatcher.
    pub fn from_config(config: &AuditConfig) -> Result<Self, EngineError> {
        let engines = Engines::from_config(config)?;
        Ok(Self::new(
            Arc::new(cache::from_config(&config.cache)),
            Arc::new(AuditScheduler::new(config.scheduler.concurrency)),
            engines,
            config.audit.coalesce_in_flight,
        ))
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Audit `input`, serving from cache when possible.
    pub async fn audit(&self, input: &str) -> Result<AuditOutcome, AuditError> {
        let target = AuditTarget::parse(input).ok_or(AuditError::InvalidInput)?;

        if let Some(result) = self.cache.get(&target) {
            metrics::record_cache_lookup(true);
            tracing::debug!(target_url = %target, "Serving audit from cache");
            return Ok(AuditOutcome {
                result,
                cached: true,
            });
        }
        metrics::record_cache_lookup(false);

        let result = match &self.in_flight {
            Some(in_flight) => {
                tracing::debug!(target_url = %target, in_flight = in_flight.len(), "Cache miss");
                let (output, role) = in_flight.run(&target, || self.enqueue(target.clone())).await;
                if role == Role::Follower {
                    metrics::record_coalesced();
                }
                output
            }
            None => self.enqueue(target.clone()).await,
        }?;

        Ok(AuditOutcome {
            result,
            cached: false,
        })
    }

    /// Last cached result for `input`, if any. Does not affect recency.
    pub fn cached(&self, input: &str) -> Result<Option<Arc<AuditResult>>, AuditError> {
        let target = AuditTarget::parse(input).ok_or(AuditError::InvalidInput)?;
        Ok(self.cache.peek(&target))
    }

    fn enqueue(&self, target: AuditTarget) -> BoxFuture<'static, PipelineOutput> {
        let scheduler = self.scheduler.clone();
        let engines = self.engines.clone();
        let cache = self.cache.clone();

        async move {
            tracing::info!(target_url = %target, queued = scheduler.pending(), "Audit queued");
            scheduler.submit(run_pipeline(engines, cache, target)).await?
        }
        .boxed()
    }
}

/// Engines → header check → scoring → cache write, for one target.
async fn run_pipeline(engines: Engines, cache: Arc<ResultCache>, target: AuditTarget) -> PipelineOutput {
    let start = Instant::now();
    tracing::info!(target_url = %target, "Audit started");

    let outcome = async {
        let report = engines.performance.audit(target.as_str()).await?;
        let accessibility = engines.accessibility.scan(target.as_str()).await?;

        let header_findings = match engines.headers.fetch(target.as_str()).await {
            Ok(headers) => check_headers(&headers),
            Err(e) => {
                tracing::warn!(target_url = %target, error = %e, "Header fetch failed; continuing without header findings");
                Vec::new()
            }
        };

        Ok::<_, AuditError>(build_result(
            target.clone(),
            Utc::now(),
            &report,
            accessibility,
            header_findings,
        ))
    }
    .await;

    metrics::record_pipeline_duration(start);
    match outcome {
        Ok(result) => {
            let result = Arc::new(result);
            cache.set(target.clone(), result.clone());
            metrics::record_audit("success");
            tracing::info!(
                target_url = %target,
                smart_score = result.smart_score,
                grade = %result.grade,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Audit complete"
            );
            Ok(result)
        }
        Err(e) => {
            metrics::record_audit(e.kind());
            tracing::error!(target_url = %target, error = %e, "Audit failed");
            Err(e)
        }
    }
}

/// Assemble the immutable result record from engine outputs.
pub fn build_result(
    target: AuditTarget,
    timestamp: DateTime<Utc>,
    report: &LighthouseReport,
    accessibility: AccessibilityFindings,
    header_findings: Vec<String>,
) -> AuditResult {
    let scores = SubScores {
        performance: report.performance(),
        seo: report.seo(),
        security: SubScores::derive_security(&header_findings),
        accessibility: report.accessibility(),
    };

    let card = aggregate(ScoreInput {
        scores,
        header_findings: &header_findings,
        accessibility: &accessibility,
    });

    AuditResult {
        url: target,
        timestamp,
        radar: AuditResult::radar_for(&scores),
        scores,
        header_checks: header_findings,
        axe: AxeSummary {
            violations: accessibility.violation_count().to_string(),
            details: accessibility.violations,
        },
        smart_score: card.final_score,
        grade: card.grade,
        label: card.label.to_string(),
        penalties: card.penalties,
        suggestions: card.suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::scoring::{SUGGEST_HEADERS, SUGGEST_VIOLATIONS};
    use crate::audit::types::Grade;
    use serde_json::json;

    #[test]
    fn test_build_result_derives_security_and_summary() {
        let report = LighthouseReport::from_scores(Some(0.9), Some(0.9), Some(0.9));
        let accessibility = AccessibilityFindings {
            violations: vec![json!({"id": "image-alt"}), json!({"id": "label"})],
        };
        let findings = vec!["Missing CSP".to_string()];

        let result = build_result(
            AuditTarget::parse("example.com").unwrap(),
            Utc::now(),
            &report,
            accessibility,
            findings,
        );

        assert_eq!(result.scores.security, 70);
        assert_eq!(result.axe.violations, "2");
        assert_eq!(result.axe.details[0]["id"], "image-alt");
        // base = 31.5 + 22.5 + 17.5 + 13.5 = 85; penalties 5 + 4
        assert_eq!(result.penalties, 9);
        assert_eq!(result.smart_score, 76);
        assert_eq!(result.grade, Grade::B);
        assert_eq!(result.label, "Good");
        assert_eq!(result.suggestions, vec![SUGGEST_HEADERS, SUGGEST_VIOLATIONS]);
        assert_eq!(result.radar[2].value, 70);
    }

    #[test]
    fn test_result_json_shape() {
        let result = build_result(
            AuditTarget::parse("example.com").unwrap(),
            Utc::now(),
            &LighthouseReport::default(),
            AccessibilityFindings::default(),
            Vec::new(),
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["url"], "https://example.com/");
        assert_eq!(value["scores"]["security"], 80);
        assert_eq!(value["headerChecks"], json!([]));
        assert_eq!(value["axe"]["violations"], "0");
        assert_eq!(value["smartScore"], 20);
        assert_eq!(value["grade"], "D");
        assert_eq!(value["radar"][0]["metric"], "Performance");
        assert!(value["timestamp"].is_string());
    }
}
