//! Route handlers.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

use crate::audit::AuditError;
use crate::http::response::AuditBody;
use crate::http::server::AppState;
use crate::observability::metrics;

/// `?url=` query shared by `/audit` and `/report`.
#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

impl UrlQuery {
    fn raw(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true, "message": "Site audit service is running" }))
}

pub async fn audit(State(state): State<AppState>, Query(query): Query<UrlQuery>) -> Response {
    let start = Instant::now();
    match state.audits.audit(query.raw()).await {
        Ok(outcome) => {
            metrics::record_request(if outcome.cached { "cached" } else { "completed" });
            tracing::info!(
                target_url = %outcome.result.url,
                cached = outcome.cached,
                score = outcome.result.smart_score,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Audit served"
            );
            let body = AuditBody {
                result: &outcome.result,
                cached: outcome.cached,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            metrics::record_request(e.kind());
            match &e {
                AuditError::InvalidInput => {
                    tracing::debug!(input = %query.raw(), "Rejected audit input")
                }
                _ => tracing::error!(input = %query.raw(), error = %e, "Audit failed"),
            }
            e.into_response()
        }
    }
}

pub async fn report(State(state): State<AppState>, Query(query): Query<UrlQuery>) -> Response {
    let cached = match state.audits.cached(query.raw()) {
        Ok(cached) => cached,
        Err(e) => return e.into_response(),
    };

    match state.renderer.render(cached.as_deref()).await {
        Ok(pdf) => ([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response(),
        Err(e) => {
            tracing::error!(input = %query.raw(), error = %e, "Report rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Report failed", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}
