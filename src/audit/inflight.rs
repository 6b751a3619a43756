//! Single-flight registry for audit pipelines.
//!
//! The first caller for a target becomes the leader: its pipeline is spawned
//! on a task of its own and registered under the target. Callers arriving
//! while it is registered await the same task instead of starting their own.
//! The task unregisters itself after the pipeline returns, which is after the
//! cache write, so a cancelled caller never frees the slot early.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::audit::error::AuditError;
use crate::audit::target::AuditTarget;
use crate::audit::types::AuditResult;
use crate::scheduler::SchedulerError;

pub type PipelineOutput = Result<Arc<AuditResult>, AuditError>;
type Flight = Shared<BoxFuture<'static, PipelineOutput>>;

/// Whether a caller started the pipeline or joined one already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
}

/// In-flight pipelines keyed by target.
#[derive(Default)]
pub struct InFlight {
    flights: Arc<DashMap<AuditTarget, (u64, Flight)>>,
    next_id: AtomicU64,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the pipeline for `target`, starting it with `start` only when
    /// no flight for the target is registered.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn run<F>(&self, target: &AuditTarget, start: F) -> (PipelineOutput, Role)
    where
        F: FnOnce() -> BoxFuture<'static, PipelineOutput>,
    {
        let (flight, role) = match self.flights.entry(target.clone()) {
            Entry::Occupied(entry) => (entry.get().1.clone(), Role::Follower),
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let flight = self.launch(target.clone(), id, start());
                entry.insert((id, flight.clone()));
                (flight, Role::Leader)
            }
        };

        if role == Role::Follower {
            tracing::debug!(target_url = %target, "Joined in-flight audit");
        }
        (flight.await, role)
    }

    fn launch(&self, target: AuditTarget, id: u64, pipeline: BoxFuture<'static, PipelineOutput>) -> Flight {
        let flights = self.flights.clone();
        let task = tokio::spawn(async move {
            let output = pipeline.await;
            flights.remove_if(&target, |_, (current, _)| *current == id);
            output
        });

        async move {
            match task.await {
                Ok(output) => output,
                Err(e) => {
                    tracing::error!(error = %e, "In-flight audit task failed");
                    Err(AuditError::Scheduler(SchedulerError::Aborted))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Number of targets with a registered flight.
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
