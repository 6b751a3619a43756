//! FIFO audit queue.
//!
//! Submitted jobs go through an unbounded channel to a single dispatcher
//! task. The dispatcher admits jobs in arrival order, one per free worker
//! permit, and spawns each admitted job on its own task. A job keeps its
//! permit until it finishes or panics, and runs to completion even when its
//! submitter stops waiting.

use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Semaphore};

use crate::observability::metrics;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Errors returned to a submitter instead of the job's output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The dispatcher has stopped accepting jobs.
    #[error("Audit queue is closed")]
    Closed,

    /// The job ended without producing output (it panicked).
    #[error("Audit job aborted before completion")]
    Aborted,
}

/// Bounded-concurrency execution queue for audit pipelines.
pub struct AuditScheduler {
    jobs: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
    concurrency: usize,
}

impl AuditScheduler {
    /// Create a queue running at most `concurrency` jobs at once.
    ///
    /// Must be called from within a Tokio runtime; the dispatcher is spawned here.
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        let (jobs, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        tokio::spawn(dispatch(receiver, Arc::new(Semaphore::new(concurrency)), pending.clone()));

        Self {
            jobs,
            pending,
            concurrency,
        }
    }

    /// Run `job` once it is admitted and wait for its output.
    pub async fn submit<F, T>(&self, job: F) -> Result<T, SchedulerError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done, output) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = done.send(job.await);
        });

        let depth = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_queue_depth(depth);
        if self.jobs.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(SchedulerError::Closed);
        }

        output.await.map_err(|_| SchedulerError::Aborted)
    }

    /// Jobs submitted but not yet admitted.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

async fn dispatch(mut receiver: mpsc::UnboundedReceiver<Job>, permits: Arc<Semaphore>, pending: Arc<AtomicUsize>) {
    while let Some(job) = receiver.recv().await {
        let permit = match permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let depth = pending.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        metrics::set_queue_depth(depth);
        tracing::debug!(queued = depth, "Audit job admitted");

        tokio::spawn(async move {
            if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                tracing::error!("Audit job panicked");
            }
            drop(permit);
        });
    }
    tracing::debug!("Audit queue dispatcher stopped");
}
