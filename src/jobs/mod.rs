//! Background work detached from the webhook request cycle.
//!
//! The host gives no delivery guarantee for work that outlives the
//! HTTP response, so a detached task is best-effort by contract. Each
//! one runs behind its own error boundary: a failure is logged and
//! never unwinds into the worker.

use std::future::Future;

use anyhow::Result;

/// Spawn a task that keeps running after the response is returned.
pub fn spawn_detached<F>(name: &'static str, task: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = task.await {
            tracing::error!("Detached task {} failed: {}", name, err);
        }
    });
}
