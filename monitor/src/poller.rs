//! Fan-out execution of one polling cycle
//!
//! Every address in the snapshot is queried on its own spawned task, so
//! the slowest server bounds the cycle's wall clock but no server can
//! delay or corrupt another's outcome. Handles are joined in input
//! order, which keeps the batch order identical to the input list no
//! matter in which order queries complete.

use crate::query;
use log::{debug, error};
use shared::{FailureReason, QueryOutcome, ResultBatch, ServerAddress};
use std::time::Duration;

/// Runs one full polling cycle per call; holds only the per-query timeout.
#[derive(Debug, Clone, Copy)]
pub struct BatchPoller {
    query_timeout: Duration,
}

impl BatchPoller {
    pub fn new(query_timeout: Duration) -> Self {
        Self { query_timeout }
    }

    /// Queries every address concurrently and reassembles the outcomes
    /// into a batch matching the input order and length.
    pub async fn run_cycle(&self, addresses: &[ServerAddress]) -> ResultBatch {
        let timeout = self.query_timeout;
        let handles: Vec<_> = addresses
            .iter()
            .map(|address| {
                let address = address.clone();
                (
                    address.clone(),
                    tokio::spawn(async move { query::query(&address, timeout).await }),
                )
            })
            .collect();

        let mut entries = Vec::with_capacity(handles.len());
        for (address, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                // A panicked query task still yields a failure row
                // instead of aborting the cycle.
                Err(e) => {
                    error!("query task for {} did not finish: {}", address, e);
                    QueryOutcome::Failure {
                        address: address.clone(),
                        reason: FailureReason::Transport,
                    }
                }
            };
            entries.push((address, outcome));
        }

        debug!(
            "cycle complete: {}/{} servers responded",
            entries.iter().filter(|(_, o)| o.is_success()).count(),
            entries.len()
        );
        ResultBatch::new(entries)
    }
}
