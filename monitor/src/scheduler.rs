//! Cycle scheduling: trigger, poll, publish, re-arm
//!
//! The original design re-scheduled itself recursively after each
//! worker run; here the schedule is an explicit loop owned by one
//! background task. Cycles never overlap because the next trigger is
//! only armed after the current cycle's publish, and the re-arm timer
//! is measured from the trigger instant, so a slow cycle shortens the
//! idle gap instead of drifting the cadence.

use crate::channel::ResultChannel;
use crate::poller::BatchPoller;
use crate::servers::ServerList;
use log::info;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Shared polling state: the refresh interval and whether a cycle is
/// currently running. Settable from the consumer side at any time; the
/// interval is read fresh at each re-arm, so a change never retimes the
/// in-flight cycle.
#[derive(Debug, Clone)]
pub struct PollState {
    inner: Arc<PollStateInner>,
}

#[derive(Debug)]
struct PollStateInner {
    interval_secs: AtomicU64,
    in_flight: AtomicBool,
}

impl PollState {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            inner: Arc::new(PollStateInner {
                interval_secs: AtomicU64::new(interval_secs.max(1)),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.inner.interval_secs.load(Ordering::Relaxed))
    }

    /// Updates the refresh interval. Zero is rejected, matching the
    /// original settings dialog's validation.
    pub fn set_interval_secs(&self, secs: u64) {
        if secs > 0 {
            self.inner.interval_secs.store(secs, Ordering::Relaxed);
            info!("poll interval set to {}s", secs);
        }
    }

    pub fn cycle_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::Relaxed)
    }

    fn mark_cycle(&self, running: bool) {
        self.inner.in_flight.store(running, Ordering::Relaxed);
    }
}

/// Runs polling cycles serially, forever. Torn down by aborting its
/// task; an abandoned cycle needs no cleanup.
pub struct CycleScheduler {
    servers: ServerList,
    state: PollState,
    poller: BatchPoller,
    channel: ResultChannel,
}

impl CycleScheduler {
    pub fn new(
        servers: ServerList,
        state: PollState,
        poller: BatchPoller,
        channel: ResultChannel,
    ) -> Self {
        Self {
            servers,
            state,
            poller,
            channel,
        }
    }

    pub async fn run(self) {
        loop {
            let triggered = Instant::now();
            self.state.mark_cycle(true);

            // Immutable snapshot: list mutations land in the next cycle,
            // never mid-cycle.
            let snapshot = self.servers.snapshot().await;
            let batch = self.poller.run_cycle(&snapshot).await;
            self.channel.publish(batch);

            self.state.mark_cycle(false);
            let interval = self.state.interval();
            sleep_until(triggered + interval).await;
        }
    }
}
