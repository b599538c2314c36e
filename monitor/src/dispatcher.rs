//! Consumer-side tick loop
//!
//! Runs on the presentation side, independent of the polling cadence.
//! Each tick drains the channel without blocking; when a batch arrives
//! it is forwarded synchronously to the presenter and stamped as the
//! "last updated" time.

use crate::channel::ResultChannel;
use crate::display::Presenter;
use chrono::{DateTime, Local};
use log::info;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub struct Dispatcher<P: Presenter> {
    channel: ResultChannel,
    presenter: P,
    tick: Duration,
    last_updated: Option<DateTime<Local>>,
}

impl<P: Presenter> Dispatcher<P> {
    pub fn new(channel: ResultChannel, presenter: P, tick: Duration) -> Self {
        Self {
            channel,
            presenter,
            tick,
            last_updated: None,
        }
    }

    /// Arrival time of the most recently presented batch.
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    /// One tick's worth of work: drain, forward, stamp. Returns whether
    /// a batch was presented.
    pub fn poll_once(&mut self) -> bool {
        let Some(batch) = self.channel.try_drain() else {
            return false;
        };
        self.presenter.present(&batch);
        let now = Local::now();
        self.last_updated = Some(now);
        info!(
            "presented {} servers, last updated {}",
            batch.len(),
            now.format(TIMESTAMP_FORMAT)
        );
        true
    }

    pub async fn run(mut self) {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.poll_once();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{FailureReason, QueryOutcome, ResultBatch, ServerAddress};

    #[derive(Default)]
    struct RecordingPresenter {
        seen: Vec<ResultBatch>,
    }

    impl Presenter for &mut RecordingPresenter {
        fn present(&mut self, batch: &ResultBatch) {
            self.seen.push(batch.clone());
        }
    }

    fn batch_with_port(port: u16) -> ResultBatch {
        let address = ServerAddress::new("example.org", port);
        ResultBatch::new(vec![(
            address.clone(),
            QueryOutcome::Failure {
                address,
                reason: FailureReason::Timeout,
            },
        )])
    }

    #[test]
    fn empty_channel_leaves_presentation_untouched() {
        let mut presenter = RecordingPresenter::default();
        let mut dispatcher =
            Dispatcher::new(ResultChannel::new(), &mut presenter, Duration::from_millis(250));
        assert!(!dispatcher.poll_once());
        assert!(dispatcher.last_updated().is_none());
        assert!(presenter.seen.is_empty());
    }

    #[test]
    fn drained_batch_is_presented_once_and_stamped() {
        let channel = ResultChannel::new();
        let mut presenter = RecordingPresenter::default();
        {
            let mut dispatcher =
                Dispatcher::new(channel.clone(), &mut presenter, Duration::from_millis(250));
            channel.publish(batch_with_port(1));
            assert!(dispatcher.poll_once());
            assert!(dispatcher.last_updated().is_some());
            assert!(!dispatcher.poll_once(), "second tick finds nothing");
        }
        assert_eq!(presenter.seen.len(), 1);
    }

    #[test]
    fn dispatcher_sees_only_the_latest_batch() {
        let channel = ResultChannel::new();
        let mut presenter = RecordingPresenter::default();
        {
            let mut dispatcher =
                Dispatcher::new(channel.clone(), &mut presenter, Duration::from_millis(250));
            channel.publish(batch_with_port(1));
            channel.publish(batch_with_port(2));
            assert!(dispatcher.poll_once());
        }
        assert_eq!(presenter.seen.len(), 1);
        assert_eq!(presenter.seen[0].entries()[0].0.port, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_presents_on_its_tick() {
        struct CountingPresenter(std::sync::Arc<std::sync::atomic::AtomicUsize>);
        impl Presenter for CountingPresenter {
            fn present(&mut self, _batch: &ResultBatch) {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }

        let channel = ResultChannel::new();
        let presented = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(
            channel.clone(),
            CountingPresenter(presented.clone()),
            Duration::from_millis(250),
        );
        let handle = tokio::spawn(dispatcher.run());

        channel.publish(batch_with_port(1));
        tokio::time::advance(Duration::from_millis(250)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(presented.load(std::sync::atomic::Ordering::SeqCst), 1);

        handle.abort();
    }
}
