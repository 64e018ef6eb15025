//! Notification polling loop.
//!
//! One poller owns one watermark. Each cycle fetches the notifications newer
//! than the watermark, updates the badges in batch order, moves the watermark
//! to the last timestamp seen, then sleeps for the poll interval. A failed
//! fetch counts as an empty batch and is retried after the same interval.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{CounterBoard, Notification, NotificationKind, NotificationSource, Watermark};
use crate::config::{DEFAULT_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS};
use crate::error::FestivalResult;

/// Result of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    Delivered { events: usize, watermark: Watermark },
    Failed,
}

pub struct NotificationPoller<S, B> {
    source: S,
    board: B,
    watermark: Watermark,
    interval: Duration,
}

impl<S, B> NotificationPoller<S, B>
where
    S: NotificationSource,
    B: CounterBoard,
{
    pub fn new(source: S, board: B) -> Self {
        Self {
            source,
            board,
            watermark: Watermark::ZERO,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    /// A zero interval falls back to [`MIN_POLL_INTERVAL_SECS`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            warn!("Zero poll interval requested, using the minimum");
            Duration::from_secs(MIN_POLL_INTERVAL_SECS)
        } else {
            interval
        };
        self
    }

    /// Start from a known watermark instead of zero.
    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// Apply a batch in order. Every event moves the watermark, whether its
    /// kind drives a badge or not.
    pub fn apply(&mut self, batch: &[Notification]) {
        for notification in batch {
            match notification.kind.counter() {
                Some((slot, count)) => {
                    debug!(counter = %slot, count, "Updating badge");
                    self.board.set_counter(slot, count);
                }
                None => {
                    if let NotificationKind::Unknown { name } = &notification.kind {
                        debug!(name = %name, "Skipping notification without badge");
                    }
                }
            }
            self.watermark.advance(notification.timestamp);
        }
    }

    /// Run one fetch-and-apply cycle.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let since = self.watermark;
        match self.source.fetch_since(since).await {
            Ok(batch) => {
                self.apply(&batch);
                debug!(
                    events = batch.len(),
                    since = %since,
                    watermark = %self.watermark,
                    "Notification poll completed"
                );
                PollOutcome::Delivered {
                    events: batch.len(),
                    watermark: self.watermark,
                }
            }
            Err(e) => {
                warn!(error = %e, since = %since, "Notification poll failed");
                PollOutcome::Failed
            }
        }
    }
}

impl<S, B> NotificationPoller<S, B>
where
    S: NotificationSource + 'static,
    B: CounterBoard + 'static,
{
    /// Spawn the polling loop. The first poll runs immediately.
    ///
    /// Dropping the returned handle without calling [`PollerHandle::stop`]
    /// also ends the loop.
    pub fn start(self) -> PollerHandle<S, B> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (watermark_tx, watermark_rx) = watch::channel(self.watermark);
        let task = tokio::spawn(self.run(stop_rx, watermark_tx));
        PollerHandle {
            stop_tx,
            watermark_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut stop_rx: watch::Receiver<bool>,
        watermark_tx: watch::Sender<Watermark>,
    ) -> Self {
        info!(
            since = %self.watermark,
            interval_secs = self.interval.as_secs_f64(),
            "Notification poller started"
        );

        loop {
            tokio::select! {
                _ = self.poll_once() => {}
                _ = stop_rx.changed() => break,
            }
            watermark_tx.send_replace(self.watermark);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = stop_rx.changed() => break,
            }
        }

        info!(watermark = %self.watermark, "Notification poller stopped");
        self
    }
}

/// Handle on a running poller.
pub struct PollerHandle<S, B> {
    stop_tx: watch::Sender<bool>,
    watermark_rx: watch::Receiver<Watermark>,
    task: JoinHandle<NotificationPoller<S, B>>,
}

impl<S, B> PollerHandle<S, B> {
    /// Watermark after the most recent completed cycle.
    pub fn watermark(&self) -> Watermark {
        *self.watermark_rx.borrow()
    }

    /// Receiver notified after every completed cycle.
    pub fn subscribe(&self) -> watch::Receiver<Watermark> {
        self.watermark_rx.clone()
    }

    /// Stop the loop and hand the poller back. An in-flight request is dropped.
    pub async fn stop(self) -> FestivalResult<NotificationPoller<S, B>> {
        let _ = self.stop_tx.send(true);
        Ok(self.task.await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FestivalError;
    use crate::notification::{CounterSlot, Counters};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays scripted batches and records the `since` of every call.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        batches: Arc<Mutex<VecDeque<FestivalResult<Vec<Notification>>>>>,
        calls: Arc<Mutex<Vec<f64>>>,
    }

    impl ScriptedSource {
        fn push(&self, batch: FestivalResult<Vec<Notification>>) {
            self.batches.lock().unwrap().push_back(batch);
        }

        fn calls(&self) -> Vec<f64> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSource for ScriptedSource {
        async fn fetch_since(&self, since: Watermark) -> FestivalResult<Vec<Notification>> {
            self.calls.lock().unwrap().push(since.value());
            self.batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn event(kind: NotificationKind, timestamp: f64) -> Notification {
        Notification::new(kind, timestamp)
    }

    fn failure() -> FestivalError {
        FestivalError::UnexpectedStatus {
            endpoint: "/notifications".to_string(),
            status: 502,
        }
    }

    #[tokio::test]
    async fn test_single_festival_update() {
        let source = ScriptedSource::default();
        source.push(Ok(vec![event(NotificationKind::FestivalUpdated(3), 100.0)]));
        let mut poller = NotificationPoller::new(source.clone(), Counters::default());

        let outcome = poller.poll_once().await;
        assert_eq!(
            outcome,
            PollOutcome::Delivered {
                events: 1,
                watermark: Watermark::new(100.0)
            }
        );

        let counter = poller.board().get(CounterSlot::FestivalCount);
        assert_eq!(counter.text, "3");
        assert!(counter.visible);

        poller.poll_once().await;
        assert_eq!(source.calls(), vec![0.0, 100.0]);
    }

    #[tokio::test]
    async fn test_last_event_per_counter_wins() {
        let source = ScriptedSource::default();
        source.push(Ok(vec![
            event(NotificationKind::FestivalUpdated(2), 10.0),
            event(NotificationKind::NoRegistrationCodes(5), 11.0),
            event(NotificationKind::FestivalUpdated(4), 12.0),
        ]));
        source.push(Ok(vec![
            event(NotificationKind::NoRegistrationCodes(0), 20.0),
            event(NotificationKind::Admin(1), 21.0),
        ]));
        let mut poller = NotificationPoller::new(source.clone(), Counters::default());

        poller.poll_once().await;
        poller.poll_once().await;

        let board = poller.board();
        assert_eq!(board.get(CounterSlot::FestivalCount).text, "4");
        assert_eq!(board.get(CounterSlot::AvailableCodes).text, "0");
        assert!(!board.get(CounterSlot::AvailableCodes).visible);
        assert_eq!(board.get(CounterSlot::AdminChanged).text, "1");
        assert_eq!(poller.watermark(), Watermark::new(21.0));
    }

    #[tokio::test]
    async fn test_unknown_events_advance_watermark() {
        let source = ScriptedSource::default();
        source.push(Ok(vec![
            event(NotificationKind::Admin(1), 5.0),
            event(
                NotificationKind::Unknown {
                    name: "purchase_added".to_string(),
                },
                9.0,
            ),
        ]));
        let mut poller = NotificationPoller::new(source.clone(), Counters::default());

        poller.poll_once().await;
        assert_eq!(poller.watermark(), Watermark::new(9.0));
        assert_eq!(poller.board().get(CounterSlot::AdminChanged).text, "1");
    }

    #[tokio::test]
    async fn test_empty_and_failed_batches_keep_watermark() {
        let source = ScriptedSource::default();
        source.push(Ok(vec![event(NotificationKind::Admin(1), 42.0)]));
        source.push(Ok(Vec::new()));
        source.push(Err(failure()));
        let mut poller = NotificationPoller::new(source.clone(), Counters::default());

        poller.poll_once().await;
        assert_eq!(
            poller.poll_once().await,
            PollOutcome::Delivered {
                events: 0,
                watermark: Watermark::new(42.0)
            }
        );
        assert_eq!(poller.poll_once().await, PollOutcome::Failed);
        poller.poll_once().await;

        assert_eq!(source.calls(), vec![0.0, 42.0, 42.0, 42.0]);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let source = ScriptedSource::default();
        source.push(Ok(vec![event(NotificationKind::FestivalUpdated(3), 100.0)]));
        source.push(Err(failure()));
        let poller = NotificationPoller::new(source.clone(), Counters::default())
            .with_interval(Duration::from_millis(5));

        let handle = poller.start();
        let mut updates = handle.subscribe();
        while source.calls().len() < 4 {
            updates.changed().await.unwrap();
        }
        assert_eq!(handle.watermark(), Watermark::new(100.0));

        let poller = handle.stop().await.unwrap();
        let calls = source.calls();
        assert_eq!(&calls[..4], &[0.0, 100.0, 100.0, 100.0]);
        assert_eq!(poller.board().get(CounterSlot::FestivalCount).text, "3");

        // No requests after stop.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(source.calls().len(), calls.len());
    }

    #[test]
    fn test_zero_interval_uses_minimum() {
        let poller = NotificationPoller::new(ScriptedSource::default(), Counters::default())
            .with_interval(Duration::ZERO);
        assert_eq!(poller.interval(), Duration::from_secs(MIN_POLL_INTERVAL_SECS));

        let poller = poller.with_interval(Duration::from_millis(5));
        assert_eq!(poller.interval(), Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_first_poll_is_immediate() {
        let source = ScriptedSource::default();
        let poller = NotificationPoller::new(source.clone(), Counters::default())
            .with_interval(Duration::from_secs(3600))
            .with_watermark(Watermark::new(7.0));

        let handle = poller.start();
        let mut updates = handle.subscribe();
        updates.changed().await.unwrap();
        assert_eq!(source.calls(), vec![7.0]);

        handle.stop().await.unwrap();
    }
}
