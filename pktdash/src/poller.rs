//! Fixed-cadence poll loop.
//!
//! One background task owns the timer. Each tick runs a cycle: the three
//! fetches are joined concurrently and the finished [`CycleOutcome`] is sent
//! to the UI loop, which merges it. A cycle that overruns the period makes
//! the missed ticks get skipped, so cycles never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::client::DataSource;
use crate::error::PollerError;
use crate::store::CycleOutcome;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

// Small on purpose: a slow consumer back-pressures the loop instead of
// queueing old cycles.
const OUTCOME_QUEUE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Stopped,
}

pub struct Poller<S: DataSource + 'static> {
    source: Arc<S>,
    period: Duration,
    state: PollerState,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl<S: DataSource + 'static> Poller<S> {
    pub fn new(source: S, period: Duration) -> Self {
        Self::with_shared(Arc::new(source), period)
    }

    pub fn with_shared(source: Arc<S>, period: Duration) -> Self {
        Self {
            source,
            period,
            state: PollerState::Idle,
            stop_tx: None,
            task: None,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Idle -> Polling. The first cycle fires immediately; finished cycles
    /// arrive on the returned receiver.
    pub fn start(&mut self) -> Result<mpsc::Receiver<CycleOutcome>, PollerError> {
        match self.state {
            PollerState::Idle => {}
            PollerState::Polling => return Err(PollerError::AlreadyPolling),
            PollerState::Stopped => return Err(PollerError::Stopped),
        }

        let (tx, rx) = mpsc::channel(OUTCOME_QUEUE);
        let (stop_tx, stop_rx) = watch::channel(false);
        let source = self.source.clone();
        let period = self.period;

        self.task = Some(tokio::spawn(poll_loop(source, period, tx, stop_rx)));
        self.stop_tx = Some(stop_tx);
        self.state = PollerState::Polling;
        info!(period_ms = period.as_millis() as u64, "poller started");
        Ok(rx)
    }

    /// -> Stopped. Cancels the timer and abandons any in-flight cycle. Waits
    /// for the loop to exit so nothing is sent after this returns.
    pub async fn stop(&mut self) {
        if self.state == PollerState::Stopped {
            return;
        }
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.state = PollerState::Stopped;
        info!("poller stopped");
    }
}

impl<S: DataSource + 'static> Drop for Poller<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Issue all three fetches concurrently and wait for every one to settle.
pub async fn run_cycle<S: DataSource + ?Sized>(source: &S, cycle: u64) -> CycleOutcome {
    let (records, timeline, distribution) = tokio::join!(
        source.fetch_records(),
        source.fetch_timeline(),
        source.fetch_distribution(),
    );
    CycleOutcome {
        cycle,
        records,
        timeline,
        distribution,
    }
}

async fn poll_loop<S: DataSource + ?Sized>(
    source: Arc<S>,
    period: Duration,
    tx: mpsc::Sender<CycleOutcome>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cycle: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        cycle += 1;
        let outcome = tokio::select! {
            biased;
            _ = stop_rx.changed() => {
                debug!(cycle, "in-flight cycle abandoned at teardown");
                break;
            }
            outcome = run_cycle(source.as_ref(), cycle) => outcome,
        };

        // liveness check before handing off
        if *stop_rx.borrow() {
            debug!(cycle, "finished cycle dropped after teardown");
            break;
        }
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            sent = tx.send(outcome) => {
                if sent.is_err() {
                    // receiver gone; nobody left to render
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::types::{PacketRecord, ProtocolDistribution, TimelineSeries};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches and how many run at once; every call sleeps `delay`.
    #[derive(Default)]
    struct SlowSource {
        delay: Duration,
        fail_timeline: bool,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl SlowSource {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        async fn enter(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl DataSource for SlowSource {
        async fn fetch_records(&self) -> Result<Vec<PacketRecord>, FetchError> {
            self.enter().await;
            Ok(vec![])
        }
        async fn fetch_timeline(&self) -> Result<TimelineSeries, FetchError> {
            self.enter().await;
            if self.fail_timeline {
                return Err(FetchError::Timeout);
            }
            Ok(TimelineSeries {
                times: vec!["12:00".into()],
                counts: vec![5],
            })
        }
        async fn fetch_distribution(&self) -> Result<ProtocolDistribution, FetchError> {
            self.enter().await;
            Ok(ProtocolDistribution::default())
        }
        fn description(&self) -> String {
            "slow".into()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn state_machine_transitions() {
        let mut p = Poller::new(SlowSource::new(Duration::ZERO), DEFAULT_INTERVAL);
        assert_eq!(p.state(), PollerState::Idle);
        assert_eq!(p.period(), Duration::from_millis(2000));

        let _rx = p.start().unwrap();
        assert_eq!(p.state(), PollerState::Polling);
        assert_eq!(p.start().unwrap_err(), PollerError::AlreadyPolling);

        p.stop().await;
        assert_eq!(p.state(), PollerState::Stopped);
        assert_eq!(p.start().unwrap_err(), PollerError::Stopped);

        // idempotent
        p.stop().await;
        assert_eq!(p.state(), PollerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_from_idle_is_terminal() {
        let mut p = Poller::new(SlowSource::new(Duration::ZERO), DEFAULT_INTERVAL);
        p.stop().await;
        assert_eq!(p.state(), PollerState::Stopped);
        assert!(p.start().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_fires_immediately_then_on_cadence() {
        let mut p = Poller::new(SlowSource::new(Duration::ZERO), Duration::from_millis(2000));
        let mut rx = p.start().unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.cycle, 1);
        let started = time::Instant::now();

        let second = rx.recv().await.unwrap();
        assert_eq!(second.cycle, 2);
        assert!(started.elapsed() >= Duration::from_millis(1999));

        p.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_within_a_cycle_run_concurrently() {
        let src = Arc::new(SlowSource::new(Duration::from_millis(100)));
        let outcome = run_cycle(src.as_ref(), 1).await;
        assert_eq!(src.peak.load(Ordering::SeqCst), 3);
        assert_eq!(src.calls.load(Ordering::SeqCst), 3);
        assert!(outcome.records.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn partial_failure_is_carried_per_field() {
        let src = SlowSource {
            fail_timeline: true,
            ..SlowSource::new(Duration::ZERO)
        };
        let outcome = run_cycle(&src, 7).await;
        assert_eq!(outcome.cycle, 7);
        assert!(outcome.records.is_ok());
        assert_eq!(outcome.timeline.unwrap_err(), FetchError::Timeout);
        assert!(outcome.distribution.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycles_never_overlap() {
        // each cycle takes 5s against a 2s period
        let src = Arc::new(SlowSource::new(Duration::from_secs(5)));
        let mut p = Poller::with_shared(src.clone(), Duration::from_secs(2));
        let mut rx = p.start().unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(rx.recv().await.unwrap().cycle);
        }
        assert_eq!(seen, vec![1, 2, 3]);
        // never more than one cycle's three fetches in flight
        assert_eq!(src.peak.load(Ordering::SeqCst), 3);

        p.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_delivered_after_teardown() {
        let src = Arc::new(SlowSource::new(Duration::from_secs(10)));
        let mut p = Poller::with_shared(src.clone(), DEFAULT_INTERVAL);
        let mut rx = p.start().unwrap();

        // let the first cycle get in flight, then tear down mid-request
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(src.in_flight.load(Ordering::SeqCst), 3);
        p.stop().await;

        // the abandoned fetches would have resolved by now
        time::sleep(Duration::from_secs(30)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_exits_when_receiver_dropped() {
        let mut p = Poller::new(SlowSource::new(Duration::ZERO), Duration::from_millis(100));
        let rx = p.start().unwrap();
        drop(rx);
        time::sleep(Duration::from_secs(1)).await;
        p.stop().await;
        assert_eq!(p.state(), PollerState::Stopped);
    }
}
