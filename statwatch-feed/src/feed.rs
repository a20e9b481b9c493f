//! The telemetry feed: a fixed-interval scheduler over a sample source.
//!
//! ## Tick lifecycle
//!
//! ```text
//! start() ──▶ tick ──▶ fetch_sample() ──┬─ Ok ───────────▶ append, Running, notify snapshot
//!              ▲                        ├─ Unreachable ──▶ Error(msg), notify snapshot
//!              │                        ├─ ServerError ──▶ Error(msg), notify snapshot
//!              └──── every interval ◀───┘
//!                                       └─ Unauthorized ─▶ Unauthenticated, notify once, halt
//! ```
//!
//! Ticks never overlap: the next tick waits for the previous fetch to
//! resolve. `stop()` drops an in-flight fetch and bumps the run epoch, so a
//! result that races with `stop()` is discarded before it touches state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, RwLock};
use statwatch_types::{FeedStatus, SampleData, SystemStats};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::history::{HistoryBuffer, Sample, DEFAULT_HISTORY_LEN};
use crate::source::SampleSource;
use crate::{FeedError, SourceError};

/// Default time between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

type SnapshotObserver = Arc<dyn Fn(&FeedSnapshot) + Send + Sync>;
type UnauthenticatedObserver = Arc<dyn Fn() + Send + Sync>;

/// A copy of the feed's state handed to observers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedSnapshot {
    /// Latest value per series name.
    pub series: BTreeMap<String, f64>,
    /// The history window, oldest first.
    pub history: Vec<Sample>,
    /// Status after the tick that produced this snapshot.
    pub status: FeedStatus,
}

impl FeedSnapshot {
    /// Most recent sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.history.last()
    }

    /// Most recent structured stats record, if the source is remote.
    pub fn latest_stats(&self) -> Option<&SystemStats> {
        self.latest().and_then(Sample::stats)
    }

    /// Series names seen across the window, sorted.
    pub fn series_names(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }
}

/// Mutable state of one feed. Only the tick handler and `stop()` write it.
#[derive(Debug)]
struct FeedState {
    status: FeedStatus,
    history: HistoryBuffer,
    latest: BTreeMap<String, f64>,
    next_seq: u64,
}

impl FeedState {
    fn new(history_len: usize) -> Self {
        Self {
            status: FeedStatus::Idle,
            history: HistoryBuffer::new(history_len),
            latest: BTreeMap::new(),
            next_seq: 0,
        }
    }

    fn reset(&mut self) {
        self.history.clear();
        self.latest.clear();
        self.next_seq = 0;
    }

    fn record(&mut self, data: SampleData) {
        for (name, value) in data.series() {
            self.latest.insert(name, value);
        }

        let sample = Sample {
            seq: self.next_seq,
            captured_at: Instant::now(),
            timestamp_ms: current_timestamp_ms(),
            data,
        };
        self.next_seq += 1;

        if let Some(evicted) = self.history.push(sample) {
            debug!("evicted sample {} from history", evicted.seq);
        }
    }

    fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            series: self.latest.clone(),
            history: self.history.to_vec(),
            status: self.status.clone(),
        }
    }
}

/// State shared between the feed handle and its tick task.
struct Shared {
    state: Mutex<FeedState>,
    /// Held while a tick applies its result and notifies observers.
    gate: Mutex<()>,
    /// Bumped by every start and stop; ticks from an older run are discarded.
    epoch: AtomicU64,
    /// Thread currently running this feed's observers, if any.
    dispatcher: Mutex<Option<ThreadId>>,
    snapshot_observers: RwLock<Vec<SnapshotObserver>>,
    unauthenticated_observers: RwLock<Vec<UnauthenticatedObserver>>,
}

/// What the tick loop should do after applying a result.
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Continue,
    Halt,
}

impl Shared {
    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Apply one fetch outcome and notify observers.
    fn apply(&self, epoch: u64, outcome: Result<SampleData, SourceError>) -> Next {
        let _gate = self.gate.lock();
        if !self.is_current(epoch) {
            debug!("discarding result from superseded run");
            return Next::Halt;
        }

        match outcome {
            Ok(data) => {
                let snapshot = {
                    let mut state = self.state.lock();
                    state.record(data);
                    state.status = FeedStatus::Running;
                    state.snapshot()
                };
                debug!("tick ok, {} samples in window", snapshot.history.len());
                self.notify_snapshot(epoch, &snapshot);
                Next::Continue
            }
            Err(SourceError::Unauthorized) => {
                self.state.lock().status = FeedStatus::Unauthenticated;
                info!("source rejected the session, polling stopped");
                self.notify_unauthenticated(epoch);
                Next::Halt
            }
            Err(err) => {
                warn!("tick failed, retrying next interval: {}", err);
                let snapshot = {
                    let mut state = self.state.lock();
                    state.status = FeedStatus::Error(err.to_string());
                    state.snapshot()
                };
                self.notify_snapshot(epoch, &snapshot);
                Next::Continue
            }
        }
    }

    fn notify_snapshot(&self, epoch: u64, snapshot: &FeedSnapshot) {
        let observers = self.snapshot_observers.read().clone();
        let _dispatch = DispatchGuard::enter(&self.dispatcher);
        for observer in observers {
            if !self.is_current(epoch) {
                break;
            }
            observer(snapshot);
        }
    }

    fn notify_unauthenticated(&self, epoch: u64) {
        let observers = self.unauthenticated_observers.read().clone();
        let _dispatch = DispatchGuard::enter(&self.dispatcher);
        for observer in observers {
            if !self.is_current(epoch) {
                break;
            }
            observer();
        }
    }

    /// Wait for an in-progress notification to finish.
    ///
    /// Skipped when called from one of this feed's own observers, whose
    /// thread already holds the gate.
    fn wait_for_dispatch(&self) {
        let current = thread::current().id();
        if *self.dispatcher.lock() != Some(current) {
            drop(self.gate.lock());
        }
    }
}

/// Records the current thread as the feed's dispatcher until dropped.
struct DispatchGuard<'a> {
    dispatcher: &'a Mutex<Option<ThreadId>>,
}

impl<'a> DispatchGuard<'a> {
    fn enter(dispatcher: &'a Mutex<Option<ThreadId>>) -> Self {
        *dispatcher.lock() = Some(thread::current().id());
        Self { dispatcher }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        *self.dispatcher.lock() = None;
    }
}

/// Handle to a running tick task.
struct RunningTask {
    stop_tx: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

/// Periodically pulls samples from a source into a bounded window.
///
/// # Example
///
/// ```rust,no_run
/// use statwatch_feed::{SyntheticSource, TelemetryFeed};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let feed = TelemetryFeed::builder(SyntheticSource::new(["A", "B"]))
///         .interval(Duration::from_secs(1))
///         .build();
///
///     feed.on_snapshot(|snapshot| {
///         println!("{} samples, status {}", snapshot.history.len(), snapshot.status);
///     });
///     feed.on_unauthenticated(|| println!("session expired"));
///
///     feed.start().expect("non-zero interval");
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     feed.stop();
/// }
/// ```
pub struct TelemetryFeed {
    source: Arc<dyn SampleSource>,
    shared: Arc<Shared>,
    task: Mutex<Option<RunningTask>>,
    interval: Duration,
}

impl TelemetryFeed {
    /// Create a feed with default settings.
    pub fn new<S: SampleSource + 'static>(source: S) -> Self {
        Self::builder(source).build()
    }

    /// Create a builder for configuring the feed.
    pub fn builder<S: SampleSource + 'static>(source: S) -> TelemetryFeedBuilder {
        TelemetryFeedBuilder::new(Arc::new(source))
    }

    /// Start ticking at the configured interval.
    ///
    /// See [`start_with_interval`](Self::start_with_interval).
    pub fn start(&self) -> Result<(), FeedError> {
        self.start_with_interval(self.interval)
    }

    /// Start ticking: one tick now, then one every `interval`.
    ///
    /// A no-op while the feed is already polling, and while it is
    /// unauthenticated (call [`stop`](Self::stop) first). Starting resets
    /// the history window. Outside a tokio runtime this fails with
    /// [`FeedError::NoRuntime`] and leaves the feed untouched.
    pub fn start_with_interval(&self, interval: Duration) -> Result<(), FeedError> {
        if interval.is_zero() {
            return Err(FeedError::InvalidInterval);
        }
        let runtime = Handle::try_current().map_err(|_| FeedError::NoRuntime)?;

        let mut task = self.task.lock();
        let epoch = {
            let mut state = self.shared.state.lock();
            if state.status.is_polling() {
                debug!("start ignored, feed already running");
                return Ok(());
            }
            if state.status.is_terminal() {
                warn!("start ignored, feed is unauthenticated; stop it first");
                return Ok(());
            }
            state.reset();
            state.status = FeedStatus::Running;
            self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = runtime.spawn(run_ticks(
            self.source.clone(),
            self.shared.clone(),
            interval,
            epoch,
            stop_rx,
        ));
        *task = Some(RunningTask {
            stop_tx,
            _handle: handle,
        });

        info!(
            "feed started: {} every {:?}",
            self.source.description(),
            interval
        );
        Ok(())
    }

    /// Stop ticking and return to `Idle`.
    ///
    /// Idempotent and safe from any state, including from inside an
    /// observer. Once this returns no observer is notified for the stopped
    /// run, even if a fetch was in flight. The history window is kept until
    /// the next start.
    pub fn stop(&self) {
        let running = self.task.lock().take();
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = running {
            let _ = task.stop_tx.send(true);
        }

        self.shared.wait_for_dispatch();

        let mut state = self.shared.state.lock();
        if state.status != FeedStatus::Idle {
            info!("feed stopped (was {})", state.status.label());
            state.status = FeedStatus::Idle;
        }
    }

    /// Start ticking and stop again when the returned guard is dropped.
    pub fn start_scoped(&self) -> Result<RunGuard<'_>, FeedError> {
        self.start()?;
        Ok(RunGuard { feed: self })
    }

    /// Register an observer called after every tick that changed state.
    pub fn on_snapshot<F>(&self, observer: F)
    where
        F: Fn(&FeedSnapshot) + Send + Sync + 'static,
    {
        self.shared.snapshot_observers.write().push(Arc::new(observer));
    }

    /// Register an observer called once when the source rejects the session.
    pub fn on_unauthenticated<F>(&self, observer: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared
            .unauthenticated_observers
            .write()
            .push(Arc::new(observer));
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Current status.
    pub fn status(&self) -> FeedStatus {
        self.shared.state.lock().status.clone()
    }

    /// The configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Description of the underlying source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }
}

impl Drop for TelemetryFeed {
    fn drop(&mut self) {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.get_mut().take() {
            let _ = task.stop_tx.send(true);
        }
    }
}

impl std::fmt::Debug for TelemetryFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryFeed")
            .field("source", &self.source.description())
            .field("interval", &self.interval)
            .field("status", &self.status())
            .finish()
    }
}

/// Stops the feed when dropped.
///
/// Pairs a host's mount/unmount with the feed's start/stop.
#[must_use = "the feed stops as soon as the guard is dropped"]
pub struct RunGuard<'a> {
    feed: &'a TelemetryFeed,
}

impl RunGuard<'_> {
    /// The feed this guard keeps running.
    pub fn feed(&self) -> &TelemetryFeed {
        self.feed
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.feed.stop();
    }
}

/// Builder for configuring a [`TelemetryFeed`].
pub struct TelemetryFeedBuilder {
    source: Arc<dyn SampleSource>,
    interval: Option<Duration>,
    history_len: Option<usize>,
}

impl TelemetryFeedBuilder {
    fn new(source: Arc<dyn SampleSource>) -> Self {
        Self {
            source,
            interval: None,
            history_len: None,
        }
    }

    /// Set the tick interval.
    ///
    /// Defaults to 2 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the history window length.
    ///
    /// Defaults to 20 samples if not specified.
    pub fn history_len(mut self, len: usize) -> Self {
        self.history_len = Some(len);
        self
    }

    /// Build the feed. It stays idle until started.
    pub fn build(self) -> TelemetryFeed {
        let history_len = self.history_len.unwrap_or(DEFAULT_HISTORY_LEN);
        TelemetryFeed {
            source: self.source,
            shared: Arc::new(Shared {
                state: Mutex::new(FeedState::new(history_len)),
                gate: Mutex::new(()),
                epoch: AtomicU64::new(0),
                dispatcher: Mutex::new(None),
                snapshot_observers: RwLock::new(Vec::new()),
                unauthenticated_observers: RwLock::new(Vec::new()),
            }),
            task: Mutex::new(None),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
        }
    }
}

/// The tick loop of one run.
async fn run_ticks(
    source: Arc<dyn SampleSource>,
    shared: Arc<Shared>,
    interval: Duration,
    epoch: u64,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            biased;
            _ = stop_rx.changed() => {
                debug!("stop requested, dropping in-flight fetch");
                break;
            }
            outcome = source.fetch_sample() => outcome,
        };

        if shared.apply(epoch, outcome) == Next::Halt {
            break;
        }
    }

    debug!("tick loop for run {} exited", epoch);
}

/// Get current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntheticSource;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Weak;

    /// A source that replays scripted outcomes, then succeeds forever.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<f64, SourceError>>>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<f64, SourceError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                ..Default::default()
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay: Some(delay),
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SampleSource for ScriptedSource {
        async fn fetch_sample(&self) -> Result<SampleData, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let next = self.script.lock().pop_front().unwrap_or(Ok(50.0));
            next.map(|v| SampleData::Scalars(BTreeMap::from([("A".to_string(), v)])))
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    /// Collects everything observers see.
    #[derive(Default)]
    struct Recorder {
        snapshots: Mutex<Vec<FeedSnapshot>>,
        unauthenticated: AtomicUsize,
    }

    fn observe(feed: &TelemetryFeed) -> Arc<Recorder> {
        let recorder = Arc::new(Recorder::default());
        let r = recorder.clone();
        feed.on_snapshot(move |s| r.snapshots.lock().push(s.clone()));
        let r = recorder.clone();
        feed.on_unauthenticated(move || {
            r.unauthenticated.fetch_add(1, Ordering::SeqCst);
        });
        recorder
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn synthetic_three_ticks() {
        let source = SyntheticSource::with_rng(["A"], StdRng::seed_from_u64(11));
        let feed = TelemetryFeed::builder(source)
            .interval(Duration::from_millis(2000))
            .build();
        let recorder = observe(&feed);

        feed.start().unwrap();
        advance(4001).await;

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.history.len(), 3);
        for sample in &snapshot.history {
            let value = sample.value("A").unwrap();
            assert!((20.0..180.0).contains(&value));
        }
        assert_eq!(
            snapshot.series["A"],
            snapshot.latest().unwrap().value("A").unwrap()
        );
        assert_eq!(snapshot.status, FeedStatus::Running);
        assert_eq!(recorder.snapshots.lock().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::new(source.clone());

        feed.start().unwrap();
        advance(1).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(feed.snapshot().history.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn window_evicts_oldest_first() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::builder(source.clone())
            .interval(Duration::from_millis(10))
            .build();

        feed.start().unwrap();
        advance(205).await; // ticks at 0, 10, ..., 200

        let snapshot = feed.snapshot();
        assert_eq!(source.calls(), 21);
        assert_eq!(snapshot.history.len(), DEFAULT_HISTORY_LEN);
        assert_eq!(snapshot.history[0].seq, 1);
        assert!(snapshot.history.iter().all(|s| s.seq != 0));
    }

    #[tokio::test(start_paused = true)]
    async fn history_is_in_capture_order() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::builder(source)
            .interval(Duration::from_millis(100))
            .history_len(5)
            .build();

        feed.start().unwrap();
        advance(1_250).await;

        let history = feed.snapshot().history;
        assert_eq!(history.len(), 5);
        for pair in history.windows(2) {
            assert!(pair[0].captured_at < pair[1].captured_at);
            assert_eq!(pair[0].seq + 1, pair[1].seq);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_halts_polling() {
        let source = ScriptedSource::new(vec![Err(SourceError::Unauthorized)]);
        let feed = TelemetryFeed::new(source.clone());
        let recorder = observe(&feed);

        feed.start().unwrap();
        advance(10_000).await;

        assert_eq!(feed.status(), FeedStatus::Unauthenticated);
        assert_eq!(recorder.unauthenticated.load(Ordering::SeqCst), 1);
        assert_eq!(source.calls(), 1);
        assert!(recorder.snapshots.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_keeps_last_known_values() {
        let source = ScriptedSource::new(vec![Ok(33.0), Ok(44.0), Err(SourceError::Unauthorized)]);
        let feed = TelemetryFeed::new(source.clone());

        feed.start().unwrap();
        advance(10_000).await;

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.status, FeedStatus::Unauthenticated);
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.series["A"], 44.0);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn soft_failure_then_recovery() {
        let source = ScriptedSource::new(vec![Err(SourceError::Unreachable(
            "connection refused".into(),
        ))]);
        let feed = TelemetryFeed::new(source.clone());
        let recorder = observe(&feed);

        feed.start().unwrap();
        advance(1).await;

        let snapshot = feed.snapshot();
        assert!(matches!(snapshot.status, FeedStatus::Error(_)));
        assert_eq!(snapshot.history.len(), 0);

        advance(2000).await;

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.status, FeedStatus::Running);
        assert_eq!(snapshot.history.len(), 1);

        let seen = recorder.snapshots.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0].status.error_message(),
            Some("Failed to connect to backend: connection refused")
        );
        assert_eq!(seen[1].status, FeedStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_keep_retrying() {
        let source = ScriptedSource::new(vec![
            Err(SourceError::ServerError("502".into())),
            Err(SourceError::ServerError("502".into())),
            Err(SourceError::ServerError("502".into())),
        ]);
        let feed = TelemetryFeed::new(source.clone());

        feed.start().unwrap();
        advance(4001).await;
        assert!(matches!(feed.status(), FeedStatus::Error(_)));
        assert_eq!(source.calls(), 3);

        advance(2000).await;
        assert_eq!(feed.status(), FeedStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_fetch() {
        let source = ScriptedSource::slow(Duration::from_millis(500));
        let feed = TelemetryFeed::new(source.clone());
        let recorder = observe(&feed);

        feed.start().unwrap();
        advance(100).await;
        assert_eq!(source.calls(), 1);

        feed.stop();
        advance(5_000).await;

        assert_eq!(source.calls(), 1);
        assert!(recorder.snapshots.lock().is_empty());
        assert_eq!(feed.status(), FeedStatus::Idle);
        assert!(feed.snapshot().history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetches_never_overlap() {
        let source = ScriptedSource::slow(Duration::from_millis(3000));
        let feed = TelemetryFeed::new(source.clone());

        feed.start().unwrap();
        advance(10_000).await;

        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
        let history = feed.snapshot().history;
        assert_eq!(history.len(), 3);
        for pair in history.windows(2) {
            assert!(pair[0].captured_at < pair[1].captured_at);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_noop() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::new(source.clone());

        feed.start().unwrap();
        feed.start().unwrap();
        advance(1).await;

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_ignored_while_unauthenticated() {
        let source = ScriptedSource::new(vec![Err(SourceError::Unauthorized)]);
        let feed = TelemetryFeed::new(source.clone());

        feed.start().unwrap();
        advance(1).await;
        feed.start().unwrap();
        advance(5_000).await;

        assert_eq!(feed.status(), FeedStatus::Unauthenticated);
        assert_eq!(source.calls(), 1);

        feed.stop();
        assert_eq!(feed.status(), FeedStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_begins_fresh_window() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::new(source.clone());

        feed.start().unwrap();
        advance(2001).await;
        assert_eq!(feed.snapshot().history.len(), 2);

        feed.stop();
        assert_eq!(feed.snapshot().history.len(), 2);

        feed.start().unwrap();
        advance(1).await;
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].seq, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let feed = TelemetryFeed::new(ScriptedSource::new(vec![]));
        feed.stop();
        feed.start().unwrap();
        feed.stop();
        feed.stop();
        assert_eq!(feed.status(), FeedStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn observer_can_stop_the_feed() {
        let source = ScriptedSource::new(vec![]);
        let feed = Arc::new(TelemetryFeed::new(source.clone()));
        let weak: Weak<TelemetryFeed> = Arc::downgrade(&feed);
        feed.on_snapshot(move |_| {
            if let Some(feed) = weak.upgrade() {
                feed.stop();
            }
        });

        feed.start().unwrap();
        advance(10_000).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(feed.status(), FeedStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn scoped_run_stops_on_drop() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::new(source.clone());

        {
            let guard = feed.start_scoped().unwrap();
            advance(1).await;
            assert_eq!(guard.feed().status(), FeedStatus::Running);
        }

        assert_eq!(feed.status(), FeedStatus::Idle);
        advance(10_000).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_feed_ends_the_task() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::new(source.clone());
        feed.start().unwrap();
        advance(1).await;

        drop(feed);
        advance(10_000).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let feed = TelemetryFeed::new(ScriptedSource::new(vec![]));
        assert_eq!(
            feed.start_with_interval(Duration::ZERO),
            Err(FeedError::InvalidInterval)
        );
        assert_eq!(feed.status(), FeedStatus::Idle);
    }

    /// Block the calling thread until `condition` holds.
    fn wait_for(condition: impl Fn() -> bool) {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(std::time::Instant::now() < deadline, "condition not met in time");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_from_another_feeds_observer_waits_for_dispatch() {
        let slow = Arc::new(
            TelemetryFeed::builder(ScriptedSource::new(vec![]))
                .interval(Duration::from_secs(60))
                .build(),
        );
        let entered = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        {
            let (entered, finished) = (entered.clone(), finished.clone());
            slow.on_snapshot(move |_| {
                entered.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(300));
                finished.store(true, Ordering::SeqCst);
            });
        }

        let other = TelemetryFeed::builder(ScriptedSource::new(vec![]))
            .interval(Duration::from_secs(60))
            .build();
        let finished_at_return = Arc::new(Mutex::new(None));
        {
            let (slow, finished) = (slow.clone(), finished.clone());
            let finished_at_return = finished_at_return.clone();
            other.on_snapshot(move |_| {
                slow.stop();
                *finished_at_return.lock() = Some(finished.load(Ordering::SeqCst));
            });
        }

        slow.start().unwrap();
        wait_for(|| entered.load(Ordering::SeqCst));
        other.start().unwrap();
        wait_for(|| finished_at_return.lock().is_some());

        assert_eq!(*finished_at_return.lock(), Some(true));
        assert_eq!(slow.status(), FeedStatus::Idle);
        other.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn result_waiting_on_the_gate_is_discarded_by_stop() {
        let source = ScriptedSource::new(vec![]);
        let feed = TelemetryFeed::builder(source.clone())
            .interval(Duration::from_secs(60))
            .build();
        let recorder = observe(&feed);

        // The first fetch resolves at once, then blocks applying its result
        let gate = feed.shared.gate.lock();
        feed.start().unwrap();
        wait_for(|| source.calls() == 1);
        std::thread::sleep(Duration::from_millis(50));
        let epoch = feed.shared.epoch.load(Ordering::SeqCst);

        std::thread::scope(|scope| {
            let stopper = scope.spawn(|| feed.stop());
            wait_for(|| feed.shared.epoch.load(Ordering::SeqCst) != epoch);
            drop(gate);
            stopper.join().unwrap();
        });

        assert!(recorder.snapshots.lock().is_empty());
        assert!(feed.snapshot().history.is_empty());
        assert!(feed.snapshot().series.is_empty());
        assert_eq!(feed.status(), FeedStatus::Idle);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn start_outside_a_runtime_leaves_the_feed_idle() {
        let feed = TelemetryFeed::new(ScriptedSource::new(vec![]));
        assert_eq!(feed.start(), Err(FeedError::NoRuntime));
        assert_eq!(feed.status(), FeedStatus::Idle);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        assert_eq!(feed.start(), Ok(()));
        assert_eq!(feed.status(), FeedStatus::Running);
        feed.stop();
    }

    #[test]
    fn builder_defaults() {
        let feed = TelemetryFeed::new(ScriptedSource::new(vec![]));
        assert_eq!(feed.interval(), DEFAULT_INTERVAL);
        assert_eq!(feed.status(), FeedStatus::Idle);
        assert_eq!(feed.source_description(), "scripted");
        assert!(feed.snapshot().history.is_empty());
    }
}
